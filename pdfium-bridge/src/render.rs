//! Rasterization into host surfaces
//!
//! RGBA_8888 surfaces are rendered in place. RGB_565 surfaces are rendered
//! into a 24-bit scratch bitmap first and down-converted row by row.

use crate::bridge::{invalid_handle, invalid_parameter, PdfBridge};
use crate::engine::{BitmapView, Engine, EngineFormat, RenderFlags, Rotation, Viewport};
use crate::error::{PdfError, Result};
use crate::registry::PageHandle;
use crate::surface::{PixelSurface, SurfaceFormat, SurfaceLock};

/// Pack 8-bit channels into RGB_565 with rounding.
///
/// # Example
///
/// ```
/// use pdfium_bridge::rgb_to_565;
///
/// assert_eq!(rgb_to_565(0xFF, 0xFF, 0xFF), 0xFFFF);
/// assert_eq!(rgb_to_565(0x84, 0x84, 0x84), 0x8430);
/// ```
pub fn rgb_to_565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = ((u32::from(r) * 249 + 1014) >> 11) as u16;
    let g6 = ((u32::from(g) * 253 + 505) >> 10) as u16;
    let b5 = ((u32::from(b) * 249 + 1014) >> 11) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Convert `height` rows of `width` RGB pixels into native-endian RGB_565.
pub(crate) fn convert_rgb24_to_565(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
) {
    for y in 0..height {
        let src_row = &src[y * src_stride..y * src_stride + width * 3];
        let dst_row = &mut dst[y * dst_stride..y * dst_stride + width * 2];
        for (rgb, out) in src_row.chunks_exact(3).zip(dst_row.chunks_exact_mut(2)) {
            out.copy_from_slice(&rgb_to_565(rgb[0], rgb[1], rgb[2]).to_ne_bytes());
        }
    }
}

impl<E: Engine> PdfBridge<E> {
    /// Render `page` into `surface`.
    ///
    /// The page is scaled to `draw_width` x `draw_height` pixels with its
    /// top-left corner at (`origin_x`, `origin_y`) in surface space; origins
    /// may be negative to show a scrolled region. When the draw size is
    /// smaller than the surface, uncovered pixels get the configured
    /// background color.
    ///
    /// The surface is unlocked again before this returns, on success or
    /// failure.
    #[allow(clippy::too_many_arguments)]
    pub fn render<S: PixelSurface + ?Sized>(
        &mut self,
        page: PageHandle,
        surface: &mut S,
        origin_x: i32,
        origin_y: i32,
        draw_width: i32,
        draw_height: i32,
        annotations: bool,
    ) -> Result<()> {
        let info = surface.info().map_err(|e| {
            log::error!("{}", e);
            PdfError::from(e)
        })?;

        let Some(bpp) = info.format.bytes_per_pixel() else {
            let err = PdfError::UnsupportedFormat(format!("{:?}", info.format));
            log::error!("{}", err);
            return Err(err);
        };
        if info.width == 0 || info.height == 0 {
            return Err(invalid_parameter(format!(
                "surface size {}x{}",
                info.width, info.height
            )));
        }
        if draw_width < 0 || draw_height < 0 {
            return Err(invalid_parameter(format!(
                "draw size {}x{}",
                draw_width, draw_height
            )));
        }
        let width = info.width as usize;
        let height = info.height as usize;
        let stride = info.stride as usize;
        if stride < width * bpp {
            return Err(invalid_parameter(format!(
                "stride {} shorter than row of {} pixels",
                stride, width
            )));
        }

        let slot = self.pages.get(page).ok_or_else(|| invalid_handle(page))?;

        let mut lock = SurfaceLock::new(surface).map_err(|e| {
            log::error!("{}", e);
            PdfError::from(e)
        })?;
        let pixels = lock.pixels_mut();
        let required = (height - 1) * stride + width * bpp;
        if pixels.len() < required {
            return Err(invalid_parameter(format!(
                "pixel buffer of {} bytes, need {}",
                pixels.len(),
                required
            )));
        }

        let request = DrawRequest {
            origin_x,
            origin_y,
            draw_width,
            draw_height,
            annotations,
        };
        let background = self.config.background_color();
        let page_fill = self.config.page_fill_color();

        match info.format {
            SurfaceFormat::Rgb565 => {
                let mut scratch = vec![0u8; width * height * 3];
                let mut view = BitmapView::new(
                    &mut scratch,
                    info.width,
                    info.height,
                    width * 3,
                    EngineFormat::Rgb24,
                );
                request.paint(
                    &mut self.engine,
                    &slot.raw,
                    &mut view,
                    background,
                    Some(page_fill),
                );
                convert_rgb24_to_565(&scratch, width * 3, pixels, stride, width, height);
            }
            _ => {
                let mut view = BitmapView::new(
                    &mut pixels[..required],
                    info.width,
                    info.height,
                    stride,
                    EngineFormat::Rgba32,
                );
                request.paint(&mut self.engine, &slot.raw, &mut view, background, None);
            }
        }

        log::trace!(
            "Rendered {:?} into {}x{} {:?}",
            page,
            info.width,
            info.height,
            info.format
        );
        Ok(())
    }
}

struct DrawRequest {
    origin_x: i32,
    origin_y: i32,
    draw_width: i32,
    draw_height: i32,
    annotations: bool,
}

impl DrawRequest {
    fn paint<E: Engine>(
        &self,
        engine: &mut E,
        page: &E::Page,
        view: &mut BitmapView<'_>,
        background: [u8; 3],
        page_fill: Option<[u8; 3]>,
    ) {
        let width = view.width() as i32;
        let height = view.height() as i32;

        if self.draw_width < width || self.draw_height < height {
            view.fill_rect(0, 0, width, height, background);
        }

        if let Some(fill) = page_fill {
            view.fill_rect(
                self.origin_x.max(0),
                self.origin_y.max(0),
                width.min(self.draw_width),
                height.min(self.draw_height),
                fill,
            );
        }

        let mut flags = RenderFlags::REVERSE_BYTE_ORDER;
        if self.annotations {
            flags |= RenderFlags::ANNOT;
        }

        engine.render_page(
            page,
            view,
            Viewport::new(self.origin_x, self.origin_y, self.draw_width, self.draw_height),
            Rotation::None,
            flags,
        );
    }
}
