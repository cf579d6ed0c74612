//! Host pixel surfaces
//!
//! The render pipeline draws into memory owned by the host (a platform bitmap,
//! a texture upload buffer...). [`PixelSurface`] is the seam to that memory;
//! [`HostBitmap`] is an owned in-memory implementation.

use crate::error::{PdfError, Result};
use std::path::Path;
use thiserror::Error;

/// Failures reported by a host surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Surface metadata could not be read
    #[error("Failed to get bitmap info: {0}")]
    InfoUnavailable(String),

    /// Surface memory could not be locked
    #[error("Failed to lock bitmap: {0}")]
    LockFailed(String),

    /// Surface is already locked
    #[error("Bitmap is already locked")]
    AlreadyLocked,

    /// Unlock without a matching lock
    #[error("Bitmap is not locked")]
    NotLocked,
}

/// Pixel layout of a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// 4 bytes per pixel, R G B A in memory order
    Rgba8888,
    /// 2 bytes per pixel, native-endian `RRRRRGGGGGGBBBBB`
    Rgb565,
    /// Anything else the host reports, by its raw format code
    Other(i32),
}

impl SurfaceFormat {
    /// Bytes per pixel, or `None` for formats the renderer cannot target.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            SurfaceFormat::Rgba8888 => Some(4),
            SurfaceFormat::Rgb565 => Some(2),
            SurfaceFormat::Other(_) => None,
        }
    }
}

/// Geometry and format of a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows
    pub stride: u32,
    pub format: SurfaceFormat,
}

impl SurfaceInfo {
    /// Minimum pixel slice length for this geometry.
    pub fn required_len(&self) -> Option<usize> {
        let bpp = self.format.bytes_per_pixel()?;
        if self.height == 0 {
            return Some(0);
        }
        Some((self.height as usize - 1) * self.stride as usize + self.width as usize * bpp)
    }
}

/// Caller-owned pixel memory the renderer draws into.
///
/// `pixels_mut` is only meaningful between a successful `lock` and the
/// matching `unlock`.
pub trait PixelSurface {
    fn info(&self) -> std::result::Result<SurfaceInfo, SurfaceError>;
    fn lock(&mut self) -> std::result::Result<(), SurfaceError>;
    fn pixels_mut(&mut self) -> &mut [u8];
    fn unlock(&mut self);
}

/// Scoped surface lock; unlocks when dropped.
pub struct SurfaceLock<'a, S: PixelSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: PixelSurface + ?Sized> SurfaceLock<'a, S> {
    pub fn new(surface: &'a mut S) -> std::result::Result<Self, SurfaceError> {
        surface.lock()?;
        Ok(Self { surface })
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.surface.pixels_mut()
    }
}

impl<S: PixelSurface + ?Sized> Drop for SurfaceLock<'_, S> {
    fn drop(&mut self) {
        self.surface.unlock();
    }
}

/// In-memory surface.
///
/// Useful for headless rendering, tests, and dumping pages to PNG.
///
/// # Example
///
/// ```
/// use pdfium_bridge::{HostBitmap, SurfaceFormat};
///
/// let bitmap = HostBitmap::new(64, 32, SurfaceFormat::Rgb565);
/// assert_eq!(bitmap.stride(), 128);
/// ```
#[derive(Debug, Clone)]
pub struct HostBitmap {
    width: u32,
    height: u32,
    stride: u32,
    format: SurfaceFormat,
    data: Vec<u8>,
    locked: bool,
    lock_count: usize,
}

impl HostBitmap {
    /// Zeroed bitmap with tightly packed rows.
    pub fn new(width: u32, height: u32, format: SurfaceFormat) -> Self {
        let bpp = format.bytes_per_pixel().unwrap_or(4) as u32;
        Self::with_stride(width, height, width * bpp, format)
    }

    /// Zeroed bitmap with an explicit row stride in bytes (row padding).
    pub fn with_stride(width: u32, height: u32, stride: u32, format: SurfaceFormat) -> Self {
        Self {
            width,
            height,
            stride,
            format,
            data: vec![0; stride as usize * height as usize],
            locked: false,
            lock_count: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// How many times the surface has been locked so far.
    pub fn lock_count(&self) -> usize {
        self.lock_count
    }

    /// RGBA bytes at (x, y) of an `Rgba8888` bitmap.
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.format != SurfaceFormat::Rgba8888 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Packed value at (x, y) of an `Rgb565` bitmap.
    pub fn pixel_565(&self, x: u32, y: u32) -> Option<u16> {
        if self.format != SurfaceFormat::Rgb565 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * 2;
        let px = self.data.get(offset..offset + 2)?;
        Some(u16::from_ne_bytes([px[0], px[1]]))
    }

    /// Save the bitmap as a PNG file.
    ///
    /// RGB_565 pixels are expanded to 8 bits per channel.
    pub fn save_as_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use png::{BitDepth, ColorType, Encoder};
        use std::fs::File;
        use std::io::BufWriter;

        let (color_type, data) = match self.format {
            SurfaceFormat::Rgba8888 => {
                let mut rgba = Vec::with_capacity((self.width * self.height * 4) as usize);
                for y in 0..self.height as usize {
                    let row = y * self.stride as usize;
                    rgba.extend_from_slice(&self.data[row..row + self.width as usize * 4]);
                }
                (ColorType::Rgba, rgba)
            }
            SurfaceFormat::Rgb565 => {
                let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
                for y in 0..self.height {
                    for x in 0..self.width {
                        let v = self.pixel_565(x, y).unwrap_or(0);
                        let r5 = (v >> 11) as u8 & 0x1F;
                        let g6 = (v >> 5) as u8 & 0x3F;
                        let b5 = v as u8 & 0x1F;
                        rgb.push((r5 << 3) | (r5 >> 2));
                        rgb.push((g6 << 2) | (g6 >> 4));
                        rgb.push((b5 << 3) | (b5 >> 2));
                    }
                }
                (ColorType::Rgb, rgb)
            }
            SurfaceFormat::Other(code) => {
                return Err(PdfError::UnsupportedFormat(format!("format code {}", code)));
            }
        };

        let file = File::create(path)?;
        let writer = BufWriter::new(file);

        let mut encoder = Encoder::new(writer, self.width, self.height);
        encoder.set_color(color_type);
        encoder.set_depth(BitDepth::Eight);

        let mut png_writer = encoder
            .write_header()
            .map_err(|e| PdfError::PngEncoding(e.to_string()))?;

        png_writer
            .write_image_data(&data)
            .map_err(|e| PdfError::PngEncoding(e.to_string()))?;

        Ok(())
    }
}

impl PixelSurface for HostBitmap {
    fn info(&self) -> std::result::Result<SurfaceInfo, SurfaceError> {
        Ok(SurfaceInfo {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        })
    }

    fn lock(&mut self) -> std::result::Result<(), SurfaceError> {
        if self.locked {
            return Err(SurfaceError::AlreadyLocked);
        }
        self.locked = true;
        self.lock_count += 1;
        Ok(())
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn unlock(&mut self) {
        if !self.locked {
            log::warn!("{}", SurfaceError::NotLocked);
        }
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(SurfaceFormat::Rgba8888.bytes_per_pixel(), Some(4));
        assert_eq!(SurfaceFormat::Rgb565.bytes_per_pixel(), Some(2));
        assert_eq!(SurfaceFormat::Other(8).bytes_per_pixel(), None);
    }

    #[test]
    fn test_required_len_accounts_for_stride() {
        let info = SurfaceInfo {
            width: 10,
            height: 3,
            stride: 48,
            format: SurfaceFormat::Rgba8888,
        };
        // Last row only needs width * bpp
        assert_eq!(info.required_len(), Some(48 * 2 + 40));
    }

    #[test]
    fn test_lock_guard_unlocks_on_drop() {
        let mut bitmap = HostBitmap::new(2, 2, SurfaceFormat::Rgba8888);
        {
            let mut lock = SurfaceLock::new(&mut bitmap).unwrap();
            lock.pixels_mut()[0] = 0xAB;
        }
        assert!(!bitmap.is_locked());
        assert_eq!(bitmap.lock_count(), 1);
        assert_eq!(bitmap.pixel_rgba(0, 0), Some([0xAB, 0, 0, 0]));
    }

    #[test]
    fn test_double_lock_fails() {
        let mut bitmap = HostBitmap::new(1, 1, SurfaceFormat::Rgb565);
        bitmap.lock().unwrap();
        assert_eq!(bitmap.lock(), Err(SurfaceError::AlreadyLocked));
        bitmap.unlock();
        assert!(bitmap.lock().is_ok());
    }

    #[test]
    fn test_pixel_accessors_check_format_and_bounds() {
        let bitmap = HostBitmap::new(4, 4, SurfaceFormat::Rgb565);
        assert_eq!(bitmap.pixel_565(3, 3), Some(0));
        assert_eq!(bitmap.pixel_565(4, 0), None);
        assert_eq!(bitmap.pixel_rgba(0, 0), None);
    }

    #[test]
    fn test_save_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut bitmap = HostBitmap::with_stride(3, 2, 16, SurfaceFormat::Rgba8888);
        bitmap.pixels_mut().fill(0xFF);
        bitmap.save_as_png(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_save_as_png_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let bitmap = HostBitmap::new(1, 1, SurfaceFormat::Other(9));
        let result = bitmap.save_as_png(dir.path().join("x.png"));
        assert!(matches!(result, Err(PdfError::UnsupportedFormat(_))));
    }
}
