//! The document engine seam
//!
//! [`Engine`] mirrors the slice of the PDFium C API the bridge needs. The
//! bridge owns every engine resource inside its registry and never hands them
//! to callers, so implementations can use raw pointers for the associated
//! types. [`crate::PdfiumEngine`] (feature `pdfium`) is the production
//! implementation.

use crate::types::RectF;
use std::io;

/// Engine error codes reported after a failed document load.
///
/// Values match `FPDF_ERR_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    Unknown,
    File,
    Format,
    Password,
    Security,
    Page,
    Other(u32),
}

impl ErrorCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::File,
            3 => ErrorCode::Format,
            4 => ErrorCode::Password,
            5 => ErrorCode::Security,
            6 => ErrorCode::Page,
            other => ErrorCode::Other(other),
        }
    }

    /// Human-readable description used in open errors.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Success => "No error.",
            ErrorCode::File => "File not found or could not be opened.",
            ErrorCode::Format => "File not in PDF format or corrupted.",
            ErrorCode::Password => "Incorrect password.",
            ErrorCode::Security => "Unsupported security scheme.",
            ErrorCode::Page => "Page not found or content error.",
            ErrorCode::Unknown | ErrorCode::Other(_) => "Unknown error.",
        }
    }
}

/// Random-access document bytes, pulled by the engine in blocks.
pub trait ByteSource: Send {
    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `position`.
    fn read_block(&mut self, position: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// Memory layout of a render target. Channel order in memory is always
/// R, G, B (then A), as rendered with [`RenderFlags::REVERSE_BYTE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFormat {
    Rgb24,
    Rgba32,
}

impl EngineFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            EngineFormat::Rgb24 => 3,
            EngineFormat::Rgba32 => 4,
        }
    }
}

/// Render target borrowed from the bridge (caller surface or scratch).
#[derive(Debug)]
pub struct BitmapView<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    format: EngineFormat,
}

impl<'a> BitmapView<'a> {
    /// Wrap `data`; the caller guarantees it holds `height` rows of `stride`
    /// bytes (the last row may be only `width * bpp` long).
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: EngineFormat,
    ) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> EngineFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Fill `width` x `height` pixels at (`left`, `top`) with an opaque
    /// color, clipped to the bitmap.
    pub fn fill_rect(&mut self, left: i32, top: i32, width: i32, height: i32, rgb: [u8; 3]) {
        let x0 = left.max(0) as i64;
        let y0 = top.max(0) as i64;
        let x1 = (left as i64 + width.max(0) as i64).min(self.width as i64);
        let y1 = (top as i64 + height.max(0) as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let bpp = self.format.bytes_per_pixel();
        let rgba = [rgb[0], rgb[1], rgb[2], 0xFF];
        let pixel = &rgba[..bpp];
        for y in y0 as usize..y1 as usize {
            let row = y * self.stride;
            for x in x0 as usize..x1 as usize {
                let offset = row + x * bpp;
                self.data[offset..offset + bpp].copy_from_slice(pixel);
            }
        }
    }
}

/// `FPDF_*` render flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderFlags(i32);

impl RenderFlags {
    /// Draw annotations (`FPDF_ANNOT`).
    pub const ANNOT: RenderFlags = RenderFlags(0x01);
    /// Write pixels R-G-B(-A) instead of B-G-R(-A) (`FPDF_REVERSE_BYTE_ORDER`).
    pub const REVERSE_BYTE_ORDER: RenderFlags = RenderFlags(0x10);

    pub const fn empty() -> Self {
        RenderFlags(0)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: RenderFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for RenderFlags {
    type Output = RenderFlags;

    fn bitor(self, rhs: RenderFlags) -> RenderFlags {
        RenderFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for RenderFlags {
    fn bitor_assign(&mut self, rhs: RenderFlags) {
        self.0 |= rhs.0;
    }
}

/// Device-space placement of a page: the page is drawn at (`start_x`,
/// `start_y`) scaled to `size_x` x `size_y` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub start_x: i32,
    pub start_y: i32,
    pub size_x: i32,
    pub size_y: i32,
}

impl Viewport {
    pub fn new(start_x: i32, start_y: i32, size_x: i32, size_y: i32) -> Self {
        Self {
            start_x,
            start_y,
            size_x,
            size_y,
        }
    }
}

/// Clockwise page rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Engine encoding: 0, 1, 2 or 3 quarter turns.
    pub fn to_raw(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 1,
            Rotation::Cw180 => 2,
            Rotation::Cw270 => 3,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Rotation::None),
            1 => Some(Rotation::Cw90),
            2 => Some(Rotation::Cw180),
            3 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }
}

/// The document engine.
///
/// Calls that fill a caller buffer follow the engine's two-call convention:
/// they return the full length the value needs (terminator included) and
/// write only if the buffer is large enough.
pub trait Engine {
    type Document;
    type Page;
    type TextPage;
    type Search;
    type Bookmark;
    type Link;

    /// Global init. Called by the guard on its 0→1 transition.
    fn init_library(&mut self) -> Result<(), String>;
    /// Global teardown. Called by the guard on its 1→0 transition.
    fn destroy_library(&mut self);

    fn load_document(
        &mut self,
        source: Box<dyn ByteSource>,
        password: Option<&str>,
    ) -> Result<Self::Document, ErrorCode>;
    fn close_document(&mut self, doc: Self::Document);
    fn page_count(&self, doc: &Self::Document) -> i32;
    /// Intrinsic (width, height) in points.
    fn page_size_by_index(&self, doc: &Self::Document, index: i32) -> Option<(f64, f64)>;
    /// UTF-16LE value of an info dictionary entry.
    fn meta_text(&self, doc: &Self::Document, tag: &str, buf: &mut [u8]) -> usize;

    /// First top-level bookmark when `parent` is `None`.
    fn bookmark_first_child(
        &self,
        doc: &Self::Document,
        parent: Option<&Self::Bookmark>,
    ) -> Option<Self::Bookmark>;
    fn bookmark_next_sibling(
        &self,
        doc: &Self::Document,
        bookmark: &Self::Bookmark,
    ) -> Option<Self::Bookmark>;
    /// UTF-16LE title.
    fn bookmark_title(&self, bookmark: &Self::Bookmark, buf: &mut [u8]) -> usize;
    fn bookmark_dest_page(&self, doc: &Self::Document, bookmark: &Self::Bookmark) -> Option<i32>;

    fn load_page(&mut self, doc: &Self::Document, index: i32) -> Option<Self::Page>;
    fn close_page(&mut self, page: Self::Page);
    fn render_page(
        &mut self,
        page: &Self::Page,
        bitmap: &mut BitmapView<'_>,
        viewport: Viewport,
        rotation: Rotation,
        flags: RenderFlags,
    );

    /// Next link at or after `*position`; advances `position`.
    fn enumerate_link(&self, page: &Self::Page, position: &mut i32) -> Option<Self::Link>;
    fn link_dest_page(&self, doc: &Self::Document, link: &Self::Link) -> Option<i32>;
    /// NUL-terminated 7-bit URI path of the link's action.
    fn link_uri(&self, doc: &Self::Document, link: &Self::Link, buf: &mut [u8]) -> usize;
    fn link_rect(&self, link: &Self::Link) -> Option<RectF>;

    fn device_to_page(
        &self,
        page: &Self::Page,
        viewport: Viewport,
        rotation: Rotation,
        device_x: i32,
        device_y: i32,
    ) -> Option<(f64, f64)>;
    fn page_to_device(
        &self,
        page: &Self::Page,
        viewport: Viewport,
        rotation: Rotation,
        page_x: f64,
        page_y: f64,
    ) -> Option<(i32, i32)>;

    fn load_text_page(&mut self, page: &Self::Page) -> Option<Self::TextPage>;
    fn close_text_page(&mut self, text: Self::TextPage);
    fn count_chars(&self, text: &Self::TextPage) -> i32;
    /// Character under (x, y) in page space, or -1.
    fn char_index_at_pos(
        &self,
        text: &Self::TextPage,
        x: f64,
        y: f64,
        x_tolerance: f64,
        y_tolerance: f64,
    ) -> i32;
    /// Writes up to `count` chars plus a terminator into `buf`; returns the
    /// number of UTF-16 units written including the terminator.
    fn get_text(&self, text: &Self::TextPage, start: i32, count: i32, buf: &mut [u16]) -> i32;
    fn count_rects(&self, text: &Self::TextPage, start: i32, count: i32) -> i32;
    /// Rectangle `index` from the most recent `count_rects` call.
    fn get_rect(&self, text: &Self::TextPage, index: i32) -> Option<RectF>;

    /// `query` is NUL-terminated UTF-16.
    fn find_start(
        &mut self,
        text: &Self::TextPage,
        query: &[u16],
        flags: u32,
        start_index: i32,
    ) -> Option<Self::Search>;
    fn find_next(&mut self, search: &mut Self::Search) -> bool;
    fn find_prev(&mut self, search: &mut Self::Search) -> bool;
    fn sch_result_index(&self, search: &Self::Search) -> i32;
    fn sch_count(&self, search: &Self::Search) -> i32;
    fn find_close(&mut self, search: Self::Search);
}
