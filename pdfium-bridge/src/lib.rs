//! # pdfium-bridge
//!
//! Handle-based access to the PDFium document engine for managed hosts.
//!
//! - **Refcounted engine lifetime**: the library is initialized on the first
//!   document open and torn down when the last one closes
//! - **Typed generational handles** for documents, pages, text layers and
//!   search cursors; stale handles fail instead of aliasing
//! - **Rasterization** straight into host pixel buffers (RGBA_8888, RGB_565)
//!   with partial-viewport clipping
//! - **Text, search, outline and links**
//!
//! The engine sits behind the [`Engine`] trait; enable the `pdfium` feature
//! for [`PdfiumEngine`].
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "pdfium")]
//! # fn main() -> pdfium_bridge::Result<()> {
//! use pdfium_bridge::{meta, PdfBridge, PdfiumEngine, ReaderSource, SearchFlags};
//!
//! let mut bridge = PdfBridge::new(PdfiumEngine::new());
//! let doc = bridge.open_document(ReaderSource::open("document.pdf")?, None)?;
//! println!("{:?}", bridge.metadata_text(doc, meta::TITLE)?);
//!
//! for entry in bridge.bookmark_tree(doc)? {
//!     println!("{}{}", "  ".repeat(entry.depth), entry.title);
//! }
//!
//! if let Some(page) = bridge.open_page(doc, 0)? {
//!     let text = bridge.open_text(page)?;
//!     let search = bridge.start_search(text, "invoice", SearchFlags::new(), 0)?;
//!     while bridge.search_next(search)? {
//!         println!("{:?}", bridge.search_result(search)?);
//!     }
//! }
//! bridge.close_document(doc);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "pdfium"))]
//! # fn main() {}
//! ```

mod bookmark;
mod bridge;
mod config;
mod document;
mod engine;
mod error;
mod guard;
mod link;
mod page;
#[cfg(feature = "pdfium")]
mod pdfium;
mod registry;
mod render;
mod search;
mod source;
mod surface;
mod text;
mod types;
mod utf16;

pub use bookmark::Bookmark;
pub use bridge::{OpenCounts, PdfBridge};
pub use config::BridgeConfig;
pub use engine::{
    BitmapView, ByteSource, Engine, EngineFormat, ErrorCode, RenderFlags, Rotation, Viewport,
};
pub use error::{PdfError, Result};
pub use guard::LibraryGuard;
pub use link::Link;
#[cfg(feature = "pdfium")]
pub use pdfium::{
    PdfiumBookmark, PdfiumDocument, PdfiumEngine, PdfiumLink, PdfiumPage, PdfiumSearch,
    PdfiumTextPage,
};
pub use registry::{
    DocumentHandle, DocumentKind, Handle, HandleKind, PageHandle, PageKind, SearchHandle,
    SearchKind, TextHandle, TextKind,
};
pub use render::rgb_to_565;
pub use search::{SearchFlags, TextMatch};
pub use source::ReaderSource;
pub use surface::{HostBitmap, PixelSurface, SurfaceError, SurfaceFormat, SurfaceInfo, SurfaceLock};
pub use types::{PageSize, Rect, RectF};

/// Standard document information keys for
/// [`PdfBridge::metadata_text`].
pub mod meta {
    pub const TITLE: &str = "Title";
    pub const AUTHOR: &str = "Author";
    pub const SUBJECT: &str = "Subject";
    pub const KEYWORDS: &str = "Keywords";
    pub const CREATOR: &str = "Creator";
    pub const PRODUCER: &str = "Producer";
    pub const CREATION_DATE: &str = "CreationDate";
    pub const MOD_DATE: &str = "ModDate";

    /// Every key above, in declaration order.
    pub const ALL: [&str; 8] = [
        TITLE,
        AUTHOR,
        SUBJECT,
        KEYWORDS,
        CREATOR,
        PRODUCER,
        CREATION_DATE,
        MOD_DATE,
    ];
}
