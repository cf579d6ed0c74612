//! The handle registry and engine owner
//!
//! [`PdfBridge`] owns the engine and one slot table per resource type. Each
//! child slot records its parent handle, and each parent records its open
//! children, so closes can cascade in reverse dependency order.

use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::error::{PdfError, Result};
use crate::guard::LibraryGuard;
use crate::registry::{
    DocumentHandle, DocumentKind, Handle, HandleKind, PageHandle, PageKind, SearchHandle,
    SearchKind, Slots, TextHandle, TextKind,
};
use crate::search::TextMatch;
use crate::types::PageSize;
use serde::Serialize;
use std::sync::Arc;

pub(crate) struct DocumentSlot<E: Engine> {
    pub(crate) raw: E::Document,
    pub(crate) pages: Vec<PageHandle>,
}

pub(crate) struct PageSlot<E: Engine> {
    pub(crate) raw: E::Page,
    pub(crate) document: DocumentHandle,
    pub(crate) index: usize,
    pub(crate) size: Option<PageSize>,
    pub(crate) text: Option<TextHandle>,
}

pub(crate) struct TextSlot<E: Engine> {
    pub(crate) raw: E::TextPage,
    pub(crate) page: PageHandle,
    pub(crate) searches: Vec<SearchHandle>,
}

pub(crate) struct SearchSlot<E: Engine> {
    pub(crate) raw: E::Search,
    pub(crate) text: TextHandle,
    pub(crate) last_match: Option<TextMatch>,
}

/// Number of open resources per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OpenCounts {
    pub documents: usize,
    pub pages: usize,
    pub texts: usize,
    pub searches: usize,
}

/// Log and build the error for a handle that does not resolve.
pub(crate) fn invalid_handle<K: HandleKind>(handle: Handle<K>) -> PdfError {
    log::error!("Invalid {} handle {:?}", K::NAME, handle);
    PdfError::InvalidHandle { kind: K::NAME }
}

/// Log and build an `InvalidParameter` error.
pub(crate) fn invalid_parameter(message: impl Into<String>) -> PdfError {
    let message = message.into();
    log::error!("Invalid parameter: {}", message);
    PdfError::InvalidParameter(message)
}

/// Handle-based access to a document engine.
///
/// Every resource the engine hands out lives in the bridge and is addressed by
/// a typed handle. Closing a parent closes its children first.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "pdfium")]
/// # fn main() -> pdfium_bridge::Result<()> {
/// use pdfium_bridge::{HostBitmap, PdfBridge, PdfiumEngine, ReaderSource, SurfaceFormat};
///
/// let mut bridge = PdfBridge::new(PdfiumEngine::new());
/// let doc = bridge.open_document(ReaderSource::open("document.pdf")?, None)?;
/// if let Some(page) = bridge.open_page(doc, 0)? {
///     let mut bitmap = HostBitmap::new(612, 792, SurfaceFormat::Rgba8888);
///     bridge.render(page, &mut bitmap, 0, 0, 612, 792, true)?;
///     bitmap.save_as_png("page.png")?;
/// }
/// bridge.close_document(doc);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "pdfium"))]
/// # fn main() {}
/// ```
pub struct PdfBridge<E: Engine> {
    pub(crate) engine: E,
    pub(crate) guard: Arc<LibraryGuard>,
    pub(crate) config: BridgeConfig,
    pub(crate) documents: Slots<DocumentKind, DocumentSlot<E>>,
    pub(crate) pages: Slots<PageKind, PageSlot<E>>,
    pub(crate) texts: Slots<TextKind, TextSlot<E>>,
    pub(crate) searches: Slots<SearchKind, SearchSlot<E>>,
    explicit_init: bool,
}

impl<E: Engine> PdfBridge<E> {
    /// Bridge sharing the process-wide [`LibraryGuard`].
    pub fn new(engine: E) -> Self {
        Self::with_guard(engine, LibraryGuard::global())
    }

    /// Bridge using an explicit guard.
    ///
    /// Every bridge driving the same engine library must share one guard.
    pub fn with_guard(engine: E, guard: Arc<LibraryGuard>) -> Self {
        Self {
            engine,
            guard,
            config: BridgeConfig::default(),
            documents: Slots::default(),
            pages: Slots::default(),
            texts: Slots::default(),
            searches: Slots::default(),
            explicit_init: false,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn guard(&self) -> &Arc<LibraryGuard> {
        &self.guard
    }

    /// Take an explicit engine reference, independent of open documents.
    ///
    /// The bridge holds at most one; repeated calls are no-ops.
    pub fn init_engine(&mut self) -> Result<()> {
        if self.explicit_init {
            return Ok(());
        }
        self.acquire_library()?;
        self.explicit_init = true;
        Ok(())
    }

    /// Drop the reference taken by [`init_engine`](Self::init_engine).
    pub fn shutdown_engine(&mut self) {
        if self.explicit_init {
            self.explicit_init = false;
            self.release_library();
        }
    }

    pub fn is_document_open(&self, handle: DocumentHandle) -> bool {
        self.documents.contains(handle)
    }

    pub fn is_page_open(&self, handle: PageHandle) -> bool {
        self.pages.contains(handle)
    }

    pub fn is_text_open(&self, handle: TextHandle) -> bool {
        self.texts.contains(handle)
    }

    pub fn is_search_open(&self, handle: SearchHandle) -> bool {
        self.searches.contains(handle)
    }

    pub fn open_counts(&self) -> OpenCounts {
        OpenCounts {
            documents: self.documents.len(),
            pages: self.pages.len(),
            texts: self.texts.len(),
            searches: self.searches.len(),
        }
    }

    pub(crate) fn acquire_library(&mut self) -> Result<()> {
        let engine = &mut self.engine;
        let count = self.guard.acquire(|| {
            engine.init_library().map_err(|reason| {
                log::error!("PDF engine init failed: {}", reason);
                PdfError::InitializationFailed { reason }
            })
        })?;
        log::trace!("Library references: {}", count);
        Ok(())
    }

    pub(crate) fn release_library(&mut self) {
        let engine = &mut self.engine;
        let count = self.guard.release(|| engine.destroy_library());
        log::trace!("Library references: {}", count);
    }
}

impl<E: Engine> Drop for PdfBridge<E> {
    fn drop(&mut self) {
        let open = self.documents.handles();
        if !open.is_empty() {
            log::warn!("Bridge dropped with {} open document(s)", open.len());
        }
        for doc in open.into_iter().rev() {
            self.close_document(doc);
        }
        self.shutdown_engine();
    }
}
