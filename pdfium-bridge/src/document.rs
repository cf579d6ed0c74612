//! Document lifecycle and document-level queries

use crate::bridge::{invalid_handle, DocumentSlot, PdfBridge};
use crate::engine::{ByteSource, Engine, ErrorCode};
use crate::error::{PdfError, Result};
use crate::registry::DocumentHandle;
use crate::types::PageSize;
use crate::utf16::decode_utf16le;

impl<E: Engine> PdfBridge<E> {
    /// Open a document from `source`.
    ///
    /// The first open in the process initializes the engine library.
    ///
    /// # Errors
    ///
    /// * [`PdfError::InvalidPassword`] if the document is encrypted and
    ///   `password` is missing or wrong. The caller may retry.
    /// * [`PdfError::OpenFailed`] for empty sources and any other engine
    ///   failure.
    /// * [`PdfError::InitializationFailed`] if the engine library cannot start.
    pub fn open_document<S>(&mut self, source: S, password: Option<&str>) -> Result<DocumentHandle>
    where
        S: ByteSource + 'static,
    {
        if source.is_empty() {
            log::error!("Cannot open document: file is empty");
            return Err(PdfError::OpenFailed {
                reason: "File is empty".to_string(),
            });
        }

        self.acquire_library()?;

        match self.engine.load_document(Box::new(source), password) {
            Ok(raw) => {
                let handle = self.documents.insert(DocumentSlot {
                    raw,
                    pages: Vec::new(),
                });
                log::debug!("Opened {:?}", handle);
                Ok(handle)
            }
            Err(code) => {
                self.release_library();
                match code {
                    ErrorCode::Password => {
                        log::debug!("Document requires a password");
                        Err(PdfError::InvalidPassword)
                    }
                    code => {
                        let reason = format!("cannot create document: {}", code.description());
                        log::error!("{}", reason);
                        Err(PdfError::OpenFailed { reason })
                    }
                }
            }
        }
    }

    /// Close a document, first closing any pages still open on it.
    ///
    /// Returns `false` if the handle was not open.
    pub fn close_document(&mut self, handle: DocumentHandle) -> bool {
        let pages = match self.documents.get(handle) {
            Some(slot) => slot.pages.clone(),
            None => return false,
        };
        if !pages.is_empty() {
            log::warn!(
                "Closing {:?} with {} page(s) still open; closing them first",
                handle,
                pages.len()
            );
        }
        for page in pages.into_iter().rev() {
            self.close_page(page);
        }

        if let Some(slot) = self.documents.remove(handle) {
            self.engine.close_document(slot.raw);
            self.release_library();
            log::debug!("Closed {:?}", handle);
        }
        true
    }

    /// Number of pages in the document.
    pub fn page_count(&self, handle: DocumentHandle) -> Result<usize> {
        let slot = self.documents.get(handle).ok_or_else(|| invalid_handle(handle))?;
        Ok(self.engine.page_count(&slot.raw).max(0) as usize)
    }

    /// Intrinsic size of page `index` without loading it.
    ///
    /// `None` if the engine cannot report a size for that index.
    pub fn page_size(&self, handle: DocumentHandle, index: usize) -> Result<Option<PageSize>> {
        let slot = self.documents.get(handle).ok_or_else(|| invalid_handle(handle))?;
        let Ok(index) = i32::try_from(index) else {
            return Ok(None);
        };
        Ok(self
            .engine
            .page_size_by_index(&slot.raw, index)
            .map(|(width, height)| PageSize {
                width: width as i32,
                height: height as i32,
            }))
    }

    /// Value of an info dictionary entry such as [`meta::TITLE`](crate::meta::TITLE).
    ///
    /// `None` when the entry is absent or empty.
    pub fn metadata_text(&self, handle: DocumentHandle, tag: &str) -> Result<Option<String>> {
        let slot = self.documents.get(handle).ok_or_else(|| invalid_handle(handle))?;

        // Length includes the two-byte terminator
        let len = self.engine.meta_text(&slot.raw, tag, &mut []);
        if len <= 2 {
            return Ok(None);
        }
        let mut buf = vec![0u8; len];
        self.engine.meta_text(&slot.raw, tag, &mut buf);
        let value = decode_utf16le(&buf[..len - 2]);
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}
