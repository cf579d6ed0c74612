//! Page lifecycle and coordinate transforms

use crate::bridge::{invalid_handle, invalid_parameter, PageSlot, PdfBridge};
use crate::engine::{Engine, Rotation, Viewport};
use crate::error::Result;
use crate::registry::{DocumentHandle, PageHandle};
use crate::types::{PageSize, Rect, RectF};

impl<E: Engine> PdfBridge<E> {
    /// Load page `index` of `document`.
    ///
    /// Returns `Ok(None)` when the engine cannot load that page (out of range
    /// or broken), so callers can skip it.
    pub fn open_page(&mut self, document: DocumentHandle, index: usize) -> Result<Option<PageHandle>> {
        let slot = self
            .documents
            .get(document)
            .ok_or_else(|| invalid_handle(document))?;
        let Ok(raw_index) = i32::try_from(index) else {
            return Ok(None);
        };

        let Some(raw) = self.engine.load_page(&slot.raw, raw_index) else {
            log::debug!("Page {} of {:?} not available", index, document);
            return Ok(None);
        };
        let size = self
            .engine
            .page_size_by_index(&slot.raw, raw_index)
            .map(|(width, height)| PageSize {
                width: width as i32,
                height: height as i32,
            });

        let handle = self.pages.insert(PageSlot {
            raw,
            document,
            index,
            size,
            text: None,
        });
        if let Some(doc) = self.documents.get_mut(document) {
            doc.pages.push(handle);
        }
        log::debug!("Opened {:?} (index {})", handle, index);
        Ok(Some(handle))
    }

    /// Close a page and its text layer.
    ///
    /// Returns `false` if the handle was not open.
    pub fn close_page(&mut self, handle: PageHandle) -> bool {
        let text = match self.pages.get(handle) {
            Some(slot) => slot.text,
            None => return false,
        };
        if let Some(text) = text {
            log::warn!("Closing {:?} with its text layer still open", handle);
            self.close_text(text);
        }

        if let Some(slot) = self.pages.remove(handle) {
            if let Some(doc) = self.documents.get_mut(slot.document) {
                doc.pages.retain(|&p| p != handle);
            }
            self.engine.close_page(slot.raw);
            log::debug!("Closed {:?}", handle);
        }
        true
    }

    /// Document the page was opened from.
    pub fn page_document(&self, handle: PageHandle) -> Result<DocumentHandle> {
        let slot = self.pages.get(handle).ok_or_else(|| invalid_handle(handle))?;
        Ok(slot.document)
    }

    /// Zero-based index of the page in its document.
    pub fn page_index(&self, handle: PageHandle) -> Result<usize> {
        let slot = self.pages.get(handle).ok_or_else(|| invalid_handle(handle))?;
        Ok(slot.index)
    }

    /// Intrinsic size recorded when the page was opened.
    pub fn page_dimensions(&self, handle: PageHandle) -> Result<Option<PageSize>> {
        let slot = self.pages.get(handle).ok_or_else(|| invalid_handle(handle))?;
        Ok(slot.size)
    }

    /// Map a device pixel to page coordinates for a page drawn into `viewport`.
    pub fn device_to_page(
        &self,
        page: PageHandle,
        viewport: Viewport,
        rotation: Rotation,
        device_x: i32,
        device_y: i32,
    ) -> Result<(f64, f64)> {
        let slot = self.pages.get(page).ok_or_else(|| invalid_handle(page))?;
        self.engine
            .device_to_page(&slot.raw, viewport, rotation, device_x, device_y)
            .ok_or_else(|| invalid_parameter(format!("cannot map device point for {:?}", viewport)))
    }

    /// Map a page point to device pixels for a page drawn into `viewport`.
    pub fn page_to_device(
        &self,
        page: PageHandle,
        viewport: Viewport,
        rotation: Rotation,
        page_x: f64,
        page_y: f64,
    ) -> Result<(i32, i32)> {
        let slot = self.pages.get(page).ok_or_else(|| invalid_handle(page))?;
        self.engine
            .page_to_device(&slot.raw, viewport, rotation, page_x, page_y)
            .ok_or_else(|| invalid_parameter(format!("cannot map page point for {:?}", viewport)))
    }

    /// Map both corners of a page rectangle (text bounds, link areas) to
    /// device pixels.
    pub fn page_rect_to_device(
        &self,
        page: PageHandle,
        viewport: Viewport,
        rotation: Rotation,
        rect: impl Into<RectF>,
    ) -> Result<Rect> {
        let rect = rect.into();
        let (left, top) = self.page_to_device(page, viewport, rotation, rect.left, rect.top)?;
        let (right, bottom) =
            self.page_to_device(page, viewport, rotation, rect.right, rect.bottom)?;
        Ok(Rect::new(left, top, right, bottom))
    }
}
