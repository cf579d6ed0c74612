//! Text layer access: characters, strings and bounds

use crate::bridge::{invalid_handle, invalid_parameter, PdfBridge, TextSlot};
use crate::engine::Engine;
use crate::error::{PdfError, Result};
use crate::registry::{PageHandle, TextHandle};
use crate::types::Rect;

impl<E: Engine> PdfBridge<E> {
    /// Load the text layer of `page`.
    ///
    /// A page has at most one text layer; while it is open this returns the
    /// same handle.
    pub fn open_text(&mut self, page: PageHandle) -> Result<TextHandle> {
        let slot = self.pages.get(page).ok_or_else(|| invalid_handle(page))?;
        if let Some(existing) = slot.text {
            return Ok(existing);
        }

        let raw = self.engine.load_text_page(&slot.raw).ok_or_else(|| {
            log::error!("Failed to load text layer of {:?}", page);
            PdfError::TextLoadFailed { index: slot.index }
        })?;

        let handle = self.texts.insert(TextSlot {
            raw,
            page,
            searches: Vec::new(),
        });
        if let Some(slot) = self.pages.get_mut(page) {
            slot.text = Some(handle);
        }
        log::debug!("Opened {:?} for {:?}", handle, page);
        Ok(handle)
    }

    /// Close a text layer and its search cursors.
    ///
    /// Returns `false` if the handle was not open.
    pub fn close_text(&mut self, handle: TextHandle) -> bool {
        let searches = match self.texts.get(handle) {
            Some(slot) => slot.searches.clone(),
            None => return false,
        };
        if !searches.is_empty() {
            log::warn!(
                "Closing {:?} with {} search(es) still open",
                handle,
                searches.len()
            );
        }
        for search in searches.into_iter().rev() {
            self.close_search(search);
        }

        if let Some(slot) = self.texts.remove(handle) {
            if let Some(page) = self.pages.get_mut(slot.page) {
                page.text = None;
            }
            self.engine.close_text_page(slot.raw);
            log::debug!("Closed {:?}", handle);
        }
        true
    }

    /// Number of characters on the page.
    pub fn char_count(&self, text: TextHandle) -> Result<usize> {
        let slot = self.texts.get(text).ok_or_else(|| invalid_handle(text))?;
        Ok(self.engine.count_chars(&slot.raw).max(0) as usize)
    }

    /// Character nearest to page point (`x`, `y`) within the configured
    /// tolerance.
    pub fn char_index_at(&self, text: TextHandle, x: f64, y: f64) -> Result<Option<usize>> {
        let slot = self.texts.get(text).ok_or_else(|| invalid_handle(text))?;
        let (x_tolerance, y_tolerance) = self.config.char_tolerance();
        let index = self
            .engine
            .char_index_at_pos(&slot.raw, x, y, x_tolerance, y_tolerance);
        Ok(usize::try_from(index).ok())
    }

    /// UTF-16 units of `count` characters starting at `start`.
    ///
    /// The request is clamped to the characters that remain. `None` when the
    /// engine returns nothing.
    pub fn extract_text_utf16(
        &self,
        text: TextHandle,
        start: i32,
        count: i32,
    ) -> Result<Option<Vec<u16>>> {
        let slot = self.texts.get(text).ok_or_else(|| invalid_handle(text))?;
        if start < 0 || count < 0 {
            return Err(invalid_parameter(format!(
                "text range start {} count {}",
                start, count
            )));
        }

        let remaining = (self.engine.count_chars(&slot.raw) - start).max(0);
        let count = count.min(remaining);
        let mut buf = vec![0u16; count as usize + 1];
        let written = self.engine.get_text(&slot.raw, start, count, &mut buf);
        if written <= 0 {
            return Ok(None);
        }

        // Drop the terminator
        buf.truncate((written - 1) as usize);
        Ok(Some(buf))
    }

    /// Like [`extract_text_utf16`](Self::extract_text_utf16), decoded to a
    /// `String`. Unpaired surrogates become U+FFFD.
    pub fn extract_text(&self, text: TextHandle, start: i32, count: i32) -> Result<Option<String>> {
        Ok(self
            .extract_text_utf16(text, start, count)?
            .map(|units| String::from_utf16_lossy(&units)))
    }

    /// Bounding rectangles covering `count` characters from `start`, in page
    /// space with corners truncated toward zero. `count` of `-1` means every
    /// remaining character.
    pub fn bounding_rects(&self, text: TextHandle, start: i32, count: i32) -> Result<Vec<Rect>> {
        let slot = self.texts.get(text).ok_or_else(|| invalid_handle(text))?;
        if start < 0 || count < -1 {
            return Err(invalid_parameter(format!(
                "rect range start {} count {}",
                start, count
            )));
        }

        let n = self.engine.count_rects(&slot.raw, start, count);
        Ok((0..n)
            .filter_map(|i| self.engine.get_rect(&slot.raw, i))
            .map(|r| r.truncate())
            .collect())
    }
}
