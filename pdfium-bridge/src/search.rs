//! Incremental text search

use crate::bridge::{invalid_handle, PdfBridge, SearchSlot};
use crate::engine::Engine;
use crate::error::{PdfError, Result};
use crate::registry::{SearchHandle, TextHandle};
use crate::utf16::encode_utf16z;
use serde::Serialize;

/// Search flags passed to the engine.
///
/// Bits this type does not name are kept and passed through.
///
/// # Example
///
/// ```
/// use pdfium_bridge::SearchFlags;
///
/// let flags = SearchFlags::new().case_sensitive().whole_word();
/// assert_eq!(flags.bits(), 0x3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFlags(u32);

impl SearchFlags {
    /// `FPDF_MATCHCASE`
    pub const MATCH_CASE: u32 = 0x0001;
    /// `FPDF_MATCHWHOLEWORD`
    pub const MATCH_WHOLE_WORD: u32 = 0x0002;
    /// `FPDF_CONSECUTIVE`
    pub const CONSECUTIVE: u32 = 0x0004;

    /// No flags: case-insensitive substring search.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: u32) -> Self {
        SearchFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Enable case-sensitive matching.
    pub fn case_sensitive(mut self) -> Self {
        self.0 |= Self::MATCH_CASE;
        self
    }

    /// Enable whole word matching.
    pub fn whole_word(mut self) -> Self {
        self.0 |= Self::MATCH_WHOLE_WORD;
        self
    }

    /// Enable consecutive matching.
    pub fn consecutive(mut self) -> Self {
        self.0 |= Self::CONSECUTIVE;
        self
    }
}

/// Position of a search hit in the page's character stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextMatch {
    /// Index of the first matched character
    pub start: usize,
    /// Number of matched characters
    pub length: usize,
}

impl<E: Engine> PdfBridge<E> {
    /// Start searching `text` for `query` from character `start_index`
    /// (`-1` searches backward from the end).
    pub fn start_search(
        &mut self,
        text: TextHandle,
        query: &str,
        flags: SearchFlags,
        start_index: i32,
    ) -> Result<SearchHandle> {
        let slot = self.texts.get(text).ok_or_else(|| invalid_handle(text))?;
        let query_units = encode_utf16z(query);

        let raw = self
            .engine
            .find_start(&slot.raw, &query_units, flags.bits(), start_index)
            .ok_or_else(|| {
                log::error!("Failed to start search for {:?} in {:?}", query, text);
                PdfError::SearchError(format!("cannot start search for {:?}", query))
            })?;

        let handle = self.searches.insert(SearchSlot {
            raw,
            text,
            last_match: None,
        });
        if let Some(slot) = self.texts.get_mut(text) {
            slot.searches.push(handle);
        }
        log::debug!("Started {:?} on {:?}", handle, text);
        Ok(handle)
    }

    /// Advance to the next match. `false` when there is none; the last match
    /// is kept.
    pub fn search_next(&mut self, search: SearchHandle) -> Result<bool> {
        self.step(search, true)
    }

    /// Step back to the previous match. `false` when there is none; the last
    /// match is kept.
    pub fn search_prev(&mut self, search: SearchHandle) -> Result<bool> {
        self.step(search, false)
    }

    /// The most recent successful match, if any.
    pub fn search_result(&self, search: SearchHandle) -> Result<Option<TextMatch>> {
        let slot = self.searches.get(search).ok_or_else(|| invalid_handle(search))?;
        Ok(slot.last_match)
    }

    /// Returns `false` if the handle was not open.
    pub fn close_search(&mut self, handle: SearchHandle) -> bool {
        let Some(slot) = self.searches.remove(handle) else {
            return false;
        };
        if let Some(text) = self.texts.get_mut(slot.text) {
            text.searches.retain(|&s| s != handle);
        }
        self.engine.find_close(slot.raw);
        log::debug!("Closed {:?}", handle);
        true
    }

    fn step(&mut self, search: SearchHandle, forward: bool) -> Result<bool> {
        let slot = self
            .searches
            .get_mut(search)
            .ok_or_else(|| invalid_handle(search))?;

        let found = if forward {
            self.engine.find_next(&mut slot.raw)
        } else {
            self.engine.find_prev(&mut slot.raw)
        };
        if found {
            let start = self.engine.sch_result_index(&slot.raw);
            let length = self.engine.sch_count(&slot.raw);
            slot.last_match = Some(TextMatch {
                start: start.max(0) as usize,
                length: length.max(0) as usize,
            });
        }
        Ok(found)
    }
}
