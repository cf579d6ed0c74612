//! Document outline (bookmarks)

use crate::bridge::{invalid_handle, PdfBridge};
use crate::engine::Engine;
use crate::error::Result;
use crate::registry::DocumentHandle;
use crate::utf16::decode_utf16le;
use serde::Serialize;

/// One outline entry with its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    /// Title text (empty if the entry has none)
    pub title: String,
    /// Target page index, if the entry points at a page
    pub page_index: Option<usize>,
    /// Nesting level; 0 for top-level entries
    pub depth: usize,
}

impl<E: Engine> PdfBridge<E> {
    /// Flatten the outline into document order (parents before children).
    ///
    /// Stops after [`BridgeConfig::max_bookmarks`](crate::BridgeConfig::max_bookmarks)
    /// entries, which also bounds cyclic outlines.
    ///
    /// For an outline `A { B { D }, C }` this yields
    /// `A(0), B(1), D(2), C(1)`.
    pub fn bookmark_tree(&self, document: DocumentHandle) -> Result<Vec<Bookmark>> {
        let slot = self
            .documents
            .get(document)
            .ok_or_else(|| invalid_handle(document))?;
        let doc = &slot.raw;
        let limit = self.config.max_bookmarks();

        let mut result = Vec::new();
        let mut stack = Vec::new();
        if let Some(first) = self.engine.bookmark_first_child(doc, None) {
            stack.push((first, 0usize));
        }

        while let Some((node, depth)) = stack.pop() {
            if result.len() >= limit {
                log::warn!(
                    "Outline of {:?} truncated at {} entries",
                    document,
                    limit
                );
                break;
            }

            // Sibling below child so the subtree is visited first
            if let Some(next) = self.engine.bookmark_next_sibling(doc, &node) {
                stack.push((next, depth));
            }
            if let Some(child) = self.engine.bookmark_first_child(doc, Some(&node)) {
                stack.push((child, depth + 1));
            }

            result.push(Bookmark {
                title: self.bookmark_title(&node),
                page_index: self
                    .engine
                    .bookmark_dest_page(doc, &node)
                    .and_then(|i| usize::try_from(i).ok()),
                depth,
            });
        }

        Ok(result)
    }

    fn bookmark_title(&self, bookmark: &E::Bookmark) -> String {
        let len = self.engine.bookmark_title(bookmark, &mut []);
        if len == 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len];
        self.engine.bookmark_title(bookmark, &mut buf);
        decode_utf16le(&buf)
    }
}
