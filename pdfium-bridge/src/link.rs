//! Link annotations

use crate::bridge::{invalid_handle, PdfBridge};
use crate::engine::Engine;
use crate::error::Result;
use crate::registry::PageHandle;
use crate::types::Rect;
use serde::Serialize;

/// A link annotation on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// URI of a URI action
    pub uri: Option<String>,
    /// Target page of an internal destination
    pub dest_page: Option<usize>,
    /// Clickable area in page space
    pub rect: Option<Rect>,
}

impl<E: Engine> PdfBridge<E> {
    /// All link annotations on `page`, in annotation order.
    pub fn links(&self, page: PageHandle) -> Result<Vec<Link>> {
        let slot = self.pages.get(page).ok_or_else(|| invalid_handle(page))?;
        let doc = self
            .documents
            .get(slot.document)
            .ok_or_else(|| invalid_handle(slot.document))?;

        let mut links = Vec::new();
        let mut position = 0;
        while let Some(link) = self.engine.enumerate_link(&slot.raw, &mut position) {
            let dest_page = self
                .engine
                .link_dest_page(&doc.raw, &link)
                .and_then(|i| usize::try_from(i).ok());

            let len = self.engine.link_uri(&doc.raw, &link, &mut []);
            let uri = if len > 1 {
                let mut buf = vec![0u8; len];
                self.engine.link_uri(&doc.raw, &link, &mut buf);
                let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                Some(String::from_utf8_lossy(&buf[..end]).into_owned())
            } else {
                None
            };

            links.push(Link {
                uri,
                dest_page,
                rect: self.engine.link_rect(&link).map(|r| r.truncate()),
            });
        }
        Ok(links)
    }
}
