//! Scripted in-memory engine for integration tests.
//!
//! Documents are registered by their source bytes. Every engine call is
//! checked against the library init state and resource counts are tracked so
//! tests can assert that the bridge released everything.

#![allow(dead_code)]

use pdfium_bridge::{
    BitmapView, ByteSource, Engine, EngineFormat, ErrorCode, RectF, RenderFlags, Rotation,
    Viewport,
};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct Outline {
    pub title: String,
    pub page: Option<i32>,
    pub children: Vec<Outline>,
}

pub fn node(title: &str, page: Option<i32>, children: Vec<Outline>) -> Outline {
    Outline {
        title: title.to_string(),
        page,
        children,
    }
}

#[derive(Debug, Clone)]
pub struct FakeLink {
    pub uri: Option<String>,
    pub dest: Option<i32>,
    pub rect: Option<RectF>,
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub links: Vec<FakeLink>,
    pub color: [u8; 3],
    pub broken: bool,
}

impl FakePage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            text: String::new(),
            links: Vec::new(),
            color: [0xFF, 0xFF, 0xFF],
            broken: false,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn link(mut self, link: FakeLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn color(mut self, rgb: [u8; 3]) -> Self {
        self.color = rgb;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDoc {
    pub password: Option<String>,
    pub pages: Vec<FakePage>,
    pub outline: Vec<Outline>,
    pub cyclic_outline: bool,
    pub meta: HashMap<String, String>,
    pub load_error: Option<ErrorCode>,
}

impl FakeDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: FakePage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn outline(mut self, outline: Vec<Outline>) -> Self {
        self.outline = outline;
        self
    }

    /// Last top-level entry links back to the first.
    pub fn cyclic_outline(mut self) -> Self {
        self.cyclic_outline = true;
        self
    }

    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    pub fn load_error(mut self, code: ErrorCode) -> Self {
        self.load_error = Some(code);
        self
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub documents: HashMap<Vec<u8>, Arc<FakeDoc>>,
    pub initialized: bool,
    pub fail_init: bool,
    /// "init" / "destroy" in call order
    pub events: Vec<&'static str>,
    pub open_documents: usize,
    pub open_pages: usize,
    pub open_texts: usize,
    pub open_searches: usize,
    pub renders: Vec<RenderCall>,
    pub last_tolerance: Option<(f64, f64)>,
    pub last_search_flags: Option<u32>,
    pub last_search_query: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCall {
    pub viewport: Viewport,
    pub rotation: Rotation,
    pub flags: RenderFlags,
    pub format: EngineFormat,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

/// Cloning shares the scripted state.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<State>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&self, bytes: &[u8], doc: FakeDoc) {
        self.state().documents.insert(bytes.to_vec(), Arc::new(doc));
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn assert_initialized(&self) {
        assert!(self.state().initialized, "engine used before init");
    }
}

pub struct FakeDocHandle {
    pub doc: Arc<FakeDoc>,
}

pub struct FakePageHandle {
    pub page: FakePage,
}

pub struct FakeTextPage {
    chars: Vec<u16>,
    rect_range: Cell<(i32, i32)>,
}

impl FakeTextPage {
    /// Character `i` sits in a 8x10 box on a 10pt grid, offset by half a point
    /// so truncation is observable.
    fn char_rect(i: i32) -> RectF {
        let left = 10.0 * i as f64 + 0.5;
        RectF::new(left, 20.5, left + 8.0, 10.5)
    }
}

pub struct FakeSearch {
    positions: Vec<usize>,
    needle_len: usize,
    start: i32,
    current: Option<usize>,
}

pub struct FakeBookmark {
    path: Vec<usize>,
    title: String,
}

fn bookmark_at(doc: &FakeDoc, path: Vec<usize>) -> Option<FakeBookmark> {
    let title = outline_node(doc, &path)?.title.clone();
    Some(FakeBookmark { path, title })
}

fn outline_node<'a>(doc: &'a FakeDoc, path: &[usize]) -> Option<&'a Outline> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.outline.get(*first)?;
    for &i in rest {
        node = node.children.get(i)?;
    }
    Some(node)
}

/// Two-call convention: return the full length, write only if it fits.
fn write_bytes(value: &[u8], buf: &mut [u8]) -> usize {
    if buf.len() >= value.len() {
        buf[..value.len()].copy_from_slice(value);
    }
    value.len()
}

fn utf16le_z(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|u| u.to_le_bytes())
        .collect()
}

fn fold(unit: u16, match_case: bool) -> u16 {
    if !match_case && unit < 0x80 {
        (unit as u8).to_ascii_lowercase() as u16
    } else {
        unit
    }
}

impl Engine for FakeEngine {
    type Document = FakeDocHandle;
    type Page = FakePageHandle;
    type TextPage = FakeTextPage;
    type Search = FakeSearch;
    type Bookmark = FakeBookmark;
    type Link = FakeLink;

    fn init_library(&mut self) -> Result<(), String> {
        let mut state = self.state();
        if state.fail_init {
            return Err("scripted init failure".to_string());
        }
        assert!(!state.initialized, "init while already initialized");
        state.initialized = true;
        state.events.push("init");
        Ok(())
    }

    fn destroy_library(&mut self) {
        let mut state = self.state();
        assert!(state.initialized, "destroy while not initialized");
        state.initialized = false;
        state.events.push("destroy");
    }

    fn load_document(
        &mut self,
        mut source: Box<dyn ByteSource>,
        password: Option<&str>,
    ) -> Result<FakeDocHandle, ErrorCode> {
        self.assert_initialized();
        let mut bytes = vec![0u8; source.len() as usize];
        source
            .read_block(0, &mut bytes)
            .map_err(|_| ErrorCode::File)?;

        let mut state = self.state();
        let doc = state.documents.get(&bytes).cloned().ok_or(ErrorCode::Format)?;
        if let Some(code) = doc.load_error {
            return Err(code);
        }
        if doc.password.is_some() && doc.password.as_deref() != password {
            return Err(ErrorCode::Password);
        }
        state.open_documents += 1;
        Ok(FakeDocHandle { doc })
    }

    fn close_document(&mut self, _doc: FakeDocHandle) {
        self.state().open_documents -= 1;
    }

    fn page_count(&self, doc: &FakeDocHandle) -> i32 {
        doc.doc.pages.len() as i32
    }

    fn page_size_by_index(&self, doc: &FakeDocHandle, index: i32) -> Option<(f64, f64)> {
        let page = doc.doc.pages.get(usize::try_from(index).ok()?)?;
        Some((page.width, page.height))
    }

    fn meta_text(&self, doc: &FakeDocHandle, tag: &str, buf: &mut [u8]) -> usize {
        let value = doc.doc.meta.get(tag).map(String::as_str).unwrap_or("");
        write_bytes(&utf16le_z(value), buf)
    }

    fn bookmark_first_child(
        &self,
        doc: &FakeDocHandle,
        parent: Option<&FakeBookmark>,
    ) -> Option<FakeBookmark> {
        let mut path = parent.map(|p| p.path.clone()).unwrap_or_default();
        path.push(0);
        bookmark_at(&doc.doc, path)
    }

    fn bookmark_next_sibling(
        &self,
        doc: &FakeDocHandle,
        bookmark: &FakeBookmark,
    ) -> Option<FakeBookmark> {
        let mut path = bookmark.path.clone();
        *path.last_mut()? += 1;
        if let Some(next) = bookmark_at(&doc.doc, path) {
            return Some(next);
        }
        if doc.doc.cyclic_outline && bookmark.path.len() == 1 {
            return bookmark_at(&doc.doc, vec![0]);
        }
        None
    }

    fn bookmark_title(&self, bookmark: &FakeBookmark, buf: &mut [u8]) -> usize {
        if bookmark.title.is_empty() {
            return 0;
        }
        write_bytes(&utf16le_z(&bookmark.title), buf)
    }

    fn bookmark_dest_page(&self, doc: &FakeDocHandle, bookmark: &FakeBookmark) -> Option<i32> {
        outline_node(&doc.doc, &bookmark.path)?.page
    }

    fn load_page(&mut self, doc: &FakeDocHandle, index: i32) -> Option<FakePageHandle> {
        self.assert_initialized();
        let page = doc.doc.pages.get(usize::try_from(index).ok()?)?;
        if page.broken {
            return None;
        }
        self.state().open_pages += 1;
        Some(FakePageHandle { page: page.clone() })
    }

    fn close_page(&mut self, _page: FakePageHandle) {
        self.state().open_pages -= 1;
    }

    fn render_page(
        &mut self,
        page: &FakePageHandle,
        bitmap: &mut BitmapView<'_>,
        viewport: Viewport,
        rotation: Rotation,
        flags: RenderFlags,
    ) {
        self.state().renders.push(RenderCall {
            viewport,
            rotation,
            flags,
            format: bitmap.format(),
            width: bitmap.width(),
            height: bitmap.height(),
            stride: bitmap.stride(),
        });
        bitmap.fill_rect(
            viewport.start_x,
            viewport.start_y,
            viewport.size_x,
            viewport.size_y,
            page.page.color,
        );
    }

    fn enumerate_link(&self, page: &FakePageHandle, position: &mut i32) -> Option<FakeLink> {
        let link = page.page.links.get(usize::try_from(*position).ok()?)?.clone();
        *position += 1;
        Some(link)
    }

    fn link_dest_page(&self, _doc: &FakeDocHandle, link: &FakeLink) -> Option<i32> {
        link.dest
    }

    fn link_uri(&self, _doc: &FakeDocHandle, link: &FakeLink, buf: &mut [u8]) -> usize {
        match &link.uri {
            Some(uri) => {
                let mut bytes = uri.as_bytes().to_vec();
                bytes.push(0);
                write_bytes(&bytes, buf)
            }
            None => 0,
        }
    }

    fn link_rect(&self, link: &FakeLink) -> Option<RectF> {
        link.rect
    }

    fn device_to_page(
        &self,
        page: &FakePageHandle,
        viewport: Viewport,
        rotation: Rotation,
        device_x: i32,
        device_y: i32,
    ) -> Option<(f64, f64)> {
        if viewport.size_x <= 0 || viewport.size_y <= 0 {
            return None;
        }
        let u = (device_x - viewport.start_x) as f64 / viewport.size_x as f64;
        let v = (device_y - viewport.start_y) as f64 / viewport.size_y as f64;
        let (a, b) = match rotation {
            Rotation::None => (u, 1.0 - v),
            Rotation::Cw90 => (v, u),
            Rotation::Cw180 => (1.0 - u, v),
            Rotation::Cw270 => (1.0 - v, 1.0 - u),
        };
        Some((a * page.page.width, b * page.page.height))
    }

    fn page_to_device(
        &self,
        page: &FakePageHandle,
        viewport: Viewport,
        rotation: Rotation,
        page_x: f64,
        page_y: f64,
    ) -> Option<(i32, i32)> {
        if viewport.size_x <= 0 || viewport.size_y <= 0 {
            return None;
        }
        let a = page_x / page.page.width;
        let b = page_y / page.page.height;
        let (u, v) = match rotation {
            Rotation::None => (a, 1.0 - b),
            Rotation::Cw90 => (b, a),
            Rotation::Cw180 => (1.0 - a, b),
            Rotation::Cw270 => (1.0 - b, 1.0 - a),
        };
        Some((
            viewport.start_x + (u * viewport.size_x as f64).round() as i32,
            viewport.start_y + (v * viewport.size_y as f64).round() as i32,
        ))
    }

    fn load_text_page(&mut self, page: &FakePageHandle) -> Option<FakeTextPage> {
        self.assert_initialized();
        self.state().open_texts += 1;
        Some(FakeTextPage {
            chars: page.page.text.encode_utf16().collect(),
            rect_range: Cell::new((0, 0)),
        })
    }

    fn close_text_page(&mut self, _text: FakeTextPage) {
        self.state().open_texts -= 1;
    }

    fn count_chars(&self, text: &FakeTextPage) -> i32 {
        text.chars.len() as i32
    }

    fn char_index_at_pos(
        &self,
        text: &FakeTextPage,
        x: f64,
        y: f64,
        x_tolerance: f64,
        y_tolerance: f64,
    ) -> i32 {
        self.state().last_tolerance = Some((x_tolerance, y_tolerance));
        (0..text.chars.len() as i32)
            .find(|&i| {
                let r = FakeTextPage::char_rect(i);
                x >= r.left - x_tolerance
                    && x <= r.right + x_tolerance
                    && y >= r.bottom - y_tolerance
                    && y <= r.top + y_tolerance
            })
            .unwrap_or(-1)
    }

    fn get_text(&self, text: &FakeTextPage, start: i32, count: i32, buf: &mut [u16]) -> i32 {
        let len = text.chars.len() as i32;
        if start < 0 || start >= len || count < 0 || buf.is_empty() {
            return 0;
        }
        let n = count.min(len - start).min(buf.len() as i32 - 1) as usize;
        let start = start as usize;
        buf[..n].copy_from_slice(&text.chars[start..start + n]);
        buf[n] = 0;
        n as i32 + 1
    }

    fn count_rects(&self, text: &FakeTextPage, start: i32, count: i32) -> i32 {
        let len = text.chars.len() as i32;
        if start < 0 || start >= len {
            text.rect_range.set((0, 0));
            return 0;
        }
        let n = if count == -1 {
            len - start
        } else {
            count.min(len - start)
        };
        text.rect_range.set((start, n));
        n
    }

    fn get_rect(&self, text: &FakeTextPage, index: i32) -> Option<RectF> {
        let (start, n) = text.rect_range.get();
        (index >= 0 && index < n).then(|| FakeTextPage::char_rect(start + index))
    }

    fn find_start(
        &mut self,
        text: &FakeTextPage,
        query: &[u16],
        flags: u32,
        start_index: i32,
    ) -> Option<FakeSearch> {
        self.assert_initialized();
        let (&terminator, needle) = query.split_last()?;
        assert_eq!(terminator, 0, "query must be NUL-terminated");
        {
            let mut state = self.state();
            state.last_search_flags = Some(flags);
            state.last_search_query = Some(query.to_vec());
            state.open_searches += 1;
        }

        let match_case = flags & 0x1 != 0;
        let positions = if needle.is_empty() || needle.len() > text.chars.len() {
            Vec::new()
        } else {
            (0..=text.chars.len() - needle.len())
                .filter(|&i| {
                    needle
                        .iter()
                        .zip(&text.chars[i..])
                        .all(|(&a, &b)| fold(a, match_case) == fold(b, match_case))
                })
                .collect()
        };
        Some(FakeSearch {
            positions,
            needle_len: needle.len(),
            start: start_index,
            current: None,
        })
    }

    fn find_next(&mut self, search: &mut FakeSearch) -> bool {
        let next = match search.current {
            None => search
                .positions
                .iter()
                .position(|&p| p as i32 >= search.start),
            Some(i) => (i + 1 < search.positions.len()).then_some(i + 1),
        };
        match next {
            Some(i) => {
                search.current = Some(i);
                true
            }
            None => false,
        }
    }

    fn find_prev(&mut self, search: &mut FakeSearch) -> bool {
        let prev = match search.current {
            None => search
                .positions
                .iter()
                .rposition(|&p| (p as i32) < search.start),
            Some(i) => i.checked_sub(1),
        };
        match prev {
            Some(i) => {
                search.current = Some(i);
                true
            }
            None => false,
        }
    }

    fn sch_result_index(&self, search: &FakeSearch) -> i32 {
        search
            .current
            .map_or(0, |i| search.positions[i] as i32)
    }

    fn sch_count(&self, search: &FakeSearch) -> i32 {
        search.current.map_or(0, |_| search.needle_len as i32)
    }

    fn find_close(&mut self, _search: FakeSearch) {
        self.state().open_searches -= 1;
    }
}
