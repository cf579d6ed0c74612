//! [`Engine`] implementation over the PDFium C API

use crate::engine::{
    BitmapView, ByteSource, Engine, EngineFormat, ErrorCode, RenderFlags, Rotation, Viewport,
};
use crate::types::RectF;
use libc::{c_int, c_uchar, c_ulong};
use pdfium_sys::*;
use std::ffi::{c_void, CString};

/// PDFium-backed engine.
///
/// All PDFium state is process-global; create as many `PdfiumEngine`s as you
/// like, but drive them through bridges sharing one
/// [`LibraryGuard`](crate::LibraryGuard).
#[derive(Debug, Default)]
pub struct PdfiumEngine {
    _private: (),
}

impl PdfiumEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Keeps the byte source alive for as long as PDFium may read from it.
struct FileAccess {
    access: FPDF_FILEACCESS,
    source: Box<dyn ByteSource>,
}

unsafe extern "C" fn get_block_callback(
    param: *mut c_void,
    position: c_ulong,
    p_buf: *mut c_uchar,
    size: c_ulong,
) -> c_int {
    let file = &mut *(param as *mut FileAccess);
    let buf = std::slice::from_raw_parts_mut(p_buf, size as usize);
    match file.source.read_block(position as u64, buf) {
        Ok(()) => 1,
        Err(e) => {
            log::error!("Read of {} bytes at {} failed: {}", size, position, e);
            0
        }
    }
}

pub struct PdfiumDocument {
    handle: FPDF_DOCUMENT,
    _file: Box<FileAccess>,
}

pub struct PdfiumPage(FPDF_PAGE);
pub struct PdfiumTextPage(FPDF_TEXTPAGE);
pub struct PdfiumSearch(FPDF_SCHHANDLE);
pub struct PdfiumBookmark(FPDF_BOOKMARK);
pub struct PdfiumLink(FPDF_LINK);

// PDFium handles are plain pointers into library state; the bridge never uses
// one from two threads at once.
unsafe impl Send for PdfiumDocument {}
unsafe impl Send for PdfiumPage {}
unsafe impl Send for PdfiumTextPage {}
unsafe impl Send for PdfiumSearch {}

impl Engine for PdfiumEngine {
    type Document = PdfiumDocument;
    type Page = PdfiumPage;
    type TextPage = PdfiumTextPage;
    type Search = PdfiumSearch;
    type Bookmark = PdfiumBookmark;
    type Link = PdfiumLink;

    fn init_library(&mut self) -> Result<(), String> {
        unsafe { FPDF_InitLibrary() };
        Ok(())
    }

    fn destroy_library(&mut self) {
        unsafe { FPDF_DestroyLibrary() };
    }

    fn load_document(
        &mut self,
        source: Box<dyn ByteSource>,
        password: Option<&str>,
    ) -> Result<PdfiumDocument, ErrorCode> {
        let password = match password.map(CString::new).transpose() {
            Ok(password) => password,
            // Interior NUL can never match a real password
            Err(_) => return Err(ErrorCode::Password),
        };

        let mut file = Box::new(FileAccess {
            access: FPDF_FILEACCESS {
                m_FileLen: source.len() as c_ulong,
                m_GetBlock: Some(get_block_callback),
                m_Param: std::ptr::null_mut(),
            },
            source,
        });
        file.access.m_Param = file.as_mut() as *mut FileAccess as *mut c_void;

        let handle = unsafe {
            FPDF_LoadCustomDocument(
                &mut file.access,
                password
                    .as_ref()
                    .map_or(std::ptr::null(), |p| p.as_ptr()),
            )
        };
        if handle.is_null() {
            let code = unsafe { FPDF_GetLastError() };
            return Err(ErrorCode::from_raw(code as u32));
        }
        Ok(PdfiumDocument {
            handle,
            _file: file,
        })
    }

    fn close_document(&mut self, doc: PdfiumDocument) {
        unsafe { FPDF_CloseDocument(doc.handle) };
    }

    fn page_count(&self, doc: &PdfiumDocument) -> i32 {
        unsafe { FPDF_GetPageCount(doc.handle) }
    }

    fn page_size_by_index(&self, doc: &PdfiumDocument, index: i32) -> Option<(f64, f64)> {
        let mut width = 0.0;
        let mut height = 0.0;
        let ok = unsafe { FPDF_GetPageSizeByIndex(doc.handle, index, &mut width, &mut height) };
        (ok != 0).then_some((width, height))
    }

    fn meta_text(&self, doc: &PdfiumDocument, tag: &str, buf: &mut [u8]) -> usize {
        let Ok(tag) = CString::new(tag) else {
            return 0;
        };
        unsafe {
            FPDF_GetMetaText(
                doc.handle,
                tag.as_ptr(),
                buffer_ptr(buf),
                buf.len() as c_ulong,
            ) as usize
        }
    }

    fn bookmark_first_child(
        &self,
        doc: &PdfiumDocument,
        parent: Option<&PdfiumBookmark>,
    ) -> Option<PdfiumBookmark> {
        let parent = parent.map_or(std::ptr::null_mut(), |b| b.0);
        let child = unsafe { FPDFBookmark_GetFirstChild(doc.handle, parent) };
        (!child.is_null()).then_some(PdfiumBookmark(child))
    }

    fn bookmark_next_sibling(
        &self,
        doc: &PdfiumDocument,
        bookmark: &PdfiumBookmark,
    ) -> Option<PdfiumBookmark> {
        let next = unsafe { FPDFBookmark_GetNextSibling(doc.handle, bookmark.0) };
        (!next.is_null()).then_some(PdfiumBookmark(next))
    }

    fn bookmark_title(&self, bookmark: &PdfiumBookmark, buf: &mut [u8]) -> usize {
        unsafe { FPDFBookmark_GetTitle(bookmark.0, buffer_ptr(buf), buf.len() as c_ulong) as usize }
    }

    fn bookmark_dest_page(&self, doc: &PdfiumDocument, bookmark: &PdfiumBookmark) -> Option<i32> {
        let dest = unsafe { FPDFBookmark_GetDest(doc.handle, bookmark.0) };
        dest_page_index(doc, dest)
    }

    fn load_page(&mut self, doc: &PdfiumDocument, index: i32) -> Option<PdfiumPage> {
        let page = unsafe { FPDF_LoadPage(doc.handle, index) };
        (!page.is_null()).then_some(PdfiumPage(page))
    }

    fn close_page(&mut self, page: PdfiumPage) {
        unsafe { FPDF_ClosePage(page.0) };
    }

    fn render_page(
        &mut self,
        page: &PdfiumPage,
        bitmap: &mut BitmapView<'_>,
        viewport: Viewport,
        rotation: Rotation,
        flags: RenderFlags,
    ) {
        let format = match bitmap.format() {
            EngineFormat::Rgb24 => FPDFBitmap_BGR,
            EngineFormat::Rgba32 => FPDFBitmap_BGRA,
        };
        let width = bitmap.width() as c_int;
        let height = bitmap.height() as c_int;
        let stride = bitmap.stride() as c_int;

        unsafe {
            let pdf_bitmap = FPDFBitmap_CreateEx(
                width,
                height,
                format as c_int,
                bitmap.data_mut().as_mut_ptr() as *mut c_void,
                stride,
            );
            if pdf_bitmap.is_null() {
                log::error!("FPDFBitmap_CreateEx failed for {}x{}", width, height);
                return;
            }
            FPDF_RenderPageBitmap(
                pdf_bitmap,
                page.0,
                viewport.start_x,
                viewport.start_y,
                viewport.size_x,
                viewport.size_y,
                rotation.to_raw(),
                flags.bits(),
            );
            FPDFBitmap_Destroy(pdf_bitmap);
        }
    }

    fn enumerate_link(&self, page: &PdfiumPage, position: &mut i32) -> Option<PdfiumLink> {
        let mut link: FPDF_LINK = std::ptr::null_mut();
        let ok = unsafe { FPDFLink_Enumerate(page.0, position, &mut link) };
        (ok != 0 && !link.is_null()).then_some(PdfiumLink(link))
    }

    fn link_dest_page(&self, doc: &PdfiumDocument, link: &PdfiumLink) -> Option<i32> {
        let dest = unsafe { FPDFLink_GetDest(doc.handle, link.0) };
        dest_page_index(doc, dest)
    }

    fn link_uri(&self, doc: &PdfiumDocument, link: &PdfiumLink, buf: &mut [u8]) -> usize {
        unsafe {
            let action = FPDFLink_GetAction(link.0);
            if action.is_null() {
                return 0;
            }
            FPDFAction_GetURIPath(doc.handle, action, buffer_ptr(buf), buf.len() as c_ulong)
                as usize
        }
    }

    fn link_rect(&self, link: &PdfiumLink) -> Option<RectF> {
        let mut rect = FS_RECTF {
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        };
        let ok = unsafe { FPDFLink_GetAnnotRect(link.0, &mut rect) };
        (ok != 0).then(|| {
            RectF::new(
                f64::from(rect.left),
                f64::from(rect.top),
                f64::from(rect.right),
                f64::from(rect.bottom),
            )
        })
    }

    fn device_to_page(
        &self,
        page: &PdfiumPage,
        viewport: Viewport,
        rotation: Rotation,
        device_x: i32,
        device_y: i32,
    ) -> Option<(f64, f64)> {
        let mut page_x = 0.0;
        let mut page_y = 0.0;
        let ok = unsafe {
            FPDF_DeviceToPage(
                page.0,
                viewport.start_x,
                viewport.start_y,
                viewport.size_x,
                viewport.size_y,
                rotation.to_raw(),
                device_x,
                device_y,
                &mut page_x,
                &mut page_y,
            )
        };
        (ok != 0).then_some((page_x, page_y))
    }

    fn page_to_device(
        &self,
        page: &PdfiumPage,
        viewport: Viewport,
        rotation: Rotation,
        page_x: f64,
        page_y: f64,
    ) -> Option<(i32, i32)> {
        let mut device_x = 0;
        let mut device_y = 0;
        let ok = unsafe {
            FPDF_PageToDevice(
                page.0,
                viewport.start_x,
                viewport.start_y,
                viewport.size_x,
                viewport.size_y,
                rotation.to_raw(),
                page_x,
                page_y,
                &mut device_x,
                &mut device_y,
            )
        };
        (ok != 0).then_some((device_x, device_y))
    }

    fn load_text_page(&mut self, page: &PdfiumPage) -> Option<PdfiumTextPage> {
        let text = unsafe { FPDFText_LoadPage(page.0) };
        (!text.is_null()).then_some(PdfiumTextPage(text))
    }

    fn close_text_page(&mut self, text: PdfiumTextPage) {
        unsafe { FPDFText_ClosePage(text.0) };
    }

    fn count_chars(&self, text: &PdfiumTextPage) -> i32 {
        unsafe { FPDFText_CountChars(text.0) }
    }

    fn char_index_at_pos(
        &self,
        text: &PdfiumTextPage,
        x: f64,
        y: f64,
        x_tolerance: f64,
        y_tolerance: f64,
    ) -> i32 {
        unsafe { FPDFText_GetCharIndexAtPos(text.0, x, y, x_tolerance, y_tolerance) }
    }

    fn get_text(&self, text: &PdfiumTextPage, start: i32, count: i32, buf: &mut [u16]) -> i32 {
        // PDFium writes count + 1 units
        let count = count.min(buf.len() as i32 - 1);
        if count < 0 {
            return 0;
        }
        unsafe { FPDFText_GetText(text.0, start, count, buf.as_mut_ptr()) }
    }

    fn count_rects(&self, text: &PdfiumTextPage, start: i32, count: i32) -> i32 {
        unsafe { FPDFText_CountRects(text.0, start, count) }
    }

    fn get_rect(&self, text: &PdfiumTextPage, index: i32) -> Option<RectF> {
        let (mut left, mut top, mut right, mut bottom) = (0.0, 0.0, 0.0, 0.0);
        let ok = unsafe {
            FPDFText_GetRect(text.0, index, &mut left, &mut top, &mut right, &mut bottom)
        };
        (ok != 0).then_some(RectF::new(left, top, right, bottom))
    }

    fn find_start(
        &mut self,
        text: &PdfiumTextPage,
        query: &[u16],
        flags: u32,
        start_index: i32,
    ) -> Option<PdfiumSearch> {
        if query.last() != Some(&0) {
            return None;
        }
        let search =
            unsafe { FPDFText_FindStart(text.0, query.as_ptr(), flags as c_ulong, start_index) };
        (!search.is_null()).then_some(PdfiumSearch(search))
    }

    fn find_next(&mut self, search: &mut PdfiumSearch) -> bool {
        unsafe { FPDFText_FindNext(search.0) != 0 }
    }

    fn find_prev(&mut self, search: &mut PdfiumSearch) -> bool {
        unsafe { FPDFText_FindPrev(search.0) != 0 }
    }

    fn sch_result_index(&self, search: &PdfiumSearch) -> i32 {
        unsafe { FPDFText_GetSchResultIndex(search.0) }
    }

    fn sch_count(&self, search: &PdfiumSearch) -> i32 {
        unsafe { FPDFText_GetSchCount(search.0) }
    }

    fn find_close(&mut self, search: PdfiumSearch) {
        unsafe { FPDFText_FindClose(search.0) };
    }
}

fn buffer_ptr(buf: &mut [u8]) -> *mut c_void {
    if buf.is_empty() {
        std::ptr::null_mut()
    } else {
        buf.as_mut_ptr() as *mut c_void
    }
}

fn dest_page_index(doc: &PdfiumDocument, dest: FPDF_DEST) -> Option<i32> {
    if dest.is_null() {
        return None;
    }
    let index = unsafe { FPDFDest_GetPageIndex(doc.handle, dest) };
    (index >= 0).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReaderSource;
    use crate::{LibraryGuard, PdfBridge, PdfError};
    use std::sync::Arc;

    #[test]
    fn test_garbage_is_format_error() {
        let mut bridge = PdfBridge::with_guard(PdfiumEngine::new(), Arc::new(LibraryGuard::new()));
        let result = bridge.open_document(ReaderSource::from_bytes(b"not a pdf".to_vec()), None);
        match result {
            Err(PdfError::OpenFailed { reason }) => {
                assert_eq!(reason, "cannot create document: File not in PDF format or corrupted.");
            }
            Err(e) => panic!("Expected OpenFailed, got {:?}", e),
            Ok(_) => panic!("Expected error for garbage input"),
        }
        assert_eq!(bridge.guard().count(), 0);
    }
}
