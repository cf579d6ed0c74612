//! Engine lifetime under concurrent bridges
//!
//! Several bridges share one engine and one `LibraryGuard`; the engine must
//! be initialized exactly while at least one document is open anywhere.

mod common;

use common::{FakeDoc, FakeEngine, FakePage};
use pdfium_bridge::{
    DocumentHandle, LibraryGuard, PageHandle, PdfBridge, ReaderSource, SearchHandle, TextHandle,
};
use serial_test::serial;
use std::sync::{Arc, Barrier};
use std::thread;

const DOC: &[u8] = b"%PDF-1.7 shared";

fn shared_engine() -> FakeEngine {
    let engine = FakeEngine::new();
    engine.add_document(
        DOC,
        FakeDoc::new()
            .page(FakePage::new(612.0, 792.0).text("shared page"))
            .page(FakePage::new(612.0, 792.0)),
    );
    engine
}

#[test]
fn test_handles_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DocumentHandle>();
    assert_send_sync::<PageHandle>();
    assert_send_sync::<TextHandle>();
    assert_send_sync::<SearchHandle>();
    assert_send_sync::<LibraryGuard>();
}

#[test]
#[serial]
fn test_concurrent_bridges_share_guard() {
    let engine = shared_engine();
    let guard = Arc::new(LibraryGuard::new());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let engine = engine.clone();
            let guard = Arc::clone(&guard);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut bridge = PdfBridge::with_guard(engine, guard);
                barrier.wait();
                for _ in 0..50 {
                    let doc = bridge
                        .open_document(ReaderSource::from_bytes(DOC.to_vec()), None)
                        .unwrap();
                    assert_eq!(bridge.page_count(doc).unwrap(), 2);
                    let page = bridge.open_page(doc, 0).unwrap().unwrap();
                    let text = bridge.open_text(page).unwrap();
                    assert_eq!(
                        bridge.extract_text(text, 0, 6).unwrap().as_deref(),
                        Some("shared")
                    );
                    assert!(bridge.close_document(doc));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should complete");
    }

    assert_eq!(guard.count(), 0);
    let state = engine.state();
    assert!(!state.initialized);
    assert_eq!(state.open_documents, 0);
    assert_eq!(state.open_pages, 0);
    assert_eq!(state.open_texts, 0);

    // init and destroy strictly alternate
    assert!(!state.events.is_empty());
    for pair in state.events.chunks(2) {
        assert_eq!(pair, ["init", "destroy"]);
    }
}

#[test]
#[serial]
fn test_bridge_moves_across_threads() {
    let engine = shared_engine();
    let guard = Arc::new(LibraryGuard::new());
    let mut bridge = PdfBridge::with_guard(engine.clone(), Arc::clone(&guard));
    let doc = bridge
        .open_document(ReaderSource::from_bytes(DOC.to_vec()), None)
        .unwrap();

    let bridge = thread::spawn(move || {
        assert_eq!(bridge.page_count(doc).unwrap(), 2);
        bridge
    })
    .join()
    .expect("Thread should complete");

    assert_eq!(guard.count(), 1);
    drop(bridge);
    assert_eq!(guard.count(), 0);
    assert_eq!(engine.state().events, vec!["init", "destroy"]);
}
