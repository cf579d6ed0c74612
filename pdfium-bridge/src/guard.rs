//! Process-wide engine lifetime
//!
//! The engine's global init/teardown is not reentrant. [`LibraryGuard`] keeps a
//! reference count under a single mutex and runs init on the 0→1 transition and
//! teardown on 1→0, so neither ever races with the other.

use crate::error::Result;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static GLOBAL: Lazy<Arc<LibraryGuard>> = Lazy::new(|| Arc::new(LibraryGuard::new()));

/// Reference-counted gate around the engine's global state.
///
/// Every opened document holds one reference. Hosts may also hold an explicit
/// reference through [`PdfBridge::init_engine`](crate::PdfBridge::init_engine).
#[derive(Debug, Default)]
pub struct LibraryGuard {
    count: Mutex<usize>,
}

impl LibraryGuard {
    /// Create a guard with a zero count.
    ///
    /// Use a fresh guard per test; production code normally shares
    /// [`LibraryGuard::global`].
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(0),
        }
    }

    /// The process-wide guard shared by every bridge created with
    /// [`PdfBridge::new`](crate::PdfBridge::new).
    pub fn global() -> Arc<LibraryGuard> {
        GLOBAL.clone()
    }

    /// Take a reference, running `init` if this is the first one.
    ///
    /// If `init` fails the count is left untouched and the error is returned.
    /// Returns the new count.
    pub fn acquire<F>(&self, init: F) -> Result<usize>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut count = self.lock();
        if *count == 0 {
            log::debug!("Init PDF engine library");
            init()?;
        }
        *count += 1;
        Ok(*count)
    }

    /// Drop a reference, running `destroy` if it was the last one.
    ///
    /// Releasing an unheld guard is logged and ignored. Returns the new count.
    pub fn release<F>(&self, destroy: F) -> usize
    where
        F: FnOnce(),
    {
        let mut count = self.lock();
        if *count == 0 {
            log::warn!("LibraryGuard released more often than acquired; ignoring");
            return 0;
        }
        *count -= 1;
        if *count == 0 {
            log::debug!("Destroy PDF engine library");
            destroy();
        }
        *count
    }

    /// Current number of outstanding references.
    pub fn count(&self) -> usize {
        *self.lock()
    }

    /// Whether the engine's global state is currently initialized.
    pub fn is_initialized(&self) -> bool {
        self.count() > 0
    }

    // A panic inside init/destroy must not wedge every later open.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
