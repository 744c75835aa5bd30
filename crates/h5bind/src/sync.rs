//! Synchronization primitives for HDF5 operations.
//!
//! HDF5 is not thread-safe by default, so every native call runs under one
//! process-wide reentrant lock. The identifier registry lives inside the same lock,
//! so registering a wrapper and issuing the call that produced its handle can never
//! interleave with another thread closing that handle.
//!
//! - LIBRARY_INIT ensures H5dont_atexit() and H5open() are called once and silences
//!   the library's automatic error printing (errors are returned instead)
//! - sync() forces initialization before acquiring the lock

use std::cell::RefCell;
use std::ptr;
use std::sync::LazyLock;

use parking_lot::ReentrantMutex;

use crate::registry::Registry;
use crate::sys::{H5Eset_auto2, H5dont_atexit, H5open, H5E_DEFAULT};

/// Global reentrant mutex guarding all HDF5 calls and the identifier registry.
static LOCK: LazyLock<ReentrantMutex<RefCell<Registry>>> =
    LazyLock::new(|| ReentrantMutex::new(RefCell::new(Registry::default())));

/// Library initialization - called once before any HDF5 operations.
pub static LIBRARY_INIT: LazyLock<()> = LazyLock::new(|| {
    let _guard = LOCK.lock();
    unsafe {
        // Ensure HDF5 does not invalidate handles which might
        // still be live on other threads on program exit
        H5dont_atexit();
        H5open();
        H5Eset_auto2(H5E_DEFAULT, None, ptr::null_mut());
    }
});

fn ensure_loaded() {
    #[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
    if !crate::sys::is_initialized() {
        panic!("HDF5 library not initialized. Call h5bind::init() first.");
    }
}

/// Guards the execution of the provided closure with a recursive static mutex.
/// Forces library initialization before acquiring the lock.
pub fn sync<T, F>(func: F) -> T
where
    F: FnOnce() -> T,
{
    ensure_loaded();
    let _ = LazyLock::force(&LIBRARY_INIT);
    let _guard = LOCK.lock();
    func()
}

/// Run `func` with the registry borrowed, under the global lock.
///
/// `func` must not call back into anything that touches the registry, and must not
/// drop an `ObjectId` (its destructor unregisters).
pub(crate) fn with_registry<T, F>(func: F) -> T
where
    F: FnOnce(&mut Registry) -> T,
{
    sync(|| {
        let guard = LOCK.lock();
        let mut registry = guard.borrow_mut();
        func(&mut registry)
    })
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;

    #[test]
    pub fn test_sync_reentrant() {
        // Test that sync is reentrant (can be called nested)
        let result = sync(|| sync(|| sync(|| 42)));
        assert_eq!(result, 42);
    }

    #[test]
    fn test_registry_inside_sync() {
        let count = sync(|| with_registry(|r| r.live_count()));
        assert!(count < usize::MAX);
    }
}
