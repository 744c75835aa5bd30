//! HDF5 library initialization.
//!
//! Two modes are supported:
//! - `emulated` feature (default): no initialization needed, the engine is in-process
//! - `runtime-loading` feature: must call [`init`] before using HDF5 operations

use std::os::raw::c_uint;

use crate::error::Result;
use crate::sys::H5get_libversion;

/// Initialize HDF5 by loading the library from the given path.
///
/// # Runtime-loading mode
///
/// Must be called before any HDF5 operation.
///
/// * `Ok(())` if initialization succeeds or already initialized with the same path
/// * `Err(Error::AlreadyInitialized)` if already initialized with a different path
/// * `Err(Error::LibraryLoad)` if the library or one of its symbols cannot be loaded
///
/// # Emulated mode
///
/// A no-op that always returns `Ok(())`.
///
/// # Example
///
/// ```ignore
/// h5bind::init("/usr/lib/x86_64-linux-gnu/hdf5/serial/libhdf5.so")?;
/// ```
#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
pub fn init(library_path: &str) -> Result<()> {
    crate::sys::load_library(library_path)
}

/// Initialize HDF5 (no-op with the emulated engine).
#[cfg(feature = "emulated")]
pub fn init(_library_path: &str) -> Result<()> {
    Ok(())
}

/// Check if HDF5 has been initialized.
///
/// Always `true` for the emulated engine.
pub fn is_initialized() -> bool {
    crate::sys::is_initialized()
}

/// Get the path used for HDF5 initialization (`None` for the emulated engine).
pub fn library_path() -> Option<String> {
    crate::sys::library_path()
}

/// Version of the native library as `(major, minor, release)`.
pub fn library_version() -> (u32, u32, u32) {
    let (mut major, mut minor, mut release): (c_uint, c_uint, c_uint) = (0, 0, 0);
    h5call!(H5get_libversion(&mut major, &mut minor, &mut release))
        .map(|_| (major, minor, release))
        .unwrap_or((0, 0, 0))
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;

    #[test]
    fn test_emulated_library() {
        assert!(init("ignored").is_ok());
        assert!(is_initialized());
        assert_eq!(library_path(), None);
        let (major, minor, _) = library_version();
        assert_eq!((major, minor), (1, 14));
    }
}
