//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

/// Route `tracing` output through the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A scratch directory plus a path for `name` inside it.
///
/// Keep the `TempDir` alive for as long as the file is used.
pub fn scratch(name: &str) -> (TempDir, PathBuf) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

/// Make sure a native library is available.
///
/// The emulated engine always is; with `runtime-loading` the library named by
/// `H5BIND_HDF5_LIB` is loaded, and tests are skipped when it is unset.
#[cfg(feature = "emulated")]
pub fn ensure_hdf5_init() -> bool {
    true
}

#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
pub fn ensure_hdf5_init() -> bool {
    if h5bind::is_initialized() {
        return true;
    }
    match std::env::var(h5bind::config::ENV_LIBRARY_PATH) {
        Ok(path) => {
            h5bind::init(&path).expect("failed to load HDF5");
            true
        }
        Err(_) => {
            eprintln!("Skipping test: H5BIND_HDF5_LIB environment variable not set");
            false
        }
    }
}
