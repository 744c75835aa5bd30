//! Initialization and C API status tests.

use std::ffi::{CStr, CString};

use h5bind::{
    h5bind_init, h5bind_is_initialized, h5bind_library_path, h5bind_status_message, init,
    is_initialized, library_path, library_version, H5BIND_NULL_POINTER, H5BIND_SUCCESS,
};

#[test]
fn test_not_initialized() {
    // Only meaningful when nothing else in this binary loaded the library first.
    if !is_initialized() {
        assert!(library_path().is_none());
        assert_eq!(h5bind_is_initialized(), 0);
    }
}

#[test]
#[cfg(feature = "emulated")]
fn test_init_emulated() {
    assert!(init("").is_ok());
    assert!(is_initialized());
    assert!(library_path().is_none());
    assert_eq!(library_version().0, 1);

    let path = CString::new("/does/not/matter").unwrap();
    assert_eq!(h5bind_init(path.as_ptr()), H5BIND_SUCCESS);
    assert_eq!(h5bind_is_initialized(), 1);
}

#[test]
#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
fn test_init_invalid_path() {
    use h5bind::{Error, H5BIND_ALREADY_INITIALIZED, H5BIND_LIBRARY_LOAD_ERROR};

    let path = CString::new("/nonexistent/path/libhdf5.so").unwrap();
    let status = h5bind_init(path.as_ptr());
    if is_initialized() {
        assert_eq!(status, H5BIND_ALREADY_INITIALIZED);
        return;
    }
    assert_eq!(status, H5BIND_LIBRARY_LOAD_ERROR);
    match init("/nonexistent/path/libhdf5.so") {
        Err(Error::LibraryLoad { path, .. }) => assert!(path.contains("nonexistent")),
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn test_capi_null_arguments() {
    assert_eq!(h5bind_init(std::ptr::null()), H5BIND_NULL_POINTER);
    let status = h5bind_library_path(std::ptr::null_mut(), 0, std::ptr::null_mut());
    assert_eq!(status, H5BIND_NULL_POINTER);
    let msg = unsafe { CStr::from_ptr(h5bind_status_message(status)) };
    assert_eq!(msg.to_str().unwrap(), "Null pointer");
}
