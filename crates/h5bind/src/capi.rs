//! C API for library initialization and error reporting.
//!
//! Lets hosts that ship their own HDF5 (HDF5_jll in Julia, h5py wheels in Python)
//! point the bindings at it before any other call.
//!
//! # Example (C)
//!
//! ```c
//! #include "h5bind.h"
//!
//! int main() {
//!     int status = h5bind_init("/usr/lib/libhdf5.so");
//!     if (status != H5BIND_SUCCESS) {
//!         fprintf(stderr, "%s\n", h5bind_status_message(status));
//!     }
//! }
//! ```

use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{Error, ErrorKind};

// ============================================================================
// Status Codes
// ============================================================================

/// Status code type for C API functions.
pub type StatusCode = c_int;

pub const H5BIND_SUCCESS: StatusCode = 0;
pub const H5BIND_NULL_POINTER: StatusCode = -1;
pub const H5BIND_INVALID_ARGUMENT: StatusCode = -2;
/// Library already initialized from a different path.
pub const H5BIND_ALREADY_INITIALIZED: StatusCode = -3;
pub const H5BIND_LIBRARY_LOAD_ERROR: StatusCode = -4;
pub const H5BIND_NOT_INITIALIZED: StatusCode = -5;
/// A panic or any other unexpected failure.
pub const H5BIND_INTERNAL_ERROR: StatusCode = -6;
pub const H5BIND_BUFFER_TOO_SMALL: StatusCode = -7;

// ============================================================================
// Initialization Functions
// ============================================================================

/// Initialize the bindings by loading the HDF5 library from `library_path`.
///
/// # Returns
///
/// * `H5BIND_SUCCESS` on success, or when already initialized from the same path
/// * `H5BIND_NULL_POINTER` if `library_path` is NULL
/// * `H5BIND_INVALID_ARGUMENT` if the path is not valid UTF-8
/// * `H5BIND_ALREADY_INITIALIZED` if initialized from a different path
/// * `H5BIND_LIBRARY_LOAD_ERROR` if the library or one of its symbols cannot be loaded
///
/// # Safety
///
/// `library_path` must be a valid null-terminated C string.
#[no_mangle]
pub extern "C" fn h5bind_init(library_path: *const c_char) -> StatusCode {
    if library_path.is_null() {
        return H5BIND_NULL_POINTER;
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let path = match unsafe { CStr::from_ptr(library_path) }.to_str() {
            Ok(s) => s,
            Err(_) => return H5BIND_INVALID_ARGUMENT,
        };

        match crate::library::init(path) {
            Ok(()) => H5BIND_SUCCESS,
            Err(Error::AlreadyInitialized(_)) => H5BIND_ALREADY_INITIALIZED,
            Err(Error::LibraryLoad { .. }) => H5BIND_LIBRARY_LOAD_ERROR,
            Err(err) => {
                tracing::error!(%err, "h5bind_init failed");
                H5BIND_INTERNAL_ERROR
            }
        }
    }));

    result.unwrap_or(H5BIND_INTERNAL_ERROR)
}

/// 1 if the library is ready for use, 0 otherwise.
#[no_mangle]
pub extern "C" fn h5bind_is_initialized() -> c_int {
    catch_unwind(|| c_int::from(crate::library::is_initialized())).unwrap_or(0)
}

/// Get the path the library was loaded from.
///
/// Query-then-fill:
/// 1. Call with `buf = NULL` to get the required length in `out_len`
/// 2. Allocate `out_len + 1` bytes (for the null terminator)
/// 3. Call again with the buffer
///
/// # Returns
///
/// * `H5BIND_SUCCESS` if the path was written (or only its length queried)
/// * `H5BIND_NULL_POINTER` if `out_len` is NULL
/// * `H5BIND_NOT_INITIALIZED` if no library was loaded
/// * `H5BIND_BUFFER_TOO_SMALL` if the buffer is too small (length still written)
///
/// # Safety
///
/// * `out_len` must be a valid pointer
/// * If `buf` is not NULL, it must point to a buffer of at least `buf_len` bytes
#[no_mangle]
pub extern "C" fn h5bind_library_path(
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> StatusCode {
    if out_len.is_null() {
        return H5BIND_NULL_POINTER;
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let Some(path) = crate::library::library_path() else {
            return H5BIND_NOT_INITIALIZED;
        };

        let path_bytes = path.as_bytes();
        let required_len = path_bytes.len();
        unsafe { *out_len = required_len };

        if buf.is_null() {
            return H5BIND_SUCCESS;
        }
        if buf_len <= required_len {
            return H5BIND_BUFFER_TOO_SMALL;
        }

        unsafe {
            std::ptr::copy_nonoverlapping(path_bytes.as_ptr(), buf as *mut u8, required_len);
            *buf.add(required_len) = 0;
        }
        H5BIND_SUCCESS
    }));

    result.unwrap_or(H5BIND_INTERNAL_ERROR)
}

/// Static description of a status code. Must not be freed.
#[no_mangle]
pub extern "C" fn h5bind_status_message(status: StatusCode) -> *const c_char {
    let msg = match status {
        H5BIND_SUCCESS => "Success\0",
        H5BIND_NULL_POINTER => "Null pointer\0",
        H5BIND_INVALID_ARGUMENT => "Invalid argument\0",
        H5BIND_ALREADY_INITIALIZED => "Already initialized with different path\0",
        H5BIND_LIBRARY_LOAD_ERROR => "Failed to load HDF5 library\0",
        H5BIND_NOT_INITIALIZED => "HDF5 library not initialized\0",
        H5BIND_INTERNAL_ERROR => "Internal error\0",
        H5BIND_BUFFER_TOO_SMALL => "Buffer too small\0",
        _ => "Unknown error\0",
    };

    msg.as_ptr() as *const c_char
}

/// Static name of the error kind with integer code `code` (see `ErrorKind::code`),
/// or NULL for an unknown code.
#[no_mangle]
pub extern "C" fn h5bind_error_kind_name(code: c_int) -> *const c_char {
    let name = match ErrorKind::from_code(code) {
        Some(ErrorKind::InvalidHandle) => "InvalidHandle\0",
        Some(ErrorKind::NotFound) => "NotFound\0",
        Some(ErrorKind::AlreadyExists) => "AlreadyExists\0",
        Some(ErrorKind::TypeMismatch) => "TypeMismatch\0",
        Some(ErrorKind::UnsupportedType) => "UnsupportedType\0",
        Some(ErrorKind::StringTooLong) => "StringTooLong\0",
        Some(ErrorKind::IoFailure) => "IoFailure\0",
        Some(ErrorKind::Unsupported) => "Unsupported\0",
        Some(ErrorKind::Internal) => "Internal\0",
        None => return std::ptr::null(),
    };

    name.as_ptr() as *const c_char
}

// ============================================================================
// Version Information
// ============================================================================

/// Version of this crate (e.g. "0.1.0"). Must not be freed.
#[no_mangle]
pub extern "C" fn h5bind_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(H5BIND_SUCCESS, 0);
        for code in [
            H5BIND_NULL_POINTER,
            H5BIND_INVALID_ARGUMENT,
            H5BIND_ALREADY_INITIALIZED,
            H5BIND_LIBRARY_LOAD_ERROR,
            H5BIND_NOT_INITIALIZED,
            H5BIND_INTERNAL_ERROR,
            H5BIND_BUFFER_TOO_SMALL,
        ] {
            assert!(code < 0);
            let msg = unsafe { CStr::from_ptr(h5bind_status_message(code)) };
            assert_ne!(msg.to_str().unwrap(), "Unknown error");
        }
    }

    #[test]
    fn test_init_null_pointer() {
        assert_eq!(h5bind_init(std::ptr::null()), H5BIND_NULL_POINTER);
    }

    #[test]
    fn test_library_path_null_out_len() {
        let status = h5bind_library_path(std::ptr::null_mut(), 0, std::ptr::null_mut());
        assert_eq!(status, H5BIND_NULL_POINTER);
    }

    #[cfg(feature = "emulated")]
    #[test]
    fn test_emulated_is_always_initialized() {
        assert_eq!(h5bind_is_initialized(), 1);
        let mut len = 0;
        let status = h5bind_library_path(std::ptr::null_mut(), 0, &mut len);
        assert_eq!(status, H5BIND_NOT_INITIALIZED);
    }

    #[test]
    fn test_error_kind_names() {
        for kind in ErrorKind::ALL {
            let name = unsafe { CStr::from_ptr(h5bind_error_kind_name(kind.code())) };
            assert_eq!(name.to_str().unwrap(), kind.name());
        }
        assert!(h5bind_error_kind_name(0).is_null());
    }

    #[test]
    fn test_version() {
        let ver = unsafe { CStr::from_ptr(h5bind_version()) };
        assert_eq!(ver.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
