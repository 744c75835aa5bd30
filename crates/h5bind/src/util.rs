//! Utility functions for string handling.

use std::borrow::Borrow;
use std::ffi::{CStr, CString};
use std::ptr;

use crate::error::Result;
use crate::sys::{c_char, c_void, size_t, H5free_memory};

/// Convert a zero-terminated string (`const char *`) into a `String`.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Safety
///
/// `string` must be null or point to a valid zero-terminated string.
pub unsafe fn string_from_cstr(string: *const c_char) -> String {
    if string.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(string).to_string_lossy().into_owned() }
}

/// Convert a `String` or a `&str` into a zero-terminated string (`const char *`).
pub fn to_cstring<S: Borrow<str>>(string: S) -> Result<CString> {
    let string = string.borrow();
    match CString::new(string) {
        Ok(cstr) => Ok(cstr),
        Err(_) => fail!(Unsupported, "null byte in string: {string:?}"),
    }
}

/// Get a string from an HDF5 function that returns the length of the string.
///
/// # Safety
///
/// `func` must expect a pointer to a buffer and its size.
/// If the pointer is null, `func` must return the length of the message.
/// Otherwise, `func` must write a zero-terminated string into the buffer.
#[doc(hidden)]
pub unsafe fn get_h5_str<T, F>(func: F) -> Result<String>
where
    F: Fn(*mut c_char, size_t) -> T,
    T: TryInto<isize>,
{
    let len = 1_isize + func(ptr::null_mut(), 0).try_into().unwrap_or(-1);
    ensure!(len > 0, Internal, "negative string length in get_h5_str()");
    if len == 1 {
        Ok(String::new())
    } else {
        let mut buf: Vec<c_char> = vec![0; len as usize];
        func(buf.as_mut_ptr(), len as _);
        Ok(unsafe { string_from_cstr(buf.as_ptr()) })
    }
}

/// Take ownership of a string allocated by the library and release it.
///
/// # Safety
///
/// `string` must be null or a zero-terminated string allocated by the HDF5 library.
pub(crate) unsafe fn take_h5_string(string: *mut c_char) -> Option<String> {
    if string.is_null() {
        return None;
    }
    let value = unsafe { string_from_cstr(string) };
    unsafe { H5free_memory(string.cast::<c_void>()) };
    Some(value)
}

pub(crate) fn usize_dims(dims: &[u64]) -> Vec<usize> {
    dims.iter().map(|&d| d as usize).collect()
}

pub(crate) fn hsize_dims(dims: &[usize]) -> Vec<u64> {
    dims.iter().map(|&d| d as u64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_to_cstring_rejects_interior_nul() {
        assert!(to_cstring("ok").is_ok());
        let err = to_cstring("a\0b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_string_from_cstr_null() {
        assert_eq!(unsafe { string_from_cstr(ptr::null()) }, "");
        let owned = CString::new("grp").unwrap();
        assert_eq!(unsafe { string_from_cstr(owned.as_ptr()) }, "grp");
    }

    #[test]
    fn test_get_h5_str() {
        let source = b"dataset\0";
        let s = unsafe {
            get_h5_str(|buf: *mut c_char, size: size_t| {
                if !buf.is_null() {
                    let n = size.min(source.len());
                    ptr::copy_nonoverlapping(source.as_ptr().cast(), buf, n);
                    *buf.add(n - 1) = 0;
                }
                (source.len() - 1) as isize
            })
        }
        .unwrap();
        assert_eq!(s, "dataset");
    }
}
