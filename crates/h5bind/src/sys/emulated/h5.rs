//! Library-level entry points.

use std::ffi::CString;

use super::engine::{api, put};
use crate::sys::types::*;

const LIB_VERSION: (c_uint, c_uint, c_uint) = (1, 14, 0);

pub unsafe extern "C" fn H5open() -> herr_t {
    0
}

pub unsafe extern "C" fn H5close() -> herr_t {
    0
}

pub unsafe extern "C" fn H5dont_atexit() -> herr_t {
    0
}

pub unsafe extern "C" fn H5get_libversion(
    majnum: *mut c_uint,
    minnum: *mut c_uint,
    relnum: *mut c_uint,
) -> herr_t {
    put(majnum, LIB_VERSION.0);
    put(minnum, LIB_VERSION.1);
    put(relnum, LIB_VERSION.2);
    0
}

/// Releases memory the engine handed out (names, tags, variable-length strings).
pub unsafe extern "C" fn H5free_memory(mem: *mut c_void) -> herr_t {
    if mem.is_null() {
        return 0;
    }
    api("H5free_memory", "unable to free memory", -1, |engine| {
        if !engine.allocations.remove(&(mem as usize)) {
            bail!(Resource, CantFree, "pointer {mem:p} was not allocated by the library");
        }
        drop(CString::from_raw(mem as *mut c_char));
        Ok(0)
    })
}
