#![allow(non_camel_case_types, non_upper_case_globals)]
//! Error stacks (H5E).

use super::types::*;

pub use H5E_direction_t::*;
pub use H5E_type_t::*;

/// The calling thread's default error stack.
pub const H5E_DEFAULT: hid_t = 0;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5E_type_t {
    H5E_MAJOR = 0,
    H5E_MINOR = 1,
}

/// One entry of an error stack as reported by `H5Ewalk2`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct H5E_error2_t {
    pub cls_id: hid_t,
    pub maj_num: hid_t,
    pub min_num: hid_t,
    pub line: c_uint,
    pub func_name: *const c_char,
    pub file_name: *const c_char,
    pub desc: *const c_char,
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5E_direction_t {
    /// Innermost (where the failure was detected) first.
    H5E_WALK_UPWARD = 0,
    /// API function first.
    H5E_WALK_DOWNWARD = 1,
}

pub type H5E_walk2_t = Option<
    unsafe extern "C" fn(n: c_uint, err_desc: *const H5E_error2_t, client_data: *mut c_void) -> herr_t,
>;

pub type H5E_auto2_t =
    Option<unsafe extern "C" fn(estack: hid_t, client_data: *mut c_void) -> herr_t>;
