#![allow(non_camel_case_types, non_upper_case_globals)]
//! Links (H5L).

use super::types::*;

/// Link iteration callback.
///
/// The link-info argument differs between library versions (`H5L_info1_t` before
/// 1.12, `H5L_info2_t` after), so it is passed through as an opaque pointer.
pub type H5L_iterate_t = Option<
    unsafe extern "C" fn(
        group: hid_t,
        name: *const c_char,
        info: *const c_void,
        op_data: *mut c_void,
    ) -> herr_t,
>;
