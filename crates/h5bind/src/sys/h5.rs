#![allow(non_camel_case_types, non_upper_case_globals)]
//! General library interface (H5).

use super::types::*;

pub use H5_index_t::*;
pub use H5_iter_order_t::*;

pub const H5_ITER_ERROR: herr_t = -1;
pub const H5_ITER_CONT: herr_t = 0;
pub const H5_ITER_STOP: herr_t = 1;

pub const HADDR_UNDEF: haddr_t = !0;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5_iter_order_t {
    H5_ITER_UNKNOWN = -1,
    H5_ITER_INC = 0,
    H5_ITER_DEC = 1,
    H5_ITER_NATIVE = 2,
    H5_ITER_N = 3,
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5_index_t {
    H5_INDEX_UNKNOWN = -1,
    H5_INDEX_NAME = 0,
    H5_INDEX_CRT_ORDER = 1,
    H5_INDEX_N = 2,
}
