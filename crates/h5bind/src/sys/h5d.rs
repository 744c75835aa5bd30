#![allow(non_camel_case_types, non_upper_case_globals)]
//! Datasets (H5D).

pub use H5D_layout_t::*;

/// Storage layout of a dataset's raw data.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5D_layout_t {
    H5D_LAYOUT_ERROR = -1,
    H5D_COMPACT = 0,
    H5D_CONTIGUOUS = 1,
    H5D_CHUNKED = 2,
    H5D_VIRTUAL = 3,
    H5D_NLAYOUTS = 4,
}

impl H5D_layout_t {
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => H5D_COMPACT,
            1 => H5D_CONTIGUOUS,
            2 => H5D_CHUNKED,
            3 => H5D_VIRTUAL,
            _ => H5D_LAYOUT_ERROR,
        }
    }
}
