#![allow(non_camel_case_types, non_upper_case_globals)]
//! References (H5R).

use super::types::*;

pub use H5R_type_t::*;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5R_type_t {
    H5R_BADTYPE = -1,
    H5R_OBJECT = 0,
    H5R_DATASET_REGION = 1,
    H5R_MAXTYPE = 2,
}

/// Object reference in the 1.8 encoding: the object header address.
pub type hobj_ref_t = haddr_t;

pub const H5R_DSET_REG_REF_BUF_SIZE: usize = 12;
