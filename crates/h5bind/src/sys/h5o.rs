#![allow(non_camel_case_types, non_upper_case_globals)]
//! Objects (H5O).

pub use H5O_type_t::*;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5O_type_t {
    H5O_TYPE_UNKNOWN = -1,
    H5O_TYPE_GROUP = 0,
    H5O_TYPE_DATASET = 1,
    H5O_TYPE_NAMED_DATATYPE = 2,
    H5O_TYPE_MAP = 3,
    H5O_TYPE_NTYPES = 4,
}
