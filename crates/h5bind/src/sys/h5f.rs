#![allow(non_camel_case_types, non_upper_case_globals)]
//! Files (H5F).

use super::types::*;

pub use H5F_close_degree_t::*;
pub use H5F_scope_t::*;

pub const H5F_ACC_RDONLY: c_uint = 0x0000;
pub const H5F_ACC_RDWR: c_uint = 0x0001;
pub const H5F_ACC_TRUNC: c_uint = 0x0002;
pub const H5F_ACC_EXCL: c_uint = 0x0004;

pub const H5F_OBJ_FILE: c_uint = 0x0001;
pub const H5F_OBJ_DATASET: c_uint = 0x0002;
pub const H5F_OBJ_GROUP: c_uint = 0x0004;
pub const H5F_OBJ_DATATYPE: c_uint = 0x0008;
pub const H5F_OBJ_ATTR: c_uint = 0x0010;
pub const H5F_OBJ_ALL: c_uint =
    H5F_OBJ_FILE | H5F_OBJ_DATASET | H5F_OBJ_GROUP | H5F_OBJ_DATATYPE | H5F_OBJ_ATTR;
pub const H5F_OBJ_LOCAL: c_uint = 0x0020;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5F_scope_t {
    H5F_SCOPE_LOCAL = 0,
    H5F_SCOPE_GLOBAL = 1,
}

/// What closing a file does to objects that are still open in it.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug, Default)]
pub enum H5F_close_degree_t {
    #[default]
    H5F_CLOSE_DEFAULT = 0,
    H5F_CLOSE_WEAK = 1,
    H5F_CLOSE_SEMI = 2,
    H5F_CLOSE_STRONG = 3,
}

impl H5F_close_degree_t {
    pub fn from_raw(value: c_int) -> Option<Self> {
        match value {
            0 => Some(H5F_CLOSE_DEFAULT),
            1 => Some(H5F_CLOSE_WEAK),
            2 => Some(H5F_CLOSE_SEMI),
            3 => Some(H5F_CLOSE_STRONG),
            _ => None,
        }
    }
}
