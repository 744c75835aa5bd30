#![allow(non_camel_case_types, non_upper_case_globals)]
//! Datatypes (H5T).

use super::types::*;

pub use H5T_class_t::*;
pub use H5T_cset_t::*;
pub use H5T_order_t::*;
pub use H5T_sign_t::*;
pub use H5T_str_t::*;

/// Size marker for variable-length strings.
pub const H5T_VARIABLE: size_t = !0;
pub const H5T_OPAQUE_TAG_MAX: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5T_class_t {
    H5T_NO_CLASS = -1,
    H5T_INTEGER = 0,
    H5T_FLOAT = 1,
    H5T_TIME = 2,
    H5T_STRING = 3,
    H5T_BITFIELD = 4,
    H5T_OPAQUE = 5,
    H5T_COMPOUND = 6,
    H5T_REFERENCE = 7,
    H5T_ENUM = 8,
    H5T_VLEN = 9,
    H5T_ARRAY = 10,
    H5T_NCLASSES = 11,
}

impl H5T_class_t {
    pub fn from_raw(value: c_int) -> Self {
        match value {
            0 => H5T_INTEGER,
            1 => H5T_FLOAT,
            2 => H5T_TIME,
            3 => H5T_STRING,
            4 => H5T_BITFIELD,
            5 => H5T_OPAQUE,
            6 => H5T_COMPOUND,
            7 => H5T_REFERENCE,
            8 => H5T_ENUM,
            9 => H5T_VLEN,
            10 => H5T_ARRAY,
            _ => H5T_NO_CLASS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5T_order_t {
    H5T_ORDER_ERROR = -1,
    H5T_ORDER_LE = 0,
    H5T_ORDER_BE = 1,
    H5T_ORDER_VAX = 2,
    H5T_ORDER_MIXED = 3,
    H5T_ORDER_NONE = 4,
}

impl H5T_order_t {
    pub fn from_raw(value: c_int) -> Self {
        match value {
            0 => H5T_ORDER_LE,
            1 => H5T_ORDER_BE,
            2 => H5T_ORDER_VAX,
            3 => H5T_ORDER_MIXED,
            4 => H5T_ORDER_NONE,
            _ => H5T_ORDER_ERROR,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5T_sign_t {
    H5T_SGN_ERROR = -1,
    H5T_SGN_NONE = 0,
    H5T_SGN_2 = 1,
    H5T_NSGN = 2,
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5T_cset_t {
    H5T_CSET_ERROR = -1,
    H5T_CSET_ASCII = 0,
    H5T_CSET_UTF8 = 1,
}

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub enum H5T_str_t {
    H5T_STR_ERROR = -1,
    H5T_STR_NULLTERM = 0,
    H5T_STR_NULLPAD = 1,
    H5T_STR_SPACEPAD = 2,
}
