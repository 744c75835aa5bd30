#![allow(non_camel_case_types, non_upper_case_globals)]
//! Identifiers (H5I).

use super::types::*;

pub use H5I_type_t::*;

pub const H5I_INVALID_HID: hid_t = -1;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug, Hash)]
pub enum H5I_type_t {
    H5I_UNINIT = -2,
    H5I_BADID = -1,
    H5I_FILE = 1,
    H5I_GROUP = 2,
    H5I_DATATYPE = 3,
    H5I_DATASPACE = 4,
    H5I_DATASET = 5,
    H5I_MAP = 6,
    H5I_ATTR = 7,
    H5I_VFL = 8,
    H5I_VOL = 9,
    H5I_GENPROP_CLS = 10,
    H5I_GENPROP_LST = 11,
    H5I_ERROR_CLASS = 12,
    H5I_ERROR_MSG = 13,
    H5I_ERROR_STACK = 14,
    H5I_SPACE_SEL_ITER = 15,
    H5I_EVENTSET = 16,
    H5I_NTYPES = 17,
}

impl H5I_type_t {
    /// Interpret the raw value returned by `H5Iget_type`.
    pub fn from_raw(value: c_int) -> Self {
        match value {
            1 => H5I_FILE,
            2 => H5I_GROUP,
            3 => H5I_DATATYPE,
            4 => H5I_DATASPACE,
            5 => H5I_DATASET,
            6 => H5I_MAP,
            7 => H5I_ATTR,
            8 => H5I_VFL,
            9 => H5I_VOL,
            10 => H5I_GENPROP_CLS,
            11 => H5I_GENPROP_LST,
            12 => H5I_ERROR_CLASS,
            13 => H5I_ERROR_MSG,
            14 => H5I_ERROR_STACK,
            15 => H5I_SPACE_SEL_ITER,
            16 => H5I_EVENTSET,
            _ => H5I_BADID,
        }
    }
}
