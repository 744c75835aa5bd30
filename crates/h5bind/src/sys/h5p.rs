#![allow(non_camel_case_types, non_upper_case_globals)]
//! Property lists (H5P).

use super::types::*;

pub const H5P_DEFAULT: hid_t = 0;
