//! Scalar aliases shared by every native module.

#![allow(non_camel_case_types)]

pub use std::os::raw::{c_char, c_double, c_float, c_int, c_uint, c_void};

pub type herr_t = c_int;
pub type htri_t = c_int;
pub type hsize_t = u64;
pub type hssize_t = i64;
pub type haddr_t = u64;
pub type hbool_t = u8;
pub type hid_t = i64;

pub type size_t = usize;
pub type ssize_t = isize;
