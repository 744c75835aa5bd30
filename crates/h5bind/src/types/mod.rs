//! Host-side type model.
//!
//! [`TypeDescriptor`] describes a native datatype on the host side; [`H5Type`] ties
//! Rust types to their descriptors. The native half of the bridge lives in
//! [`crate::hl::datatype`].

pub mod descriptor;
pub mod h5type;
pub mod string;
pub mod typestr;

pub use descriptor::*;
pub use h5type::H5Type;
pub use string::{decode_fixed, encode_fixed, FixedAscii, FixedUnicode, StringError};
