//! Low-level HDF5 FFI surface.
//!
//! Type definitions are shared by both backends. Functions come from [`funcs`],
//! which either forwards to a dynamically loaded `libhdf5` (`runtime-loading`) or
//! to the in-process engine (`emulated`).

pub mod h5;
pub mod h5d;
pub mod h5e;
pub mod h5f;
pub mod h5g;
pub mod h5i;
pub mod h5l;
pub mod h5o;
pub mod h5p;
pub mod h5r;
pub mod h5s;
pub mod h5t;
pub mod h5z;
pub mod types;

#[cfg(feature = "emulated")]
pub(crate) mod emulated;

pub mod funcs;

pub use h5::*;
pub use h5d::*;
pub use h5e::*;
pub use h5f::*;
pub use h5g::*;
pub use h5i::*;
pub use h5l::*;
pub use h5o::*;
pub use h5p::*;
pub use h5r::*;
pub use h5s::*;
pub use h5t::*;
pub use h5z::*;
pub use types::*;

pub use funcs::*;
