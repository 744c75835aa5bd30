//! In-process engine implementing the native API surface.
//!
//! Every entry point has the C signature of its HDF5 counterpart and follows
//! the same conventions: ids carry their type in the top byte, failures return
//! a negative value (or null) and leave records on the calling thread's error
//! stack, and iteration calls back into the caller. Files are persisted as a
//! private binary image.

#![allow(non_snake_case, clippy::missing_safety_doc)]

#[macro_use]
mod macros;

mod convert;
mod dtype;
mod engine;
mod errors;
mod ids;
mod plist;
mod space;
mod store;

mod h5;
mod h5a;
mod h5d;
mod h5e;
mod h5f;
mod h5g;
mod h5i;
mod h5p;
mod h5r;
mod h5s;
mod h5t;

pub(crate) mod globals;

pub use self::h5::*;
pub use self::h5a::*;
pub use self::h5d::*;
pub use self::h5e::*;
pub use self::h5f::*;
pub use self::h5g::*;
pub use self::h5i::*;
pub use self::h5p::*;
pub use self::h5r::*;
pub use self::h5s::*;
pub use self::h5t::*;
