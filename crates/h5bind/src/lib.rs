// FFI surface mirrors the C API naming and pointer conventions
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]
#![allow(unexpected_cfgs)]
#![allow(non_snake_case)]

//! Low-level HDF5 bindings: handle lifecycle, type bridging and error translation.
//!
//! Native identifiers are wrapped in reference-counted [`ObjectId`]s, registered so
//! that one native id always maps to one wrapper, and exposed through typed façades
//! in [`hl`]. Every native call runs under one process-wide reentrant lock, and
//! every failure is translated into an [`Error`] carrying the library's error stack.
//!
//! # Backends
//!
//! With the default `runtime-loading` feature, `libhdf5` is opened with `dlopen`
//! and must be initialized first. The opt-in `emulated` feature swaps in an
//! in-process engine for the subset of the C API the bindings use; it exists for
//! tests and does not write HDF5 files.
//!
//! ```ignore
//! h5bind::init("/usr/lib/x86_64-linux-gnu/hdf5/serial/libhdf5.so")?;
//! ```
//!
//! # Example
//!
//! ```ignore
//! use h5bind::{File, Location};
//!
//! let file = File::create("data.h5")?;
//! let group = file.create_group("g")?;
//! let dataset = group.new_dataset::<i32>().shape([10]).create("d")?;
//! dataset.write(&(0..10).collect::<Vec<i32>>())?;
//! assert_eq!(dataset.read::<i32>()?, (0..10).collect::<Vec<_>>());
//! ```

// Macros (must come before modules that use them)
#[macro_use]
mod macros;

// Low-level FFI layer
pub mod sys;

// Host-side type model
pub mod types;

// Global ids (H5T_NATIVE_*, H5P_CLS_*, ...)
pub mod globals;

mod error;
pub use error::{h5check, Error, ErrorFrame, ErrorKind, ErrorStack, LoadError, Result};

mod sync;
pub use sync::sync;

mod util;
pub use util::{get_h5_str, string_from_cstr, to_cstring};

// Identifier wrapper and registry
mod class;
mod dim;
mod handle;
pub mod registry;

pub use class::{from_id, ObjectClass};
pub use dim::{Dimension, Ix};
pub use handle::{IdKind, IdState, ObjectId};

pub mod hl;

pub use hl::{
    Attribute, AttributeBuilder, CloseDegree, Dataset, DatasetBuilder, Dataspace, Datatype, File,
    FileBuilder, Filter, FilterInfo, Group, Hyperslab, Layout, Location, MemberIter, Object,
    ObjectReference, ObjectType, OpenMode, PropertyClass, PropertyList, RegionReference, SelectOp,
    Selection,
};
pub use types::{FixedAscii, FixedUnicode, H5Type, TypeDescriptor};

pub mod library;
pub use library::{init, is_initialized, library_path, library_version};

pub mod config;
pub use config::Config;

// C API
pub mod capi;
pub use capi::{
    h5bind_error_kind_name, h5bind_init, h5bind_is_initialized, h5bind_library_path,
    h5bind_status_message, h5bind_version, StatusCode, H5BIND_ALREADY_INITIALIZED,
    H5BIND_BUFFER_TOO_SMALL, H5BIND_INTERNAL_ERROR, H5BIND_INVALID_ARGUMENT,
    H5BIND_LIBRARY_LOAD_ERROR, H5BIND_NOT_INITIALIZED, H5BIND_NULL_POINTER, H5BIND_SUCCESS,
};
