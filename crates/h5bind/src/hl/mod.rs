//! Entity façades over the native API.
//!
//! Each façade owns an [`ObjectId`](crate::ObjectId) and checks its preconditions
//! before the native call, so most misuse is reported as a binding error with a
//! specific [`ErrorKind`](crate::ErrorKind).

mod container;

pub mod attribute;
pub mod dataset;
pub mod dataspace;
pub mod datatype;
pub mod file;
pub mod filters;
pub mod group;
pub mod identifier;
pub mod location;
pub mod plist;
pub mod reference;

pub use attribute::{Attribute, AttributeBuilder};
pub use dataset::{Dataset, DatasetBuilder};
pub use dataspace::{Dataspace, Hyperslab, SelectOp, Selection};
pub use datatype::Datatype;
pub use file::{File, FileBuilder, OpenMode};
pub use filters::{filter_available, filter_info, Filter, FilterInfo};
pub use group::{Group, MemberIter};
pub use location::{Location, Object, ObjectType};
pub use plist::{CloseDegree, Layout, PropertyClass, PropertyList};
pub use reference::{ObjectReference, RegionReference};
