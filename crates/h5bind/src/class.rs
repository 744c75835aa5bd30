//! Object class trait for HDF5 objects.

use std::fmt;

use crate::error::Result;
use crate::handle::{IdKind, ObjectId};

pub trait ObjectClass: Sized {
    const NAME: &'static str;
    const VALID_KINDS: &'static [IdKind];

    /// Build the façade around an id whose kind was already checked.
    fn from_object_id(id: ObjectId) -> Result<Self>;

    fn id(&self) -> &ObjectId;

    fn short_repr(&self) -> Option<String> {
        None
    }

    fn is_valid_kind(kind: IdKind) -> bool {
        Self::VALID_KINDS.is_empty() || Self::VALID_KINDS.contains(&kind)
    }

    fn from_id(id: ObjectId) -> Result<Self> {
        ensure!(
            Self::is_valid_kind(id.kind()),
            TypeMismatch,
            "invalid {} id: {:?} is a {}",
            Self::NAME,
            id,
            id.kind()
        );
        id.ensure_valid()?;
        Self::from_object_id(id)
    }

    fn is_valid(&self) -> bool {
        self.id().is_valid()
    }

    fn close(&self) -> Result<()> {
        self.id().close()
    }

    fn debug_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.id().is_valid() {
            write!(f, "<HDF5 {}: invalid id>", Self::NAME)
        } else if let Some(d) = self.short_repr() {
            write!(f, "<HDF5 {}: {}>", Self::NAME, d)
        } else {
            write!(f, "<HDF5 {}>", Self::NAME)
        }
    }
}

/// Wraps an existing id into the façade `T`.
pub fn from_id<T: ObjectClass>(id: ObjectId) -> Result<T> {
    T::from_id(id)
}
