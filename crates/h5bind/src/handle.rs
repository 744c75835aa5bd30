//! Identifier wrapper: owns exactly one native handle.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{h5check, Result};
use crate::sync::with_registry;
use crate::sys::h5i::H5I_type_t;
use crate::sys::{
    herr_t, hid_t, H5Aclose, H5Dclose, H5Eclose_stack, H5Fclose, H5Gclose, H5Idec_ref,
    H5Iget_ref, H5Iget_type, H5Iinc_ref, H5Iis_valid, H5Pclose, H5Pclose_class, H5Sclose,
    H5Tclose,
};

/// Entity kind of a native handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    File,
    Group,
    Dataset,
    Dataspace,
    Datatype,
    Attribute,
    PropertyList,
    PropertyClass,
    ErrorStack,
}

impl IdKind {
    pub fn from_native(tp: H5I_type_t) -> Option<Self> {
        Some(match tp {
            H5I_type_t::H5I_FILE => IdKind::File,
            H5I_type_t::H5I_GROUP => IdKind::Group,
            H5I_type_t::H5I_DATASET => IdKind::Dataset,
            H5I_type_t::H5I_DATASPACE => IdKind::Dataspace,
            H5I_type_t::H5I_DATATYPE => IdKind::Datatype,
            H5I_type_t::H5I_ATTR => IdKind::Attribute,
            H5I_type_t::H5I_GENPROP_LST => IdKind::PropertyList,
            H5I_type_t::H5I_GENPROP_CLS => IdKind::PropertyClass,
            H5I_type_t::H5I_ERROR_STACK => IdKind::ErrorStack,
            _ => return None,
        })
    }

    pub fn native(self) -> H5I_type_t {
        match self {
            IdKind::File => H5I_type_t::H5I_FILE,
            IdKind::Group => H5I_type_t::H5I_GROUP,
            IdKind::Dataset => H5I_type_t::H5I_DATASET,
            IdKind::Dataspace => H5I_type_t::H5I_DATASPACE,
            IdKind::Datatype => H5I_type_t::H5I_DATATYPE,
            IdKind::Attribute => H5I_type_t::H5I_ATTR,
            IdKind::PropertyList => H5I_type_t::H5I_GENPROP_LST,
            IdKind::PropertyClass => H5I_type_t::H5I_GENPROP_CLS,
            IdKind::ErrorStack => H5I_type_t::H5I_ERROR_STACK,
        }
    }

    /// Kind of a raw handle as reported by `H5Iget_type`.
    pub(crate) fn of_raw(id: hid_t) -> Option<Self> {
        if id <= 0 {
            return None;
        }
        Self::from_native(H5I_type_t::from_raw(h5lock!(H5Iget_type(id))))
    }

    unsafe fn release(self, id: hid_t) -> herr_t {
        unsafe {
            match self {
                IdKind::File => H5Fclose(id),
                IdKind::Group => H5Gclose(id),
                IdKind::Dataset => H5Dclose(id),
                IdKind::Dataspace => H5Sclose(id),
                IdKind::Datatype => H5Tclose(id),
                IdKind::Attribute => H5Aclose(id),
                IdKind::PropertyList => H5Pclose(id),
                IdKind::PropertyClass => H5Pclose_class(id),
                IdKind::ErrorStack => H5Eclose_stack(id),
            }
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            IdKind::File => "file",
            IdKind::Group => "group",
            IdKind::Dataset => "dataset",
            IdKind::Dataspace => "dataspace",
            IdKind::Datatype => "datatype",
            IdKind::Attribute => "attribute",
            IdKind::PropertyList => "property list",
            IdKind::PropertyClass => "property class",
            IdKind::ErrorStack => "error stack",
        })
    }
}

const OPEN: u8 = 0;
const CLOSED: u8 = 1;
const INVALIDATED: u8 = 2;

/// Lifecycle state of a wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdState {
    Open,
    Closed,
    Invalidated,
}

pub(crate) struct IdInner {
    id: hid_t,
    kind: IdKind,
    state: AtomicU8,
}

impl IdInner {
    pub(crate) fn is_open(&self) -> bool {
        self.state.load(Ordering::Acquire) == OPEN
    }

    fn close(&self) -> Result<()> {
        h5lock!({
            if self
                .state
                .compare_exchange(OPEN, CLOSED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Ok(());
            }
            with_registry(|registry| registry.unregister(self.id, self));
            tracing::trace!(id = self.id, kind = %self.kind, "unregistered handle");
            h5check(self.kind.release(self.id)).map(drop)
        })
    }
}

impl Drop for IdInner {
    fn drop(&mut self) {
        if *self.state.get_mut() != OPEN {
            return;
        }
        if let Err(err) = self.close() {
            tracing::warn!(id = self.id, kind = %self.kind, error = %err, "failed to close handle on drop");
        }
    }
}

/// A reference-counted wrapper around one native handle.
///
/// Clones share state: closing through one clone closes them all. The native handle
/// is released exactly once, either by [`close`](Self::close) or when the last clone
/// is dropped. The registry guarantees one wrapper per live handle value.
#[derive(Clone)]
pub struct ObjectId(Arc<IdInner>);

impl ObjectId {
    pub(crate) fn from_inner(inner: Arc<IdInner>) -> Self {
        Self(inner)
    }

    fn register(kind: IdKind, id: hid_t) -> Self {
        let inner = Arc::new(IdInner { id, kind, state: AtomicU8::new(OPEN) });
        with_registry(|registry| registry.register(id, &inner));
        tracing::trace!(id, kind = %kind, "registered handle");
        Self(inner)
    }

    /// Take ownership of a fresh handle returned by a create or open call.
    ///
    /// If the library handed back a value that is already wrapped (with its count
    /// incremented), the extra reference is released and the existing wrapper returned.
    pub(crate) fn from_owned(kind: IdKind, id: hid_t) -> Result<Self> {
        ensure!(id > 0, InvalidHandle, "invalid {kind} id: {id}");
        h5lock!({
            let existing = with_registry(|registry| registry.lookup(id));
            if let Some(inner) = existing.filter(|inner| inner.is_open()) {
                h5check(H5Idec_ref(id))?;
                return Ok(Self(inner));
            }
            Ok(Self::register(kind, id))
        })
    }

    /// Like [`from_owned`](Self::from_owned), with the kind queried from the library.
    pub(crate) fn from_owned_any(id: hid_t) -> Result<Self> {
        match IdKind::of_raw(id) {
            Some(kind) => Self::from_owned(kind, id),
            None => fail!(InvalidHandle, "unsupported id type for id {id:#x}"),
        }
    }

    /// Wrap a handle the caller keeps owning.
    ///
    /// Returns the registered wrapper when there is one; otherwise the native count is
    /// incremented so the new wrapper holds its own reference.
    pub fn open(kind: IdKind, id: hid_t) -> Result<Self> {
        h5lock!({
            let valid = id > 0 && H5Iis_valid(id) > 0;
            ensure!(valid, InvalidHandle, "invalid {kind} id: {id:#x}");
            let actual = IdKind::of_raw(id);
            ensure!(
                actual == Some(kind),
                InvalidHandle,
                "id {id:#x} is not a {kind} id ({actual:?})"
            );
            let existing = with_registry(|registry| registry.lookup(id));
            if let Some(inner) = existing.filter(|inner| inner.is_open()) {
                return Ok(Self(inner));
            }
            h5check(H5Iinc_ref(id))?;
            Ok(Self::register(kind, id))
        })
    }

    /// Release the native handle. A second call is a no-op.
    pub fn close(&self) -> Result<()> {
        self.0.close()
    }

    /// Mark the wrapper dead after the library closed its handle out of band.
    pub(crate) fn invalidate(&self) -> bool {
        let changed = self
            .0
            .state
            .compare_exchange(OPEN, INVALIDATED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if changed {
            with_registry(|registry| registry.unregister(self.0.id, &*self.0));
            tracing::trace!(id = self.0.id, kind = %self.0.kind, "invalidated handle");
        }
        changed
    }

    pub fn state(&self) -> IdState {
        match self.0.state.load(Ordering::Acquire) {
            OPEN => IdState::Open,
            CLOSED => IdState::Closed,
            _ => IdState::Invalidated,
        }
    }

    /// `true` while the wrapper is open and the library still knows the handle.
    pub fn is_valid(&self) -> bool {
        self.0.is_open() && h5lock!(H5Iis_valid(self.0.id)) > 0
    }

    pub fn ensure_valid(&self) -> Result<()> {
        match self.state() {
            IdState::Open if self.is_valid() => Ok(()),
            IdState::Open => fail!(InvalidHandle, "{} id {:#x} is no longer valid", self.0.kind, self.0.id),
            IdState::Closed => fail!(InvalidHandle, "{} id {:#x} is closed", self.0.kind, self.0.id),
            IdState::Invalidated => {
                fail!(InvalidHandle, "{} id {:#x} was invalidated by its file closing", self.0.kind, self.0.id)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state() != IdState::Open
    }

    /// Native reference count; 0 once the handle is gone.
    pub fn refcount(&self) -> u32 {
        if !self.0.is_open() {
            return 0;
        }
        h5call!(H5Iget_ref(self.0.id)).map(|x| x as u32).unwrap_or(0)
    }

    /// `true` when both wrappers are the same registry entry.
    pub fn same_identity(&self, other: &ObjectId) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind(&self) -> IdKind {
        self.0.kind
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.0.id
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ObjectId")
            .field("id", &format_args!("{:#x}", self.0.id))
            .field("kind", &self.0.kind)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::globals::H5T_NATIVE_INT32;
    use crate::registry;
    use crate::sys::{H5Screate_simple, H5Tcopy};

    fn new_space() -> ObjectId {
        let dims = [4_u64];
        let id = h5call!(H5Screate_simple(1, dims.as_ptr(), std::ptr::null())).unwrap();
        ObjectId::from_owned(IdKind::Dataspace, id).unwrap()
    }

    #[test]
    fn test_close_is_idempotent() {
        let space = new_space();
        assert!(space.is_valid());
        assert_eq!(space.refcount(), 1);
        space.close().unwrap();
        assert!(space.is_closed());
        assert_eq!(space.state(), IdState::Closed);
        space.close().unwrap();
        assert_eq!(space.ensure_valid().unwrap_err().kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_open_returns_registered_wrapper() {
        let space = new_space();
        let again = ObjectId::open(IdKind::Dataspace, space.raw()).unwrap();
        assert!(again.same_identity(&space));
        assert_eq!(space.refcount(), 1);
        let found = registry::lookup(space.raw()).unwrap();
        assert!(found.same_identity(&space));
    }

    #[test]
    fn test_open_checks_kind() {
        let space = new_space();
        let err = ObjectId::open(IdKind::Datatype, space.raw()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        let err = ObjectId::open(IdKind::Dataspace, -1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_open_borrows_a_reference() {
        let raw = h5call!(H5Tcopy(H5T_NATIVE_INT32())).unwrap();
        let dtype = ObjectId::open(IdKind::Datatype, raw).unwrap();
        assert_eq!(dtype.refcount(), 2);
        drop(dtype);
        assert_eq!(h5call!(H5Iget_ref(raw)).unwrap(), 1);
        h5call!(H5Tclose(raw)).unwrap();
    }

    #[test]
    fn test_drop_unregisters() {
        let space = new_space();
        let raw = space.raw();
        let clone = space.clone();
        drop(space);
        assert!(registry::lookup(raw).is_some());
        drop(clone);
        assert!(registry::lookup(raw).is_none());
        assert_eq!(h5lock!(H5Iis_valid(raw)), 0);
    }

    #[test]
    fn test_invalidate_makes_no_native_call() {
        let space = new_space();
        let raw = space.raw();
        assert!(space.invalidate());
        assert!(!space.invalidate());
        assert_eq!(space.state(), IdState::Invalidated);
        assert_eq!(space.ensure_valid().unwrap_err().kind(), ErrorKind::InvalidHandle);
        // The handle itself is still open; release it by hand.
        assert_eq!(h5lock!(H5Iis_valid(raw)), 1);
        h5call!(H5Sclose(raw)).unwrap();
    }
}
