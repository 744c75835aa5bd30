//! Object and region references (H5R).

use std::fmt;
use std::mem::MaybeUninit;

use crate::error::Result;
use crate::hl::dataspace::Dataspace;
use crate::hl::location::{Location, Object, ObjectType};
use crate::sys::{
    c_int, c_void, hobj_ref_t, H5O_type_t, H5R_type_t, H5Rcreate, H5Rdereference2, H5Rget_obj_type2,
    H5P_DEFAULT, H5R_DSET_REG_REF_BUF_SIZE,
};
use crate::types::{H5Type, ReferenceKind, TypeDescriptor};
use crate::util::to_cstring;

/// Reference to an object, by its address in the file it was created in.
///
/// A plain value: it keeps nothing open and can be stored in datasets and attributes.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectReference(hobj_ref_t);

impl ObjectReference {
    pub(crate) fn from_raw(addr: hobj_ref_t) -> Self {
        Self(addr)
    }

    pub fn addr(&self) -> u64 {
        self.0
    }

    fn as_ptr(&self) -> *const c_void {
        (&self.0 as *const hobj_ref_t).cast()
    }

    /// Open the referenced object in the file of `loc`.
    pub fn dereference<L: Location>(&self, loc: &L) -> Result<Object> {
        loc.id().ensure_valid()?;
        let id = h5try!(H5Rdereference2(
            loc.id().raw(),
            H5P_DEFAULT,
            H5R_type_t::H5R_OBJECT,
            self.as_ptr()
        ));
        Object::from_raw(id)
    }

    pub fn object_type<L: Location>(&self, loc: &L) -> Result<ObjectType> {
        loc.id().ensure_valid()?;
        let mut tp: c_int = -1;
        h5try!(H5Rget_obj_type2(loc.id().raw(), H5R_type_t::H5R_OBJECT, self.as_ptr(), &mut tp));
        let tp = match tp {
            0 => H5O_type_t::H5O_TYPE_GROUP,
            1 => H5O_type_t::H5O_TYPE_DATASET,
            2 => H5O_type_t::H5O_TYPE_NAMED_DATATYPE,
            _ => H5O_type_t::H5O_TYPE_UNKNOWN,
        };
        ObjectType::from_native(tp)
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<HDF5 object reference @{}>", self.0)
    }
}

unsafe impl H5Type for ObjectReference {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Reference(ReferenceKind::Object)
    }
}

/// Reference to a selection within a dataset.
///
/// Only the type model is supported: these can be described, but not created.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionReference([u8; H5R_DSET_REG_REF_BUF_SIZE]);

impl RegionReference {
    /// Reference to the current selection of `space` in dataset `name`.
    pub fn create<L: Location>(loc: &L, name: &str, space: &Dataspace) -> Result<Self> {
        loc.id().ensure_valid()?;
        let c_name = to_cstring(name)?;
        let mut buf = MaybeUninit::<[u8; H5R_DSET_REG_REF_BUF_SIZE]>::zeroed();
        h5try!(H5Rcreate(
            buf.as_mut_ptr().cast(),
            loc.id().raw(),
            c_name.as_ptr(),
            H5R_type_t::H5R_DATASET_REGION,
            space.raw()
        ));
        Ok(Self(unsafe { buf.assume_init() }))
    }
}

unsafe impl H5Type for RegionReference {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Reference(ReferenceKind::Region)
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hl::file::File;

    #[test]
    fn test_object_reference_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("refs.h5")).unwrap();
        let g = file.create_group("g").unwrap();
        let d = g.new_dataset::<u8>().shape([1]).create("d").unwrap();
        let r = file.reference("g/d").unwrap();
        assert_eq!(r.object_type(&file).unwrap(), ObjectType::Dataset);
        let target = r.dereference(&g).unwrap().into_dataset().unwrap();
        assert_eq!(target.name().unwrap(), d.name().unwrap());
        assert_eq!(file.reference("g").unwrap().object_type(&d).unwrap(), ObjectType::Group);

        let refs = file.new_dataset::<ObjectReference>().shape([1]).create("refs").unwrap();
        refs.write(&[r]).unwrap();
        assert_eq!(refs.read::<ObjectReference>().unwrap(), [r]);
        assert_eq!(file.reference("nope").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_region_references_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("region.h5")).unwrap();
        file.new_dataset::<u8>().shape([4]).create("d").unwrap();
        let space = Dataspace::new([4]).unwrap();
        let err = RegionReference::create(&file, "d", &space).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(RegionReference::type_descriptor().size(), H5R_DSET_REG_REF_BUF_SIZE);
    }
}
