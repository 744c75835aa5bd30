//! Named objects that can carry attributes: files, groups and datasets.

use std::fmt;
use std::mem::MaybeUninit;

use crate::class::ObjectClass;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::hl::attribute::{Attribute, AttributeBuilder};
use crate::hl::dataset::Dataset;
use crate::hl::file::File;
use crate::hl::group::Group;
use crate::hl::identifier;
use crate::hl::reference::ObjectReference;
use crate::sys::{
    c_void, hid_t, hobj_ref_t, H5Adelete, H5Aexists, H5Aget_num_attrs, H5O_type_t, H5Rcreate,
    H5R_type_t,
};
use crate::types::H5Type;
use crate::util::to_cstring;

pub(crate) mod private {
    use crate::handle::ObjectId;

    pub trait Sealed {
        /// Wrapper of the file the object lives in.
        fn file_id(&self) -> &ObjectId;
    }
}

/// Kind of a named object stored in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Group,
    Dataset,
    NamedDatatype,
}

impl ObjectType {
    pub(crate) fn from_native(tp: H5O_type_t) -> Result<Self> {
        match tp {
            H5O_type_t::H5O_TYPE_GROUP => Ok(ObjectType::Group),
            H5O_type_t::H5O_TYPE_DATASET => Ok(ObjectType::Dataset),
            H5O_type_t::H5O_TYPE_NAMED_DATATYPE => Ok(ObjectType::NamedDatatype),
            other => fail!(Unsupported, "unsupported object type: {other:?}"),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ObjectType::Group => "group",
            ObjectType::Dataset => "dataset",
            ObjectType::NamedDatatype => "named datatype",
        })
    }
}

/// A group or a dataset, for lookups that can return either.
#[derive(Clone, Debug)]
pub enum Object {
    Group(Group),
    Dataset(Dataset),
}

impl Object {
    /// Take ownership of a freshly opened object handle.
    pub(crate) fn from_raw(id: hid_t) -> Result<Self> {
        let id = ObjectId::from_owned_any(id)?;
        let file = identifier::file_handle(&id)?;
        match id.kind() {
            IdKind::Group => Ok(Object::Group(Group::from_parts(id, file))),
            IdKind::Dataset => Ok(Object::Dataset(Dataset::from_parts(id, file))),
            kind => fail!(TypeMismatch, "expected a group or a dataset, got a {kind}"),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Group(_) => ObjectType::Group,
            Object::Dataset(_) => ObjectType::Dataset,
        }
    }

    pub fn id(&self) -> &ObjectId {
        match self {
            Object::Group(group) => group.id(),
            Object::Dataset(dataset) => dataset.id(),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Object::Group(group) => Some(group),
            Object::Dataset(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Object::Dataset(dataset) => Some(dataset),
            Object::Group(_) => None,
        }
    }

    pub fn into_group(self) -> Result<Group> {
        match self {
            Object::Group(group) => Ok(group),
            Object::Dataset(_) => fail!(TypeMismatch, "object is a dataset, not a group"),
        }
    }

    pub fn into_dataset(self) -> Result<Dataset> {
        match self {
            Object::Dataset(dataset) => Ok(dataset),
            Object::Group(_) => fail!(TypeMismatch, "object is a group, not a dataset"),
        }
    }

    pub fn close(&self) -> Result<()> {
        self.id().close()
    }
}

/// Operations shared by every object that has a name and attributes.
pub trait Location: ObjectClass + private::Sealed {
    /// Full path of the object; empty for anonymous objects.
    fn name(&self) -> Result<String> {
        Ok(identifier::get_name(self)?.unwrap_or_default())
    }

    fn file(&self) -> Result<File> {
        identifier::get_file(self)
    }

    fn attr(&self, name: &str) -> Result<Attribute> {
        Attribute::open(self, name)
    }

    fn attr_exists(&self, name: &str) -> Result<bool> {
        self.id().ensure_valid()?;
        let name = to_cstring(name)?;
        Ok(h5try!(H5Aexists(self.id().raw(), name.as_ptr())) > 0)
    }

    /// Attribute names in index order.
    fn attr_names(&self) -> Result<Vec<String>> {
        (0..self.num_attrs()?)
            .map(|idx| Attribute::open_by_idx(self, idx).and_then(|attr| attr.name()))
            .collect()
    }

    fn num_attrs(&self) -> Result<usize> {
        self.id().ensure_valid()?;
        Ok(h5try!(H5Aget_num_attrs(self.id().raw())) as usize)
    }

    fn delete_attr(&self, name: &str) -> Result<()> {
        ensure!(self.attr_exists(name)?, NotFound, "attribute {name:?} does not exist");
        let name = to_cstring(name)?;
        h5call!(H5Adelete(self.id().raw(), name.as_ptr())).map(drop)
    }

    fn new_attr<T: H5Type>(&self) -> AttributeBuilder<T> {
        AttributeBuilder::new(self.id().clone(), self.file_id().clone())
    }

    /// Object reference to the object at `name`, relative to this location.
    fn reference(&self, name: &str) -> Result<ObjectReference> {
        self.id().ensure_valid()?;
        let c_name = to_cstring(name)?;
        let mut addr = MaybeUninit::<hobj_ref_t>::uninit();
        h5try!(H5Rcreate(
            addr.as_mut_ptr().cast::<c_void>(),
            self.id().raw(),
            c_name.as_ptr(),
            H5R_type_t::H5R_OBJECT,
            -1,
        ));
        Ok(ObjectReference::from_raw(unsafe { addr.assume_init() }))
    }
}

impl private::Sealed for File {
    fn file_id(&self) -> &ObjectId {
        self.id()
    }
}

impl Location for File {}

impl private::Sealed for Group {
    fn file_id(&self) -> &ObjectId {
        self.file_handle()
    }
}

impl Location for Group {}

impl private::Sealed for Dataset {
    fn file_id(&self) -> &ObjectId {
        self.file_handle()
    }
}

impl Location for Dataset {}
