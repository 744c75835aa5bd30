//! Property lists (H5P).
//!
//! A [`PropertyList`] has a fixed [`PropertyClass`]. Every option accessor checks the
//! class before calling into the library, so asking a file-access list for its chunk
//! shape fails with `TypeMismatch` instead of a native error.

use std::fmt;
use std::mem::MaybeUninit;
use std::ptr;
use std::str::FromStr;

use crate::class::ObjectClass;
use crate::error::{Error, Result};
use crate::globals::*;
use crate::handle::{IdKind, ObjectId};
use crate::hl::datatype::Datatype;
use crate::hl::filters::Filter;
use crate::sys::{
    c_char, c_int, c_uint, hid_t, hsize_t, size_t, H5D_layout_t, H5F_close_degree_t, H5Pclose_class,
    H5Pcopy, H5Pcreate, H5Pequal, H5Pget_buffer, H5Pget_chunk, H5Pget_class,
    H5Pget_create_intermediate_group, H5Pget_fclose_degree, H5Pget_fill_value, H5Pget_filter2,
    H5Pget_layout, H5Pget_nfilters, H5Pget_userblock, H5Pset_buffer, H5Pset_chunk,
    H5Pset_create_intermediate_group, H5Pset_deflate, H5Pset_fclose_degree, H5Pset_fill_value,
    H5Pset_fletcher32, H5Pset_layout, H5Pset_shuffle, H5Pset_userblock,
};
use crate::types::H5Type;
use crate::util::hsize_dims;

/// What closing a file does to objects still open in it.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CloseDegree {
    /// The file stays open until its last object closes.
    Weak = 1,
    /// Closing fails while objects are open.
    Semi = 2,
    /// Open objects are closed with the file.
    Strong = 3,
}

impl CloseDegree {
    pub(crate) fn native(self) -> H5F_close_degree_t {
        match self {
            CloseDegree::Weak => H5F_close_degree_t::H5F_CLOSE_WEAK,
            CloseDegree::Semi => H5F_close_degree_t::H5F_CLOSE_SEMI,
            CloseDegree::Strong => H5F_close_degree_t::H5F_CLOSE_STRONG,
        }
    }

    /// The library default (`H5F_CLOSE_DEFAULT`) behaves as weak for the sec2 driver.
    pub(crate) fn from_native(degree: H5F_close_degree_t) -> Self {
        match degree {
            H5F_close_degree_t::H5F_CLOSE_SEMI => CloseDegree::Semi,
            H5F_close_degree_t::H5F_CLOSE_STRONG => CloseDegree::Strong,
            _ => CloseDegree::Weak,
        }
    }
}

impl FromStr for CloseDegree {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Ok(CloseDegree::Weak),
            "semi" => Ok(CloseDegree::Semi),
            "strong" => Ok(CloseDegree::Strong),
            _ => fail!(Unsupported, "invalid close degree: {s:?} (expected weak, semi or strong)"),
        }
    }
}

impl fmt::Display for CloseDegree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            CloseDegree::Weak => "weak",
            CloseDegree::Semi => "semi",
            CloseDegree::Strong => "strong",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyClass {
    FileCreate,
    FileAccess,
    DatasetCreate,
    DatasetAccess,
    DatasetTransfer,
    GroupCreate,
    LinkCreate,
    AttributeCreate,
}

impl PropertyClass {
    pub const ALL: [PropertyClass; 8] = [
        PropertyClass::FileCreate,
        PropertyClass::FileAccess,
        PropertyClass::DatasetCreate,
        PropertyClass::DatasetAccess,
        PropertyClass::DatasetTransfer,
        PropertyClass::GroupCreate,
        PropertyClass::LinkCreate,
        PropertyClass::AttributeCreate,
    ];

    pub(crate) fn class_id(self) -> hid_t {
        match self {
            PropertyClass::FileCreate => H5P_CLS_FILE_CREATE(),
            PropertyClass::FileAccess => H5P_CLS_FILE_ACCESS(),
            PropertyClass::DatasetCreate => H5P_CLS_DATASET_CREATE(),
            PropertyClass::DatasetAccess => H5P_CLS_DATASET_ACCESS(),
            PropertyClass::DatasetTransfer => H5P_CLS_DATASET_XFER(),
            PropertyClass::GroupCreate => H5P_CLS_GROUP_CREATE(),
            PropertyClass::LinkCreate => H5P_CLS_LINK_CREATE(),
            PropertyClass::AttributeCreate => H5P_CLS_ATTRIBUTE_CREATE(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyClass::FileCreate => "file create",
            PropertyClass::FileAccess => "file access",
            PropertyClass::DatasetCreate => "dataset create",
            PropertyClass::DatasetAccess => "dataset access",
            PropertyClass::DatasetTransfer => "dataset transfer",
            PropertyClass::GroupCreate => "group create",
            PropertyClass::LinkCreate => "link create",
            PropertyClass::AttributeCreate => "attribute create",
        }
    }
}

impl fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw-data storage layout of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Contiguous,
    Chunked,
}

impl Layout {
    fn native(self) -> H5D_layout_t {
        match self {
            Layout::Compact => H5D_layout_t::H5D_COMPACT,
            Layout::Contiguous => H5D_layout_t::H5D_CONTIGUOUS,
            Layout::Chunked => H5D_layout_t::H5D_CHUNKED,
        }
    }
}

/// Class of a raw list, found by comparing against every predefined class.
fn class_of(id: hid_t) -> Result<PropertyClass> {
    let cls = h5try!(H5Pget_class(id));
    let class = PropertyClass::ALL
        .into_iter()
        .find(|class| h5lock!(H5Pequal(cls, class.class_id())) > 0);
    h5lock!(H5Pclose_class(cls));
    match class {
        Some(class) => Ok(class),
        None => fail!(Unsupported, "property list {id:#x} has an unknown class"),
    }
}

/// An HDF5 property list.
#[derive(Clone)]
pub struct PropertyList {
    id: ObjectId,
    class: PropertyClass,
}

impl ObjectClass for PropertyList {
    const NAME: &'static str = "property list";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::PropertyList];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        let class = class_of(id.raw())?;
        Ok(Self { id, class })
    }

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn short_repr(&self) -> Option<String> {
        Some(self.class.to_string())
    }
}

impl fmt::Debug for PropertyList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl PropertyList {
    /// Create a list of `class` holding the library defaults.
    pub fn new(class: PropertyClass) -> Result<Self> {
        let id = h5try!(H5Pcreate(class.class_id()));
        Ok(Self { id: ObjectId::from_owned(IdKind::PropertyList, id)?, class })
    }

    pub(crate) fn from_raw(id: hid_t) -> Result<Self> {
        Self::from_object_id(ObjectId::from_owned(IdKind::PropertyList, id)?)
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.id.raw()
    }

    pub fn class(&self) -> PropertyClass {
        self.class
    }

    /// An independent copy with the same options.
    pub fn copy(&self) -> Result<Self> {
        self.id.ensure_valid()?;
        let id = h5try!(H5Pcopy(self.raw()));
        Ok(Self { id: ObjectId::from_owned(IdKind::PropertyList, id)?, class: self.class })
    }

    fn require(&self, class: PropertyClass, option: &str) -> Result<()> {
        self.id.ensure_valid()?;
        ensure!(
            self.class == class,
            TypeMismatch,
            "{option} is a {class} option, not available on a {} list",
            self.class
        );
        Ok(())
    }

    // File creation

    pub fn set_userblock(&self, size: u64) -> Result<()> {
        self.require(PropertyClass::FileCreate, "userblock")?;
        h5call!(H5Pset_userblock(self.raw(), size)).map(drop)
    }

    pub fn userblock(&self) -> Result<u64> {
        self.require(PropertyClass::FileCreate, "userblock")?;
        let mut size: hsize_t = 0;
        h5try!(H5Pget_userblock(self.raw(), &mut size));
        Ok(size)
    }

    // File access

    pub fn set_fclose_degree(&self, degree: CloseDegree) -> Result<()> {
        self.require(PropertyClass::FileAccess, "fclose_degree")?;
        h5call!(H5Pset_fclose_degree(self.raw(), degree.native())).map(drop)
    }

    pub fn fclose_degree(&self) -> Result<CloseDegree> {
        self.require(PropertyClass::FileAccess, "fclose_degree")?;
        let mut degree: c_int = 0;
        h5try!(H5Pget_fclose_degree(self.raw(), &mut degree));
        Ok(H5F_close_degree_t::from_raw(degree).map_or(CloseDegree::Weak, CloseDegree::from_native))
    }

    // Dataset creation

    /// Use chunked storage with the given chunk shape.
    pub fn set_chunk(&self, chunk: &[usize]) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "chunk")?;
        let dims = hsize_dims(chunk);
        h5call!(H5Pset_chunk(self.raw(), dims.len() as c_int, dims.as_ptr())).map(drop)
    }

    /// Chunk shape, or `None` unless the layout is chunked.
    pub fn chunk(&self) -> Result<Option<Vec<usize>>> {
        if self.layout()? != Layout::Chunked {
            return Ok(None);
        }
        let ndims = h5try!(H5Pget_chunk(self.raw(), 0, ptr::null_mut()));
        let mut dims: Vec<hsize_t> = vec![0; ndims as usize];
        h5try!(H5Pget_chunk(self.raw(), ndims, dims.as_mut_ptr()));
        Ok(Some(dims.into_iter().map(|d| d as usize).collect()))
    }

    pub fn set_layout(&self, layout: Layout) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "layout")?;
        h5call!(H5Pset_layout(self.raw(), layout.native())).map(drop)
    }

    pub fn layout(&self) -> Result<Layout> {
        self.require(PropertyClass::DatasetCreate, "layout")?;
        match H5D_layout_t::from_raw(h5try!(H5Pget_layout(self.raw()))) {
            H5D_layout_t::H5D_COMPACT => Ok(Layout::Compact),
            H5D_layout_t::H5D_CONTIGUOUS => Ok(Layout::Contiguous),
            H5D_layout_t::H5D_CHUNKED => Ok(Layout::Chunked),
            other => fail!(Unsupported, "unsupported storage layout: {other:?}"),
        }
    }

    pub fn set_deflate(&self, level: u8) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "deflate")?;
        h5call!(H5Pset_deflate(self.raw(), c_uint::from(level))).map(drop)
    }

    pub fn set_shuffle(&self) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "shuffle")?;
        h5call!(H5Pset_shuffle(self.raw())).map(drop)
    }

    pub fn set_fletcher32(&self) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "fletcher32")?;
        h5call!(H5Pset_fletcher32(self.raw())).map(drop)
    }

    /// The filter pipeline, in application order.
    pub fn filters(&self) -> Result<Vec<Filter>> {
        self.require(PropertyClass::DatasetCreate, "filters")?;
        let n = h5try!(H5Pget_nfilters(self.raw()));
        let mut filters = Vec::with_capacity(n as usize);
        for idx in 0..n as c_uint {
            let mut flags: c_uint = 0;
            let mut cd_values: [c_uint; 16] = [0; 16];
            let mut cd_nelmts: size_t = cd_values.len();
            let mut name: [c_char; 64] = [0; 64];
            let mut config: c_uint = 0;
            let id = h5try!(H5Pget_filter2(
                self.raw(),
                idx,
                &mut flags,
                &mut cd_nelmts,
                cd_values.as_mut_ptr(),
                name.len(),
                name.as_mut_ptr(),
                &mut config,
            ));
            let cd_nelmts = cd_nelmts.min(cd_values.len());
            filters.push(Filter::from_raw(id, &cd_values[..cd_nelmts]));
        }
        Ok(filters)
    }

    pub fn has_filters(&self) -> Result<bool> {
        self.require(PropertyClass::DatasetCreate, "filters")?;
        Ok(h5try!(H5Pget_nfilters(self.raw())) > 0)
    }

    /// Fill value for unwritten elements, stored as the datatype of `T`.
    pub fn set_fill_value<T: H5Type>(&self, value: &T) -> Result<()> {
        self.require(PropertyClass::DatasetCreate, "fill_value")?;
        let dtype = Datatype::of::<T>()?;
        let value: *const T = value;
        h5call!(H5Pset_fill_value(self.raw(), dtype.raw(), value.cast())).map(drop)
    }

    /// The fill value converted to `T`; zero when none was set.
    pub fn fill_value<T: H5Type>(&self) -> Result<T> {
        self.require(PropertyClass::DatasetCreate, "fill_value")?;
        let dtype = Datatype::of::<T>()?;
        let mut value = MaybeUninit::<T>::zeroed();
        h5try!(H5Pget_fill_value(self.raw(), dtype.raw(), value.as_mut_ptr().cast()));
        Ok(unsafe { value.assume_init() })
    }

    // Link creation

    pub fn set_create_intermediate_group(&self, create: bool) -> Result<()> {
        self.require(PropertyClass::LinkCreate, "create_intermediate_group")?;
        h5call!(H5Pset_create_intermediate_group(self.raw(), c_uint::from(create))).map(drop)
    }

    pub fn create_intermediate_group(&self) -> Result<bool> {
        self.require(PropertyClass::LinkCreate, "create_intermediate_group")?;
        let mut create: c_uint = 0;
        h5try!(H5Pget_create_intermediate_group(self.raw(), &mut create));
        Ok(create != 0)
    }

    // Dataset transfer

    pub fn set_buffer_size(&self, size: usize) -> Result<()> {
        self.require(PropertyClass::DatasetTransfer, "buffer_size")?;
        h5call!(H5Pset_buffer(self.raw(), size, ptr::null_mut(), ptr::null_mut())).map(drop)
    }

    pub fn buffer_size(&self) -> Result<usize> {
        self.require(PropertyClass::DatasetTransfer, "buffer_size")?;
        Ok(h5lock!(H5Pget_buffer(self.raw(), ptr::null_mut(), ptr::null_mut())))
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_close_degree_parse() {
        assert_eq!("Strong".parse::<CloseDegree>().unwrap(), CloseDegree::Strong);
        assert_eq!(" semi ".parse::<CloseDegree>().unwrap(), CloseDegree::Semi);
        let err = "never".parse::<CloseDegree>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(CloseDegree::Weak.to_string(), "weak");
    }

    #[test]
    fn test_class_is_recovered() {
        for class in PropertyClass::ALL {
            let plist = PropertyList::new(class).unwrap();
            assert_eq!(plist.class(), class);
            let copy = plist.copy().unwrap();
            assert_eq!(copy.class(), class);
            assert!(!copy.id().same_identity(plist.id()));
            let reopened = PropertyList::from_id(plist.id().clone()).unwrap();
            assert_eq!(reopened.class(), class);
        }
    }

    #[test]
    fn test_wrong_class_option() {
        let fapl = PropertyList::new(PropertyClass::FileAccess).unwrap();
        assert_eq!(fapl.set_chunk(&[4]).unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(fapl.userblock().unwrap_err().kind(), ErrorKind::TypeMismatch);
        let dcpl = PropertyList::new(PropertyClass::DatasetCreate).unwrap();
        assert_eq!(dcpl.fclose_degree().unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert!(dcpl.set_fclose_degree(CloseDegree::Semi).unwrap_err().stack().is_none());
    }

    #[test]
    fn test_defaults() {
        let fcpl = PropertyList::new(PropertyClass::FileCreate).unwrap();
        assert_eq!(fcpl.userblock().unwrap(), 0);
        let lcpl = PropertyList::new(PropertyClass::LinkCreate).unwrap();
        assert!(!lcpl.create_intermediate_group().unwrap());
        let dcpl = PropertyList::new(PropertyClass::DatasetCreate).unwrap();
        assert_eq!(dcpl.layout().unwrap(), Layout::Contiguous);
        assert_eq!(dcpl.chunk().unwrap(), None);
        assert!(!dcpl.has_filters().unwrap());
        assert_eq!(dcpl.fill_value::<i32>().unwrap(), 0);
    }

    #[test]
    fn test_dataset_create_options() {
        let dcpl = PropertyList::new(PropertyClass::DatasetCreate).unwrap();
        dcpl.set_chunk(&[4, 8]).unwrap();
        dcpl.set_shuffle().unwrap();
        dcpl.set_deflate(6).unwrap();
        dcpl.set_fletcher32().unwrap();
        assert_eq!(dcpl.layout().unwrap(), Layout::Chunked);
        assert_eq!(dcpl.chunk().unwrap(), Some(vec![4, 8]));
        assert_eq!(
            dcpl.filters().unwrap(),
            vec![Filter::Shuffle, Filter::Deflate(6), Filter::Fletcher32]
        );
        assert_eq!(dcpl.set_deflate(10).unwrap_err().kind(), ErrorKind::Unsupported);
        dcpl.set_fill_value(&-7_i64).unwrap();
        assert_eq!(dcpl.fill_value::<i64>().unwrap(), -7);
        assert_eq!(dcpl.fill_value::<f64>().unwrap(), -7.0);
    }

    #[test]
    fn test_other_options() {
        let fapl = PropertyList::new(PropertyClass::FileAccess).unwrap();
        fapl.set_fclose_degree(CloseDegree::Semi).unwrap();
        assert_eq!(fapl.fclose_degree().unwrap(), CloseDegree::Semi);
        let fcpl = PropertyList::new(PropertyClass::FileCreate).unwrap();
        fcpl.set_userblock(1024).unwrap();
        assert_eq!(fcpl.userblock().unwrap(), 1024);
        assert_eq!(fcpl.set_userblock(100).unwrap_err().kind(), ErrorKind::Unsupported);
        let lcpl = PropertyList::new(PropertyClass::LinkCreate).unwrap();
        lcpl.set_create_intermediate_group(true).unwrap();
        assert!(lcpl.create_intermediate_group().unwrap());
        let dxpl = PropertyList::new(PropertyClass::DatasetTransfer).unwrap();
        dxpl.set_buffer_size(4096).unwrap();
        assert_eq!(dxpl.buffer_size().unwrap(), 4096);
    }
}
