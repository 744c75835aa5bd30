//! HDF5 Attribute handle.

use std::fmt;
use std::marker::PhantomData;

use crate::class::ObjectClass;
use crate::dim::Dimension;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::hl::container::{self, ensure_no_vlen_sequence, Container};
use crate::hl::dataspace::Dataspace;
use crate::hl::datatype::Datatype;
use crate::hl::identifier;
use crate::hl::location::Location;
use crate::sys::{
    c_char, c_void, hid_t, hsize_t, H5Acreate2, H5Aexists, H5Aget_name, H5Aget_space, H5Aget_type,
    H5Aopen, H5Aopen_by_idx, H5Aread, H5Awrite, H5_index_t, H5_iter_order_t, H5P_DEFAULT,
};
use crate::types::H5Type;
use crate::util::{get_h5_str, to_cstring};

/// An attribute attached to a file, group or dataset.
#[derive(Clone)]
pub struct Attribute {
    id: ObjectId,
    /// Keeps the file open for as long as the attribute is.
    file: ObjectId,
}

impl ObjectClass for Attribute {
    const NAME: &'static str = "attribute";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::Attribute];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        let file = identifier::file_handle(&id)?;
        Ok(Self { id, file })
    }

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn short_repr(&self) -> Option<String> {
        let shape = self.shape().ok()?;
        Some(format!("{:?}: shape {shape:?}", self.name().ok()?))
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl Container for Attribute {
    fn stored_space(&self) -> Result<Dataspace> {
        self.space()
    }

    fn stored_type(&self) -> Result<Datatype> {
        self.dtype()
    }

    unsafe fn read_into(&self, mem_type: &Datatype, buf: *mut c_void) -> Result<()> {
        h5call!(H5Aread(self.raw(), mem_type.raw(), buf)).map(drop)
    }

    unsafe fn write_from(&self, mem_type: &Datatype, buf: *const c_void) -> Result<()> {
        h5call!(H5Awrite(self.raw(), mem_type.raw(), buf)).map(drop)
    }
}

fn attr_exists(owner: hid_t, name: &str) -> Result<bool> {
    let c_name = to_cstring(name)?;
    Ok(h5try!(H5Aexists(owner, c_name.as_ptr())) > 0)
}

impl Attribute {
    fn adopt(raw: hid_t, file: &ObjectId) -> Result<Self> {
        let id = ObjectId::from_owned(IdKind::Attribute, raw)?;
        let file = if file.is_closed() { identifier::file_handle(&id)? } else { file.clone() };
        Ok(Self { id, file })
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.id.raw()
    }

    fn create_on(
        owner: &ObjectId,
        file: &ObjectId,
        name: &str,
        dtype: &Datatype,
        space: &Dataspace,
    ) -> Result<Self> {
        owner.ensure_valid()?;
        ensure!(!name.is_empty(), Unsupported, "attribute name must not be empty");
        ensure!(!attr_exists(owner.raw(), name)?, AlreadyExists, "attribute {name:?} already exists");
        let c_name = to_cstring(name)?;
        let id = h5try!(H5Acreate2(
            owner.raw(),
            c_name.as_ptr(),
            dtype.raw(),
            space.raw(),
            H5P_DEFAULT,
            H5P_DEFAULT
        ));
        tracing::trace!(name, "created attribute");
        Self::adopt(id, file)
    }

    pub fn create<L: Location>(
        owner: &L,
        name: &str,
        dtype: &Datatype,
        space: &Dataspace,
    ) -> Result<Self> {
        Self::create_on(owner.id(), owner.file_id(), name, dtype, space)
    }

    pub fn open<L: Location>(owner: &L, name: &str) -> Result<Self> {
        owner.id().ensure_valid()?;
        ensure!(attr_exists(owner.id().raw(), name)?, NotFound, "attribute {name:?} does not exist");
        let c_name = to_cstring(name)?;
        let id = h5try!(H5Aopen(owner.id().raw(), c_name.as_ptr(), H5P_DEFAULT));
        Self::adopt(id, owner.file_id())
    }

    /// Open the `idx`-th attribute in name order.
    pub fn open_by_idx<L: Location>(owner: &L, idx: usize) -> Result<Self> {
        let count = owner.num_attrs()?;
        ensure!(idx < count, NotFound, "attribute index {idx} out of range ({count} attributes)");
        let here = to_cstring(".")?;
        let id = h5try!(H5Aopen_by_idx(
            owner.id().raw(),
            here.as_ptr(),
            H5_index_t::H5_INDEX_NAME,
            H5_iter_order_t::H5_ITER_INC,
            idx as hsize_t,
            H5P_DEFAULT,
            H5P_DEFAULT
        ));
        Self::adopt(id, owner.file_id())
    }

    pub fn name(&self) -> Result<String> {
        self.id.ensure_valid()?;
        let raw = self.raw();
        h5lock!(get_h5_str(|buf: *mut c_char, size| H5Aget_name(raw, size, buf)))
    }

    pub fn space(&self) -> Result<Dataspace> {
        self.id.ensure_valid()?;
        Dataspace::from_raw(h5try!(H5Aget_space(self.raw())))
    }

    pub fn dtype(&self) -> Result<Datatype> {
        self.id.ensure_valid()?;
        Datatype::from_raw(h5try!(H5Aget_type(self.raw())))
    }

    pub fn shape(&self) -> Result<Vec<usize>> {
        self.space()?.dims()
    }

    pub fn read<T: H5Type>(&self) -> Result<Vec<T>> {
        container::read_vec(self)
    }

    pub fn read_scalar<T: H5Type>(&self) -> Result<T> {
        container::read_scalar(self)
    }

    pub fn write<T: H5Type>(&self, data: &[T]) -> Result<()> {
        container::write_slice(self, data)
    }

    pub fn write_scalar<T: H5Type>(&self, value: &T) -> Result<()> {
        container::write_slice(self, std::slice::from_ref(value))
    }

    pub fn read_strings(&self) -> Result<Vec<String>> {
        container::read_strings(self)
    }

    pub fn write_strings<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        container::write_strings(self, values)
    }
}

/// Builder for an attribute holding elements of `T`; scalar unless a shape is given.
pub struct AttributeBuilder<T: H5Type> {
    owner: ObjectId,
    file: ObjectId,
    shape: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: H5Type> AttributeBuilder<T> {
    pub(crate) fn new(owner: ObjectId, file: ObjectId) -> Self {
        Self { owner, file, shape: Vec::new(), _marker: PhantomData }
    }

    pub fn shape<D: Dimension>(mut self, shape: D) -> Self {
        self.shape = shape.dims();
        self
    }

    pub fn create(&self, name: &str) -> Result<Attribute> {
        let desc = T::type_descriptor();
        ensure_no_vlen_sequence(&desc)?;
        let dtype = Datatype::from_descriptor(&desc)?;
        let space = Dataspace::new(&self.shape)?;
        Attribute::create_on(&self.owner, &self.file, name, &dtype, &space)
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hl::file::File;
    use crate::types::{FixedUnicode, StringEncoding, TypeDescriptor};

    #[test]
    fn test_attribute_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("attrs.h5")).unwrap();
        let g = file.create_group("g").unwrap();
        let units = g.new_attr::<f64>().shape([2]).create("range").unwrap();
        units.write(&[0.5, 1.5]).unwrap();
        g.new_attr::<i32>().create("count").unwrap().write_scalar(&3).unwrap();
        assert_eq!(g.attr("range").unwrap().read::<f64>().unwrap(), [0.5, 1.5]);
        assert_eq!(g.attr("count").unwrap().read_scalar::<i32>().unwrap(), 3);
        assert_eq!(g.attr_names().unwrap(), ["count", "range"]);
        assert_eq!(format!("{units:?}"), "<HDF5 attribute: \"range\": shape [2]>");

        let err = g.new_attr::<u8>().create("count").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(g.attr("missing").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(Attribute::open_by_idx(&g, 2).unwrap_err().kind(), ErrorKind::NotFound);

        g.delete_attr("count").unwrap();
        assert!(!g.attr_exists("count").unwrap());
        assert_eq!(g.delete_attr("count").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(g.num_attrs().unwrap(), 1);
    }

    #[test]
    fn test_string_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("sattrs.h5")).unwrap();
        let fixed = file.new_attr::<FixedUnicode<8>>().create("title").unwrap();
        fixed.write_strings(&["naïve"]).unwrap();
        assert_eq!(fixed.read_strings().unwrap(), ["naïve"]);
        let vlen = TypeDescriptor::VarLenString { encoding: StringEncoding::Ascii };
        let dtype = Datatype::from_descriptor(&vlen).unwrap();
        let space = Dataspace::new([2]).unwrap();
        let tags = Attribute::create(&file, "tags", &dtype, &space).unwrap();
        tags.write_strings(&["a", "bc"]).unwrap();
        assert_eq!(tags.read_strings().unwrap(), ["a", "bc"]);
        assert_eq!(tags.write_strings(&["ü", "x"]).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_typed_string_attribute_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("narrow-attr.h5")).unwrap();
        let label = file.new_attr::<FixedUnicode<4>>().create("label").unwrap();
        let wide: FixedUnicode<16> = "naïve".parse().unwrap();
        assert_eq!(label.write_scalar(&wide).unwrap_err().kind(), ErrorKind::StringTooLong);
        let fits: FixedUnicode<16> = "ñu".parse().unwrap();
        label.write_scalar(&fits).unwrap();
        assert_eq!(label.read_strings().unwrap(), ["ñu"]);
    }
}
