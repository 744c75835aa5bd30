//! HDF5 Dataset handle, creation builder and element I/O.

use std::fmt;

use crate::class::ObjectClass;
use crate::dim::Dimension;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::hl::container::{self, ensure_no_vlen_sequence, ensure_strings_fit, Container};
use crate::hl::dataspace::{Dataspace, Selection};
use crate::hl::datatype::Datatype;
use crate::hl::group::Group;
use crate::hl::identifier;
use crate::hl::location::Location;
use crate::hl::plist::{Layout, PropertyClass, PropertyList};
use crate::sys::{
    c_void, hid_t, H5Dcreate2, H5Dget_create_plist, H5Dget_space, H5Dget_storage_size,
    H5Dget_type, H5Dopen2, H5Dread, H5Dset_extent, H5Dwrite, H5P_DEFAULT, H5S_ALL,
};
use crate::types::H5Type;
use crate::util::{hsize_dims, to_cstring};

/// An HDF5 dataset.
#[derive(Clone)]
pub struct Dataset {
    id: ObjectId,
    file: ObjectId,
}

impl ObjectClass for Dataset {
    const NAME: &'static str = "dataset";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::Dataset];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        let file = identifier::file_handle(&id)?;
        Ok(Self { id, file })
    }

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn short_repr(&self) -> Option<String> {
        let shape = self.shape().ok()?;
        let shape = match shape.as_slice() {
            [n] => format!("({n},)"),
            dims => format!("({})", dims.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")),
        };
        let typestr = self.dtype().and_then(|dtype| dtype.to_descriptor()).ok()?.typestr();
        let name = self.name().ok().filter(|name| !name.is_empty());
        Some(match name {
            Some(name) => format!("{name:?}: shape {shape}, type {typestr:?}"),
            None => format!("anonymous, shape {shape}, type {typestr:?}"),
        })
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl Container for Dataset {
    fn stored_space(&self) -> Result<Dataspace> {
        self.space()
    }

    fn stored_type(&self) -> Result<Datatype> {
        self.dtype()
    }

    unsafe fn read_into(&self, mem_type: &Datatype, buf: *mut c_void) -> Result<()> {
        h5call!(H5Dread(self.raw(), mem_type.raw(), H5S_ALL, H5S_ALL, H5P_DEFAULT, buf)).map(drop)
    }

    unsafe fn write_from(&self, mem_type: &Datatype, buf: *const c_void) -> Result<()> {
        h5call!(H5Dwrite(self.raw(), mem_type.raw(), H5S_ALL, H5S_ALL, H5P_DEFAULT, buf)).map(drop)
    }
}

impl Dataset {
    pub(crate) fn from_parts(id: ObjectId, file: ObjectId) -> Self {
        Self { id, file }
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.id.raw()
    }

    pub(crate) fn file_handle(&self) -> &ObjectId {
        &self.file
    }

    /// Create a dataset named `name` under `parent`.
    ///
    /// `dcpl`, when given, must be a dataset creation list.
    pub fn create(
        parent: &Group,
        name: &str,
        dtype: &Datatype,
        space: &Dataspace,
        dcpl: Option<&PropertyList>,
    ) -> Result<Self> {
        let chunked = match dcpl {
            Some(dcpl) => {
                ensure!(
                    dcpl.class() == PropertyClass::DatasetCreate,
                    TypeMismatch,
                    "expected a dataset create list, got a {} list",
                    dcpl.class()
                );
                dcpl.layout()? == Layout::Chunked
            }
            None => false,
        };
        ensure!(
            chunked || !space.is_resizable(),
            Unsupported,
            "dataset {name:?}: a resizable dataspace needs a chunked layout"
        );
        parent.ensure_free(name, false)?;
        let c_name = to_cstring(name)?;
        let dcpl = dcpl.map_or(H5P_DEFAULT, PropertyList::raw);
        let id = h5try!(H5Dcreate2(
            parent.raw(),
            c_name.as_ptr(),
            dtype.raw(),
            space.raw(),
            H5P_DEFAULT,
            dcpl,
            H5P_DEFAULT
        ));
        let (id, file) = parent.adopt(IdKind::Dataset, id)?;
        tracing::debug!(name, "created dataset");
        Ok(Self { id, file })
    }

    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        parent.ensure_bound(name)?;
        let c_name = to_cstring(name)?;
        let id = h5try!(H5Dopen2(parent.raw(), c_name.as_ptr(), H5P_DEFAULT));
        let (id, file) = parent.adopt(IdKind::Dataset, id)?;
        Ok(Self { id, file })
    }

    /// A fresh copy of the dataset's dataspace, with everything selected.
    pub fn space(&self) -> Result<Dataspace> {
        self.id.ensure_valid()?;
        Dataspace::from_raw(h5try!(H5Dget_space(self.raw())))
    }

    pub fn dtype(&self) -> Result<Datatype> {
        self.id.ensure_valid()?;
        Datatype::from_raw(h5try!(H5Dget_type(self.raw())))
    }

    pub fn shape(&self) -> Result<Vec<usize>> {
        self.space()?.dims()
    }

    pub fn max_shape(&self) -> Result<Vec<Option<usize>>> {
        self.space()?.max_dims()
    }

    pub fn ndim(&self) -> Result<usize> {
        self.space()?.ndim()
    }

    /// Number of elements.
    pub fn size(&self) -> Result<usize> {
        self.space()?.size()
    }

    pub fn create_plist(&self) -> Result<PropertyList> {
        self.id.ensure_valid()?;
        PropertyList::from_raw(h5try!(H5Dget_create_plist(self.raw())))
    }

    /// Bytes allocated in the file for raw data.
    pub fn storage_size(&self) -> Result<u64> {
        self.id.ensure_valid()?;
        Ok(h5lock!(H5Dget_storage_size(self.raw())))
    }

    pub fn read<T: H5Type>(&self) -> Result<Vec<T>> {
        container::read_vec(self)
    }

    /// The only element of a scalar or single-element dataset.
    pub fn read_scalar<T: H5Type>(&self) -> Result<T> {
        container::read_scalar(self)
    }

    /// Write every element; `data` must have exactly `size()` elements.
    pub fn write<T: H5Type>(&self, data: &[T]) -> Result<()> {
        container::write_slice(self, data)
    }

    pub fn write_scalar<T: H5Type>(&self, value: &T) -> Result<()> {
        container::write_slice(self, std::slice::from_ref(value))
    }

    /// Read every element of a fixed or variable-length string dataset.
    pub fn read_strings(&self) -> Result<Vec<String>> {
        container::read_strings(self)
    }

    pub fn write_strings<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        container::write_strings(self, values)
    }

    /// File dataspace with `selection` applied, checked against the extent.
    fn selected_space(&self, selection: &Selection) -> Result<Dataspace> {
        let space = self.space()?;
        space.select(selection)?;
        ensure!(space.selection_valid()?, Unsupported, "selection lies outside the extent");
        Ok(space)
    }

    /// Read the selected elements in row-major order (points in the given order).
    pub fn read_selection<T: H5Type>(&self, selection: &Selection) -> Result<Vec<T>> {
        let desc = T::type_descriptor();
        ensure_no_vlen_sequence(&desc)?;
        let file_space = self.selected_space(selection)?;
        let n = file_space.selection_size()?;
        let mut buf: Vec<T> = Vec::with_capacity(n);
        if n == 0 {
            return Ok(buf);
        }
        let mem_type = Datatype::from_descriptor(&desc)?;
        let mem_space = Dataspace::new([n])?;
        tracing::trace!(id = self.raw(), elements = n, "read selection");
        let ptr = buf.as_mut_ptr().cast::<c_void>();
        h5try!(H5Dread(self.raw(), mem_type.raw(), mem_space.raw(), file_space.raw(), H5P_DEFAULT, ptr));
        unsafe { buf.set_len(n) };
        Ok(buf)
    }

    pub fn write_selection<T: H5Type>(&self, data: &[T], selection: &Selection) -> Result<()> {
        let desc = T::type_descriptor();
        ensure_no_vlen_sequence(&desc)?;
        let file_space = self.selected_space(selection)?;
        let n = file_space.selection_size()?;
        ensure!(data.len() == n, TypeMismatch, "selection has {n} elements, got {}", data.len());
        if n == 0 {
            return Ok(());
        }
        ensure_strings_fit(data, &self.dtype()?)?;
        let mem_type = Datatype::from_descriptor(&desc)?;
        let mem_space = Dataspace::new([n])?;
        tracing::trace!(id = self.raw(), elements = n, "write selection");
        let ptr = data.as_ptr().cast::<c_void>();
        h5call!(H5Dwrite(self.raw(), mem_type.raw(), mem_space.raw(), file_space.raw(), H5P_DEFAULT, ptr))
            .map(drop)
    }

    /// Element count of a raw transfer plus the memory and file spaces to pass.
    fn raw_spaces(
        &self,
        mem_type: &Datatype,
        mem_space: Option<&Dataspace>,
        file_space: Option<&Dataspace>,
        buf_len: usize,
    ) -> Result<(Option<Dataspace>, hid_t)> {
        self.id.ensure_valid()?;
        ensure!(
            !mem_type.to_descriptor()?.is_variable_len(),
            Unsupported,
            "raw transfers of variable-length data are not supported"
        );
        for space in mem_space.iter().chain(file_space.iter()) {
            ensure!(space.selection_valid()?, Unsupported, "selection lies outside the extent");
        }
        let n = match (mem_space, file_space) {
            (Some(space), _) | (None, Some(space)) => space.selection_size()?,
            (None, None) => self.size()?,
        };
        let expected = n * mem_type.size()?;
        ensure!(buf_len == expected, TypeMismatch, "buffer holds {buf_len} bytes, expected {expected}");
        // A file selection without a memory space reads into a packed 1-D buffer.
        let packed = match (mem_space, file_space) {
            (None, Some(_)) => Some(Dataspace::new([n])?),
            _ => None,
        };
        Ok((packed, file_space.map_or(H5S_ALL, Dataspace::raw)))
    }

    /// Read into an untyped buffer laid out as `mem_type`.
    ///
    /// `buf` must hold exactly one `mem_type` element per selected element.
    pub fn read_raw(
        &self,
        mem_type: &Datatype,
        mem_space: Option<&Dataspace>,
        file_space: Option<&Dataspace>,
        buf: &mut [u8],
    ) -> Result<()> {
        let (packed, file) = self.raw_spaces(mem_type, mem_space, file_space, buf.len())?;
        let mem = packed.as_ref().or(mem_space).map_or(H5S_ALL, Dataspace::raw);
        let ptr = buf.as_mut_ptr().cast::<c_void>();
        h5call!(H5Dread(self.raw(), mem_type.raw(), mem, file, H5P_DEFAULT, ptr)).map(drop)
    }

    pub fn write_raw(
        &self,
        mem_type: &Datatype,
        mem_space: Option<&Dataspace>,
        file_space: Option<&Dataspace>,
        buf: &[u8],
    ) -> Result<()> {
        let (packed, file) = self.raw_spaces(mem_type, mem_space, file_space, buf.len())?;
        let mem = packed.as_ref().or(mem_space).map_or(H5S_ALL, Dataspace::raw);
        let ptr = buf.as_ptr().cast::<c_void>();
        h5call!(H5Dwrite(self.raw(), mem_type.raw(), mem, file, H5P_DEFAULT, ptr)).map(drop)
    }

    /// Change the extent of a chunked dataset; new elements take the fill value.
    pub fn resize<D: Dimension>(&self, shape: D) -> Result<()> {
        let space = self.space()?;
        let dims = shape.dims();
        let ndim = space.ndim()?;
        ensure!(dims.len() == ndim, Unsupported, "cannot change rank from {ndim} to {}", dims.len());
        ensure!(
            self.create_plist()?.layout()? == Layout::Chunked,
            Unsupported,
            "only chunked datasets can be resized"
        );
        for (axis, (&d, max)) in dims.iter().zip(space.max_dims()?).enumerate() {
            ensure!(
                max.map_or(true, |max| d <= max),
                Unsupported,
                "extent {d} exceeds the maximum {max:?} on axis {axis}"
            );
        }
        let dims = hsize_dims(&dims);
        h5call!(H5Dset_extent(self.raw(), dims.as_ptr())).map(drop)
    }
}

/// Builder for a dataset holding elements of `T`.
///
/// Resizable or filtered datasets are chunked; without an explicit chunk shape the
/// whole extent is one chunk.
#[derive(Clone)]
pub struct DatasetBuilder<T: H5Type> {
    parent: Group,
    shape: Vec<usize>,
    max_shape: Option<Vec<Option<usize>>>,
    chunk: Option<Vec<usize>>,
    deflate: Option<u8>,
    shuffle: bool,
    fletcher32: bool,
    fill_value: Option<T>,
}

impl<T: H5Type> DatasetBuilder<T> {
    pub(crate) fn new(parent: Group) -> Self {
        Self {
            parent,
            shape: Vec::new(),
            max_shape: None,
            chunk: None,
            deflate: None,
            shuffle: false,
            fletcher32: false,
            fill_value: None,
        }
    }

    pub fn shape<D: Dimension>(mut self, shape: D) -> Self {
        self.shape = shape.dims();
        self
    }

    /// Make every axis unlimited (or fixed again with `false`).
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.max_shape = resizable.then(|| vec![None; self.shape.len()]);
        self
    }

    pub fn max_shape(mut self, max: &[Option<usize>]) -> Self {
        self.max_shape = Some(max.to_vec());
        self
    }

    pub fn chunk<D: Dimension>(mut self, chunk: D) -> Self {
        self.chunk = Some(chunk.dims());
        self
    }

    pub fn deflate(mut self, level: u8) -> Self {
        self.deflate = Some(level);
        self
    }

    pub fn shuffle(mut self) -> Self {
        self.shuffle = true;
        self
    }

    pub fn fletcher32(mut self) -> Self {
        self.fletcher32 = true;
        self
    }

    pub fn fill_value(mut self, value: T) -> Self {
        self.fill_value = Some(value);
        self
    }

    fn is_filtered(&self) -> bool {
        self.deflate.is_some() || self.shuffle || self.fletcher32
    }

    fn create_plist(&self) -> Result<PropertyList> {
        let dcpl = PropertyList::new(PropertyClass::DatasetCreate)?;
        let chunk = match &self.chunk {
            Some(chunk) => Some(chunk.clone()),
            None if self.max_shape.is_some() || self.is_filtered() => {
                Some(self.shape.iter().map(|&d| d.max(1)).collect())
            }
            None => None,
        };
        if let Some(chunk) = chunk {
            dcpl.set_chunk(&chunk)?;
        }
        if self.shuffle {
            dcpl.set_shuffle()?;
        }
        if let Some(level) = self.deflate {
            dcpl.set_deflate(level)?;
        }
        if self.fletcher32 {
            dcpl.set_fletcher32()?;
        }
        if let Some(value) = &self.fill_value {
            dcpl.set_fill_value(value)?;
        }
        Ok(dcpl)
    }

    pub fn create(&self, name: &str) -> Result<Dataset> {
        let desc = T::type_descriptor();
        ensure_no_vlen_sequence(&desc)?;
        let dtype = Datatype::from_descriptor(&desc)?;
        let space = match &self.max_shape {
            Some(max) => Dataspace::resizable(&self.shape, max)?,
            None => Dataspace::new(&self.shape)?,
        };
        let dcpl = self.create_plist()?;
        Dataset::create(&self.parent, name, &dtype, &space, Some(&dcpl))
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hl::dataspace::Hyperslab;
    use crate::hl::file::File;
    use crate::hl::filters::Filter;
    use crate::types::{FixedAscii, StringEncoding, StringPadding, TypeDescriptor};

    fn scratch(name: &str) -> (tempfile::TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join(name)).unwrap();
        (dir, file)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (_dir, file) = scratch("rw.h5");
        let g = file.create_group("g").unwrap();
        let d = g.new_dataset::<i32>().shape([10]).create("d").unwrap();
        d.write(&(0..10).collect::<Vec<i32>>()).unwrap();
        assert_eq!(d.read::<i32>().unwrap(), (0..10).collect::<Vec<_>>());
        assert_eq!(d.read::<f64>().unwrap()[9], 9.0);
        assert_eq!(format!("{d:?}"), "<HDF5 dataset: \"/g/d\": shape (10,), type \"<i4\">");
        d.close().unwrap();
        g.close().unwrap();
        file.close().unwrap();
    }

    #[test]
    fn test_length_and_scalar_checks() {
        let (_dir, file) = scratch("len.h5");
        let d = file.new_dataset::<u8>().shape([3]).create("d").unwrap();
        assert_eq!(d.write(&[1_u8, 2]).unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(d.read_scalar::<u8>().unwrap_err().kind(), ErrorKind::TypeMismatch);
        let s = file.new_dataset::<f64>().shape(()).create("s").unwrap();
        s.write_scalar(&2.5).unwrap();
        assert_eq!(s.read_scalar::<f64>().unwrap(), 2.5);
        assert_eq!(file.new_dataset::<u8>().create("d").unwrap_err().kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_hyperslab_selection_is_row_major() {
        let (_dir, file) = scratch("sel.h5");
        let d = file.new_dataset::<i64>().shape([4, 5]).create("grid").unwrap();
        d.write(&(0..20).collect::<Vec<i64>>()).unwrap();
        let slab = Hyperslab::new(&[1, 0], &[2, 3]).with_stride(&[2, 2]);
        assert_eq!(d.read_selection::<i64>(&slab.into()).unwrap(), [5, 7, 9, 15, 17, 19]);
        let points = Selection::Points(vec![vec![3, 4], vec![0, 0]]);
        d.write_selection(&[-1_i64, -2], &points).unwrap();
        assert_eq!(d.read_selection::<i64>(&points).unwrap(), [-1, -2]);
        let outside = Selection::from(Hyperslab::new(&[3, 3], &[2, 2]));
        assert_eq!(d.read_selection::<i64>(&outside).unwrap_err().kind(), ErrorKind::Unsupported);
        assert!(d.read_selection::<i64>(&Selection::None).unwrap().is_empty());
    }

    #[test]
    fn test_resize_respects_max_shape() {
        let (_dir, file) = scratch("resize.h5");
        let d = file
            .new_dataset::<u16>()
            .shape([2])
            .max_shape(&[Some(4)])
            .fill_value(7)
            .create("d")
            .unwrap();
        d.write(&[1_u16, 2]).unwrap();
        d.resize([4]).unwrap();
        assert_eq!(d.read::<u16>().unwrap(), [1, 2, 7, 7]);
        assert_eq!(d.resize([5]).unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(d.resize([2, 2]).unwrap_err().kind(), ErrorKind::Unsupported);
        d.resize([1]).unwrap();
        assert_eq!(d.read::<u16>().unwrap(), [1]);
        let fixed = file.new_dataset::<u16>().shape([2]).create("fixed").unwrap();
        assert_eq!(fixed.resize([1]).unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_builder_filters() {
        let (_dir, file) = scratch("filters.h5");
        let d = file.new_dataset::<f32>().shape([8]).deflate(4).shuffle().create("z").unwrap();
        let dcpl = d.create_plist().unwrap();
        assert_eq!(dcpl.layout().unwrap(), Layout::Chunked);
        assert_eq!(dcpl.chunk().unwrap(), Some(vec![8]));
        assert_eq!(dcpl.filters().unwrap(), [Filter::Shuffle, Filter::Deflate(4)]);
        assert!(d.storage_size().unwrap() > 0);
    }

    #[test]
    fn test_fixed_strings() {
        let (_dir, file) = scratch("fixed.h5");
        let d = file.new_dataset::<FixedAscii<4>>().shape([2]).create("s").unwrap();
        d.write_strings(&["ab", "wxyz"]).unwrap();
        assert_eq!(d.read_strings().unwrap(), ["ab", "wxyz"]);
        assert_eq!(d.write_strings(&["toolong", "x"]).unwrap_err().kind(), ErrorKind::StringTooLong);
        assert_eq!(d.write_strings(&["é", "x"]).unwrap_err().kind(), ErrorKind::TypeMismatch);
        let ints = file.new_dataset::<i32>().shape([2]).create("i").unwrap();
        assert_eq!(ints.read_strings().unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_typed_string_writes_never_truncate() {
        let (_dir, file) = scratch("narrow.h5");
        let d = file.new_dataset::<FixedAscii<4>>().shape([2]).create("s").unwrap();
        let long = FixedAscii::<8>::from_ascii("abcdefg").unwrap();
        let short = FixedAscii::<8>::from_ascii("ab").unwrap();
        let err = d.write(&[short, long]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
        let points = Selection::Points(vec![vec![1]]);
        let err = d.write_selection(&[long], &points).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
        assert_eq!(d.read_strings().unwrap(), ["", ""]);

        let fits = FixedAscii::<8>::from_ascii("wxyz").unwrap();
        d.write(&[short, fits]).unwrap();
        assert_eq!(d.read_strings().unwrap(), ["ab", "wxyz"]);

        let pairs = file.new_dataset::<[FixedAscii<4>; 2]>().shape([1]).create("pairs").unwrap();
        let err = pairs.write(&[[short, long]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
    }

    #[test]
    fn test_variable_length_strings() {
        let (_dir, file) = scratch("vlen.h5");
        let dtype =
            Datatype::from_descriptor(&TypeDescriptor::VarLenString { encoding: StringEncoding::Utf8 })
                .unwrap();
        let d = file.create_dataset("v", &dtype, &Dataspace::new([3]).unwrap(), None).unwrap();
        d.write_strings(&["", "héllo", "a much longer value"]).unwrap();
        assert_eq!(d.read_strings().unwrap(), ["", "héllo", "a much longer value"]);
        let fixed = Datatype::from_descriptor(&TypeDescriptor::FixedString {
            size: 8,
            encoding: StringEncoding::Utf8,
            padding: StringPadding::NullPad,
        })
        .unwrap();
        let mut buf = vec![0_u8; 24];
        let err = d.read_raw(&fixed, None, None, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_raw_io() {
        let (_dir, file) = scratch("raw.h5");
        let d = file.new_dataset::<u8>().shape([6]).create("r").unwrap();
        let dtype = Datatype::of::<u8>().unwrap();
        d.write_raw(&dtype, None, None, &[1, 2, 3, 4, 5, 6]).unwrap();
        let file_space = d.space().unwrap();
        file_space.select(&Hyperslab::new(&[2], &[3]).into()).unwrap();
        let mut buf = [0_u8; 3];
        d.read_raw(&dtype, None, Some(&file_space), &mut buf).unwrap();
        assert_eq!(buf, [3, 4, 5]);
        let mut short = [0_u8; 2];
        let err = d.read_raw(&dtype, None, Some(&file_space), &mut short).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_read_after_strong_close() {
        let (_dir, file) = scratch("closed.h5");
        let d = file.new_dataset::<i32>().shape([1]).create("d").unwrap();
        file.close().unwrap();
        assert_eq!(d.read::<i32>().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(format!("{d:?}"), "<HDF5 dataset: invalid id>");
    }
}
