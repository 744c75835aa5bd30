//! HDF5 Dataspace handle and selections.

use std::fmt;
use std::ptr;

use crate::class::ObjectClass;
use crate::dim::Dimension;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::sys::{
    c_int, hid_t, hsize_t, H5S_class_t, H5S_seloper_t, H5Scopy, H5Screate, H5Screate_simple,
    H5Sget_select_bounds, H5Sget_select_npoints, H5Sget_simple_extent_dims,
    H5Sget_simple_extent_ndims, H5Sget_simple_extent_npoints, H5Sget_simple_extent_type,
    H5Sselect_all, H5Sselect_elements, H5Sselect_hyperslab, H5Sselect_none, H5Sselect_valid,
    H5Sset_extent_simple, H5S_UNLIMITED,
};
use crate::util::{hsize_dims, usize_dims};

/// How a new hyperslab combines with the current selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectOp {
    /// Replace the current selection.
    #[default]
    Set,
    Or,
    And,
    Xor,
    /// Current selection minus the new one.
    NotB,
    /// New selection minus the current one.
    NotA,
}

impl SelectOp {
    fn native(self) -> H5S_seloper_t {
        match self {
            SelectOp::Set => H5S_seloper_t::H5S_SELECT_SET,
            SelectOp::Or => H5S_seloper_t::H5S_SELECT_OR,
            SelectOp::And => H5S_seloper_t::H5S_SELECT_AND,
            SelectOp::Xor => H5S_seloper_t::H5S_SELECT_XOR,
            SelectOp::NotB => H5S_seloper_t::H5S_SELECT_NOTB,
            SelectOp::NotA => H5S_seloper_t::H5S_SELECT_NOTA,
        }
    }
}

/// A regular pattern of blocks: along each axis, `count` blocks of `block` elements,
/// the first at `start` and each next one `stride` further.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hyperslab {
    pub start: Vec<usize>,
    pub stride: Vec<usize>,
    pub count: Vec<usize>,
    pub block: Vec<usize>,
}

impl Hyperslab {
    /// `count` contiguous elements from `start` along each axis.
    pub fn new(start: &[usize], count: &[usize]) -> Self {
        let ones = vec![1; start.len()];
        Self { start: start.to_vec(), stride: ones.clone(), count: count.to_vec(), block: ones }
    }

    pub fn with_stride(mut self, stride: &[usize]) -> Self {
        self.stride = stride.to_vec();
        self
    }

    pub fn with_block(mut self, block: &[usize]) -> Self {
        self.block = block.to_vec();
        self
    }

    pub fn ndim(&self) -> usize {
        self.start.len()
    }

    /// Number of selected elements, saturating at `usize::MAX`.
    pub fn size(&self) -> usize {
        self.count
            .iter()
            .zip(&self.block)
            .fold(1_usize, |acc, (c, b)| acc.saturating_mul(c.saturating_mul(*b)))
    }

    fn validate(&self, dims: &[usize]) -> Result<()> {
        let rank = dims.len();
        ensure!(
            [&self.start, &self.stride, &self.count, &self.block].iter().all(|v| v.len() == rank),
            Unsupported,
            "hyperslab rank does not match the dataspace rank {rank}"
        );
        for axis in 0..rank {
            let (start, stride, count, block) =
                (self.start[axis], self.stride[axis], self.count[axis], self.block[axis]);
            if count == 0 || block == 0 {
                continue;
            }
            ensure!(stride > 0, Unsupported, "hyperslab stride must be positive (axis {axis})");
            ensure!(
                count == 1 || stride >= block,
                Unsupported,
                "hyperslab blocks overlap on axis {axis}"
            );
            let last = (count - 1)
                .checked_mul(stride)
                .and_then(|x| x.checked_add(start))
                .and_then(|x| x.checked_add(block - 1));
            ensure!(
                last.is_some_and(|last| last < dims[axis]),
                Unsupported,
                "hyperslab reaches outside the extent on axis {axis} (extent {})",
                dims[axis]
            );
        }
        Ok(())
    }
}

/// Elements of a dataspace taking part in I/O.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    None,
    /// Union of the given hyperslabs.
    Hyperslab(Vec<Hyperslab>),
    /// Individual coordinates, in transfer order.
    Points(Vec<Vec<usize>>),
}

impl From<Hyperslab> for Selection {
    fn from(slab: Hyperslab) -> Self {
        Selection::Hyperslab(vec![slab])
    }
}

/// An HDF5 dataspace: an extent plus a selection.
#[derive(Clone)]
pub struct Dataspace(ObjectId);

impl ObjectClass for Dataspace {
    const NAME: &'static str = "dataspace";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::Dataspace];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        Ok(Self(id))
    }

    fn id(&self) -> &ObjectId {
        &self.0
    }

    fn short_repr(&self) -> Option<String> {
        if self.is_null() {
            return Some("null".into());
        }
        if self.is_scalar() {
            return Some("scalar".into());
        }
        let dims = self.dims().ok()?;
        let max = self.max_dims().ok()?;
        let parts: Vec<String> = dims
            .iter()
            .zip(max)
            .map(|(d, m)| match m {
                Some(m) if m == *d => d.to_string(),
                Some(m) => format!("{d}/{m}"),
                None => format!("{d}/inf"),
            })
            .collect();
        Some(format!("({})", parts.join(", ")))
    }
}

impl fmt::Debug for Dataspace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl Dataspace {
    pub(crate) fn from_raw(id: hid_t) -> Result<Self> {
        Ok(Self(ObjectId::from_owned(IdKind::Dataspace, id)?))
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.0.raw()
    }

    /// A fixed-size simple dataspace. A rank-0 shape gives a scalar dataspace.
    pub fn new<D: Dimension>(dims: D) -> Result<Self> {
        if dims.ndim() == 0 {
            return Self::scalar();
        }
        let dims = hsize_dims(&dims.dims());
        Self::from_raw(h5try!(H5Screate_simple(dims.len() as c_int, dims.as_ptr(), ptr::null())))
    }

    /// A simple dataspace whose extents may grow up to `max` (`None` is unlimited).
    pub fn resizable<D: Dimension>(dims: D, max: &[Option<usize>]) -> Result<Self> {
        let dims = dims.dims();
        ensure!(
            max.len() == dims.len(),
            Unsupported,
            "maximum shape has rank {}, expected {}",
            max.len(),
            dims.len()
        );
        ensure!(!dims.is_empty(), Unsupported, "a scalar dataspace cannot be resizable");
        let maxdims: Vec<hsize_t> =
            max.iter().map(|m| m.map_or(H5S_UNLIMITED, |m| m as hsize_t)).collect();
        let dims = hsize_dims(&dims);
        Self::from_raw(h5try!(H5Screate_simple(dims.len() as c_int, dims.as_ptr(), maxdims.as_ptr())))
    }

    pub fn scalar() -> Result<Self> {
        Self::from_raw(h5try!(H5Screate(H5S_class_t::H5S_SCALAR)))
    }

    /// A dataspace with no elements.
    pub fn null() -> Result<Self> {
        Self::from_raw(h5try!(H5Screate(H5S_class_t::H5S_NULL)))
    }

    /// An independent copy, selection included.
    pub fn copy(&self) -> Result<Self> {
        self.0.ensure_valid()?;
        Self::from_raw(h5try!(H5Scopy(self.raw())))
    }

    fn class(&self) -> Result<H5S_class_t> {
        Ok(H5S_class_t::from_raw(h5try!(H5Sget_simple_extent_type(self.raw()))))
    }

    pub fn is_scalar(&self) -> bool {
        self.class().is_ok_and(|class| class == H5S_class_t::H5S_SCALAR)
    }

    pub fn is_null(&self) -> bool {
        self.class().is_ok_and(|class| class == H5S_class_t::H5S_NULL)
    }

    pub fn ndim(&self) -> Result<usize> {
        self.0.ensure_valid()?;
        Ok(h5try!(H5Sget_simple_extent_ndims(self.raw())) as usize)
    }

    fn extent(&self) -> Result<(Vec<hsize_t>, Vec<hsize_t>)> {
        let ndim = self.ndim()?;
        let (mut dims, mut maxdims) = (vec![0; ndim], vec![0; ndim]);
        h5try!(H5Sget_simple_extent_dims(self.raw(), dims.as_mut_ptr(), maxdims.as_mut_ptr()));
        Ok((dims, maxdims))
    }

    /// Current extent; empty for scalar and null dataspaces.
    pub fn dims(&self) -> Result<Vec<usize>> {
        Ok(usize_dims(&self.extent()?.0))
    }

    /// Maximum extent per axis; `None` means unlimited.
    pub fn max_dims(&self) -> Result<Vec<Option<usize>>> {
        let (_, maxdims) = self.extent()?;
        Ok(maxdims.into_iter().map(|m| (m != H5S_UNLIMITED).then_some(m as usize)).collect())
    }

    /// Number of elements in the extent.
    pub fn size(&self) -> Result<usize> {
        self.0.ensure_valid()?;
        Ok(h5try!(H5Sget_simple_extent_npoints(self.raw())) as usize)
    }

    pub fn is_resizable(&self) -> bool {
        match (self.dims(), self.max_dims()) {
            (Ok(dims), Ok(max)) => dims.iter().zip(max).any(|(d, m)| m != Some(*d)),
            _ => false,
        }
    }

    /// Change the current extent, keeping the rank and the maximum extent.
    pub fn set_extent(&self, dims: &[usize]) -> Result<()> {
        let (current, maxdims) = self.extent()?;
        ensure!(
            dims.len() == current.len(),
            Unsupported,
            "cannot change rank from {} to {}",
            current.len(),
            dims.len()
        );
        for (axis, (&d, &m)) in dims.iter().zip(&maxdims).enumerate() {
            ensure!(
                m == H5S_UNLIMITED || d as hsize_t <= m,
                Unsupported,
                "extent {d} exceeds the maximum {m} on axis {axis}"
            );
        }
        let dims = hsize_dims(dims);
        h5call!(H5Sset_extent_simple(self.raw(), dims.len() as c_int, dims.as_ptr(), maxdims.as_ptr()))
            .map(drop)
    }

    pub fn select_all(&self) -> Result<()> {
        self.0.ensure_valid()?;
        h5call!(H5Sselect_all(self.raw())).map(drop)
    }

    pub fn select_none(&self) -> Result<()> {
        self.0.ensure_valid()?;
        h5call!(H5Sselect_none(self.raw())).map(drop)
    }

    fn simple_dims(&self, what: &str) -> Result<Vec<usize>> {
        ensure!(
            self.class()? == H5S_class_t::H5S_SIMPLE,
            Unsupported,
            "{what} selections need a simple dataspace"
        );
        self.dims()
    }

    /// Combine `slab` with the current selection.
    pub fn select_hyperslab(&self, slab: &Hyperslab, op: SelectOp) -> Result<()> {
        slab.validate(&self.simple_dims("hyperslab")?)?;
        let start = hsize_dims(&slab.start);
        let stride = hsize_dims(&slab.stride);
        let count = hsize_dims(&slab.count);
        let block = hsize_dims(&slab.block);
        h5call!(H5Sselect_hyperslab(
            self.raw(),
            op.native(),
            start.as_ptr(),
            stride.as_ptr(),
            count.as_ptr(),
            block.as_ptr()
        ))
        .map(drop)
    }

    /// Select individual coordinates, replacing the current selection.
    pub fn select_points(&self, points: &[Vec<usize>]) -> Result<()> {
        let dims = self.simple_dims("point")?;
        for point in points {
            ensure!(
                point.len() == dims.len() && point.iter().zip(&dims).all(|(p, d)| p < d),
                Unsupported,
                "point {point:?} lies outside the extent {dims:?}"
            );
        }
        let coords: Vec<hsize_t> = points.iter().flatten().map(|&p| p as hsize_t).collect();
        h5call!(H5Sselect_elements(
            self.raw(),
            H5S_seloper_t::H5S_SELECT_SET,
            points.len(),
            coords.as_ptr()
        ))
        .map(drop)
    }

    /// Install `selection`, validated against the current extent first.
    pub fn select(&self, selection: &Selection) -> Result<()> {
        match selection {
            Selection::All => self.select_all(),
            Selection::None => self.select_none(),
            Selection::Points(points) => self.select_points(points),
            Selection::Hyperslab(slabs) => {
                let dims = self.simple_dims("hyperslab")?;
                for slab in slabs {
                    slab.validate(&dims)?;
                }
                self.select_none()?;
                slabs.iter().try_for_each(|slab| self.select_hyperslab(slab, SelectOp::Or))
            }
        }
    }

    /// Number of selected elements.
    pub fn selection_size(&self) -> Result<usize> {
        self.0.ensure_valid()?;
        Ok(h5try!(H5Sget_select_npoints(self.raw())) as usize)
    }

    /// Inclusive bounding box of the selection, `None` if nothing is selected.
    pub fn selection_bounds(&self) -> Result<Option<(Vec<usize>, Vec<usize>)>> {
        if self.selection_size()? == 0 {
            return Ok(None);
        }
        let ndim = self.ndim()?;
        let (mut start, mut end) = (vec![0; ndim], vec![0; ndim]);
        h5try!(H5Sget_select_bounds(self.raw(), start.as_mut_ptr(), end.as_mut_ptr()));
        Ok(Some((usize_dims(&start), usize_dims(&end))))
    }

    /// `true` if every selected element lies within the extent.
    pub fn selection_valid(&self) -> Result<bool> {
        self.0.ensure_valid()?;
        Ok(h5try!(H5Sselect_valid(self.raw())) > 0)
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_simple_extent() {
        let space = Dataspace::new((2, 3)).unwrap();
        assert_eq!(space.ndim().unwrap(), 2);
        assert_eq!(space.dims().unwrap(), vec![2, 3]);
        assert_eq!(space.max_dims().unwrap(), vec![Some(2), Some(3)]);
        assert_eq!(space.size().unwrap(), 6);
        assert!(!space.is_resizable());
        assert!(!space.is_scalar());
        assert_eq!(format!("{space:?}"), "<HDF5 dataspace: (2, 3)>");
    }

    #[test]
    fn test_scalar_and_null() {
        let scalar = Dataspace::new(()).unwrap();
        assert!(scalar.is_scalar());
        assert_eq!(scalar.size().unwrap(), 1);
        assert!(scalar.dims().unwrap().is_empty());
        let null = Dataspace::null().unwrap();
        assert!(null.is_null());
        assert_eq!(null.size().unwrap(), 0);
        let err = scalar.select_points(&[vec![0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_resizable_extent() {
        let space = Dataspace::resizable([4], &[None]).unwrap();
        assert!(space.is_resizable());
        assert_eq!(space.max_dims().unwrap(), vec![None]);
        space.set_extent(&[100]).unwrap();
        assert_eq!(space.dims().unwrap(), vec![100]);

        let bounded = Dataspace::resizable((2, 2), &[Some(2), Some(5)]).unwrap();
        bounded.set_extent(&[2, 5]).unwrap();
        assert_eq!(bounded.set_extent(&[2, 6]).unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(bounded.set_extent(&[2]).unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(format!("{bounded:?}"), "<HDF5 dataspace: (2, 5)>");
    }

    #[test]
    fn test_hyperslab_selection() {
        let space = Dataspace::new((4, 4)).unwrap();
        let slab = Hyperslab::new(&[1, 1], &[2, 2]);
        assert_eq!(slab.size(), 4);
        space.select(&slab.into()).unwrap();
        assert_eq!(space.selection_size().unwrap(), 4);
        assert_eq!(space.selection_bounds().unwrap(), Some((vec![1, 1], vec![2, 2])));

        let strided = Hyperslab::new(&[0, 0], &[2, 1]).with_stride(&[2, 1]).with_block(&[1, 4]);
        space.select_hyperslab(&strided, SelectOp::Xor).unwrap();
        assert_eq!(space.selection_size().unwrap(), 8);
        assert!(space.selection_valid().unwrap());
    }

    #[test]
    fn test_hyperslab_size_saturates() {
        let huge = Hyperslab::new(&[0, 0], &[usize::MAX, 2]);
        assert_eq!(huge.size(), usize::MAX);
        let empty = Hyperslab::new(&[0, 0], &[usize::MAX, 0]).with_block(&[usize::MAX, 1]);
        assert_eq!(empty.size(), 0);
        let space = Dataspace::new((4, 4)).unwrap();
        let err = space.select(&huge.into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_union_of_hyperslabs() {
        let space = Dataspace::new(10).unwrap();
        let selection = Selection::Hyperslab(vec![
            Hyperslab::new(&[0], &[2]),
            Hyperslab::new(&[5], &[3]),
        ]);
        space.select(&selection).unwrap();
        assert_eq!(space.selection_size().unwrap(), 5);
        assert_eq!(space.selection_bounds().unwrap(), Some((vec![0], vec![7])));
    }

    #[test]
    fn test_out_of_extent_selection() {
        let space = Dataspace::new((3, 3)).unwrap();
        let slab = Hyperslab::new(&[2, 0], &[2, 1]);
        assert_eq!(space.select(&slab.into()).unwrap_err().kind(), ErrorKind::Unsupported);
        let slab = Hyperslab::new(&[0], &[1]);
        assert_eq!(space.select(&slab.into()).unwrap_err().kind(), ErrorKind::Unsupported);
        let err = space.select_points(&[vec![0, 0], vec![3, 0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(err.stack().is_none());
        // A failed selection leaves the previous one in place.
        assert_eq!(space.selection_size().unwrap(), 9);
    }

    #[test]
    fn test_points_and_none() {
        let space = Dataspace::new((3, 3)).unwrap();
        space.select_points(&[vec![2, 2], vec![0, 1]]).unwrap();
        assert_eq!(space.selection_size().unwrap(), 2);
        assert_eq!(space.selection_bounds().unwrap(), Some((vec![0, 1], vec![2, 2])));
        let copy = space.copy().unwrap();
        space.select(&Selection::None).unwrap();
        assert_eq!(space.selection_bounds().unwrap(), None);
        assert_eq!(copy.selection_size().unwrap(), 2);
    }
}
