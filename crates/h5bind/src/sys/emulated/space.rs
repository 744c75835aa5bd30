//! Dataspace extents and selections.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::errors::Fault;
use crate::sys::h5s::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum SpaceClass {
    Scalar,
    Simple,
    Null,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Extent {
    pub class: SpaceClass,
    pub dims: Vec<u64>,
    pub maxdims: Vec<u64>,
}

impl Extent {
    pub fn scalar() -> Self {
        Self { class: SpaceClass::Scalar, dims: Vec::new(), maxdims: Vec::new() }
    }

    pub fn null() -> Self {
        Self { class: SpaceClass::Null, dims: Vec::new(), maxdims: Vec::new() }
    }

    pub fn simple(dims: Vec<u64>, maxdims: Option<Vec<u64>>) -> Result<Self, Fault> {
        if dims.len() > H5S_MAX_RANK {
            bail!(Dataspace, BadRange, "rank {} exceeds the maximum of {}", dims.len(), H5S_MAX_RANK);
        }
        let maxdims = maxdims.unwrap_or_else(|| dims.clone());
        if maxdims.len() != dims.len() {
            bail!(Dataspace, BadValue, "maximum dimensions have a different rank");
        }
        for (d, m) in dims.iter().zip(&maxdims) {
            if *m != H5S_UNLIMITED && d > m {
                bail!(Dataspace, BadRange, "dimension {d} exceeds its maximum {m}");
            }
        }
        Ok(Self { class: SpaceClass::Simple, dims, maxdims })
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn npoints(&self) -> u64 {
        match self.class {
            SpaceClass::Scalar => 1,
            SpaceClass::Null => 0,
            SpaceClass::Simple => self.dims.iter().product(),
        }
    }

    /// Row-major offset of a coordinate; `None` when it lies outside the extent.
    pub fn linear(&self, coord: &[u64]) -> Option<u64> {
        if coord.len() != self.rank() {
            return None;
        }
        let mut offset = 0u64;
        for (c, d) in coord.iter().zip(&self.dims) {
            if c >= d {
                return None;
            }
            offset = offset * d + c;
        }
        Some(offset)
    }

    pub fn coord(&self, mut linear: u64) -> Vec<u64> {
        let mut coord = vec![0; self.rank()];
        for (slot, d) in coord.iter_mut().zip(&self.dims).rev() {
            if *d > 0 {
                *slot = linear % d;
                linear /= d;
            }
        }
        coord
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Selection {
    All,
    None,
    Hyperslab(BTreeSet<Vec<u64>>),
    Points(Vec<Vec<u64>>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SpaceState {
    pub extent: Extent,
    pub selection: Selection,
}

impl SpaceState {
    pub fn new(extent: Extent) -> Self {
        Self { extent, selection: Selection::All }
    }

    pub fn selected_count(&self) -> u64 {
        match &self.selection {
            Selection::All => self.extent.npoints(),
            Selection::None => 0,
            Selection::Hyperslab(set) => set.len() as u64,
            Selection::Points(points) => points.len() as u64,
        }
    }

    pub fn sel_type(&self) -> H5S_sel_type {
        match self.selection {
            Selection::All => H5S_SEL_ALL,
            Selection::None => H5S_SEL_NONE,
            Selection::Hyperslab(_) => H5S_SEL_HYPERSLABS,
            Selection::Points(_) => H5S_SEL_POINTS,
        }
    }

    pub fn is_valid(&self) -> bool {
        match &self.selection {
            Selection::All | Selection::None => true,
            Selection::Hyperslab(set) => set.iter().all(|c| self.extent.linear(c).is_some()),
            Selection::Points(points) => points.iter().all(|c| self.extent.linear(c).is_some()),
        }
    }

    /// Linear element offsets in iteration order.
    pub fn offsets(&self) -> Result<Vec<u64>, Fault> {
        let lookup = |c: &Vec<u64>| {
            self.extent
                .linear(c)
                .ok_or_else(|| fault!(Dataspace, BadRange, "selection {c:?} lies outside extent {:?}", self.extent.dims))
        };
        match &self.selection {
            Selection::All => Ok((0..self.extent.npoints()).collect()),
            Selection::None => Ok(Vec::new()),
            Selection::Hyperslab(set) => set.iter().map(lookup).collect(),
            Selection::Points(points) => points.iter().map(lookup).collect(),
        }
    }

    pub fn bounds(&self) -> Option<(Vec<u64>, Vec<u64>)> {
        let rank = self.extent.rank();
        let coords: Vec<&Vec<u64>> = match &self.selection {
            Selection::All => {
                if self.extent.npoints() == 0 {
                    return None;
                }
                let end = self.extent.dims.iter().map(|d| d - 1).collect();
                return Some((vec![0; rank], end));
            }
            Selection::None => return None,
            Selection::Hyperslab(set) => set.iter().collect(),
            Selection::Points(points) => points.iter().collect(),
        };
        let first = coords.first()?;
        let mut start = (*first).clone();
        let mut end = (*first).clone();
        for c in coords {
            for i in 0..rank {
                start[i] = start[i].min(c[i]);
                end[i] = end[i].max(c[i]);
            }
        }
        Some((start, end))
    }

    fn current_set(&self) -> Result<BTreeSet<Vec<u64>>, Fault> {
        match &self.selection {
            Selection::All => Ok((0..self.extent.npoints()).map(|i| self.extent.coord(i)).collect()),
            Selection::None => Ok(BTreeSet::new()),
            Selection::Hyperslab(set) => Ok(set.clone()),
            Selection::Points(_) => {
                bail!(Dataspace, BadValue, "can't combine a hyperslab with a point selection")
            }
        }
    }

    pub fn select_hyperslab(
        &mut self,
        op: H5S_seloper_t,
        start: &[u64],
        stride: &[u64],
        count: &[u64],
        block: &[u64],
    ) -> Result<(), Fault> {
        let rank = self.extent.rank();
        if self.extent.class != SpaceClass::Simple {
            bail!(Dataspace, BadValue, "hyperslabs need a simple dataspace");
        }
        for i in 0..rank {
            if stride[i] == 0 {
                bail!(Dataspace, BadValue, "hyperslab stride must be positive");
            }
            if count[i] > 1 && stride[i] < block[i] {
                bail!(Dataspace, BadValue, "hyperslab blocks overlap");
            }
        }
        let mut axes: Vec<Vec<u64>> = Vec::with_capacity(rank);
        for i in 0..rank {
            let mut axis = Vec::new();
            for c in 0..count[i] {
                for b in 0..block[i] {
                    axis.push(start[i] + c * stride[i] + b);
                }
            }
            axes.push(axis);
        }
        let mut slab = BTreeSet::new();
        let total: usize = axes.iter().map(Vec::len).product();
        for n in 0..total {
            let mut rest = n;
            let mut coord = vec![0; rank];
            for i in (0..rank).rev() {
                let len = axes[i].len();
                coord[i] = axes[i][rest % len];
                rest /= len;
            }
            slab.insert(coord);
        }
        let combined = match op {
            H5S_SELECT_SET => slab,
            H5S_SELECT_OR => &self.current_set()? | &slab,
            H5S_SELECT_AND => &self.current_set()? & &slab,
            H5S_SELECT_XOR => &self.current_set()? ^ &slab,
            H5S_SELECT_NOTB => &self.current_set()? - &slab,
            H5S_SELECT_NOTA => &slab - &self.current_set()?,
            _ => bail!(Dataspace, Unsupported, "selection operator {op:?} is not supported for hyperslabs"),
        };
        self.selection = Selection::Hyperslab(combined);
        Ok(())
    }

    pub fn select_points(&mut self, op: H5S_seloper_t, points: Vec<Vec<u64>>) -> Result<(), Fault> {
        let existing = match &self.selection {
            Selection::Points(p) => p.clone(),
            _ => Vec::new(),
        };
        self.selection = match op {
            H5S_SELECT_SET => Selection::Points(points),
            H5S_SELECT_APPEND => Selection::Points(existing.into_iter().chain(points).collect()),
            H5S_SELECT_PREPEND => Selection::Points(points.into_iter().chain(existing).collect()),
            _ => bail!(Dataspace, Unsupported, "selection operator {op:?} is not supported for points"),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(dims: &[u64]) -> SpaceState {
        SpaceState::new(Extent::simple(dims.to_vec(), None).unwrap())
    }

    #[test]
    fn test_hyperslab_row_major() {
        let mut s = space(&[4, 4]);
        s.select_hyperslab(H5S_SELECT_SET, &[1, 1], &[1, 1], &[2, 2], &[1, 1]).unwrap();
        assert_eq!(s.selected_count(), 4);
        assert_eq!(s.offsets().unwrap(), vec![5, 6, 9, 10]);
        assert_eq!(s.bounds(), Some((vec![1, 1], vec![2, 2])));
    }

    #[test]
    fn test_strided_blocks_and_or() {
        let mut s = space(&[10]);
        s.select_hyperslab(H5S_SELECT_SET, &[0], &[4], &[3], &[2]).unwrap();
        assert_eq!(s.offsets().unwrap(), vec![0, 1, 4, 5, 8, 9]);
        s.select_hyperslab(H5S_SELECT_OR, &[2], &[1], &[1], &[1]).unwrap();
        assert_eq!(s.selected_count(), 7);
        s.select_hyperslab(H5S_SELECT_NOTB, &[0], &[1], &[5], &[1]).unwrap();
        assert_eq!(s.offsets().unwrap(), vec![5, 8, 9]);
    }

    #[test]
    fn test_out_of_extent_is_detected() {
        let mut s = space(&[3]);
        s.select_points(H5S_SELECT_SET, vec![vec![0], vec![3]]).unwrap();
        assert!(!s.is_valid());
        assert!(s.offsets().is_err());
    }

    #[test]
    fn test_overlapping_blocks_rejected() {
        let mut s = space(&[10]);
        assert!(s.select_hyperslab(H5S_SELECT_SET, &[0], &[1], &[3], &[2]).is_err());
    }

    #[test]
    fn test_scalar_and_coord() {
        let s = SpaceState::new(Extent::scalar());
        assert_eq!(s.offsets().unwrap(), vec![0]);
        let e = Extent::simple(vec![2, 3], None).unwrap();
        assert_eq!(e.coord(4), vec![1, 1]);
        assert_eq!(e.linear(&[1, 2]), Some(5));
    }
}
