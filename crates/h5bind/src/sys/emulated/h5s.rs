//! Dataspaces and selections.

use super::engine::{api, slice};
use super::errors::Fault;
use super::ids::Payload;
use super::space::{Extent, Selection, SpaceClass, SpaceState};
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5s::*;
use crate::sys::types::*;

unsafe fn extent_from(rank: c_int, dims: *const hsize_t, maxdims: *const hsize_t) -> Result<Extent, Fault> {
    if rank < 0 || rank as usize > H5S_MAX_RANK {
        bail!(Args, BadRange, "invalid rank {rank}");
    }
    let rank = rank as usize;
    let dims = slice(dims, rank)?.to_vec();
    let maxdims = if maxdims.is_null() { None } else { Some(slice(maxdims, rank)?.to_vec()) };
    Extent::simple(dims, maxdims)
}

pub unsafe extern "C" fn H5Screate(type_: H5S_class_t) -> hid_t {
    api("H5Screate", "unable to create dataspace", H5I_INVALID_HID, |engine| {
        let extent = match type_ {
            H5S_SCALAR => Extent::scalar(),
            H5S_NULL => Extent::null(),
            H5S_SIMPLE => Extent::simple(Vec::new(), None)?,
            _ => bail!(Args, BadValue, "invalid dataspace type"),
        };
        Ok(engine.register(Payload::Dataspace(SpaceState::new(extent))))
    })
}

pub unsafe extern "C" fn H5Screate_simple(rank: c_int, dims: *const hsize_t, maxdims: *const hsize_t) -> hid_t {
    api("H5Screate_simple", "unable to create simple dataspace", H5I_INVALID_HID, |engine| {
        let extent = extent_from(rank, dims, maxdims)?;
        Ok(engine.register(Payload::Dataspace(SpaceState::new(extent))))
    })
}

pub unsafe extern "C" fn H5Scopy(space_id: hid_t) -> hid_t {
    api("H5Scopy", "unable to copy dataspace", H5I_INVALID_HID, |engine| {
        let space = engine.space(space_id)?.clone();
        Ok(engine.register(Payload::Dataspace(space)))
    })
}

pub unsafe extern "C" fn H5Sclose(space_id: hid_t) -> herr_t {
    api("H5Sclose", "not a dataspace", -1, |engine| {
        engine.space(space_id)?;
        engine.dec_ref(space_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Sget_simple_extent_ndims(space_id: hid_t) -> c_int {
    api("H5Sget_simple_extent_ndims", "can't get rank", -1, |engine| {
        Ok(engine.space(space_id)?.extent.rank() as c_int)
    })
}

pub unsafe extern "C" fn H5Sget_simple_extent_dims(
    space_id: hid_t,
    dims: *mut hsize_t,
    maxdims: *mut hsize_t,
) -> c_int {
    api("H5Sget_simple_extent_dims", "can't get dimensions", -1, |engine| {
        let extent = &engine.space(space_id)?.extent;
        for (i, (d, m)) in extent.dims.iter().zip(&extent.maxdims).enumerate() {
            if !dims.is_null() {
                *dims.add(i) = *d;
            }
            if !maxdims.is_null() {
                *maxdims.add(i) = *m;
            }
        }
        Ok(extent.rank() as c_int)
    })
}

pub unsafe extern "C" fn H5Sget_simple_extent_npoints(space_id: hid_t) -> hssize_t {
    api("H5Sget_simple_extent_npoints", "can't get number of elements", -1, |engine| {
        Ok(engine.space(space_id)?.extent.npoints() as hssize_t)
    })
}

pub unsafe extern "C" fn H5Sget_simple_extent_type(space_id: hid_t) -> c_int {
    api("H5Sget_simple_extent_type", "can't get dataspace class", H5S_NO_CLASS as c_int, |engine| {
        let class = match engine.space(space_id)?.extent.class {
            SpaceClass::Scalar => H5S_SCALAR,
            SpaceClass::Simple => H5S_SIMPLE,
            SpaceClass::Null => H5S_NULL,
        };
        Ok(class as c_int)
    })
}

pub unsafe extern "C" fn H5Sset_extent_simple(
    space_id: hid_t,
    rank: c_int,
    dims: *const hsize_t,
    max: *const hsize_t,
) -> herr_t {
    api("H5Sset_extent_simple", "unable to set simple extent", -1, |engine| {
        let extent = extent_from(rank, dims, max)?;
        *engine.space_mut(space_id)? = SpaceState::new(extent);
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Sselect_all(space_id: hid_t) -> herr_t {
    api("H5Sselect_all", "can't change selection", -1, |engine| {
        engine.space_mut(space_id)?.selection = Selection::All;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Sselect_none(space_id: hid_t) -> herr_t {
    api("H5Sselect_none", "can't change selection", -1, |engine| {
        engine.space_mut(space_id)?.selection = Selection::None;
        Ok(0)
    })
}

/// Hyperslab selection; null `stride` or `block` mean all ones.
pub unsafe extern "C" fn H5Sselect_hyperslab(
    space_id: hid_t,
    op: H5S_seloper_t,
    start: *const hsize_t,
    stride: *const hsize_t,
    count: *const hsize_t,
    block: *const hsize_t,
) -> herr_t {
    api("H5Sselect_hyperslab", "unable to set hyperslab selection", -1, |engine| {
        let space = engine.space_mut(space_id)?;
        let rank = space.extent.rank();
        let ones = vec![1; rank];
        let start = slice(start, rank)?;
        let count = slice(count, rank)?;
        let stride = if stride.is_null() { &ones[..] } else { slice(stride, rank)? };
        let block = if block.is_null() { &ones[..] } else { slice(block, rank)? };
        space.select_hyperslab(op, start, stride, count, block)?;
        Ok(0)
    })
}

/// Point selection; `coord` holds `num_elem` coordinates of the space's rank.
pub unsafe extern "C" fn H5Sselect_elements(
    space_id: hid_t,
    op: H5S_seloper_t,
    num_elem: size_t,
    coord: *const hsize_t,
) -> herr_t {
    api("H5Sselect_elements", "unable to select elements", -1, |engine| {
        let space = engine.space_mut(space_id)?;
        let rank = space.extent.rank();
        if rank == 0 {
            bail!(Dataspace, BadValue, "point selections need a simple dataspace");
        }
        let flat = slice(coord, num_elem * rank)?;
        let points = flat.chunks_exact(rank).map(<[u64]>::to_vec).collect();
        space.select_points(op, points)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Sget_select_npoints(space_id: hid_t) -> hssize_t {
    api("H5Sget_select_npoints", "can't get number of elements selected", -1, |engine| {
        Ok(engine.space(space_id)?.selected_count() as hssize_t)
    })
}

pub unsafe extern "C" fn H5Sget_select_type(space_id: hid_t) -> c_int {
    api("H5Sget_select_type", "can't get selection type", H5S_SEL_ERROR as c_int, |engine| {
        Ok(engine.space(space_id)?.sel_type() as c_int)
    })
}

pub unsafe extern "C" fn H5Sselect_valid(space_id: hid_t) -> htri_t {
    api("H5Sselect_valid", "can't check selection", -1, |engine| {
        Ok(engine.space(space_id)?.is_valid() as htri_t)
    })
}

pub unsafe extern "C" fn H5Sget_select_bounds(space_id: hid_t, start: *mut hsize_t, end: *mut hsize_t) -> herr_t {
    api("H5Sget_select_bounds", "can't get selection bounds", -1, |engine| {
        let Some((lo, hi)) = engine.space(space_id)?.bounds() else {
            bail!(Dataspace, CantGet, "selection is empty");
        };
        if !start.is_null() {
            std::ptr::copy_nonoverlapping(lo.as_ptr(), start, lo.len());
        }
        if !end.is_null() {
            std::ptr::copy_nonoverlapping(hi.as_ptr(), end, hi.len());
        }
        Ok(0)
    })
}
