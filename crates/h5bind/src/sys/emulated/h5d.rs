//! Datasets.

use std::collections::HashSet;

use super::convert::{check_convertible, Conv, Direction};
use super::dtype::NativeType;
use super::engine::{api, cstr, join, slice, slice_mut, Engine};
use super::errors::Fault;
use super::h5g::intermediate;
use super::ids::{ObjHandle, Payload};
use super::plist::{DatasetCreate, Plist, PlistClass};
use super::space::{Extent, SpaceClass, SpaceState};
use super::store::{FileImage, ObjectBody, StoredDataset, StoredObject};
use crate::sys::h5d::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5s::{H5S_ALL, H5S_UNLIMITED};
use crate::sys::types::*;

pub(crate) fn dcpl(engine: &Engine, id: hid_t) -> Result<DatasetCreate, Fault> {
    match engine.plist(id, PlistClass::DatasetCreate)? {
        Plist::DatasetCreate(dcpl) => Ok(dcpl),
        _ => bail!(Plist, BadType, "not a dataset creation property list"),
    }
}

fn dataset_obj(engine: &Engine, id: hid_t) -> Result<ObjHandle, Fault> {
    match engine.payload(id)? {
        Payload::Dataset(obj) => Ok(obj.clone()),
        _ => bail!(Args, BadType, "ID {id:#x} is not a dataset"),
    }
}

fn stored<'e>(engine: &'e Engine, obj: &ObjHandle) -> Result<&'e StoredDataset, Fault> {
    match &engine.object(obj)?.body {
        ObjectBody::Dataset(dset) => Ok(dset),
        ObjectBody::Group { .. } => bail!(Dataset, BadType, "not a dataset"),
    }
}

fn stored_mut<'e>(engine: &'e mut Engine, obj: &ObjHandle) -> Result<&'e mut StoredDataset, Fault> {
    let image = &mut engine.writable(obj.file)?.image;
    match image.object_mut(obj.addr).map(|o| &mut o.body) {
        Some(ObjectBody::Dataset(dset)) => Ok(dset),
        Some(ObjectBody::Group { .. }) => bail!(Dataset, BadType, "not a dataset"),
        None => bail!(Ohdr, NotFound, "no object at address {}", obj.addr),
    }
}

/// One stored element holding the fill value (zeros when none is set).
pub(crate) fn fill_element(dcpl: &DatasetCreate, file_ty: &NativeType) -> Result<Vec<u8>, Fault> {
    let mut element = vec![0u8; file_ty.size()];
    if let Some(fill) = &dcpl.fill {
        if fill.ty.has_vlen() || file_ty.has_vlen() {
            bail!(Dataset, Unsupported, "fill values with variable-length data are not supported");
        }
        check_convertible(&fill.ty, file_ty)?;
        let (mut heap, mut allocations) = (Vec::new(), HashSet::new());
        let mut conv = Conv { dir: Direction::Write, heap: &mut heap, allocations: &mut allocations };
        conv.run(&fill.ty, &fill.bytes, file_ty, &mut element)?;
    }
    Ok(element)
}

fn validate_layout(dcpl: &DatasetCreate, extent: &Extent) -> Result<(), Fault> {
    let extendible = extent.dims.iter().zip(&extent.maxdims).any(|(d, m)| m != d);
    let chunked = dcpl.layout == H5D_CHUNKED as i32;
    if extendible && !chunked {
        bail!(Dataset, CantInit, "extendible contiguous non-external dataset not allowed");
    }
    if !dcpl.filters.is_empty() && !chunked {
        bail!(Dataset, CantInit, "filters can only be used with chunked layout");
    }
    if chunked {
        let Some(chunk) = &dcpl.chunk else {
            bail!(Dataset, CantInit, "chunked layout without chunk dimensions");
        };
        if extent.class != SpaceClass::Simple {
            bail!(Dataset, CantInit, "chunked layout requires a simple dataspace");
        }
        if chunk.len() != extent.rank() {
            bail!(Dataset, BadValue, "chunk rank {} differs from dataspace rank {}", chunk.len(), extent.rank());
        }
        for (c, m) in chunk.iter().zip(&extent.maxdims) {
            if *m != H5S_UNLIMITED && c > m {
                bail!(Dataset, CantInit, "chunk size must be <= maximum dimension size for fixed-sized dimensions");
            }
        }
    }
    Ok(())
}

pub unsafe extern "C" fn H5Dcreate2(
    loc_id: hid_t,
    name: *const c_char,
    type_id: hid_t,
    space_id: hid_t,
    lcpl_id: hid_t,
    dcpl_id: hid_t,
    _dapl_id: hid_t,
) -> hid_t {
    api("H5Dcreate2", "unable to create dataset", H5I_INVALID_HID, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let dtype = engine.datatype(type_id)?;
        let extent = engine.space(space_id)?.extent.clone();
        let dcpl = dcpl(engine, dcpl_id)?;
        validate_layout(&dcpl, &extent)?;
        let fill = fill_element(&dcpl, &dtype)?;
        let data = fill.repeat(extent.npoints() as usize);
        let intermediate = intermediate(engine, lcpl_id)?;
        let (parent, leaf) = engine.parent_for_create(&loc, name, intermediate)?;
        let object = StoredObject {
            body: ObjectBody::Dataset(StoredDataset { dtype, extent, dcpl, data }),
            attrs: Vec::new(),
        };
        let addr = engine.insert_object(loc.file, parent, &leaf, object)?;
        let path = join(&loc.path, name);
        Ok(engine.register(Payload::Dataset(ObjHandle { file: loc.file, addr, path })))
    })
}

pub unsafe extern "C" fn H5Dopen2(loc_id: hid_t, name: *const c_char, _dapl_id: hid_t) -> hid_t {
    api("H5Dopen2", "unable to open dataset", H5I_INVALID_HID, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let obj = engine.resolve(&loc, name)?;
        stored(engine, &obj)?;
        Ok(engine.register(Payload::Dataset(obj)))
    })
}

pub unsafe extern "C" fn H5Dclose(dset_id: hid_t) -> herr_t {
    api("H5Dclose", "not a dataset ID", -1, |engine| {
        dataset_obj(engine, dset_id)?;
        engine.dec_ref(dset_id)?;
        Ok(0)
    })
}

/// Element offsets selected in the file and in memory.
fn selections(
    engine: &Engine,
    extent: &Extent,
    mem_space_id: hid_t,
    file_space_id: hid_t,
) -> Result<(Vec<u64>, Vec<u64>), Fault> {
    let file_space = if file_space_id == H5S_ALL {
        SpaceState::new(extent.clone())
    } else {
        let space = engine.space(file_space_id)?;
        if space.extent.dims != extent.dims {
            bail!(Dataspace, BadValue, "file dataspace extent {:?} differs from the dataset's {:?}", space.extent.dims, extent.dims);
        }
        space.clone()
    };
    let file_offsets = file_space.offsets()?;
    let mem_offsets = if mem_space_id == H5S_ALL {
        file_offsets.clone()
    } else {
        engine.space(mem_space_id)?.offsets()?
    };
    if mem_offsets.len() != file_offsets.len() {
        bail!(
            Dataspace,
            BadValue,
            "src and dest dataspaces have different number of elements selected ({} vs {})",
            mem_offsets.len(),
            file_offsets.len()
        );
    }
    Ok((mem_offsets, file_offsets))
}

fn span(offsets: &[u64], size: usize) -> usize {
    offsets.iter().max().map_or(0, |m| (*m as usize + 1) * size)
}

pub unsafe extern "C" fn H5Dread(
    dset_id: hid_t,
    mem_type_id: hid_t,
    mem_space_id: hid_t,
    file_space_id: hid_t,
    _plist_id: hid_t,
    buf: *mut c_void,
) -> herr_t {
    api("H5Dread", "can't read data", -1, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let mem_ty = engine.datatype(mem_type_id)?;
        let (mem_offsets, file_offsets) = {
            let dset = stored(engine, &obj)?;
            check_convertible(&dset.dtype, &mem_ty)?;
            selections(engine, &dset.extent, mem_space_id, file_space_id)?
        };
        let out = slice_mut(buf as *mut u8, span(&mem_offsets, mem_ty.size()))?;
        let Engine { files, allocations, .. } = engine;
        let file = files
            .get_mut(&obj.file)
            .ok_or_else(|| fault!(File, BadValue, "file is not open"))?;
        let FileImage { objects, heap, .. } = &mut file.image;
        let Some(ObjectBody::Dataset(dset)) = objects.get(obj.addr as usize - 1).map(|o| &o.body) else {
            bail!(Dataset, BadType, "not a dataset");
        };
        let mut conv = Conv { dir: Direction::Read, heap, allocations };
        conv.scatter(&dset.dtype, &dset.data, &file_offsets, &mem_ty, out, &mem_offsets)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Dwrite(
    dset_id: hid_t,
    mem_type_id: hid_t,
    mem_space_id: hid_t,
    file_space_id: hid_t,
    _plist_id: hid_t,
    buf: *const c_void,
) -> herr_t {
    api("H5Dwrite", "can't write data", -1, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let mem_ty = engine.datatype(mem_type_id)?;
        let (mem_offsets, file_offsets) = {
            let dset = stored(engine, &obj)?;
            check_convertible(&mem_ty, &dset.dtype)?;
            selections(engine, &dset.extent, mem_space_id, file_space_id)?
        };
        let input = slice(buf as *const u8, span(&mem_offsets, mem_ty.size()))?;
        stored_mut(engine, &obj)?;
        let Engine { files, allocations, .. } = engine;
        let file = files
            .get_mut(&obj.file)
            .ok_or_else(|| fault!(File, BadValue, "file is not open"))?;
        let FileImage { objects, heap, .. } = &mut file.image;
        let Some(ObjectBody::Dataset(dset)) = objects.get_mut(obj.addr as usize - 1).map(|o| &mut o.body) else {
            bail!(Dataset, BadType, "not a dataset");
        };
        let mut data = dset.data.clone();
        let mut conv = Conv { dir: Direction::Write, heap, allocations };
        conv.scatter(&mem_ty, input, &mem_offsets, &dset.dtype, &mut data, &file_offsets)?;
        dset.data = data;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Dget_space(dset_id: hid_t) -> hid_t {
    api("H5Dget_space", "unable to get dataspace", H5I_INVALID_HID, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let extent = stored(engine, &obj)?.extent.clone();
        Ok(engine.register(Payload::Dataspace(SpaceState::new(extent))))
    })
}

pub unsafe extern "C" fn H5Dget_type(dset_id: hid_t) -> hid_t {
    api("H5Dget_type", "unable to get datatype", H5I_INVALID_HID, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let dtype = stored(engine, &obj)?.dtype.clone();
        Ok(engine.register(Payload::Datatype(dtype)))
    })
}

pub unsafe extern "C" fn H5Dget_create_plist(dset_id: hid_t) -> hid_t {
    api("H5Dget_create_plist", "unable to get dataset creation properties", H5I_INVALID_HID, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let dcpl = stored(engine, &obj)?.dcpl.clone();
        Ok(engine.register(Payload::PropList(Plist::DatasetCreate(dcpl))))
    })
}

/// Changes the extent of a chunked dataset. Elements outside the new extent
/// are dropped and new elements take the fill value.
pub unsafe extern "C" fn H5Dset_extent(dset_id: hid_t, size: *const hsize_t) -> herr_t {
    api("H5Dset_extent", "unable to set extent of dataset", -1, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        let dset = stored(engine, &obj)?;
        if dset.dcpl.layout != H5D_CHUNKED as i32 {
            bail!(Dataset, Unsupported, "dataset has non-chunked storage and can't be resized");
        }
        let rank = dset.extent.rank();
        let dims = slice(size, rank)?.to_vec();
        for (d, m) in dims.iter().zip(&dset.extent.maxdims) {
            if *m != H5S_UNLIMITED && d > m {
                bail!(Dataset, BadRange, "dataset dimensions {dims:?} exceed maximum {:?}", dset.extent.maxdims);
            }
        }
        let resized = Extent::simple(dims, Some(dset.extent.maxdims.clone()))?;
        let fill = fill_element(&dset.dcpl, &dset.dtype)?;
        let size = dset.dtype.size();
        let mut data = fill.repeat(resized.npoints() as usize);
        for old in 0..dset.extent.npoints() {
            let coord = dset.extent.coord(old);
            if let Some(new) = resized.linear(&coord) {
                let (o, n) = (old as usize * size, new as usize * size);
                data[n..n + size].copy_from_slice(&dset.data[o..o + size]);
            }
        }
        let dset = stored_mut(engine, &obj)?;
        dset.extent = resized;
        dset.data = data;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Dget_storage_size(dset_id: hid_t) -> hsize_t {
    api("H5Dget_storage_size", "can't get size of dataset's storage", 0, |engine| {
        let obj = dataset_obj(engine, dset_id)?;
        Ok(stored(engine, &obj)?.data.len() as hsize_t)
    })
}
