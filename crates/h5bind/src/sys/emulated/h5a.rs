//! Attributes.

use super::convert::{check_convertible, Conv, Direction};
use super::engine::{api, copy_name, cstr, slice, slice_mut, Engine};
use super::errors::Fault;
use super::ids::{AttrHandle, ObjHandle, Payload};
use super::plist::PlistClass;
use super::space::SpaceState;
use super::store::{FileImage, StoredAttr};
use crate::sys::h5::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::types::*;

fn attrs<'e>(engine: &'e Engine, owner: &ObjHandle) -> Result<&'e [StoredAttr], Fault> {
    Ok(&engine.object(owner)?.attrs)
}

fn find<'e>(engine: &'e Engine, attr: &AttrHandle) -> Result<&'e StoredAttr, Fault> {
    attrs(engine, &attr.owner)?
        .iter()
        .find(|a| a.name == attr.name)
        .ok_or_else(|| fault!(Attr, NotFound, "can't locate attribute: '{}'", attr.name))
}

fn attrs_mut<'i>(image: &'i mut FileImage, owner: &ObjHandle) -> Result<&'i mut Vec<StoredAttr>, Fault> {
    image
        .object_mut(owner.addr)
        .map(|o| &mut o.attrs)
        .ok_or_else(|| fault!(Ohdr, NotFound, "no object at address {}", owner.addr))
}

pub unsafe extern "C" fn H5Acreate2(
    loc_id: hid_t,
    attr_name: *const c_char,
    type_id: hid_t,
    space_id: hid_t,
    acpl_id: hid_t,
    _aapl_id: hid_t,
) -> hid_t {
    api("H5Acreate2", "unable to create attribute", H5I_INVALID_HID, |engine| {
        let name = cstr(attr_name)?;
        if name.is_empty() {
            bail!(Args, BadValue, "no attribute name");
        }
        let owner = engine.location(loc_id)?;
        let dtype = engine.datatype(type_id)?;
        let extent = engine.space(space_id)?.extent.clone();
        engine.plist(acpl_id, PlistClass::AttributeCreate)?;
        if attrs(engine, &owner)?.iter().any(|a| a.name == name) {
            bail!(Attr, AlreadyExists, "attribute '{name}' already exists");
        }
        let data = vec![0u8; dtype.size() * extent.npoints() as usize];
        let image = &mut engine.writable(owner.file)?.image;
        attrs_mut(image, &owner)?.push(StoredAttr { name: name.to_owned(), dtype, extent, data });
        Ok(engine.register(Payload::Attribute(AttrHandle { owner, name: name.to_owned() })))
    })
}

pub unsafe extern "C" fn H5Aopen(obj_id: hid_t, attr_name: *const c_char, _aapl_id: hid_t) -> hid_t {
    api("H5Aopen", "unable to open attribute", H5I_INVALID_HID, |engine| {
        let name = cstr(attr_name)?;
        let attr = AttrHandle { owner: engine.location(obj_id)?, name: name.to_owned() };
        find(engine, &attr)?;
        Ok(engine.register(Payload::Attribute(attr)))
    })
}

/// Opens the `n`-th attribute of the object at `obj_name` in the given index order.
pub unsafe extern "C" fn H5Aopen_by_idx(
    loc_id: hid_t,
    obj_name: *const c_char,
    idx_type: H5_index_t,
    order: H5_iter_order_t,
    n: hsize_t,
    _aapl_id: hid_t,
    _lapl_id: hid_t,
) -> hid_t {
    api("H5Aopen_by_idx", "unable to open attribute", H5I_INVALID_HID, |engine| {
        let obj_name = cstr(obj_name)?;
        let loc = engine.location(loc_id)?;
        let owner = engine.resolve(&loc, obj_name)?;
        let mut names: Vec<&str> = attrs(engine, &owner)?.iter().map(|a| a.name.as_str()).collect();
        if idx_type == H5_INDEX_NAME {
            names.sort_unstable();
        }
        if order == H5_ITER_DEC {
            names.reverse();
        }
        let name = names
            .get(n as usize)
            .map(|s| (*s).to_owned())
            .ok_or_else(|| fault!(Attr, BadRange, "attribute index {n} out of range"))?;
        Ok(engine.register(Payload::Attribute(AttrHandle { owner, name })))
    })
}

pub unsafe extern "C" fn H5Aclose(attr_id: hid_t) -> herr_t {
    api("H5Aclose", "not an attribute ID", -1, |engine| {
        engine.attr_handle(attr_id)?;
        engine.dec_ref(attr_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Aread(attr_id: hid_t, type_id: hid_t, buf: *mut c_void) -> herr_t {
    api("H5Aread", "unable to read attribute", -1, |engine| {
        let handle = engine.attr_handle(attr_id)?;
        let mem_ty = engine.datatype(type_id)?;
        let attr = find(engine, &handle)?.clone();
        check_convertible(&attr.dtype, &mem_ty)?;
        let out = slice_mut(buf as *mut u8, mem_ty.size() * attr.extent.npoints() as usize)?;
        let Engine { files, allocations, .. } = engine;
        let file = files
            .get_mut(&handle.owner.file)
            .ok_or_else(|| fault!(File, BadValue, "file is not open"))?;
        let mut conv = Conv { dir: Direction::Read, heap: &mut file.image.heap, allocations };
        conv.run(&attr.dtype, &attr.data, &mem_ty, out)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Awrite(attr_id: hid_t, type_id: hid_t, buf: *const c_void) -> herr_t {
    api("H5Awrite", "unable to write attribute", -1, |engine| {
        let handle = engine.attr_handle(attr_id)?;
        let mem_ty = engine.datatype(type_id)?;
        let attr = find(engine, &handle)?;
        check_convertible(&mem_ty, &attr.dtype)?;
        let (file_ty, mut data) = (attr.dtype.clone(), attr.data.clone());
        let input = slice(buf as *const u8, mem_ty.size() * attr.extent.npoints() as usize)?;
        engine.writable(handle.owner.file)?;
        let Engine { files, allocations, .. } = engine;
        let file = files
            .get_mut(&handle.owner.file)
            .ok_or_else(|| fault!(File, BadValue, "file is not open"))?;
        let mut conv = Conv { dir: Direction::Write, heap: &mut file.image.heap, allocations };
        conv.run(&mem_ty, input, &file_ty, &mut data)?;
        if let Some(stored) = attrs_mut(&mut file.image, &handle.owner)?
            .iter_mut()
            .find(|a| a.name == handle.name)
        {
            stored.data = data;
        }
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Aget_space(attr_id: hid_t) -> hid_t {
    api("H5Aget_space", "unable to get dataspace", H5I_INVALID_HID, |engine| {
        let handle = engine.attr_handle(attr_id)?;
        let extent = find(engine, &handle)?.extent.clone();
        Ok(engine.register(Payload::Dataspace(SpaceState::new(extent))))
    })
}

pub unsafe extern "C" fn H5Aget_type(attr_id: hid_t) -> hid_t {
    api("H5Aget_type", "unable to get datatype", H5I_INVALID_HID, |engine| {
        let handle = engine.attr_handle(attr_id)?;
        let dtype = find(engine, &handle)?.dtype.clone();
        Ok(engine.register(Payload::Datatype(dtype)))
    })
}

pub unsafe extern "C" fn H5Aget_name(attr_id: hid_t, buf_size: size_t, buf: *mut c_char) -> ssize_t {
    api("H5Aget_name", "can't get attribute name", -1, |engine| {
        let handle = engine.attr_handle(attr_id)?;
        Ok(copy_name(&handle.name, buf, buf_size))
    })
}

pub unsafe extern "C" fn H5Aexists(obj_id: hid_t, attr_name: *const c_char) -> htri_t {
    api("H5Aexists", "can't check if attribute exists", -1, |engine| {
        let name = cstr(attr_name)?;
        let owner = engine.location(obj_id)?;
        Ok(attrs(engine, &owner)?.iter().any(|a| a.name == name) as htri_t)
    })
}

pub unsafe extern "C" fn H5Adelete(loc_id: hid_t, name: *const c_char) -> herr_t {
    api("H5Adelete", "unable to delete attribute", -1, |engine| {
        let name = cstr(name)?;
        let owner = engine.location(loc_id)?;
        if !attrs(engine, &owner)?.iter().any(|a| a.name == name) {
            bail!(Attr, NotFound, "can't locate attribute: '{name}'");
        }
        let image = &mut engine.writable(owner.file)?.image;
        attrs_mut(image, &owner)?.retain(|a| a.name != name);
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Aget_num_attrs(loc_id: hid_t) -> c_int {
    api("H5Aget_num_attrs", "can't get attribute count", -1, |engine| {
        let owner = engine.location(loc_id)?;
        Ok(attrs(engine, &owner)?.len() as c_int)
    })
}
