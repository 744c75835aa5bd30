//! Object references.

use super::engine::{api, cstr, put, Engine};
use super::errors::Fault;
use super::h5g::open_object;
use super::ids::ObjHandle;
use super::store::ObjectBody;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5o::*;
use crate::sys::h5r::*;
use crate::sys::types::*;

fn target(engine: &Engine, id: hid_t, ref_type: H5R_type_t, ref_: *const c_void) -> Result<ObjHandle, Fault> {
    if ref_type != H5R_OBJECT {
        bail!(Reference, Unsupported, "only object references are supported");
    }
    if ref_.is_null() {
        bail!(Args, BadValue, "invalid reference pointer");
    }
    let key = engine
        .payload(id)?
        .file()
        .ok_or_else(|| fault!(Args, BadType, "ID {id:#x} does not live in a file"))?;
    let addr = unsafe { (ref_ as *const hobj_ref_t).read_unaligned() };
    let image = &engine.file(key)?.image;
    if image.object(addr).is_none() {
        bail!(Reference, BadValue, "reference {addr} does not point to an object");
    }
    let path = image.path_of(addr).unwrap_or_default();
    Ok(ObjHandle { file: key, addr, path })
}

pub unsafe extern "C" fn H5Rcreate(
    ref_: *mut c_void,
    loc_id: hid_t,
    name: *const c_char,
    ref_type: H5R_type_t,
    _space_id: hid_t,
) -> herr_t {
    api("H5Rcreate", "unable to create reference", -1, |engine| {
        if ref_type != H5R_OBJECT {
            bail!(Reference, Unsupported, "only object references are supported");
        }
        if ref_.is_null() {
            bail!(Args, BadValue, "invalid reference pointer");
        }
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let obj = engine.resolve(&loc, name)?;
        (ref_ as *mut hobj_ref_t).write_unaligned(obj.addr);
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Rdereference2(
    obj_id: hid_t,
    _oapl_id: hid_t,
    ref_type: H5R_type_t,
    ref_: *const c_void,
) -> hid_t {
    api("H5Rdereference2", "unable to dereference object", H5I_INVALID_HID, |engine| {
        let obj = target(engine, obj_id, ref_type, ref_)?;
        open_object(engine, obj)
    })
}

pub unsafe extern "C" fn H5Rget_obj_type2(
    id: hid_t,
    ref_type: H5R_type_t,
    ref_: *const c_void,
    obj_type: *mut c_int,
) -> herr_t {
    api("H5Rget_obj_type2", "unable to determine object type", -1, |engine| {
        let obj = target(engine, id, ref_type, ref_)?;
        let kind = match engine.object(&obj)?.body {
            ObjectBody::Group { .. } => H5O_TYPE_GROUP,
            ObjectBody::Dataset(_) => H5O_TYPE_DATASET,
        };
        put(obj_type, kind as c_int);
        Ok(0)
    })
}
