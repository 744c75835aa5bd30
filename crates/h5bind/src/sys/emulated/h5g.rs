//! Groups, links, and generic object access.

use std::collections::BTreeMap;
use std::ffi::CString;

use super::engine::{api, cstr, finish, join, links, links_mut, put, Engine};
use super::errors::Fault;
use super::ids::{ObjHandle, Payload};
use super::plist::{Plist, PlistClass};
use super::store::{ObjectBody, StoredObject};
use crate::sys::h5::*;
use crate::sys::h5g::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::h5l::H5L_iterate_t;
use crate::sys::types::*;

pub(crate) fn intermediate(engine: &Engine, lcpl_id: hid_t) -> Result<bool, Fault> {
    match engine.plist(lcpl_id, PlistClass::LinkCreate)? {
        Plist::LinkCreate { intermediate } => Ok(intermediate),
        _ => Ok(false),
    }
}

/// Registers an id for whatever kind of object `obj` designates.
pub(crate) fn open_object(engine: &mut Engine, obj: ObjHandle) -> Result<hid_t, Fault> {
    let payload = match engine.object(&obj)?.body {
        ObjectBody::Group { .. } => Payload::Group(obj),
        ObjectBody::Dataset(_) => Payload::Dataset(obj),
    };
    Ok(engine.register(payload))
}

pub unsafe extern "C" fn H5Gcreate2(
    loc_id: hid_t,
    name: *const c_char,
    lcpl_id: hid_t,
    gcpl_id: hid_t,
    _gapl_id: hid_t,
) -> hid_t {
    api("H5Gcreate2", "unable to create group", H5I_INVALID_HID, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        engine.plist(gcpl_id, PlistClass::GroupCreate)?;
        let intermediate = intermediate(engine, lcpl_id)?;
        let (parent, leaf) = engine.parent_for_create(&loc, name, intermediate)?;
        let group = StoredObject { body: ObjectBody::Group { links: BTreeMap::new() }, attrs: Vec::new() };
        let addr = engine.insert_object(loc.file, parent, &leaf, group)?;
        let path = join(&loc.path, name);
        Ok(engine.register(Payload::Group(ObjHandle { file: loc.file, addr, path })))
    })
}

pub unsafe extern "C" fn H5Gopen2(loc_id: hid_t, name: *const c_char, _gapl_id: hid_t) -> hid_t {
    api("H5Gopen2", "unable to open group", H5I_INVALID_HID, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let obj = engine.resolve(&loc, name)?;
        if !matches!(engine.object(&obj)?.body, ObjectBody::Group { .. }) {
            bail!(Sym, BadType, "'{name}' is not a group");
        }
        Ok(engine.register(Payload::Group(obj)))
    })
}

pub unsafe extern "C" fn H5Gclose(group_id: hid_t) -> herr_t {
    api("H5Gclose", "not a group ID", -1, |engine| {
        if !matches!(engine.payload(group_id)?, Payload::Group(_)) {
            bail!(Args, BadType, "not a group ID");
        }
        engine.dec_ref(group_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Gget_info(loc_id: hid_t, ginfo: *mut H5G_info_t) -> herr_t {
    api("H5Gget_info", "unable to retrieve group info", -1, |engine| {
        let loc = engine.location(loc_id)?;
        let nlinks = links(&engine.file(loc.file)?.image, loc.addr)?.len() as hsize_t;
        put(
            ginfo,
            H5G_info_t { storage_type: H5G_STORAGE_TYPE_COMPACT, nlinks, max_corder: 0, mounted: 0 },
        );
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Lexists(loc_id: hid_t, name: *const c_char, _lapl_id: hid_t) -> htri_t {
    api("H5Lexists", "unable to get link info", -1, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let parts: Vec<&str> = super::engine::components(name).collect();
        let Some((leaf, dirs)) = parts.split_last() else {
            return Ok(1);
        };
        let prefix = if name.starts_with('/') { format!("/{}", dirs.join("/")) } else { dirs.join("/") };
        let parent = engine.resolve(&loc, &prefix)?;
        let found = links(&engine.file(loc.file)?.image, parent.addr)?.contains_key(*leaf);
        Ok(found as htri_t)
    })
}

/// Parent group and leaf name of an existing link.
fn existing_link(engine: &Engine, loc: &ObjHandle, name: &str) -> Result<(ObjHandle, String), Fault> {
    let parts: Vec<&str> = super::engine::components(name).collect();
    let Some((leaf, dirs)) = parts.split_last() else {
        bail!(Args, BadValue, "no link name given");
    };
    let prefix = if name.starts_with('/') { format!("/{}", dirs.join("/")) } else { dirs.join("/") };
    let parent = engine.resolve(loc, &prefix)?;
    if !links(&engine.file(loc.file)?.image, parent.addr)?.contains_key(*leaf) {
        bail!(Sym, NotFound, "object '{leaf}' doesn't exist");
    }
    Ok((parent, (*leaf).to_owned()))
}

pub unsafe extern "C" fn H5Ldelete(loc_id: hid_t, name: *const c_char, _lapl_id: hid_t) -> herr_t {
    api("H5Ldelete", "unable to delete link", -1, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let (parent, leaf) = existing_link(engine, &loc, name)?;
        let image = &mut engine.writable(loc.file)?.image;
        links_mut(image, parent.addr)?.remove(&leaf);
        engine.rename_open(loc.file, &join(&loc.path, name), None);
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Lmove(
    src_loc: hid_t,
    src_name: *const c_char,
    dst_loc: hid_t,
    dst_name: *const c_char,
    lcpl_id: hid_t,
    _lapl_id: hid_t,
) -> herr_t {
    api("H5Lmove", "unable to move link", -1, |engine| {
        let (src_name, dst_name) = (cstr(src_name)?, cstr(dst_name)?);
        let src = engine.location(src_loc)?;
        let dst = engine.location(dst_loc)?;
        if src.file != dst.file {
            bail!(Link, Unsupported, "moving a link across files is not allowed");
        }
        let (src_parent, src_leaf) = existing_link(engine, &src, src_name)?;
        let intermediate = intermediate(engine, lcpl_id)?;
        let (dst_parent, dst_leaf) = engine.parent_for_create(&dst, dst_name, intermediate)?;
        let image = &mut engine.writable(src.file)?.image;
        let addr = links_mut(image, src_parent.addr)?
            .remove(&src_leaf)
            .ok_or_else(|| fault!(Link, CantMove, "link '{src_leaf}' vanished"))?;
        links_mut(image, dst_parent)?.insert(dst_leaf, addr);
        let (from, to) = (join(&src.path, src_name), join(&dst.path, dst_name));
        engine.rename_open(src.file, &from, Some(&to));
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Lcreate_hard(
    cur_loc: hid_t,
    cur_name: *const c_char,
    dst_loc: hid_t,
    dst_name: *const c_char,
    lcpl_id: hid_t,
    _lapl_id: hid_t,
) -> herr_t {
    api("H5Lcreate_hard", "unable to create link", -1, |engine| {
        let (cur_name, dst_name) = (cstr(cur_name)?, cstr(dst_name)?);
        let cur = engine.location(cur_loc)?;
        let dst = engine.location(dst_loc)?;
        if cur.file != dst.file {
            bail!(Link, Unsupported, "hard links can't cross files");
        }
        let target = engine.resolve(&cur, cur_name)?;
        let intermediate = intermediate(engine, lcpl_id)?;
        let (parent, leaf) = engine.parent_for_create(&dst, dst_name, intermediate)?;
        let image = &mut engine.writable(dst.file)?.image;
        links_mut(image, parent)?.insert(leaf, target.addr);
        Ok(0)
    })
}

/// Iterates over the links of a group in name order, invoking `op` outside
/// the engine lock. On early stop `idx` holds the position after the link
/// that stopped iteration.
pub unsafe extern "C" fn H5Literate(
    grp_id: hid_t,
    idx_type: H5_index_t,
    order: H5_iter_order_t,
    idx: *mut hsize_t,
    op: H5L_iterate_t,
    op_data: *mut c_void,
) -> herr_t {
    let names = api("H5Literate", "link iteration failed", None, |engine| {
        if idx_type != H5_INDEX_NAME {
            bail!(Sym, BadValue, "creation order is not tracked for this group");
        }
        let loc = engine.location(grp_id)?;
        let mut names: Vec<String> = links(&engine.file(loc.file)?.image, loc.addr)?.keys().cloned().collect();
        if order == H5_ITER_DEC {
            names.reverse();
        }
        Ok(Some(names))
    });
    let Some(names) = names else {
        return -1;
    };
    let start = if idx.is_null() { 0 } else { *idx as usize };
    let Some(op) = op else {
        return finish("H5Literate", "link iteration failed", -1, Err(fault!(Args, BadValue, "no operator specified")));
    };
    let info = [0u64; 8];
    for (i, name) in names.iter().enumerate().skip(start) {
        let cname = CString::new(name.as_str()).unwrap_or_default();
        let ret = op(grp_id, cname.as_ptr(), info.as_ptr() as *const c_void, op_data);
        if ret != 0 {
            put(idx, (i + 1) as hsize_t);
            if ret < 0 {
                return finish(
                    "H5Literate",
                    "link iteration failed",
                    ret,
                    Err(fault!(Sym, CantNext, "iteration operator failed")),
                );
            }
            return ret;
        }
    }
    put(idx, names.len() as hsize_t);
    0
}

pub unsafe extern "C" fn H5Oopen(loc_id: hid_t, name: *const c_char, _lapl_id: hid_t) -> hid_t {
    api("H5Oopen", "unable to open object", H5I_INVALID_HID, |engine| {
        let name = cstr(name)?;
        let loc = engine.location(loc_id)?;
        let obj = engine.resolve(&loc, name)?;
        open_object(engine, obj)
    })
}

pub unsafe extern "C" fn H5Oclose(object_id: hid_t) -> herr_t {
    api("H5Oclose", "unable to release object", -1, |engine| {
        if !matches!(engine.payload(object_id)?, Payload::Group(_) | Payload::Dataset(_)) {
            bail!(Args, BadType, "not a valid object");
        }
        engine.dec_ref(object_id)?;
        Ok(0)
    })
}
