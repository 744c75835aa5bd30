//! Identifier introspection and reference counting.

use super::dtype::predefined;
use super::engine::{api, copy_name, Engine};
use super::errors::{self, ERROR_CLASS_ID};
use super::ids::{is_predefined, Payload};
use super::plist::PlistClass;
use super::store::ROOT_ADDR;
use crate::sys::h5i::*;
use crate::sys::types::*;

/// Kind of a live id, including the predefined ones that have no table entry.
fn live_kind(engine: &Engine, id: hid_t) -> Option<H5I_type_t> {
    if let Some(entry) = engine.ids.get(id) {
        return Some(entry.payload.kind());
    }
    if !is_predefined(id) {
        return None;
    }
    if predefined(id).is_some() {
        Some(H5I_DATATYPE)
    } else if PlistClass::from_id(id).is_some() {
        Some(H5I_GENPROP_CLS)
    } else if id == ERROR_CLASS_ID {
        Some(H5I_ERROR_CLASS)
    } else if errors::message(id).is_some() {
        Some(H5I_ERROR_MSG)
    } else {
        None
    }
}

pub unsafe extern "C" fn H5Iget_type(id: hid_t) -> c_int {
    api("H5Iget_type", "invalid identifier", H5I_BADID as c_int, |engine| {
        Ok(live_kind(engine, id).unwrap_or(H5I_BADID) as c_int)
    })
}

pub unsafe extern "C" fn H5Iis_valid(id: hid_t) -> htri_t {
    api("H5Iis_valid", "can't check identifier", -1, |engine| {
        Ok(live_kind(engine, id).is_some() as htri_t)
    })
}

pub unsafe extern "C" fn H5Iinc_ref(id: hid_t) -> c_int {
    api("H5Iinc_ref", "can't increment ID ref count", -1, |engine| {
        let entry = engine
            .ids
            .get_mut(id)
            .ok_or_else(|| fault!(Id, BadId, "can't locate ID {id:#x}"))?;
        entry.refcount += 1;
        Ok(entry.refcount as c_int)
    })
}

pub unsafe extern "C" fn H5Idec_ref(id: hid_t) -> c_int {
    api("H5Idec_ref", "can't decrement ID ref count", -1, |engine| {
        engine
            .dec_ref(id)
            .map(|n| n as c_int)
            .map_err(|f| if f.minor == errors::Minor::BadId { f } else { fault!(Id, CantDec, "{}", f.desc) })
    })
}

pub unsafe extern "C" fn H5Iget_ref(id: hid_t) -> c_int {
    api("H5Iget_ref", "can't get ID ref count", -1, |engine| {
        Ok(engine.entry(id)?.refcount as c_int)
    })
}

/// New reference to a file id for the file `id` lives in; an existing file id
/// is reused with its count incremented.
pub unsafe extern "C" fn H5Iget_file_id(id: hid_t) -> hid_t {
    api("H5Iget_file_id", "can't retrieve file ID", H5I_INVALID_HID, |engine| {
        let key = engine
            .payload(id)?
            .file()
            .ok_or_else(|| fault!(Args, BadType, "ID {id:#x} does not live in a file"))?;
        if let Some(&existing) = engine.file_ids(key).first() {
            if let Some(entry) = engine.ids.get_mut(existing) {
                entry.refcount += 1;
            }
            return Ok(existing);
        }
        Ok(engine.register(Payload::File(key)))
    })
}

pub unsafe extern "C" fn H5Iget_name(id: hid_t, name: *mut c_char, size: size_t) -> ssize_t {
    api("H5Iget_name", "can't retrieve object name", -1, |engine| {
        let path = match engine.payload(id)? {
            Payload::File(_) => "/".to_owned(),
            Payload::Group(obj) | Payload::Dataset(obj) if obj.addr == ROOT_ADDR => "/".to_owned(),
            Payload::Group(obj) | Payload::Dataset(obj) => obj.path.clone(),
            Payload::Attribute(attr) => attr.owner.path.clone(),
            _ => bail!(Args, BadType, "ID {id:#x} is not a named object"),
        };
        Ok(copy_name(&path, name, size))
    })
}
