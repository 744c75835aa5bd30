//! Files.

use std::fs::{self, OpenOptions};
use std::path::Path;

use super::engine::{api, copy_name, cstr, put, Engine, OpenFile};
use super::errors::Fault;
use super::ids::Payload;
use super::plist::{Plist, PlistClass};
use super::store::{has_hdf5_signature, is_image, FileImage, FileKey};
use crate::sys::h5f::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::types::*;

fn fapl_degree(engine: &Engine, fapl: hid_t) -> Result<H5F_close_degree_t, Fault> {
    match engine.plist(fapl, PlistClass::FileAccess)? {
        Plist::FileAccess { degree: H5F_CLOSE_DEFAULT } => Ok(H5F_CLOSE_WEAK),
        Plist::FileAccess { degree } => Ok(degree),
        _ => Ok(H5F_CLOSE_WEAK),
    }
}

fn file_key(engine: &Engine, id: hid_t) -> Result<FileKey, Fault> {
    match engine.payload(id)? {
        Payload::File(key) => Ok(*key),
        _ => bail!(Args, BadType, "ID {id:#x} is not a file"),
    }
}

pub unsafe extern "C" fn H5Fcreate(
    filename: *const c_char,
    flags: c_uint,
    fcpl_id: hid_t,
    fapl_id: hid_t,
) -> hid_t {
    api("H5Fcreate", "unable to create file", H5I_INVALID_HID, |engine| {
        let name = cstr(filename)?;
        let path = Path::new(name);
        if flags & !(H5F_ACC_TRUNC | H5F_ACC_EXCL | H5F_ACC_RDWR) != 0 {
            bail!(Args, BadValue, "invalid flags {flags:#x}");
        }
        let excl = flags & H5F_ACC_EXCL != 0;
        if excl && path.exists() {
            bail!(File, FileExists, "unable to truncate a file which is already open or exists: name = '{name}'");
        }
        if engine.find_file(path).is_some() {
            bail!(File, FileOpen, "unable to truncate a file which is already open: name = '{name}'");
        }
        let userblock = match engine.plist(fcpl_id, PlistClass::FileCreate)? {
            Plist::FileCreate { userblock } => userblock,
            _ => 0,
        };
        let degree = fapl_degree(engine, fapl_id)?;
        let image = FileImage::new(userblock);
        let mut opts = OpenOptions::new();
        opts.write(true);
        if excl {
            opts.create_new(true);
        } else {
            opts.create(true).truncate(true);
        }
        opts.open(path)
            .map_err(|e| fault!(File, CantOpenFile, "unable to open file: name = '{name}': {e}"))?;
        image
            .save(path)
            .map_err(|e| fault!(Io, WriteError, "unable to write file '{name}': {e}"))?;
        let canonical = fs::canonicalize(path)
            .map_err(|e| fault!(File, CantOpenFile, "unable to open file: name = '{name}': {e}"))?;
        let key = engine.add_file(OpenFile {
            name: name.to_owned(),
            path: canonical,
            image,
            writable: true,
            degree,
            dirty: false,
        });
        Ok(engine.register(Payload::File(key)))
    })
}

pub unsafe extern "C" fn H5Fopen(filename: *const c_char, flags: c_uint, fapl_id: hid_t) -> hid_t {
    api("H5Fopen", "unable to open file", H5I_INVALID_HID, |engine| {
        let name = cstr(filename)?;
        let path = Path::new(name);
        let writable = flags & H5F_ACC_RDWR != 0;
        if flags & (H5F_ACC_TRUNC | H5F_ACC_EXCL) != 0 {
            bail!(Args, BadValue, "invalid flags for opening: {flags:#x}");
        }
        let degree = fapl_degree(engine, fapl_id)?;
        if let Some(key) = engine.find_file(path) {
            let file = engine.file_mut(key)?;
            if writable && !file.writable {
                bail!(File, FileOpen, "file '{name}' is already open for read-only");
            }
            return Ok(engine.register(Payload::File(key)));
        }
        if !path.exists() {
            bail!(File, CantOpenFile, "unable to open file: name = '{name}', errno = 2, error message = 'No such file or directory'");
        }
        let signed = is_image(path)
            .map_err(|e| fault!(File, CantOpenFile, "unable to open file: name = '{name}': {e}"))?;
        if !signed {
            bail!(File, NotHdf5, "file signature not found");
        }
        let image = FileImage::load(path)
            .map_err(|e| fault!(File, ReadError, "unable to read file '{name}': {e}"))?;
        if writable {
            OpenOptions::new()
                .append(true)
                .open(path)
                .map_err(|e| fault!(File, CantOpenFile, "unable to open file for writing: name = '{name}': {e}"))?;
        }
        let canonical = fs::canonicalize(path)
            .map_err(|e| fault!(File, CantOpenFile, "unable to open file: name = '{name}': {e}"))?;
        let key = engine.add_file(OpenFile {
            name: name.to_owned(),
            path: canonical,
            image,
            writable,
            degree,
            dirty: false,
        });
        Ok(engine.register(Payload::File(key)))
    })
}

pub unsafe extern "C" fn H5Fclose(file_id: hid_t) -> herr_t {
    api("H5Fclose", "closing file ID failed", -1, |engine| {
        file_key(engine, file_id)?;
        engine.dec_ref(file_id)?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Fflush(object_id: hid_t, _scope: H5F_scope_t) -> herr_t {
    api("H5Fflush", "unable to flush file", -1, |engine| {
        let key = engine
            .payload(object_id)?
            .file()
            .ok_or_else(|| fault!(Args, BadType, "not a file or file object"))?;
        engine
            .file_mut(key)?
            .flush()
            .map_err(|f| fault!(Io, CantFlush, "{}", f.desc))?;
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Fget_name(obj_id: hid_t, name: *mut c_char, size: size_t) -> ssize_t {
    api("H5Fget_name", "unable to get file name", -1, |engine| {
        let key = engine
            .payload(obj_id)?
            .file()
            .ok_or_else(|| fault!(Args, BadType, "not a file or file object"))?;
        let file = engine.file(key)?;
        Ok(copy_name(&file.name, name, size))
    })
}

pub unsafe extern "C" fn H5Fget_intent(file_id: hid_t, intent: *mut c_uint) -> herr_t {
    api("H5Fget_intent", "unable to get file's intent flags", -1, |engine| {
        let key = file_key(engine, file_id)?;
        let writable = engine.file(key)?.writable;
        put(intent, if writable { H5F_ACC_RDWR } else { H5F_ACC_RDONLY });
        Ok(0)
    })
}

fn open_objects(engine: &Engine, file_id: hid_t, types: c_uint) -> Result<Vec<hid_t>, Fault> {
    let key = file_key(engine, file_id)?;
    Ok(engine.ids.find(|p| {
        p.file() == Some(key)
            && match p {
                Payload::File(_) => types & H5F_OBJ_FILE != 0,
                Payload::Group(_) => types & H5F_OBJ_GROUP != 0,
                Payload::Dataset(_) => types & H5F_OBJ_DATASET != 0,
                Payload::Attribute(_) => types & H5F_OBJ_ATTR != 0,
                _ => false,
            }
    }))
}

pub unsafe extern "C" fn H5Fget_obj_count(file_id: hid_t, types: c_uint) -> ssize_t {
    api("H5Fget_obj_count", "unable to get object count in file(s)", -1, |engine| {
        Ok(open_objects(engine, file_id, types)?.len() as ssize_t)
    })
}

pub unsafe extern "C" fn H5Fget_obj_ids(
    file_id: hid_t,
    types: c_uint,
    max_objs: size_t,
    obj_id_list: *mut hid_t,
) -> ssize_t {
    api("H5Fget_obj_ids", "unable to get object IDs in file(s)", -1, |engine| {
        let ids = open_objects(engine, file_id, types)?;
        let n = ids.len().min(max_objs);
        if n > 0 {
            if obj_id_list.is_null() {
                bail!(Args, BadValue, "null object ID list");
            }
            std::ptr::copy_nonoverlapping(ids.as_ptr(), obj_id_list, n);
        }
        Ok(n as ssize_t)
    })
}

pub unsafe extern "C" fn H5Fis_hdf5(filename: *const c_char) -> htri_t {
    api("H5Fis_hdf5", "unable to determine whether file is accessible as HDF5", -1, |_| {
        let name = cstr(filename)?;
        let signed = has_hdf5_signature(Path::new(name))
            .map_err(|e| fault!(File, CantOpenFile, "unable to open file: name = '{name}': {e}"))?;
        Ok(signed as htri_t)
    })
}

pub unsafe extern "C" fn H5Fget_create_plist(file_id: hid_t) -> hid_t {
    api("H5Fget_create_plist", "unable to get file creation property list", H5I_INVALID_HID, |engine| {
        let key = file_key(engine, file_id)?;
        let userblock = engine.file(key)?.image.userblock;
        Ok(engine.register(Payload::PropList(Plist::FileCreate { userblock })))
    })
}

pub unsafe extern "C" fn H5Fget_access_plist(file_id: hid_t) -> hid_t {
    api("H5Fget_access_plist", "can't get file access property list", H5I_INVALID_HID, |engine| {
        let key = file_key(engine, file_id)?;
        let degree = engine.file(key)?.degree;
        Ok(engine.register(Payload::PropList(Plist::FileAccess { degree })))
    })
}
