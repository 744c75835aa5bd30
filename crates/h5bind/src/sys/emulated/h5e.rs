//! Error stack access.

use super::engine::{api_noclear, copy_name, finish, put, Engine};
use super::errors::{self, ErrorRecord, Fault, ERROR_CLASS_ID};
use super::ids::Payload;
use crate::sys::h5e::*;
use crate::sys::h5i::H5I_INVALID_HID;
use crate::sys::types::*;

/// Moves the calling thread's stack into a new error-stack id.
pub unsafe extern "C" fn H5Eget_current_stack() -> hid_t {
    api_noclear("H5Eget_current_stack", "can't get current error stack", H5I_INVALID_HID, |engine| {
        Ok(engine.register(Payload::ErrorStack(errors::take())))
    })
}

pub unsafe extern "C" fn H5Eclose_stack(estack: hid_t) -> herr_t {
    api_noclear("H5Eclose_stack", "can't close error stack", -1, |engine| {
        match engine.payload(estack)? {
            Payload::ErrorStack(_) => {
                engine.dec_ref(estack)?;
                Ok(0)
            }
            _ => bail!(Args, BadType, "not an error stack ID"),
        }
    })
}

fn records(engine: &Engine, estack: hid_t) -> Result<Vec<ErrorRecord>, Fault> {
    if estack == H5E_DEFAULT {
        return Ok(errors::snapshot());
    }
    match engine.payload(estack)? {
        Payload::ErrorStack(records) => Ok(records.clone()),
        _ => bail!(Args, BadType, "not an error stack ID"),
    }
}

pub unsafe extern "C" fn H5Eget_num(estack: hid_t) -> ssize_t {
    api_noclear("H5Eget_num", "can't get number of error messages", -1, |engine| {
        Ok(records(engine, estack)?.len() as ssize_t)
    })
}

/// Walks a stack, calling `func` once per record outside the engine lock.
pub unsafe extern "C" fn H5Ewalk2(
    estack: hid_t,
    direction: H5E_direction_t,
    func: H5E_walk2_t,
    client_data: *mut c_void,
) -> herr_t {
    let mut stack = api_noclear("H5Ewalk2", "can't walk error stack", None, |engine| {
        records(engine, estack).map(Some)
    });
    let Some(stack) = stack.as_mut() else {
        return -1;
    };
    let Some(func) = func else {
        return 0;
    };
    if direction == H5E_WALK_DOWNWARD {
        stack.reverse();
    }
    for (n, rec) in stack.iter().enumerate() {
        let desc = H5E_error2_t {
            cls_id: ERROR_CLASS_ID,
            maj_num: rec.major.id(),
            min_num: rec.minor.id(),
            line: rec.line,
            func_name: rec.func.as_ptr(),
            file_name: rec.file.as_ptr(),
            desc: rec.desc.as_ptr(),
        };
        let ret = func(n as c_uint, &desc, client_data);
        if ret > 0 {
            break;
        }
        if ret < 0 {
            return finish(
                "H5Ewalk2",
                "can't walk error stack",
                -1,
                Err(fault!(Args, CantNext, "walk callback failed with {ret}")),
            );
        }
    }
    0
}

pub unsafe extern "C" fn H5Eget_msg(
    msg_id: hid_t,
    type_: *mut c_int,
    msg: *mut c_char,
    size: size_t,
) -> ssize_t {
    api_noclear("H5Eget_msg", "can't get error message text", -1, |_| {
        let (is_major, text) = errors::message(msg_id)
            .ok_or_else(|| fault!(Args, BadType, "not an error message ID"))?;
        put(type_, if is_major { H5E_MAJOR as c_int } else { H5E_MINOR as c_int });
        Ok(copy_name(text, msg, size))
    })
}

pub unsafe extern "C" fn H5Eset_auto2(estack: hid_t, func: H5E_auto2_t, client_data: *mut c_void) -> herr_t {
    api_noclear("H5Eset_auto2", "can't set automatic error reporting", -1, |_| {
        if estack != H5E_DEFAULT {
            bail!(Args, Unsupported, "automatic reporting is only kept for the default stack");
        }
        errors::set_auto(func, client_data);
        Ok(0)
    })
}

pub unsafe extern "C" fn H5Eclear2(estack: hid_t) -> herr_t {
    api_noclear("H5Eclear2", "can't clear error stack", -1, |engine| {
        if estack == H5E_DEFAULT {
            errors::clear();
            return Ok(0);
        }
        match engine.payload_mut(estack)? {
            Payload::ErrorStack(records) => {
                records.clear();
                Ok(0)
            }
            _ => bail!(Args, BadType, "not an error stack ID"),
        }
    })
}
