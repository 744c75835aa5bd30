//! HDF5 global ids (`H5T_NATIVE_*`, `H5P_CLS_*`, `H5E_*` message ids).
//!
//! Two modes are supported:
//! - `emulated` feature: the engine's predefined ids are compile-time constants
//! - `runtime-loading` feature: ids are read once from the library's `*_g` symbols.
//!   Until the library is loaded every accessor returns `H5I_INVALID_HID`.

#![allow(non_upper_case_globals, non_snake_case)]

pub use crate::sys::{H5I_INVALID_HID, H5P_DEFAULT};

macro_rules! global_ids {
    ($($name:ident = $($sym:literal)|+;)+) => {
        #[cfg(feature = "emulated")]
        mod emulated_impl {
            use crate::sys::hid_t;

            $(
                #[inline]
                pub fn $name() -> hid_t {
                    crate::sys::emulated::globals::$name
                }
            )+
        }

        #[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
        mod runtime_impl {
            use std::sync::OnceLock;

            use crate::sys::hid_t;

            $(
                pub fn $name() -> hid_t {
                    static VALUE: OnceLock<hid_t> = OnceLock::new();
                    super::load_global(&VALUE, &[$($sym),+])
                }
            )+
        }
    };
}

global_ids! {
    H5T_NATIVE_INT8 = "H5T_NATIVE_INT8_g";
    H5T_NATIVE_INT16 = "H5T_NATIVE_INT16_g";
    H5T_NATIVE_INT32 = "H5T_NATIVE_INT32_g";
    H5T_NATIVE_INT64 = "H5T_NATIVE_INT64_g";
    H5T_NATIVE_UINT8 = "H5T_NATIVE_UINT8_g";
    H5T_NATIVE_UINT16 = "H5T_NATIVE_UINT16_g";
    H5T_NATIVE_UINT32 = "H5T_NATIVE_UINT32_g";
    H5T_NATIVE_UINT64 = "H5T_NATIVE_UINT64_g";
    H5T_NATIVE_FLOAT = "H5T_NATIVE_FLOAT_g";
    H5T_NATIVE_DOUBLE = "H5T_NATIVE_DOUBLE_g";
    H5T_C_S1 = "H5T_C_S1_g";
    H5T_STD_REF_OBJ = "H5T_STD_REF_OBJ_g";
    H5T_STD_REF_DSETREG = "H5T_STD_REF_DSETREG_g";
    H5T_STD_B8LE = "H5T_STD_B8LE_g";
    H5T_UNIX_D32LE = "H5T_UNIX_D32LE_g";
    H5T_STD_I32BE = "H5T_STD_I32BE_g";
    H5T_IEEE_F64BE = "H5T_IEEE_F64BE_g";

    H5P_CLS_FILE_CREATE = "H5P_CLS_FILE_CREATE_ID_g";
    H5P_CLS_FILE_ACCESS = "H5P_CLS_FILE_ACCESS_ID_g";
    H5P_CLS_DATASET_CREATE = "H5P_CLS_DATASET_CREATE_ID_g";
    H5P_CLS_DATASET_ACCESS = "H5P_CLS_DATASET_ACCESS_ID_g";
    H5P_CLS_DATASET_XFER = "H5P_CLS_DATASET_XFER_ID_g";
    H5P_CLS_GROUP_CREATE = "H5P_CLS_GROUP_CREATE_ID_g";
    H5P_CLS_LINK_CREATE = "H5P_CLS_LINK_CREATE_ID_g";
    H5P_CLS_ATTRIBUTE_CREATE = "H5P_CLS_ATTRIBUTE_CREATE_ID_g";

    H5E_ERR_CLS = "H5E_ERR_CLS_g";

    H5E_ARGS = "H5E_ARGS_g";
    H5E_FILE = "H5E_FILE_g";
    H5E_IO = "H5E_IO_g";
    H5E_VFL = "H5E_VFL_g";
    H5E_ID = "H5E_ID_g" | "H5E_ATOM_g";
    H5E_SYM = "H5E_SYM_g";
    H5E_LINK = "H5E_LINK_g";
    H5E_DATASET = "H5E_DATASET_g";
    H5E_DATATYPE = "H5E_DATATYPE_g";
    H5E_ATTR = "H5E_ATTR_g";
    H5E_PLIST = "H5E_PLIST_g";

    H5E_NOTFOUND = "H5E_NOTFOUND_g";
    H5E_EXISTS = "H5E_EXISTS_g";
    H5E_ALREADYEXISTS = "H5E_ALREADYEXISTS_g";
    H5E_FILEEXISTS = "H5E_FILEEXISTS_g";
    H5E_FILEOPEN = "H5E_FILEOPEN_g";
    H5E_CANTOPENFILE = "H5E_CANTOPENFILE_g";
    H5E_CANTCLOSEFILE = "H5E_CANTCLOSEFILE_g";
    H5E_NOTHDF5 = "H5E_NOTHDF5_g";
    H5E_READERROR = "H5E_READERROR_g";
    H5E_WRITEERROR = "H5E_WRITEERROR_g";
    H5E_SEEKERROR = "H5E_SEEKERROR_g";
    H5E_TRUNCATED = "H5E_TRUNCATED_g";
    H5E_BADID = "H5E_BADID_g" | "H5E_BADATOM_g";
    H5E_BADTYPE = "H5E_BADTYPE_g";
    H5E_BADVALUE = "H5E_BADVALUE_g";
    H5E_BADRANGE = "H5E_BADRANGE_g";
    H5E_CANTCONVERT = "H5E_CANTCONVERT_g";
    H5E_UNSUPPORTED = "H5E_UNSUPPORTED_g";
    H5E_CANTGET = "H5E_CANTGET_g";
}

/// Read a global id exported as `hid_t NAME_g`, trying each symbol name in turn.
///
/// Nothing is cached while the library is not loaded.
#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
fn load_global(cell: &std::sync::OnceLock<crate::sys::hid_t>, names: &[&str]) -> crate::sys::hid_t {
    use libloading::Symbol;

    if let Some(&id) = cell.get() {
        return id;
    }
    let Some(lib) = crate::sys::funcs::get_library() else {
        return H5I_INVALID_HID;
    };
    for name in names {
        // HDF5 exports these as `hid_t` variables, so the symbol is a pointer to the id.
        let sym: Result<Symbol<*const crate::sys::hid_t>, _> = unsafe { lib.get(name.as_bytes()) };
        if let Ok(ptr) = sym {
            let ptr = *ptr;
            if !ptr.is_null() {
                let id = unsafe { *ptr };
                return *cell.get_or_init(|| id);
            }
        }
    }
    H5I_INVALID_HID
}

#[cfg(feature = "emulated")]
pub use emulated_impl::*;

#[cfg(all(feature = "runtime-loading", not(feature = "emulated")))]
pub use runtime_impl::*;

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;

    #[test]
    fn test_global_ids_are_distinct() {
        let mut ids = vec![
            H5T_NATIVE_INT8(),
            H5T_NATIVE_INT32(),
            H5T_NATIVE_DOUBLE(),
            H5T_C_S1(),
            H5P_CLS_FILE_ACCESS(),
            H5P_CLS_DATASET_CREATE(),
            H5E_NOTFOUND(),
            H5E_BADID(),
            H5E_IO(),
        ];
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(ids.iter().all(|&id| id > 0));
    }
}
