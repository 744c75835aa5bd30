//! Values of the library's global ids (`H5T_NATIVE_INT32_g`, ...).

#![allow(non_upper_case_globals)]

use super::dtype;
use super::errors::{Major, Minor, ERROR_CLASS_ID};
use super::plist::PlistClass;
use crate::sys::types::hid_t;

pub const H5T_NATIVE_INT8: hid_t = dtype::NATIVE_INT8;
pub const H5T_NATIVE_INT16: hid_t = dtype::NATIVE_INT16;
pub const H5T_NATIVE_INT32: hid_t = dtype::NATIVE_INT32;
pub const H5T_NATIVE_INT64: hid_t = dtype::NATIVE_INT64;
pub const H5T_NATIVE_UINT8: hid_t = dtype::NATIVE_UINT8;
pub const H5T_NATIVE_UINT16: hid_t = dtype::NATIVE_UINT16;
pub const H5T_NATIVE_UINT32: hid_t = dtype::NATIVE_UINT32;
pub const H5T_NATIVE_UINT64: hid_t = dtype::NATIVE_UINT64;
pub const H5T_NATIVE_FLOAT: hid_t = dtype::NATIVE_FLOAT;
pub const H5T_NATIVE_DOUBLE: hid_t = dtype::NATIVE_DOUBLE;
pub const H5T_C_S1: hid_t = dtype::C_S1;
pub const H5T_STD_REF_OBJ: hid_t = dtype::STD_REF_OBJ;
pub const H5T_STD_REF_DSETREG: hid_t = dtype::STD_REF_DSETREG;
pub const H5T_STD_B8LE: hid_t = dtype::STD_B8LE;
pub const H5T_UNIX_D32LE: hid_t = dtype::UNIX_D32LE;
pub const H5T_STD_I32BE: hid_t = dtype::STD_I32BE;
pub const H5T_IEEE_F64BE: hid_t = dtype::IEEE_F64BE;

pub const H5P_CLS_FILE_CREATE: hid_t = PlistClass::FileCreate.id();
pub const H5P_CLS_FILE_ACCESS: hid_t = PlistClass::FileAccess.id();
pub const H5P_CLS_DATASET_CREATE: hid_t = PlistClass::DatasetCreate.id();
pub const H5P_CLS_DATASET_ACCESS: hid_t = PlistClass::DatasetAccess.id();
pub const H5P_CLS_DATASET_XFER: hid_t = PlistClass::DatasetXfer.id();
pub const H5P_CLS_GROUP_CREATE: hid_t = PlistClass::GroupCreate.id();
pub const H5P_CLS_LINK_CREATE: hid_t = PlistClass::LinkCreate.id();
pub const H5P_CLS_ATTRIBUTE_CREATE: hid_t = PlistClass::AttributeCreate.id();

pub const H5E_ERR_CLS: hid_t = ERROR_CLASS_ID;

pub const H5E_ARGS: hid_t = Major::Args.id();
pub const H5E_FILE: hid_t = Major::File.id();
pub const H5E_IO: hid_t = Major::Io.id();
pub const H5E_VFL: hid_t = Major::Vfl.id();
pub const H5E_ID: hid_t = Major::Id.id();
pub const H5E_SYM: hid_t = Major::Sym.id();
pub const H5E_LINK: hid_t = Major::Link.id();
pub const H5E_DATASET: hid_t = Major::Dataset.id();
pub const H5E_DATATYPE: hid_t = Major::Datatype.id();
pub const H5E_ATTR: hid_t = Major::Attr.id();
pub const H5E_PLIST: hid_t = Major::Plist.id();

pub const H5E_NOTFOUND: hid_t = Minor::NotFound.id();
pub const H5E_EXISTS: hid_t = Minor::Exists.id();
pub const H5E_ALREADYEXISTS: hid_t = Minor::AlreadyExists.id();
pub const H5E_FILEEXISTS: hid_t = Minor::FileExists.id();
pub const H5E_FILEOPEN: hid_t = Minor::FileOpen.id();
pub const H5E_CANTOPENFILE: hid_t = Minor::CantOpenFile.id();
pub const H5E_CANTCLOSEFILE: hid_t = Minor::CantCloseFile.id();
pub const H5E_NOTHDF5: hid_t = Minor::NotHdf5.id();
pub const H5E_READERROR: hid_t = Minor::ReadError.id();
pub const H5E_WRITEERROR: hid_t = Minor::WriteError.id();
pub const H5E_SEEKERROR: hid_t = Minor::SeekError.id();
pub const H5E_TRUNCATED: hid_t = Minor::Truncated.id();
pub const H5E_BADID: hid_t = Minor::BadId.id();
pub const H5E_BADTYPE: hid_t = Minor::BadType.id();
pub const H5E_BADVALUE: hid_t = Minor::BadValue.id();
pub const H5E_BADRANGE: hid_t = Minor::BadRange.id();
pub const H5E_CANTCONVERT: hid_t = Minor::CantConvert.id();
pub const H5E_UNSUPPORTED: hid_t = Minor::Unsupported.id();
pub const H5E_CANTGET: hid_t = Minor::CantGet.id();
