//! Property list classes and their option values.

use serde::{Deserialize, Serialize};

use super::dtype::NativeType;
use super::ids::make_id;
use crate::sys::h5d::*;
use crate::sys::h5f::*;
use crate::sys::h5i::H5I_GENPROP_CLS;
use crate::sys::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlistClass {
    FileCreate,
    FileAccess,
    DatasetCreate,
    DatasetAccess,
    DatasetXfer,
    GroupCreate,
    LinkCreate,
    AttributeCreate,
}

impl PlistClass {
    pub(crate) const ALL: [PlistClass; 8] = [
        PlistClass::FileCreate,
        PlistClass::FileAccess,
        PlistClass::DatasetCreate,
        PlistClass::DatasetAccess,
        PlistClass::DatasetXfer,
        PlistClass::GroupCreate,
        PlistClass::LinkCreate,
        PlistClass::AttributeCreate,
    ];

    pub(crate) const fn id(self) -> hid_t {
        make_id(H5I_GENPROP_CLS, 1 + self as i64)
    }

    pub(crate) fn from_id(id: hid_t) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            PlistClass::FileCreate => "file create",
            PlistClass::FileAccess => "file access",
            PlistClass::DatasetCreate => "dataset create",
            PlistClass::DatasetAccess => "dataset access",
            PlistClass::DatasetXfer => "data transfer",
            PlistClass::GroupCreate => "group create",
            PlistClass::LinkCreate => "link create",
            PlistClass::AttributeCreate => "attribute create",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FilterEntry {
    pub id: c_int,
    pub flags: c_uint,
    pub cd_values: Vec<c_uint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FillValue {
    pub ty: NativeType,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DatasetCreate {
    pub layout: i32,
    pub chunk: Option<Vec<u64>>,
    pub filters: Vec<FilterEntry>,
    pub fill: Option<FillValue>,
}

impl Default for DatasetCreate {
    fn default() -> Self {
        Self { layout: H5D_CONTIGUOUS as i32, chunk: None, filters: Vec::new(), fill: None }
    }
}

pub(crate) const DEFAULT_XFER_BUFFER: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Plist {
    FileCreate { userblock: u64 },
    FileAccess { degree: H5F_close_degree_t },
    DatasetCreate(DatasetCreate),
    DatasetAccess,
    DatasetXfer { buffer: usize },
    GroupCreate,
    LinkCreate { intermediate: bool },
    AttributeCreate,
}

impl Plist {
    pub fn new(class: PlistClass) -> Self {
        match class {
            PlistClass::FileCreate => Plist::FileCreate { userblock: 0 },
            PlistClass::FileAccess => Plist::FileAccess { degree: H5F_CLOSE_DEFAULT },
            PlistClass::DatasetCreate => Plist::DatasetCreate(DatasetCreate::default()),
            PlistClass::DatasetAccess => Plist::DatasetAccess,
            PlistClass::DatasetXfer => Plist::DatasetXfer { buffer: DEFAULT_XFER_BUFFER },
            PlistClass::GroupCreate => Plist::GroupCreate,
            PlistClass::LinkCreate => Plist::LinkCreate { intermediate: false },
            PlistClass::AttributeCreate => Plist::AttributeCreate,
        }
    }

    pub fn class(&self) -> PlistClass {
        match self {
            Plist::FileCreate { .. } => PlistClass::FileCreate,
            Plist::FileAccess { .. } => PlistClass::FileAccess,
            Plist::DatasetCreate(_) => PlistClass::DatasetCreate,
            Plist::DatasetAccess => PlistClass::DatasetAccess,
            Plist::DatasetXfer { .. } => PlistClass::DatasetXfer,
            Plist::GroupCreate => PlistClass::GroupCreate,
            Plist::LinkCreate { .. } => PlistClass::LinkCreate,
            Plist::AttributeCreate => PlistClass::AttributeCreate,
        }
    }
}

/// Filters the engine knows about. Data is stored unfiltered; the pipeline is
/// recorded so that it round-trips through the file.
pub(crate) fn filter_name(id: c_int) -> Option<&'static str> {
    use crate::sys::h5z::*;
    match id {
        H5Z_FILTER_DEFLATE => Some("deflate"),
        H5Z_FILTER_SHUFFLE => Some("shuffle"),
        H5Z_FILTER_FLETCHER32 => Some("fletcher32"),
        H5Z_FILTER_NBIT => Some("nbit"),
        H5Z_FILTER_SCALEOFFSET => Some("scaleoffset"),
        _ => None,
    }
}
