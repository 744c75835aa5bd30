//! Identifier table.
//!
//! Ids carry their type in the top byte, like the real library, so that
//! `H5Iget_type` works on stale ids and predefined ids need no table entry.

use std::collections::HashMap;

use super::dtype::NativeType;
use super::errors::ErrorRecord;
use super::plist::Plist;
use super::space::SpaceState;
use super::store::FileKey;
use crate::sys::h5i::*;
use crate::sys::types::*;

const TYPE_SHIFT: u32 = 56;
const SERIAL_MASK: i64 = (1 << TYPE_SHIFT) - 1;
const FIRST_DYNAMIC: i64 = 1 << 16;

pub(crate) const fn make_id(kind: H5I_type_t, serial: i64) -> hid_t {
    ((kind as i64) << TYPE_SHIFT) | (serial & SERIAL_MASK)
}

pub(crate) fn serial(id: hid_t) -> i64 {
    id & SERIAL_MASK
}

pub(crate) fn is_predefined(id: hid_t) -> bool {
    id > 0 && serial(id) < FIRST_DYNAMIC
}

/// Open object inside a file.
#[derive(Clone, Debug)]
pub(crate) struct ObjHandle {
    pub file: FileKey,
    pub addr: u64,
    pub path: String,
}

#[derive(Clone, Debug)]
pub(crate) struct AttrHandle {
    pub owner: ObjHandle,
    pub name: String,
}

#[derive(Clone, Debug)]
pub(crate) enum Payload {
    File(FileKey),
    Group(ObjHandle),
    Dataset(ObjHandle),
    Attribute(AttrHandle),
    Datatype(NativeType),
    Dataspace(SpaceState),
    PropList(Plist),
    ErrorStack(Vec<ErrorRecord>),
}

impl Payload {
    pub fn kind(&self) -> H5I_type_t {
        match self {
            Payload::File(_) => H5I_FILE,
            Payload::Group(_) => H5I_GROUP,
            Payload::Dataset(_) => H5I_DATASET,
            Payload::Attribute(_) => H5I_ATTR,
            Payload::Datatype(_) => H5I_DATATYPE,
            Payload::Dataspace(_) => H5I_DATASPACE,
            Payload::PropList(_) => H5I_GENPROP_LST,
            Payload::ErrorStack(_) => H5I_ERROR_STACK,
        }
    }

    /// File the id belongs to, for objects living inside a file.
    pub fn file(&self) -> Option<FileKey> {
        match self {
            Payload::File(key) => Some(*key),
            Payload::Group(obj) | Payload::Dataset(obj) => Some(obj.file),
            Payload::Attribute(attr) => Some(attr.owner.file),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct IdEntry {
    pub refcount: u32,
    pub payload: Payload,
}

#[derive(Debug, Default)]
pub(crate) struct IdTable {
    entries: HashMap<hid_t, IdEntry>,
    next: i64,
}

impl IdTable {
    pub fn insert(&mut self, payload: Payload) -> hid_t {
        if self.next < FIRST_DYNAMIC {
            self.next = FIRST_DYNAMIC;
        }
        let id = make_id(payload.kind(), self.next);
        self.next += 1;
        self.entries.insert(id, IdEntry { refcount: 1, payload });
        id
    }

    pub fn get(&self, id: hid_t) -> Option<&IdEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: hid_t) -> Option<&mut IdEntry> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: hid_t) -> Option<IdEntry> {
        self.entries.remove(&id)
    }

    /// Ids whose payload satisfies `pred`, in allocation order.
    pub fn find<F>(&self, pred: F) -> Vec<hid_t>
    where
        F: Fn(&Payload) -> bool,
    {
        let mut ids: Vec<hid_t> = self
            .entries
            .iter()
            .filter(|(_, entry)| pred(&entry.payload))
            .map(|(&id, _)| id)
            .collect();
        ids.sort_by_key(|&id| serial(id));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_bits_survive_removal() {
        let mut table = IdTable::default();
        let id = table.insert(Payload::ErrorStack(Vec::new()));
        assert_eq!(H5I_type_t::from_raw((id >> TYPE_SHIFT) as c_int), H5I_ERROR_STACK);
        assert!(!is_predefined(id));
        table.remove(id);
        assert!(table.get(id).is_none());
        assert_eq!(H5I_type_t::from_raw((id >> TYPE_SHIFT) as c_int), H5I_ERROR_STACK);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut table = IdTable::default();
        let a = table.insert(Payload::ErrorStack(Vec::new()));
        table.remove(a);
        let b = table.insert(Payload::ErrorStack(Vec::new()));
        assert_ne!(a, b);
    }
}
