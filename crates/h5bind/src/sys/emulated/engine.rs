//! Engine state and the entry/exit protocol shared by every API function.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use parking_lot::Mutex;

use super::dtype::{predefined, NativeType};
use super::errors::{self, Fault};
use super::ids::{AttrHandle, IdEntry, IdTable, ObjHandle, Payload};
use super::plist::{Plist, PlistClass};
use super::space::SpaceState;
use super::store::{FileImage, FileKey, ObjectBody, StoredObject, ROOT_ADDR};
use crate::sys::h5f::*;
use crate::sys::h5p::H5P_DEFAULT;
use crate::sys::types::*;

pub(crate) struct OpenFile {
    /// Name as passed to create/open.
    pub name: String,
    pub path: PathBuf,
    pub image: FileImage,
    pub writable: bool,
    pub degree: H5F_close_degree_t,
    pub dirty: bool,
}

impl OpenFile {
    pub fn flush(&mut self) -> Result<(), Fault> {
        if self.writable && self.dirty {
            self.image
                .save(&self.path)
                .map_err(|e| fault!(Io, WriteError, "unable to write file '{}': {e}", self.name))?;
            self.dirty = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct Engine {
    pub ids: IdTable,
    pub files: HashMap<FileKey, OpenFile>,
    next_file: FileKey,
    /// Strings handed out to callers, released by `H5free_memory`.
    pub allocations: HashSet<usize>,
}

static ENGINE: LazyLock<Mutex<Engine>> = LazyLock::new(|| Mutex::new(Engine::default()));

/// Runs an API function body: clears the calling thread's error stack, runs
/// the body under the engine lock, and on failure records the fault and
/// returns `fail`.
pub(crate) fn api<T>(
    func: &'static str,
    summary: &str,
    fail: T,
    body: impl FnOnce(&mut Engine) -> Result<T, Fault>,
) -> T {
    errors::clear();
    api_noclear(func, summary, fail, body)
}

/// Like [`api`], but leaves the error stack alone (the H5E functions).
pub(crate) fn api_noclear<T>(
    func: &'static str,
    summary: &str,
    fail: T,
    body: impl FnOnce(&mut Engine) -> Result<T, Fault>,
) -> T {
    let result = {
        let mut engine = ENGINE.lock();
        body(&mut engine)
    };
    finish(func, summary, fail, result)
}

/// Records a fault raised outside the engine lock.
pub(crate) fn finish<T>(func: &'static str, summary: &str, fail: T, result: Result<T, Fault>) -> T {
    match result {
        Ok(value) => value,
        Err(fault) => {
            errors::report(func, summary, fault);
            fail
        }
    }
}

pub(crate) fn components(name: &str) -> impl Iterator<Item = &str> {
    name.split('/').filter(|c| !c.is_empty() && *c != ".")
}

/// Absolute, normalized path of `name` relative to `base`.
pub(crate) fn join(base: &str, name: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !name.starts_with('/') {
        parts.extend(components(base));
    }
    parts.extend(components(name));
    format!("/{}", parts.join("/"))
}

pub(crate) fn links(image: &FileImage, addr: u64) -> Result<&BTreeMap<String, u64>, Fault> {
    match image.object(addr) {
        Some(StoredObject { body: ObjectBody::Group { links }, .. }) => Ok(links),
        Some(_) => bail!(Sym, BadType, "object at address {addr} is not a group"),
        None => bail!(Ohdr, NotFound, "no object at address {addr}"),
    }
}

pub(crate) fn links_mut(image: &mut FileImage, addr: u64) -> Result<&mut BTreeMap<String, u64>, Fault> {
    match image.object_mut(addr) {
        Some(StoredObject { body: ObjectBody::Group { links }, .. }) => Ok(links),
        Some(_) => bail!(Sym, BadType, "object at address {addr} is not a group"),
        None => bail!(Ohdr, NotFound, "no object at address {addr}"),
    }
}

impl Engine {
    pub fn register(&mut self, payload: Payload) -> hid_t {
        self.ids.insert(payload)
    }

    pub fn entry(&self, id: hid_t) -> Result<&IdEntry, Fault> {
        self.ids.get(id).ok_or_else(|| fault!(Id, BadId, "can't locate ID {id:#x}"))
    }

    pub fn payload(&self, id: hid_t) -> Result<&Payload, Fault> {
        Ok(&self.entry(id)?.payload)
    }

    pub fn payload_mut(&mut self, id: hid_t) -> Result<&mut Payload, Fault> {
        self.ids
            .get_mut(id)
            .map(|e| &mut e.payload)
            .ok_or_else(|| fault!(Id, BadId, "can't locate ID {id:#x}"))
    }

    /// Object that `id` designates as a location: a file means its root group.
    pub fn location(&self, id: hid_t) -> Result<ObjHandle, Fault> {
        match self.payload(id)? {
            Payload::File(key) => Ok(ObjHandle { file: *key, addr: ROOT_ADDR, path: "/".into() }),
            Payload::Group(obj) | Payload::Dataset(obj) => Ok(obj.clone()),
            _ => bail!(Args, BadType, "ID {id:#x} is not a location"),
        }
    }

    pub fn attr_handle(&self, id: hid_t) -> Result<AttrHandle, Fault> {
        match self.payload(id)? {
            Payload::Attribute(attr) => Ok(attr.clone()),
            _ => bail!(Args, BadType, "ID {id:#x} is not an attribute"),
        }
    }

    pub fn file(&self, key: FileKey) -> Result<&OpenFile, Fault> {
        self.files.get(&key).ok_or_else(|| fault!(File, BadValue, "file {key} is not open"))
    }

    pub fn file_mut(&mut self, key: FileKey) -> Result<&mut OpenFile, Fault> {
        self.files.get_mut(&key).ok_or_else(|| fault!(File, BadValue, "file {key} is not open"))
    }

    /// File about to be modified; fails without write intent.
    pub fn writable(&mut self, key: FileKey) -> Result<&mut OpenFile, Fault> {
        let file = self.file_mut(key)?;
        if !file.writable {
            bail!(Args, WriteError, "no write intent on file '{}'", file.name);
        }
        file.dirty = true;
        Ok(file)
    }

    pub fn object(&self, obj: &ObjHandle) -> Result<&StoredObject, Fault> {
        self.file(obj.file)?
            .image
            .object(obj.addr)
            .ok_or_else(|| fault!(Ohdr, NotFound, "no object at address {}", obj.addr))
    }

    pub fn datatype(&self, id: hid_t) -> Result<NativeType, Fault> {
        if let Some(ty) = predefined(id) {
            return Ok(ty);
        }
        match self.payload(id)? {
            Payload::Datatype(ty) => Ok(ty.clone()),
            _ => bail!(Args, BadType, "ID {id:#x} is not a datatype"),
        }
    }

    pub fn datatype_mut(&mut self, id: hid_t) -> Result<&mut NativeType, Fault> {
        if predefined(id).is_some() {
            bail!(Datatype, CantSet, "datatype is read-only");
        }
        match self.payload_mut(id)? {
            Payload::Datatype(ty) => Ok(ty),
            _ => bail!(Args, BadType, "ID {id:#x} is not a datatype"),
        }
    }

    pub fn space(&self, id: hid_t) -> Result<&SpaceState, Fault> {
        match self.payload(id)? {
            Payload::Dataspace(space) => Ok(space),
            _ => bail!(Args, BadType, "ID {id:#x} is not a dataspace"),
        }
    }

    pub fn space_mut(&mut self, id: hid_t) -> Result<&mut SpaceState, Fault> {
        match self.payload_mut(id)? {
            Payload::Dataspace(space) => Ok(space),
            _ => bail!(Args, BadType, "ID {id:#x} is not a dataspace"),
        }
    }

    /// Property list of `class`; `H5P_DEFAULT` yields the class defaults.
    pub fn plist(&self, id: hid_t, class: PlistClass) -> Result<Plist, Fault> {
        if id == H5P_DEFAULT {
            return Ok(Plist::new(class));
        }
        match self.payload(id)? {
            Payload::PropList(plist) if plist.class() == class => Ok(plist.clone()),
            Payload::PropList(plist) => bail!(
                Plist,
                BadType,
                "property list is a {} list, expected {}",
                plist.class().name(),
                class.name()
            ),
            _ => bail!(Args, BadType, "ID {id:#x} is not a property list"),
        }
    }

    pub fn plist_mut(&mut self, id: hid_t) -> Result<&mut Plist, Fault> {
        match self.payload_mut(id)? {
            Payload::PropList(plist) => Ok(plist),
            _ => bail!(Args, BadType, "ID {id:#x} is not a property list"),
        }
    }

    /// Follows every component of `name` starting at `loc`.
    pub fn resolve(&self, loc: &ObjHandle, name: &str) -> Result<ObjHandle, Fault> {
        let image = &self.file(loc.file)?.image;
        let mut addr = if name.starts_with('/') { ROOT_ADDR } else { loc.addr };
        for part in components(name) {
            addr = *links(image, addr)?
                .get(part)
                .ok_or_else(|| fault!(Sym, NotFound, "object '{part}' doesn't exist"))?;
        }
        Ok(ObjHandle { file: loc.file, addr, path: join(&loc.path, name) })
    }

    /// Parent group address and leaf name for a link about to be created,
    /// creating missing intermediate groups when asked to.
    pub fn parent_for_create(
        &mut self,
        loc: &ObjHandle,
        name: &str,
        intermediate: bool,
    ) -> Result<(u64, String), Fault> {
        let parts: Vec<&str> = components(name).collect();
        let Some((leaf, dirs)) = parts.split_last() else {
            bail!(Args, BadValue, "no name given");
        };
        let image = &mut self.writable(loc.file)?.image;
        let mut addr = if name.starts_with('/') { ROOT_ADDR } else { loc.addr };
        for part in dirs {
            let next = links(image, addr)?.get(*part).copied();
            addr = match next {
                Some(child) => child,
                None if intermediate => {
                    let child = image.push(StoredObject {
                        body: ObjectBody::Group { links: BTreeMap::new() },
                        attrs: Vec::new(),
                    });
                    links_mut(image, addr)?.insert((*part).to_owned(), child);
                    child
                }
                None => bail!(Sym, NotFound, "component '{part}' not found"),
            };
        }
        if links(image, addr)?.contains_key(*leaf) {
            bail!(Link, Exists, "name '{leaf}' already exists");
        }
        Ok((addr, (*leaf).to_owned()))
    }

    /// Adds a new object under `parent/leaf` and returns its address.
    pub fn insert_object(
        &mut self,
        key: FileKey,
        parent: u64,
        leaf: &str,
        object: StoredObject,
    ) -> Result<u64, Fault> {
        let image = &mut self.writable(key)?.image;
        let addr = image.push(object);
        links_mut(image, parent)?.insert(leaf.to_owned(), addr);
        Ok(addr)
    }

    /// Open file matching `path`, if any.
    pub fn find_file(&self, path: &Path) -> Option<FileKey> {
        let canonical = fs::canonicalize(path).ok()?;
        self.files.iter().find(|(_, f)| f.path == canonical).map(|(k, _)| *k)
    }

    pub fn add_file(&mut self, file: OpenFile) -> FileKey {
        self.next_file += 1;
        self.files.insert(self.next_file, file);
        self.next_file
    }

    /// Ids of still-open objects living in the file, file ids excluded.
    pub fn children_of(&self, key: FileKey) -> Vec<hid_t> {
        self.ids
            .find(|p| !matches!(p, Payload::File(_)) && p.file() == Some(key))
    }

    pub fn file_ids(&self, key: FileKey) -> Vec<hid_t> {
        self.ids.find(|p| matches!(p, Payload::File(k) if *k == key))
    }

    /// Drops one reference; the last one closes the id. Returns the count left.
    pub fn dec_ref(&mut self, id: hid_t) -> Result<u32, Fault> {
        let entry = self
            .ids
            .get_mut(id)
            .ok_or_else(|| fault!(Id, BadId, "can't locate ID {id:#x}"))?;
        if entry.refcount > 1 {
            entry.refcount -= 1;
            return Ok(entry.refcount);
        }
        self.close_id(id)?;
        Ok(0)
    }

    fn close_id(&mut self, id: hid_t) -> Result<(), Fault> {
        if let Payload::File(key) = *self.payload(id)? {
            if self.file_ids(key).len() == 1 {
                let children = self.children_of(key);
                match self.file(key)?.degree {
                    H5F_CLOSE_SEMI if !children.is_empty() => bail!(
                        File,
                        CantCloseFile,
                        "can't close file, there are {} objects still open",
                        children.len()
                    ),
                    H5F_CLOSE_STRONG => {
                        for child in children {
                            self.ids.remove(child);
                        }
                    }
                    _ => {}
                }
            }
            self.ids.remove(id);
            return self.release_if_unused(key);
        }
        let entry = self.ids.remove(id);
        match entry.and_then(|e| e.payload.file()) {
            Some(key) => self.release_if_unused(key),
            None => Ok(()),
        }
    }

    /// Flushes and forgets a file once no id refers to it.
    fn release_if_unused(&mut self, key: FileKey) -> Result<(), Fault> {
        if !self.ids.find(|p| p.file() == Some(key)).is_empty() {
            return Ok(());
        }
        match self.files.remove(&key) {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Rewrites the recorded paths of open handles after a link moved or was
    /// deleted; `to == None` marks them anonymous.
    pub fn rename_open(&mut self, key: FileKey, from: &str, to: Option<&str>) {
        let rename = |obj: &mut ObjHandle| {
            if obj.file != key {
                return;
            }
            let matches = obj.path == from
                || obj.path.strip_prefix(from).is_some_and(|rest| rest.starts_with('/'));
            if matches {
                obj.path = match to {
                    Some(to) => format!("{to}{}", &obj.path[from.len()..]),
                    None => String::new(),
                };
            }
        };
        for id in self.ids.find(|p| p.file() == Some(key)) {
            if let Some(entry) = self.ids.get_mut(id) {
                match &mut entry.payload {
                    Payload::Group(obj) | Payload::Dataset(obj) => rename(obj),
                    Payload::Attribute(attr) => rename(&mut attr.owner),
                    _ => {}
                }
            }
        }
    }

    /// Hands a copy of `text` to the caller; freed with `H5free_memory`.
    pub fn alloc_string(&mut self, text: &str) -> *mut c_char {
        let raw = CString::new(text.replace('\0', "")).unwrap_or_default().into_raw();
        self.allocations.insert(raw as usize);
        raw
    }
}

/// Borrows a C string argument.
pub(crate) unsafe fn cstr<'a>(ptr: *const c_char) -> Result<&'a str, Fault> {
    if ptr.is_null() {
        bail!(Args, BadValue, "null string argument");
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| fault!(Args, BadValue, "string argument is not valid UTF-8"))
}

/// Borrows an array argument; a null pointer is only accepted for empty arrays.
pub(crate) unsafe fn slice<'a, T>(ptr: *const T, len: usize) -> Result<&'a [T], Fault> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        bail!(Args, BadValue, "null array argument");
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

pub(crate) unsafe fn slice_mut<'a, T>(ptr: *mut T, len: usize) -> Result<&'a mut [T], Fault> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        bail!(Args, BadValue, "null buffer argument");
    }
    Ok(std::slice::from_raw_parts_mut(ptr, len))
}

/// `get_name` convention: copies at most `size - 1` bytes plus a NUL and
/// returns the full length.
pub(crate) unsafe fn copy_name(text: &str, buf: *mut c_char, size: size_t) -> ssize_t {
    if !buf.is_null() && size > 0 {
        let n = text.len().min(size - 1);
        std::ptr::copy_nonoverlapping(text.as_ptr() as *const c_char, buf, n);
        *buf.add(n) = 0;
    }
    text.len() as ssize_t
}

/// Writes through an optional out-pointer.
pub(crate) unsafe fn put<T>(ptr: *mut T, value: T) {
    if !ptr.is_null() {
        *ptr = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_normalizes() {
        assert_eq!(join("/", "a/b"), "/a/b");
        assert_eq!(join("/a", "./b//c"), "/a/b/c");
        assert_eq!(join("/a", "/x"), "/x");
        assert_eq!(join("/", "."), "/");
    }

    #[test]
    fn test_copy_name_truncates() {
        let mut buf = [0 as c_char; 4];
        let len = unsafe { copy_name("abcdef", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(len, 6);
        let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(text.to_str().unwrap(), "abc");
    }
}
