//! HDF5 File handle.

use std::fmt;
use std::ops::Deref;
use std::path::Path;

use crate::class::ObjectClass;
use crate::config;
use crate::error::{h5check, Result};
use crate::handle::{IdKind, ObjectId};
use crate::hl::group::Group;
use crate::hl::plist::{CloseDegree, PropertyClass, PropertyList};
use crate::registry;
use crate::sys::{
    c_char, c_uint, hid_t, H5F_scope_t, H5Fcreate, H5Fflush, H5Fget_access_plist,
    H5Fget_create_plist, H5Fget_intent, H5Fget_name, H5Fget_obj_count, H5Fget_obj_ids,
    H5Fis_hdf5, H5Fopen, H5F_ACC_EXCL, H5F_ACC_RDONLY, H5F_ACC_RDWR, H5F_ACC_TRUNC,
    H5F_OBJ_ALL, H5F_OBJ_FILE, H5F_OBJ_LOCAL,
};
use crate::util::{get_h5_str, to_cstring};

/// File open mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file read-only.
    #[default]
    Read,
    /// Open an existing file for reading and writing.
    ReadWrite,
    /// Create a new file; fail if it exists.
    Create,
    /// Create a new file, truncating any existing one.
    Truncate,
}

/// An HDF5 file.
///
/// A file is also the root group of its hierarchy: every [`Group`] method works on it.
#[derive(Clone)]
pub struct File(Group);

impl ObjectClass for File {
    const NAME: &'static str = "file";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::File];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        Ok(Self(Group::from_parts(id.clone(), id)))
    }

    fn id(&self) -> &ObjectId {
        self.0.id()
    }

    fn short_repr(&self) -> Option<String> {
        let name = self.filename().ok()?;
        let mode = if self.is_read_only().ok()? { "read-only" } else { "read/write" };
        Some(format!("{name:?} ({mode})"))
    }

    fn close(&self) -> Result<()> {
        File::close(self)
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

impl Deref for File {
    type Target = Group;

    fn deref(&self) -> &Group {
        &self.0
    }
}

impl File {
    /// Create a file, truncating any existing one.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options().mode(OpenMode::Truncate).open(path)
    }

    /// Create a file; fails with `AlreadyExists` if it exists.
    pub fn create_excl<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options().mode(OpenMode::Create).open(path)
    }

    /// Open an existing file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options().mode(OpenMode::Read).open(path)
    }

    /// Open an existing file for reading and writing.
    pub fn open_rw<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options().mode(OpenMode::ReadWrite).open(path)
    }

    pub fn with_options() -> FileBuilder {
        FileBuilder::new()
    }

    pub(crate) fn from_handle(id: ObjectId) -> Result<Self> {
        Self::from_id(id)
    }

    fn raw(&self) -> hid_t {
        self.id().raw()
    }

    /// `true` if `path` holds an HDF5 file.
    pub fn is_hdf5<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path_str(path.as_ref())?;
        let c_path = to_cstring(path)?;
        Ok(h5try!(H5Fis_hdf5(c_path.as_ptr())) > 0)
    }

    /// Name the file was opened with.
    pub fn filename(&self) -> Result<String> {
        self.id().ensure_valid()?;
        let raw = self.raw();
        h5lock!(get_h5_str(|buf: *mut c_char, size| H5Fget_name(raw, buf, size)))
    }

    pub fn is_read_only(&self) -> Result<bool> {
        self.id().ensure_valid()?;
        let mut intent: c_uint = 0;
        h5try!(H5Fget_intent(self.raw(), &mut intent));
        Ok(intent & H5F_ACC_RDWR == 0)
    }

    /// Write buffered changes to disk.
    pub fn flush(&self) -> Result<()> {
        self.id().ensure_valid()?;
        h5call!(H5Fflush(self.raw(), H5F_scope_t::H5F_SCOPE_LOCAL)).map(drop)
    }

    /// Number of open ids in this file, file ids included.
    pub fn obj_count(&self) -> Result<usize> {
        self.id().ensure_valid()?;
        Ok(h5try!(H5Fget_obj_count(self.raw(), H5F_OBJ_ALL)) as usize)
    }

    pub fn create_plist(&self) -> Result<PropertyList> {
        self.id().ensure_valid()?;
        PropertyList::from_raw(h5try!(H5Fget_create_plist(self.raw())))
    }

    pub fn access_plist(&self) -> Result<PropertyList> {
        self.id().ensure_valid()?;
        PropertyList::from_raw(h5try!(H5Fget_access_plist(self.raw())))
    }

    /// The root group, as its own group handle.
    pub fn root(&self) -> Result<Group> {
        self.group("/")
    }

    /// Raw ids of every group, dataset, datatype and attribute open in this file.
    fn open_children(&self) -> Result<Vec<hid_t>> {
        let types = (H5F_OBJ_ALL & !H5F_OBJ_FILE) | H5F_OBJ_LOCAL;
        let count = h5try!(H5Fget_obj_count(self.raw(), types)) as usize;
        let mut ids: Vec<hid_t> = vec![0; count];
        if count > 0 {
            let n = h5try!(H5Fget_obj_ids(self.raw(), types, count, ids.as_mut_ptr()));
            ids.truncate(n as usize);
        }
        Ok(ids)
    }

    /// Close the file according to its close degree.
    ///
    /// * `Strong`: objects still open in the file are closed with it and their
    ///   wrappers become invalid.
    /// * `Semi`: fails with `IoFailure` while objects are open; the file stays open.
    /// * `Weak`: the library keeps the file open until its last object closes.
    ///
    /// Closing an already closed file is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.id().is_closed() {
            return Ok(());
        }
        h5lock!({
            self.id().ensure_valid()?;
            let degree = self.access_plist()?.fclose_degree()?;
            let last = h5check(H5Fget_obj_count(self.raw(), H5F_OBJ_FILE))? == 1;
            let children = if last { self.open_children()? } else { Vec::new() };
            tracing::debug!(id = self.raw(), degree = %degree, open = children.len(), "closing file");
            match degree {
                CloseDegree::Semi if !children.is_empty() => fail!(
                    IoFailure,
                    "cannot close file {:?}: {} objects are still open",
                    self.filename().unwrap_or_default(),
                    children.len()
                ),
                CloseDegree::Strong => {
                    let name = self.filename().unwrap_or_default();
                    self.id().close()?;
                    for child in children {
                        if registry::lookup(child).is_some_and(|obj| obj.invalidate()) {
                            tracing::warn!(id = child, file = %name, "closing the file invalidated an open object");
                        }
                    }
                    Ok(())
                }
                _ => self.id().close(),
            }
        })
    }
}

fn path_str(path: &Path) -> Result<&str> {
    match path.to_str() {
        Some(path) => Ok(path),
        None => fail!(Unsupported, "path is not valid UTF-8: {}", path.display()),
    }
}

/// Options for opening or creating a file.
#[derive(Clone, Debug, Default)]
pub struct FileBuilder {
    mode: OpenMode,
    close_degree: Option<CloseDegree>,
    userblock: Option<u64>,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Close degree of the file; defaults to [`config::default_close_degree`].
    pub fn close_degree(mut self, degree: CloseDegree) -> Self {
        self.close_degree = Some(degree);
        self
    }

    /// Bytes reserved at the start of a new file: 0 or a power of two of at least 512.
    pub fn userblock(mut self, size: u64) -> Self {
        self.userblock = Some(size);
        self
    }

    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<File> {
        let path = path.as_ref();
        let c_path = to_cstring(path_str(path)?)?;
        let creating = matches!(self.mode, OpenMode::Create | OpenMode::Truncate);
        ensure!(
            creating || self.userblock.is_none(),
            Unsupported,
            "a userblock can only be set when creating a file"
        );
        ensure!(
            creating || path.exists(),
            NotFound,
            "unable to open {}: no such file",
            path.display()
        );

        let fapl = PropertyList::new(PropertyClass::FileAccess)?;
        let degree = self.close_degree.unwrap_or_else(config::default_close_degree);
        fapl.set_fclose_degree(degree)?;
        let id = match self.mode {
            OpenMode::Read => h5try!(H5Fopen(c_path.as_ptr(), H5F_ACC_RDONLY, fapl.raw())),
            OpenMode::ReadWrite => h5try!(H5Fopen(c_path.as_ptr(), H5F_ACC_RDWR, fapl.raw())),
            OpenMode::Create | OpenMode::Truncate => {
                let fcpl = PropertyList::new(PropertyClass::FileCreate)?;
                if let Some(size) = self.userblock {
                    fcpl.set_userblock(size)?;
                }
                let flags = if self.mode == OpenMode::Create { H5F_ACC_EXCL } else { H5F_ACC_TRUNC };
                h5try!(H5Fcreate(c_path.as_ptr(), flags, fcpl.raw(), fapl.raw()))
            }
        };
        tracing::debug!(path = %path.display(), mode = ?self.mode, degree = %degree, "opened file");
        File::from_handle(ObjectId::from_owned(IdKind::File, id)?)
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::handle::IdState;

    #[test]
    fn test_create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h5");
        let file = File::create(&path).unwrap();
        assert!(!file.is_read_only().unwrap());
        assert_eq!(file.filename().unwrap(), path.to_str().unwrap());
        file.close().unwrap();
        file.close().unwrap();
        // The emulated engine's own image format is not HDF5.
        assert!(!File::is_hdf5(&path).unwrap());
        let foreign = dir.path().join("foreign.h5");
        std::fs::write(&foreign, b"\x89HDF\r\n\x1a\n\0\0\0\0").unwrap();
        assert!(File::is_hdf5(&foreign).unwrap());

        let file = File::open(&path).unwrap();
        assert!(file.is_read_only().unwrap());
        assert_eq!(
            File::create_excl(&path).unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = File::open(dir.path().join("missing.h5")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = File::with_options()
            .mode(OpenMode::ReadWrite)
            .userblock(512)
            .open(dir.path().join("missing.h5"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_strong_close_invalidates_children() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::with_options()
            .mode(OpenMode::Truncate)
            .close_degree(CloseDegree::Strong)
            .open(dir.path().join("strong.h5"))
            .unwrap();
        let group = file.create_group("g").unwrap();
        assert_eq!(file.obj_count().unwrap(), 2);
        file.close().unwrap();
        assert_eq!(group.id().state(), IdState::Invalidated);
        assert_eq!(group.len().unwrap_err().kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_semi_close_refuses_with_open_children() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::with_options()
            .mode(OpenMode::Truncate)
            .close_degree(CloseDegree::Semi)
            .open(dir.path().join("semi.h5"))
            .unwrap();
        let group = file.create_group("g").unwrap();
        assert_eq!(file.close().unwrap_err().kind(), ErrorKind::IoFailure);
        assert!(file.is_valid());
        group.close().unwrap();
        file.close().unwrap();
        assert!(file.id().is_closed());
    }

    #[test]
    fn test_weak_close_keeps_children() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::with_options()
            .mode(OpenMode::Truncate)
            .close_degree(CloseDegree::Weak)
            .open(dir.path().join("weak.h5"))
            .unwrap();
        let group = file.create_group("g").unwrap();
        file.close().unwrap();
        assert!(group.is_valid());
        group.create_group("child").unwrap();
        assert_eq!(group.len().unwrap(), 1);
    }

    #[test]
    fn test_plists_and_userblock() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::with_options()
            .mode(OpenMode::Truncate)
            .userblock(1024)
            .open(dir.path().join("ub.h5"))
            .unwrap();
        assert_eq!(file.create_plist().unwrap().userblock().unwrap(), 1024);
        let fapl = file.access_plist().unwrap();
        assert_eq!(fapl.fclose_degree().unwrap(), config::default_close_degree());
        let err = File::with_options()
            .mode(OpenMode::Truncate)
            .userblock(100)
            .open(dir.path().join("bad.h5"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
