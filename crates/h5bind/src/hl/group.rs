//! HDF5 Group handle, links and member iteration.

use std::fmt;

use crate::class::ObjectClass;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::hl::dataset::{Dataset, DatasetBuilder};
use crate::hl::dataspace::Dataspace;
use crate::hl::datatype::Datatype;
use crate::hl::identifier;
use crate::hl::location::{Location, Object, ObjectType};
use crate::hl::plist::{PropertyClass, PropertyList};
use crate::sys::{
    c_char, c_void, herr_t, hid_t, hsize_t, H5G_info_t, H5Gcreate2, H5Gget_info, H5Gopen2,
    H5Lcreate_hard, H5Ldelete, H5Lexists, H5Lmove, H5Literate, H5Oopen, H5_index_t,
    H5_iter_order_t, H5P_DEFAULT, H5_ITER_STOP,
};
use crate::types::H5Type;
use crate::util::{string_from_cstr, to_cstring};

/// An HDF5 group.
#[derive(Clone)]
pub struct Group {
    id: ObjectId,
    /// Keeps the file open for as long as the group is.
    file: ObjectId,
}

impl ObjectClass for Group {
    const NAME: &'static str = "group";
    const VALID_KINDS: &'static [IdKind] = &[IdKind::Group];

    fn from_object_id(id: ObjectId) -> Result<Self> {
        let file = identifier::file_handle(&id)?;
        Ok(Self { id, file })
    }

    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn short_repr(&self) -> Option<String> {
        let members = match self.len().ok()? {
            1 => "1 member".to_owned(),
            n => format!("{n} members"),
        };
        Some(format!("{:?} ({members})", self.name().ok()?))
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.debug_fmt(f)
    }
}

/// Parent path and leaf name of `name`; the parent is empty for a bare name.
fn split_path(name: &str) -> (&str, &str) {
    let name = name.trim_end_matches('/');
    match name.rsplit_once('/') {
        Some(("", leaf)) => ("/", leaf),
        Some((parent, leaf)) => (parent, leaf),
        None => ("", name),
    }
}

impl Group {
    pub(crate) fn from_parts(id: ObjectId, file: ObjectId) -> Self {
        Self { id, file }
    }

    pub(crate) fn raw(&self) -> hid_t {
        self.id.raw()
    }

    pub(crate) fn file_handle(&self) -> &ObjectId {
        &self.file
    }

    /// Wrap a handle just created or opened under this group.
    pub(crate) fn adopt(&self, kind: IdKind, raw: hid_t) -> Result<(ObjectId, ObjectId)> {
        let id = ObjectId::from_owned(kind, raw)?;
        let file = if self.file.is_closed() { identifier::file_handle(&id)? } else { self.file.clone() };
        Ok((id, file))
    }

    /// Fail unless `name` can be bound: the name is free and its parent groups exist
    /// (or will be created, with `intermediate`).
    pub(crate) fn ensure_free(&self, name: &str, intermediate: bool) -> Result<()> {
        self.id.ensure_valid()?;
        let (parent, leaf) = split_path(name);
        ensure!(!leaf.is_empty() && leaf != ".", Unsupported, "invalid object name: {name:?}");
        if !intermediate && !parent.is_empty() {
            ensure!(self.link_exists(parent)?, NotFound, "parent group {parent:?} does not exist");
        }
        ensure!(!self.link_exists(name)?, AlreadyExists, "{name:?} already exists");
        Ok(())
    }

    pub(crate) fn ensure_bound(&self, name: &str) -> Result<()> {
        ensure!(self.link_exists(name)?, NotFound, "{name:?} does not exist");
        Ok(())
    }

    pub fn create(parent: &Group, name: &str) -> Result<Self> {
        parent.create_group(name)
    }

    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        parent.group(name)
    }

    pub fn create_group(&self, name: &str) -> Result<Group> {
        self.create_group_in(name, None)
    }

    /// Create a group with a link creation property list, e.g. one that creates
    /// missing intermediate groups.
    pub fn create_group_with(&self, name: &str, lcpl: &PropertyList) -> Result<Group> {
        self.create_group_in(name, Some(lcpl))
    }

    fn create_group_in(&self, name: &str, lcpl: Option<&PropertyList>) -> Result<Group> {
        let intermediate = match lcpl {
            Some(lcpl) => {
                ensure!(
                    lcpl.class() == PropertyClass::LinkCreate,
                    TypeMismatch,
                    "expected a link create list, got a {} list",
                    lcpl.class()
                );
                lcpl.create_intermediate_group()?
            }
            None => false,
        };
        self.ensure_free(name, intermediate)?;
        let c_name = to_cstring(name)?;
        let lcpl = lcpl.map_or(H5P_DEFAULT, PropertyList::raw);
        let id = h5try!(H5Gcreate2(self.raw(), c_name.as_ptr(), lcpl, H5P_DEFAULT, H5P_DEFAULT));
        let (id, file) = self.adopt(IdKind::Group, id)?;
        tracing::trace!(name, "created group");
        Ok(Self { id, file })
    }

    /// Open a subgroup; `name` may be a path.
    pub fn group(&self, name: &str) -> Result<Group> {
        self.ensure_bound(name)?;
        let c_name = to_cstring(name)?;
        let id = h5try!(H5Gopen2(self.raw(), c_name.as_ptr(), H5P_DEFAULT));
        let (id, file) = self.adopt(IdKind::Group, id)?;
        Ok(Self { id, file })
    }

    /// `true` if every component of `path` exists.
    pub fn link_exists(&self, path: &str) -> Result<bool> {
        self.id.ensure_valid()?;
        let mut prefix = if path.starts_with('/') { "/".to_owned() } else { String::new() };
        for part in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
            if !prefix.is_empty() && !prefix.ends_with('/') {
                prefix.push('/');
            }
            prefix.push_str(part);
            let c_prefix = to_cstring(prefix.as_str())?;
            if h5try!(H5Lexists(self.raw(), c_prefix.as_ptr(), H5P_DEFAULT)) <= 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Remove the link `name`. The object itself lives on while handles to it are open.
    pub fn unlink(&self, name: &str) -> Result<()> {
        self.ensure_bound(name)?;
        let c_name = to_cstring(name)?;
        h5call!(H5Ldelete(self.raw(), c_name.as_ptr(), H5P_DEFAULT)).map(drop)
    }

    /// Rename the link `src` to `dst`, both relative to this group.
    pub fn move_link(&self, src: &str, dst: &str) -> Result<()> {
        self.ensure_bound(src)?;
        self.ensure_free(dst, false)?;
        let (c_src, c_dst) = (to_cstring(src)?, to_cstring(dst)?);
        h5call!(H5Lmove(
            self.raw(),
            c_src.as_ptr(),
            self.raw(),
            c_dst.as_ptr(),
            H5P_DEFAULT,
            H5P_DEFAULT
        ))
        .map(drop)
    }

    /// Add a second name, `name`, for the object at `target`.
    pub fn link_hard(&self, target: &str, name: &str) -> Result<()> {
        self.ensure_bound(target)?;
        self.ensure_free(name, false)?;
        let (c_target, c_name) = (to_cstring(target)?, to_cstring(name)?);
        h5call!(H5Lcreate_hard(
            self.raw(),
            c_target.as_ptr(),
            self.raw(),
            c_name.as_ptr(),
            H5P_DEFAULT,
            H5P_DEFAULT
        ))
        .map(drop)
    }

    /// Number of links in the group.
    pub fn len(&self) -> Result<usize> {
        self.id.ensure_valid()?;
        let mut info = H5G_info_t::default();
        h5try!(H5Gget_info(self.raw(), &mut info));
        Ok(info.nlinks as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Open whatever object `name` refers to.
    pub fn object(&self, name: &str) -> Result<Object> {
        self.ensure_bound(name)?;
        let c_name = to_cstring(name)?;
        Object::from_raw(h5try!(H5Oopen(self.raw(), c_name.as_ptr(), H5P_DEFAULT)))
    }

    pub fn member_kind(&self, name: &str) -> Result<ObjectType> {
        Ok(self.object(name)?.object_type())
    }

    /// Members in name order, with their kinds, fetched one at a time.
    pub fn members(&self) -> MemberIter {
        MemberIter { group: self.clone(), index: 0, done: false }
    }

    pub fn member_names(&self) -> impl Iterator<Item = Result<String>> {
        self.members().map(|member| member.map(|(name, _)| name))
    }

    pub fn dataset(&self, name: &str) -> Result<Dataset> {
        Dataset::open(self, name)
    }

    pub fn new_dataset<T: H5Type>(&self) -> DatasetBuilder<T> {
        DatasetBuilder::new(self.clone())
    }

    pub fn create_dataset(
        &self,
        name: &str,
        dtype: &Datatype,
        space: &Dataspace,
        dcpl: Option<&PropertyList>,
    ) -> Result<Dataset> {
        Dataset::create(self, name, dtype, space, dcpl)
    }
}

unsafe extern "C" fn take_one(
    _group: hid_t, name: *const c_char, _info: *const c_void, op_data: *mut c_void,
) -> herr_t {
    let slot = unsafe { &mut *op_data.cast::<Option<String>>() };
    *slot = Some(unsafe { string_from_cstr(name) });
    H5_ITER_STOP
}

/// Lazy iterator over a group's members.
///
/// Every step is one `H5Literate` call resuming at the saved index, so links added
/// or removed between steps are seen as of that step. Call
/// [`Group::members`] again to restart.
pub struct MemberIter {
    group: Group,
    index: hsize_t,
    done: bool,
}

impl MemberIter {
    fn step(&mut self) -> Result<Option<String>> {
        self.group.id.ensure_valid()?;
        let raw = self.group.raw();
        let mut slot: Option<String> = None;
        let op_data = (&mut slot as *mut Option<String>).cast::<c_void>();
        let index = &mut self.index;
        h5try!(H5Literate(
            raw,
            H5_index_t::H5_INDEX_NAME,
            H5_iter_order_t::H5_ITER_INC,
            index,
            Some(take_one),
            op_data
        ));
        Ok(slot)
    }
}

impl Iterator for MemberIter {
    type Item = Result<(String, ObjectType)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(name)) => Some(self.group.member_kind(&name).map(|kind| (name, kind))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hl::file::File;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("a"), ("", "a"));
        assert_eq!(split_path("a/b/c"), ("a/b", "c"));
        assert_eq!(split_path("/a"), ("/", "a"));
        assert_eq!(split_path("a/b/"), ("a", "b"));
    }

    #[test]
    fn test_create_open_and_preconditions() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("g.h5")).unwrap();
        let a = file.create_group("a").unwrap();
        a.create_group("b").unwrap();
        assert_eq!(file.group("a/b").unwrap().name().unwrap(), "/a/b");
        assert_eq!(file.create_group("a").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(file.group("nope").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(file.create_group("x/y").unwrap_err().kind(), ErrorKind::NotFound);
        assert!(file.link_exists("/a/b").unwrap());
        assert!(!file.link_exists("a/missing/deeper").unwrap());
        assert_eq!(format!("{a:?}"), "<HDF5 group: \"/a\" (1 member)>");
    }

    #[test]
    fn test_intermediate_groups() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("lcpl.h5")).unwrap();
        let lcpl = PropertyList::new(PropertyClass::LinkCreate).unwrap();
        lcpl.set_create_intermediate_group(true).unwrap();
        file.create_group_with("x/y/z", &lcpl).unwrap();
        assert_eq!(file.member_kind("x/y").unwrap(), ObjectType::Group);
        let dcpl = PropertyList::new(PropertyClass::DatasetCreate).unwrap();
        let err = file.create_group_with("p/q", &dcpl).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_links() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("links.h5")).unwrap();
        let g = file.create_group("g").unwrap();
        file.link_hard("g", "alias").unwrap();
        file.move_link("g", "moved").unwrap();
        assert_eq!(g.name().unwrap(), "/moved");
        assert_eq!(file.len().unwrap(), 2);
        assert_eq!(file.move_link("g", "h").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(file.link_hard("moved", "alias").unwrap_err().kind(), ErrorKind::AlreadyExists);
        file.unlink("alias").unwrap();
        assert_eq!(file.unlink("alias").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(file.len().unwrap(), 1);
    }

    #[test]
    fn test_member_iteration_is_lazy_and_restartable() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("iter.h5")).unwrap();
        for name in ["c", "a", "b"] {
            file.create_group(name).unwrap();
        }
        let mut members = file.members();
        assert_eq!(members.next().unwrap().unwrap(), ("a".to_owned(), ObjectType::Group));
        file.create_group("d").unwrap();
        let rest: Vec<String> = members.map(|m| m.unwrap().0).collect();
        assert_eq!(rest, ["b", "c", "d"]);
        let names: Vec<String> = file.member_names().collect::<Result<_>>().unwrap();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert!(file.group("a").unwrap().is_empty().unwrap());
    }
}
