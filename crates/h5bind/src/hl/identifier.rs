//! Identifier introspection (H5I).

use crate::class::ObjectClass;
use crate::error::Result;
use crate::handle::{IdKind, ObjectId};
use crate::hl::file::File;
use crate::sys::{c_char, H5Iget_file_id, H5Iget_name};
use crate::util::get_h5_str;

/// Entity kind of the object's handle as the library reports it.
pub fn get_type<O: ObjectClass>(obj: &O) -> Result<IdKind> {
    obj.id().ensure_valid()?;
    match IdKind::of_raw(obj.id().raw()) {
        Some(kind) => Ok(kind),
        None => fail!(InvalidHandle, "{:?} has no known kind", obj.id()),
    }
}

/// Path of the object inside its file; `None` for anonymous (unlinked) objects.
pub fn get_name<O: ObjectClass>(obj: &O) -> Result<Option<String>> {
    obj.id().ensure_valid()?;
    let raw = obj.id().raw();
    let name = h5lock!(get_h5_str(|buf: *mut c_char, size| H5Iget_name(raw, buf, size)))?;
    Ok(Some(name).filter(|name| !name.is_empty()))
}

/// The file the object lives in, as the same wrapper every other lookup returns.
pub fn get_file<O: ObjectClass>(obj: &O) -> Result<File> {
    File::from_handle(file_handle(obj.id())?)
}

pub fn refcount<O: ObjectClass>(obj: &O) -> Result<u32> {
    obj.id().ensure_valid()?;
    Ok(obj.id().refcount())
}

pub fn is_valid<O: ObjectClass>(obj: &O) -> bool {
    obj.id().is_valid()
}

/// Wrapper of the file holding `id`, shared with any façade already wrapping it.
pub(crate) fn file_handle(id: &ObjectId) -> Result<ObjectId> {
    if id.kind() == IdKind::File {
        id.ensure_valid()?;
        return Ok(id.clone());
    }
    id.ensure_valid()?;
    ObjectId::from_owned(IdKind::File, h5try!(H5Iget_file_id(id.raw())))
}

#[cfg(all(test, feature = "emulated"))]
mod tests {
    use super::*;
    use crate::hl::location::Location;

    #[test]
    fn test_file_identity_is_shared() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("ids.h5")).unwrap();
        let group = file.create_group("g").unwrap();
        let again = get_file(&group).unwrap();
        assert!(again.id().same_identity(file.id()));
        assert_eq!(get_type(&group).unwrap(), IdKind::Group);
        assert_eq!(get_name(&group).unwrap().as_deref(), Some("/g"));
        assert_eq!(group.name().unwrap(), "/g");
        assert_eq!(refcount(&group).unwrap(), 1);
    }

    #[test]
    fn test_unlinked_object_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("anon.h5")).unwrap();
        let group = file.create_group("gone").unwrap();
        file.unlink("gone").unwrap();
        assert!(is_valid(&group));
        assert_eq!(get_name(&group).unwrap(), None);
    }
}
