//! Identifier lifecycle: registry identity, reference counts and invalidation.

mod common;

use std::ffi::CString;

use h5bind::sys::{self, hid_t, H5F_ACC_TRUNC, H5P_DEFAULT};
use h5bind::{
    from_id, registry, sync, CloseDegree, Dataset, ErrorKind, File, Group, IdKind, IdState,
    Location, ObjectClass, ObjectId,
};

fn raw_create(path: &std::path::Path) -> hid_t {
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    sync(|| unsafe { sys::H5Fcreate(c_path.as_ptr(), H5F_ACC_TRUNC, H5P_DEFAULT, H5P_DEFAULT) })
}

#[test]
fn test_open_returns_registered_wrapper() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("raw.h5");
    let fid = raw_create(&path);
    assert!(fid > 0);

    let a = ObjectId::open(IdKind::File, fid).unwrap();
    let b = ObjectId::open(IdKind::File, fid).unwrap();
    assert!(a.same_identity(&b));
    assert_eq!(a.refcount(), 2);
    assert!(registry::lookup(fid).is_some_and(|id| id.same_identity(&a)));

    let file: File = from_id(b.clone()).unwrap();
    assert!(file.id().same_identity(&a));
    let err = from_id::<Group>(a.clone()).map(drop).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    let err = ObjectId::open(IdKind::Group, fid).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHandle);

    drop(file);
    drop(b);
    a.close().unwrap();
    a.close().unwrap();
    assert_eq!(a.state(), IdState::Closed);
    assert_eq!(a.refcount(), 0);
    assert!(registry::lookup(fid).is_none());

    // The caller's own reference is untouched.
    assert_eq!(sync(|| unsafe { sys::H5Iget_ref(fid) }), 1);
    assert!(sync(|| unsafe { sys::H5Fclose(fid) }) >= 0);
    assert!(sync(|| unsafe { sys::H5Iis_valid(fid) }) <= 0);
}

#[test]
fn test_open_rejects_invalid_ids() {
    if !common::ensure_hdf5_init() {
        return;
    }
    for id in [0, -1, 0x7fff_ffff] {
        let err = ObjectId::open(IdKind::Dataset, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
    }
}

#[test]
fn test_clones_share_close() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("clones.h5");
    let file = File::create(&path).unwrap();
    let group = file.create_group("g").unwrap();
    let again = file.group("g").unwrap();
    assert!(!group.id().same_identity(again.id()));

    let alias = group.clone();
    assert!(alias.id().same_identity(group.id()));
    alias.close().unwrap();
    assert_eq!(group.id().state(), IdState::Closed);
    assert!(!group.is_valid());
    assert_eq!(group.len().unwrap_err().kind(), ErrorKind::InvalidHandle);
    assert_eq!(format!("{group:?}"), "<HDF5 group: invalid id>");

    // Other wrappers of the same object stay usable.
    assert_eq!(again.name().unwrap(), "/g");
    group.close().unwrap();
}

#[test]
fn test_file_wrapper_is_shared() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("shared.h5");
    let file = File::create(&path).unwrap();
    let dset = file.new_dataset::<f32>().shape([3]).create("x").unwrap();
    let owner = dset.file().unwrap();
    assert!(owner.id().same_identity(file.id()));
    assert_eq!(h5bind::hl::identifier::get_type(&dset).unwrap(), IdKind::Dataset);
    assert_eq!(h5bind::hl::identifier::refcount(&dset).unwrap(), 1);
}

#[test]
fn test_strong_close_invalidates_children() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("strong.h5");
    let file = File::with_options()
        .mode(h5bind::OpenMode::Truncate)
        .close_degree(CloseDegree::Strong)
        .open(&path)
        .unwrap();
    let group = file.create_group("g").unwrap();
    let dset: Dataset = group.new_dataset::<i64>().shape([2]).create("d").unwrap();
    file.close().unwrap();

    assert_eq!(group.id().state(), IdState::Invalidated);
    assert_eq!(dset.id().state(), IdState::Invalidated);
    assert_eq!(dset.read::<i64>().unwrap_err().kind(), ErrorKind::InvalidHandle);
    // Closing an invalidated wrapper does nothing.
    dset.close().unwrap();
    assert_eq!(format!("{dset:?}"), "<HDF5 dataset: invalid id>");
}

#[test]
fn test_threads_share_the_library() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let path = dir.path().join(format!("thread{t}.h5"));
            std::thread::spawn(move || {
                let file = File::create(&path).unwrap();
                for i in 0..16 {
                    let data = vec![t * 100 + i; 8];
                    let d = file.new_dataset::<i32>().shape([8]).create(&format!("d{i}")).unwrap();
                    d.write(&data).unwrap();
                    assert_eq!(d.read::<i32>().unwrap(), data);
                }
                file.len().unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 16);
    }
}
