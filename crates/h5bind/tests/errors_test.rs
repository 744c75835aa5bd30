//! Native failures translated into `Error` values with their error stacks.

mod common;

use std::ffi::{CStr, CString};

use h5bind::sys::{self, H5F_ACC_TRUNC, H5P_DEFAULT};
use h5bind::{h5bind_error_kind_name, h5check, sync, Error, ErrorKind, File};

#[test]
fn test_raw_failure_captures_stack() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("raw-errors.h5");
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    let name = CString::new("g").unwrap();

    let err = sync(|| unsafe {
        let fid = h5check(sys::H5Fcreate(c_path.as_ptr(), H5F_ACC_TRUNC, H5P_DEFAULT, H5P_DEFAULT))
            .unwrap();
        let gid = h5check(sys::H5Gcreate2(fid, name.as_ptr(), H5P_DEFAULT, H5P_DEFAULT, H5P_DEFAULT))
            .unwrap();
        let err = h5check(sys::H5Gcreate2(fid, name.as_ptr(), H5P_DEFAULT, H5P_DEFAULT, H5P_DEFAULT))
            .unwrap_err();
        sys::H5Gclose(gid);
        sys::H5Fclose(fid);
        err
    });

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    let stack = err.stack().unwrap();
    assert!(!stack.is_empty());
    assert_eq!(stack.outermost().unwrap().func, "H5Gcreate2");
    assert!(stack.description().contains("already exists"));
    let text = err.to_string();
    assert!(text.starts_with("AlreadyExists: "));
    assert!(text.contains("#000: H5Gcreate2()"));
}

#[test]
fn test_failure_does_not_leak_into_next_call() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("isolated.h5");
    let file = File::create(&path).unwrap();
    let missing = file.dataset("missing").unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let d = file.new_dataset::<u16>().shape([2]).create("d").unwrap();
    d.write(&[7_u16, 8]).unwrap();
    let err = d.write(&[1_u16]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.stack().is_none());
    assert_eq!(d.read::<u16>().unwrap(), [7, 8]);
}

#[test]
fn test_errors_cross_threads() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("threads.h5");
    let file = File::create(&path).unwrap();
    file.create_group("taken").unwrap();

    let worker = {
        let file = file.clone();
        std::thread::spawn(move || file.create_group("taken").unwrap_err())
    };
    let err: Error = worker.join().unwrap();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(file.len().unwrap(), 1);
}

#[test]
fn test_kind_codes_are_stable() {
    for (code, kind) in (1..).zip(ErrorKind::ALL) {
        assert_eq!(kind.code(), code);
        assert_eq!(ErrorKind::from_code(code), Some(kind));
        let name = unsafe { CStr::from_ptr(h5bind_error_kind_name(code)) };
        assert_eq!(name.to_str().unwrap(), kind.to_string());
    }
    assert_eq!(ErrorKind::from_code(10), None);
    assert!(h5bind_error_kind_name(-1).is_null());

    let err = Error::binding(ErrorKind::StringTooLong, "value needs 12 bytes, 8 available");
    assert_eq!(err.to_string(), "StringTooLong: value needs 12 bytes, 8 available");
}
