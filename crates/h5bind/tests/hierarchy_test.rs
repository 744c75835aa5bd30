//! Groups, datasets and attributes written, closed and read back from disk.

mod common;

use approx::assert_relative_eq;
use h5bind::{
    Attribute, Dataspace, Datatype, ErrorKind, File, Filter, FixedAscii, Hyperslab, Layout,
    Location, ObjectReference, ObjectType, Selection,
};

#[test]
fn test_round_trip_through_disk() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("roundtrip.h5");
    {
        let file = File::create(&path).unwrap();
        let err = file.create_group("runs/0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let run = file.create_group("runs").unwrap().create_group("0").unwrap();

        let energy = run.new_dataset::<f64>().shape([2, 3]).create("energy").unwrap();
        energy.write(&[0.1, 0.2, 0.3, 1.1, 1.2, 1.3]).unwrap();
        let units = energy.new_attr::<FixedAscii<8>>().create("units").unwrap();
        units.write_strings(&["eV"]).unwrap();

        let steps = run
            .new_dataset::<u32>()
            .shape([4])
            .resizable(true)
            .chunk([4])
            .deflate(6)
            .create("steps")
            .unwrap();
        steps.write(&[1_u32, 2, 3, 4]).unwrap();
        steps.resize([6]).unwrap();
        steps.write_selection(&[5_u32, 6], &Hyperslab::new(&[4], &[2]).into()).unwrap();

        run.new_attr::<i64>().create("seed").unwrap().write_scalar(&42).unwrap();
        file.new_dataset::<ObjectReference>()
            .shape([1])
            .create("latest")
            .unwrap()
            .write(&[file.reference("runs/0").unwrap()])
            .unwrap();
        file.close().unwrap();
    }

    let file = File::open(&path).unwrap();
    assert!(file.is_read_only().unwrap());
    assert_eq!(file.member_names().collect::<Result<Vec<_>, _>>().unwrap(), ["latest", "runs"]);

    let run = file.group("runs/0").unwrap();
    assert_eq!(run.attr("seed").unwrap().read_scalar::<i64>().unwrap(), 42);
    assert_eq!(run.member_kind("energy").unwrap(), ObjectType::Dataset);

    let energy = run.dataset("energy").unwrap();
    assert_eq!(energy.shape().unwrap(), [2, 3]);
    let values = energy.read::<f64>().unwrap();
    assert_relative_eq!(values[4], 1.2);
    assert_relative_eq!(values.iter().sum::<f64>(), 4.2, epsilon = 1e-12);
    assert_eq!(energy.attr("units").unwrap().read_strings().unwrap(), ["eV"]);

    let steps = run.dataset("steps").unwrap();
    assert_eq!(steps.read::<u32>().unwrap(), [1, 2, 3, 4, 5, 6]);
    assert_eq!(steps.max_shape().unwrap(), [None]);
    let dcpl = steps.create_plist().unwrap();
    assert_eq!(dcpl.layout().unwrap(), Layout::Chunked);
    assert_eq!(dcpl.filters().unwrap(), [Filter::Deflate(6)]);

    let refs = file.dataset("latest").unwrap().read::<ObjectReference>().unwrap();
    let target = refs[0].dereference(&file).unwrap();
    assert_eq!(target.object_type(), ObjectType::Group);
    assert_eq!(target.into_group().unwrap().name().unwrap(), "/runs/0");

    let err = steps.write(&[0_u32; 6]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IoFailure | ErrorKind::Unsupported));
}

#[test]
fn test_links_and_iteration() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("links.h5");
    let file = File::create(&path).unwrap();
    for name in ["c", "a", "b"] {
        file.create_group(name).unwrap();
    }
    file.link_hard("a", "alias").unwrap();
    file.move_link("b", "a/b").unwrap();

    assert!(file.link_exists("a/b").unwrap());
    assert!(!file.link_exists("b").unwrap());
    assert!(!file.link_exists("missing/deeper").unwrap());
    assert_eq!(file.len().unwrap(), 3);

    let names: Vec<String> = file.members().map(|m| m.unwrap().0).collect();
    assert_eq!(names, ["a", "alias", "c"]);
    assert!(file.group("alias").unwrap().link_exists("b").unwrap());

    file.unlink("alias").unwrap();
    assert_eq!(file.unlink("alias").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(file.create_group("a").unwrap_err().kind(), ErrorKind::AlreadyExists);
}

#[test]
fn test_selections() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("select.h5");
    let file = File::create(&path).unwrap();
    let grid = file.new_dataset::<i32>().shape([4, 4]).create("grid").unwrap();
    grid.write(&(0..16).collect::<Vec<i32>>()).unwrap();

    let corners = Selection::Points(vec![vec![0, 0], vec![0, 3], vec![3, 0], vec![3, 3]]);
    assert_eq!(grid.read_selection::<i32>(&corners).unwrap(), [0, 3, 12, 15]);

    let columns = Hyperslab::new(&[0, 0], &[4, 2]).with_stride(&[1, 2]);
    assert_eq!(
        grid.read_selection::<i32>(&columns.into()).unwrap(),
        [0, 2, 4, 6, 8, 10, 12, 14]
    );
    let union = Selection::Hyperslab(vec![
        Hyperslab::new(&[0, 0], &[1, 4]),
        Hyperslab::new(&[0, 0], &[4, 1]),
    ]);
    assert_eq!(grid.read_selection::<i32>(&union).unwrap(), [0, 1, 2, 3, 4, 8, 12]);
    assert!(grid.read_selection::<i32>(&Selection::None).unwrap().is_empty());

    let outside = Hyperslab::new(&[3, 3], &[2, 2]).into();
    let err = grid.read_selection::<i32>(&outside).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_explicit_types_and_spaces() {
    if !common::ensure_hdf5_init() {
        return;
    }
    let (_dir, path) = common::scratch("explicit.h5");
    let file = File::create(&path).unwrap();

    let space = Dataspace::resizable([2], &[None]).unwrap();
    assert!(space.is_resizable());
    let dtype = Datatype::from_typestr(">i2").unwrap();
    assert_eq!(dtype.size().unwrap(), 2);
    assert_eq!(dtype.to_descriptor().unwrap().typestr(), ">i2");

    let err = file.create_dataset("big", &dtype, &space, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let fixed = Dataspace::new([2]).unwrap();
    let d = file.create_dataset("big", &dtype, &fixed, None).unwrap();
    d.write(&[-2_i16, 300]).unwrap();
    assert_eq!(d.read::<i32>().unwrap(), [-2, 300]);
    assert_eq!(d.dtype().unwrap(), dtype);

    let scalar = Dataspace::scalar().unwrap();
    let attr = Attribute::create(&d, "offset", &Datatype::of::<f32>().unwrap(), &scalar).unwrap();
    attr.write_scalar(&0.5_f32).unwrap();
    assert_relative_eq!(d.attr("offset").unwrap().read_scalar::<f32>().unwrap(), 0.5);
    assert_eq!(attr.read::<f32>().unwrap().len(), 1);
}
