use std::fs;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use shared_sheet::{SharedSheet, SheetError};

#[test]
fn save_writes_header_and_row_major_cells() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grid.sheet");

    let sheet = SharedSheet::new(50, 50);
    sheet.set_cell(13, 2, "EE").expect("set");
    sheet.set_cell(3, 4, "Hi").expect("set");
    sheet.set_cell(5, 10, "OOO").expect("set");
    sheet.save(&path).expect("save");

    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "50,50\n3,4,\"Hi\"\n5,10,\"OOO\"\n13,2,\"EE\"\n"
    );
}

#[test]
fn save_then_load_round_trips_sparse_grid() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grid.sheet");

    let original = SharedSheet::new(6, 4);
    original.set_cell(0, 0, "top-left").expect("set");
    original.set_cell(5, 3, "with, comma").expect("set");
    original.set_cell(2, 1, "\"quoted\"").expect("set");
    original.save(&path).expect("save");

    let restored = SharedSheet::new(1, 1);
    restored.load(&path).expect("load");
    assert_eq!(restored.snapshot(), original.snapshot());
    assert_eq!(restored.get_cell(4, 2).expect("empty cell"), "");
}

#[test]
fn load_replaces_shape_and_latches() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grid.sheet");
    fs::write(&path, "3,7\n2,6,\"corner\"\n").expect("write");

    let sheet = SharedSheet::new(40, 40);
    sheet.set_cell(30, 30, "gone").expect("set");
    sheet.load(&path).expect("load");

    assert_eq!(sheet.dimensions(), (3, 7));
    assert_eq!(sheet.get_cell(2, 6).expect("get"), "corner");
    assert!(sheet.get_cell(30, 30).unwrap_err().is_out_of_range());
    // The new latch arrays cover the new shape.
    sheet.add_col(6).expect("add col");
    sheet.set_cell(2, 7, "edge").expect("set");
    assert_eq!(sheet.search_in_row(2, "edge").expect("search"), Some(7));
}

#[test]
fn load_missing_file_is_not_found_and_keeps_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.sheet");

    let sheet = SharedSheet::new(2, 2);
    sheet.set_cell(1, 1, "kept").expect("set");
    let err = sheet.load(&missing).unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert_eq!(sheet.get_cell(1, 1).expect("get"), "kept");
}

#[test]
fn load_of_malformed_file_keeps_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bad.sheet");
    fs::write(&path, "2,2\n0,0,\"fine\"\n9,9,\"outside\"\n").expect("write");

    let sheet = SharedSheet::new(3, 3);
    sheet.set_cell(2, 2, "kept").expect("set");
    match sheet.load(&path) {
        Err(SheetError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(sheet.dimensions(), (3, 3));
    assert_eq!(sheet.get_cell(2, 2).expect("get"), "kept");
}

#[test]
fn load_of_degenerate_huge_header_keeps_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("huge.sheet");

    let sheet = SharedSheet::new(2, 2);
    sheet.set_cell(0, 1, "kept").expect("set");
    for header in [format!("{},0\n", usize::MAX), format!("0,{}\n", usize::MAX)] {
        fs::write(&path, &header).expect("write");
        match sheet.load(&path) {
            Err(SheetError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected parse error for {header:?}, got {other:?}"),
        }
    }
    assert_eq!(sheet.dimensions(), (2, 2));
    assert_eq!(sheet.get_cell(0, 1).expect("get"), "kept");
}

#[test]
fn save_replaces_existing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grid.sheet");
    fs::write(&path, "stale contents that are longer than the new file\n").expect("write");

    SharedSheet::new(1, 2).save(&path).expect("save");
    assert_eq!(fs::read_to_string(&path).expect("read"), "1,2\n");

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read_dir")
        .collect::<Result<Vec<_>, _>>()
        .expect("list dir");
    assert_eq!(leftovers.len(), 1, "temp files left behind: {leftovers:?}");
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    #[test]
    fn arbitrary_values_round_trip(
        cells in prop::collection::vec((0usize..4, 0usize..4, "\\PC{0,12}|[\",\n ]{1,6}"), 0..10)
    ) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("grid.sheet");

        let sheet = SharedSheet::new(4, 4);
        for (row, col, value) in &cells {
            sheet.set_cell(*row, *col, value.as_str()).expect("set");
        }
        sheet.save(&path).expect("save");

        let restored = SharedSheet::new(1, 1);
        restored.load(&path).expect("load");
        prop_assert_eq!(restored.snapshot(), sheet.snapshot());
    }
}
