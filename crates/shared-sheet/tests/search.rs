use shared_sheet::{CellRange, CellRef, SharedSheet};

fn sheet_with(cells: &[(usize, usize, &str)]) -> SharedSheet {
    let sheet = SharedSheet::new(5, 5);
    for &(row, col, value) in cells {
        sheet.set_cell(row, col, value).expect("set");
    }
    sheet
}

#[test]
fn search_in_row_finds_leftmost_exact_match() {
    let sheet = sheet_with(&[(2, 4, "my"), (2, 1, "my"), (2, 0, "mystery")]);
    assert_eq!(sheet.search_in_row(2, "my").expect("in range"), Some(1));
    assert_eq!(sheet.search_in_row(3, "my").expect("in range"), None);
    assert!(sheet.search_in_row(5, "my").unwrap_err().is_out_of_range());
}

#[test]
fn search_in_col_finds_topmost_exact_match() {
    let sheet = sheet_with(&[(4, 2, "smile"), (1, 2, "smile"), (0, 3, "smile")]);
    assert_eq!(sheet.search_in_col(2, "smile").expect("in range"), Some(1));
    assert_eq!(sheet.search_in_col(0, "smile").expect("in range"), None);
    assert!(sheet.search_in_col(9, "smile").unwrap_err().is_out_of_range());
}

#[test]
fn search_string_scans_rows_first() {
    let sheet = sheet_with(&[(3, 0, "love you"), (1, 4, "love you")]);
    assert_eq!(sheet.search_string("love you"), Some(CellRef::new(1, 4)));
    assert_eq!(sheet.search_string("love"), None);
}

#[test]
fn empty_needle_matches_empty_cells() {
    let sheet = sheet_with(&[(0, 0, "x")]);
    assert_eq!(sheet.search_string(""), Some(CellRef::new(0, 1)));
}

#[test]
fn search_in_range_returns_first_in_range_hit() {
    let sheet = sheet_with(&[(1, 0, "pizza"), (2, 3, "pizza"), (4, 2, "pizza")]);
    // Row 1's only hit is at column 0, outside the range; row 2's first hit is inside.
    let range = CellRange::new(1, 4, 2, 4);
    assert_eq!(sheet.search_in_range(range, "pizza"), Some(CellRef::new(2, 3)));
}

#[test]
fn search_in_range_only_considers_first_occurrence_per_row() {
    // "pizza" at (3,0) and (3,3): the first occurrence in row 3 is column 0, outside columns
    // 1..=4, so row 3 yields nothing even though (3,3) lies inside the range.
    let sheet = sheet_with(&[(3, 0, "pizza"), (3, 3, "pizza")]);
    let range = CellRange::new(2, 4, 1, 4);
    assert_eq!(sheet.search_in_range(range, "pizza"), None);

    // Widening the columns to include column 0 finds the first occurrence.
    let range = CellRange::new(2, 4, 0, 4);
    assert_eq!(sheet.search_in_range(range, "pizza"), Some(CellRef::new(3, 0)));
}

#[test]
fn search_in_range_stops_at_sheet_end_and_ignores_inverted_ranges() {
    let sheet = sheet_with(&[(4, 4, "hey")]);
    assert_eq!(
        sheet.search_in_range(CellRange::new(3, 100, 0, 4), "hey"),
        Some(CellRef::new(4, 4))
    );
    assert_eq!(sheet.search_in_range(CellRange::new(4, 3, 0, 4), "hey"), None);
    assert_eq!(sheet.search_in_range(CellRange::new(4, 4, 4, 0), "hey"), None);
    assert_eq!(sheet.search_in_range(CellRange::new(7, 9, 0, 4), "hey"), None);
}

#[test]
fn searches_follow_exchanges() {
    let sheet = sheet_with(&[(0, 0, "thanks")]);
    sheet.exchange_rows(0, 4).expect("exchange rows");
    sheet.exchange_cols(0, 2).expect("exchange cols");
    assert_eq!(sheet.search_string("thanks"), Some(CellRef::new(4, 2)));
    assert_eq!(sheet.search_in_col(2, "thanks").expect("in range"), Some(4));
}
