//! End-to-end sheet diff scenarios: workbook file in, records and report out.

use nettools_core::{
    column_letter, diff, diff_sheets, export_to_bytes, export_to_file, records_from_workbook, CellValue,
    DiffOptions, DiffRecord, DiffStatus, ErrorKind, Grid, GridOptions, Workbook, EXPORT_HEADER,
};
use proptest::prelude::*;
use tempfile::NamedTempFile;

fn workbook_with(sheets: &[(&str, Vec<Vec<&str>>)]) -> Workbook {
    let mut wb = Workbook::new();
    for (name, rows) in sheets {
        let ws = wb.create_sheet(Some(name.to_string())).unwrap();
        for row in rows {
            ws.append_row(row.iter().map(|v| if v.is_empty() { CellValue::Empty } else { CellValue::from(*v) }));
        }
    }
    wb
}

fn reload(wb: &Workbook) -> Workbook {
    Workbook::load_from_bytes(&wb.save_to_bytes().unwrap()).unwrap()
}

#[test]
fn test_column_letters() {
    assert_eq!(column_letter(0), "A");
    assert_eq!(column_letter(25), "Z");
    assert_eq!(column_letter(26), "AA");
    assert_eq!(column_letter(51), "AZ");
    assert_eq!(column_letter(701), "ZZ");
}

#[test]
fn test_header_scenario_from_file() {
    let wb = reload(&workbook_with(&[
        ("A", vec![vec!["h1", "h2"], vec!["x", "y"]]),
        ("B", vec![vec!["h1", "h2"], vec!["x", "z"]]),
    ]));

    let result = diff_sheets(&wb, "A", "B", DiffOptions::default(), GridOptions::default()).unwrap();
    assert_eq!(
        result.records,
        vec![DiffRecord {
            sheet_a: "A".into(),
            sheet_b: "B".into(),
            row: 2,
            column: "B".into(),
            header: "h2".into(),
            value_a: "y".into(),
            value_b: "z".into(),
            status: DiffStatus::Different,
        }]
    );
}

#[test]
fn test_trailing_row_only_in_a() {
    let wb = workbook_with(&[
        ("A", vec![vec!["h1", "h2"], vec!["x", "y"], vec!["p", "q"]]),
        ("B", vec![vec!["h1", "h2"], vec!["x", "y"]]),
    ]);
    let result = diff_sheets(&wb, "A", "B", DiffOptions::default(), GridOptions::default()).unwrap();
    let statuses: Vec<(u32, &str, DiffStatus)> =
        result.records.iter().map(|r| (r.row, r.column.as_str(), r.status)).collect();
    assert_eq!(statuses, vec![(3, "A", DiffStatus::OnlyInA), (3, "B", DiffStatus::OnlyInA)]);
    assert_eq!(result.counts().only_in_a, 2);
}

#[test]
fn test_blank_rows_shift_unless_kept() {
    // B has an empty row 2 that A does not
    let mut wb = workbook_with(&[("A", vec![vec!["h"], vec!["v"]]), ("B", vec![vec!["h"]])]);
    wb.get_sheet_by_name_mut("B").unwrap().set_cell_value(3, 1, CellValue::from("v"));

    let skipped = diff_sheets(&wb, "A", "B", DiffOptions::default(), GridOptions::default()).unwrap();
    assert!(skipped.is_empty());

    let kept = diff_sheets(&wb, "A", "B", DiffOptions::default(), GridOptions { skip_blank_rows: false }).unwrap();
    let rows: Vec<(u32, DiffStatus)> = kept.records.iter().map(|r| (r.row, r.status)).collect();
    assert_eq!(rows, vec![(2, DiffStatus::OnlyInA), (3, DiffStatus::OnlyInB)]);
}

#[test]
fn test_empty_sheets_export_header_only() {
    let wb = workbook_with(&[("A", vec![]), ("B", vec![])]);
    let result = diff_sheets(&wb, "A", "B", DiffOptions::default(), GridOptions::default()).unwrap();
    assert!(result.is_empty());

    let report = Workbook::load_from_bytes(&export_to_bytes(&result.records).unwrap()).unwrap();
    let sheet = report.get_sheet_by_name("Differences").unwrap();
    assert_eq!(sheet.max_row(), 1);
    let header: Vec<String> = (1..=8).map(|c| sheet.get_cell_value(1, c).unwrap().to_text()).collect();
    assert_eq!(header, EXPORT_HEADER);
}

#[test]
fn test_export_file_roundtrip() {
    let wb = workbook_with(&[
        ("Before", vec![vec!["host", "ip", "vlan"], vec!["sw1", "10.0.0.1", "10"], vec!["sw2", "10.0.0.2"]]),
        ("After", vec![vec!["host", "ip", "vlan"], vec!["sw1", "10.0.0.9", "10"], vec!["", "10.0.0.2", "20"]]),
    ]);
    let result = diff_sheets(&wb, "Before", "After", DiffOptions::default(), GridOptions::default()).unwrap();
    assert_eq!(result.len(), 3);

    let temp_file = NamedTempFile::new().unwrap();
    export_to_file(&result.records, temp_file.path()).unwrap();
    let report = Workbook::load(temp_file.path()).unwrap();
    assert_eq!(records_from_workbook(&report).unwrap(), result.records);
}

#[test]
fn test_missing_sheet_and_bad_file() {
    let wb = workbook_with(&[("A", vec![vec!["x"]])]);
    let err = diff_sheets(&wb, "A", "Missing", DiffOptions::default(), GridOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SheetNotFound);

    let err = Workbook::load_from_bytes(b"hostname,ip\nsw1,10.0.0.1\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
}

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[a-c0-2 ]{0,3}".prop_map(CellValue::from),
        (-50i32..50).prop_map(|n| CellValue::Number(n as f64 / 2.0)),
        any::<bool>().prop_map(CellValue::Boolean),
    ]
}

fn grid_strategy(name: &'static str) -> impl Strategy<Value = Grid> {
    prop::collection::vec(prop::collection::vec(cell_strategy(), 0..6), 0..6)
        .prop_map(move |rows| Grid::from_rows(name, rows))
}

proptest! {
    #[test]
    fn prop_self_diff_is_empty(grid in grid_strategy("S")) {
        let options = DiffOptions { use_header_row: false };
        prop_assert!(diff(&grid, &grid, options).is_empty());
    }

    #[test]
    fn prop_records_are_real_and_bounded(
        a in grid_strategy("A"),
        b in grid_strategy("B"),
        use_header_row in any::<bool>(),
    ) {
        let records = diff(&a, &b, DiffOptions { use_header_row });
        let bound = a.row_count().max(b.row_count()) * a.column_count().max(b.column_count());
        prop_assert!(records.len() <= bound);

        let mut last = (0u32, 0u32);
        for record in &records {
            prop_assert_ne!(&record.value_a, &record.value_b);
            let position = (record.row, nettools_core::letter_to_column(&record.column).unwrap());
            prop_assert!(position > last, "records out of order");
            last = position;
            if use_header_row {
                prop_assert!(record.row >= 2);
            }
        }
    }
}

#[test]
fn test_error_cells_compare_as_empty() {
    let mut wb = workbook_with(&[("A", vec![vec!["h"], vec!["1"]]), ("B", vec![vec!["h"], vec!["1"]])]);
    wb.get_sheet_by_name_mut("A").unwrap().set_cell_value(2, 2, CellValue::Error("#REF!".into()));
    wb.get_sheet_by_name_mut("B").unwrap().set_cell_value(3, 1, CellValue::Error("#N/A".into()));

    let result = diff_sheets(&reload(&wb), "A", "B", DiffOptions::default(), GridOptions::default()).unwrap();
    assert!(result.is_empty(), "{:?}", result.records);
}
