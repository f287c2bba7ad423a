//! Cell-level comparison of two worksheets.
//!
//! Both grids are walked over their common bounding box in row-major order;
//! cells are compared on their text form only.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NettoolsError, Result};
use crate::grid::{Grid, GridOptions};
use crate::utils::column_letter;
use crate::workbook::Workbook;

/// Options for a diff run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    /// Treat row 0 of each sheet as a header: it is not compared and its
    /// values label the columns of every record.
    pub use_header_row: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions { use_header_row: true }
    }
}

/// How a reported cell differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffStatus {
    #[serde(rename = "different")]
    Different,
    #[serde(rename = "only_in_A")]
    OnlyInA,
    #[serde(rename = "only_in_B")]
    OnlyInB,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Different => "different",
            DiffStatus::OnlyInA => "only_in_A",
            DiffStatus::OnlyInB => "only_in_B",
        }
    }

    /// Parse the wire name of a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "different" => Some(DiffStatus::Different),
            "only_in_A" => Some(DiffStatus::OnlyInA),
            "only_in_B" => Some(DiffStatus::OnlyInB),
            _ => None,
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported discrepancy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRecord {
    pub sheet_a: String,
    pub sheet_b: String,
    /// 1-based row number.
    pub row: u32,
    /// Column letters (`A`, `B`, ..., `AA`).
    pub column: String,
    pub header: String,
    pub value_a: String,
    pub value_b: String,
    pub status: DiffStatus,
}

/// Record totals per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub different: usize,
    pub only_in_a: usize,
    pub only_in_b: usize,
}

impl DiffCounts {
    pub fn total(&self) -> usize {
        self.different + self.only_in_a + self.only_in_b
    }
}

/// Result of comparing two named sheets.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDiff {
    pub sheet_a: String,
    pub sheet_b: String,
    pub options: DiffOptions,
    pub records: Vec<DiffRecord>,
}

impl SheetDiff {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts::default();
        for record in &self.records {
            match record.status {
                DiffStatus::Different => counts.different += 1,
                DiffStatus::OnlyInA => counts.only_in_a += 1,
                DiffStatus::OnlyInB => counts.only_in_b += 1,
            }
        }
        counts
    }
}

/// Compare two grids cell by cell.
///
/// Records come out row-major: outer loop rows, inner loop columns.
pub fn diff(sheet_a: &Grid, sheet_b: &Grid, options: DiffOptions) -> Vec<DiffRecord> {
    let start_row = usize::from(options.use_header_row);
    let header_row = |grid: &Grid| -> Vec<String> {
        if !options.use_header_row {
            return Vec::new();
        }
        grid.rows()
            .first()
            .map(|row| row.iter().map(|v| v.to_text()).collect())
            .unwrap_or_default()
    };
    let headers_a = header_row(sheet_a);
    let headers_b = header_row(sheet_b);

    let row_count = sheet_a.row_count().max(sheet_b.row_count());
    let col_count = sheet_a.column_count().max(sheet_b.column_count());

    let mut records = Vec::new();
    for row in start_row..row_count {
        for column in 0..col_count {
            let a = sheet_a.text(row, column);
            let b = sheet_b.text(row, column);
            if a == b {
                continue;
            }

            let status = if a.is_empty() {
                DiffStatus::OnlyInB
            } else if b.is_empty() {
                DiffStatus::OnlyInA
            } else {
                DiffStatus::Different
            };

            let header = [&headers_a, &headers_b]
                .into_iter()
                .filter_map(|headers| headers.get(column))
                .find(|h| !h.is_empty())
                .cloned()
                .unwrap_or_default();

            records.push(DiffRecord {
                sheet_a: sheet_a.name().to_string(),
                sheet_b: sheet_b.name().to_string(),
                row: (row + 1) as u32,
                column: column_letter(column),
                header,
                value_a: a,
                value_b: b,
                status,
            });
        }
    }

    records
}

/// Default pair of sheets to compare: the first against the second, or the
/// first against itself when the workbook has only one sheet.
pub fn default_sheet_pair(workbook: &Workbook) -> Result<(String, String)> {
    let names = workbook.sheet_names();
    let first = names.first().ok_or(NettoolsError::NoWorksheets)?;
    let second = names.get(1).unwrap_or(first);
    Ok((first.clone(), second.clone()))
}

/// Resolve two sheets of a workbook by name and diff them.
pub fn diff_sheets(
    workbook: &Workbook,
    sheet_a: &str,
    sheet_b: &str,
    options: DiffOptions,
    grid_options: GridOptions,
) -> Result<SheetDiff> {
    let grid_a = Grid::from_worksheet(workbook.get_sheet_by_name(sheet_a)?, grid_options);
    let grid_b = Grid::from_worksheet(workbook.get_sheet_by_name(sheet_b)?, grid_options);

    let records = diff(&grid_a, &grid_b, options);
    debug!(
        sheet_a,
        sheet_b,
        rows_a = grid_a.row_count(),
        rows_b = grid_b.row_count(),
        records = records.len(),
        "sheet diff complete"
    );

    Ok(SheetDiff {
        sheet_a: sheet_a.to_string(),
        sheet_b: sheet_b.to_string(),
        options,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn grid(name: &str, rows: Vec<Vec<&str>>) -> Grid {
        Grid::from_rows(name, rows)
    }

    #[test]
    fn test_header_scenario() {
        let a = grid("A", vec![vec!["h1", "h2"], vec!["x", "y"]]);
        let b = grid("B", vec![vec!["h1", "h2"], vec!["x", "z"]]);
        let records = diff(&a, &b, DiffOptions::default());
        assert_eq!(
            records,
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
        let a = grid("A", vec![vec!["h1", "h2"], vec!["x", "y"], vec!["p", "q"]]);
        let b = grid("B", vec![vec!["h1", "h2"], vec!["x", "y"]]);
        let records = diff(&a, &b, DiffOptions::default());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == DiffStatus::OnlyInA && r.row == 3));
        assert_eq!(records[0].column, "A");
        assert_eq!(records[0].value_a, "p");
        assert_eq!(records[1].column, "B");
        assert_eq!(records[1].header, "h2");
        assert_eq!(records[1].value_b, "");
    }

    #[test]
    fn test_only_in_b_and_header_fallback() {
        let a = grid("A", vec![vec!["", ""], vec!["", ""]]);
        let b = grid("B", vec![vec!["", "right"], vec!["", "new"]]);
        let records = diff(&a, &b, DiffOptions::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DiffStatus::OnlyInB);
        assert_eq!(records[0].header, "right");
    }

    #[test]
    fn test_without_header_compares_row_zero() {
        let a = grid("A", vec![vec!["h1"]]);
        let b = grid("B", vec![vec!["h9"]]);
        let records = diff(&a, &b, DiffOptions { use_header_row: false });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].header, "");
    }

    #[test]
    fn test_equality_is_textual() {
        let a = Grid::from_rows("A", vec![vec![CellValue::Number(1.0), CellValue::Boolean(true)]]);
        let b = Grid::from_rows("B", vec![vec![CellValue::from("1"), CellValue::from("true")]]);
        assert!(diff(&a, &b, DiffOptions { use_header_row: false }).is_empty());
    }

    #[test]
    fn test_empty_sheets() {
        let a = Grid::new("A");
        let b = Grid::new("B");
        assert!(diff(&a, &b, DiffOptions::default()).is_empty());
        assert!(diff(&a, &b, DiffOptions { use_header_row: false }).is_empty());
    }

    #[test]
    fn test_row_major_order() {
        let a = grid("A", vec![vec!["a", "b"], vec!["c", "d"]]);
        let b = grid("B", vec![vec!["1", "2"], vec!["3", "4"]]);
        let order: Vec<(u32, String)> = diff(&a, &b, DiffOptions { use_header_row: false })
            .into_iter()
            .map(|r| (r.row, r.column))
            .collect();
        assert_eq!(
            order,
            vec![(1, "A".into()), (1, "B".into()), (2, "A".into()), (2, "B".into())]
        );
    }

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = DiffRecord {
            sheet_a: "S1".into(),
            sheet_b: "S2".into(),
            row: 4,
            column: "C".into(),
            header: "".into(),
            value_a: "".into(),
            value_b: "v".into(),
            status: DiffStatus::OnlyInB,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"sheetA":"S1","sheetB":"S2","row":4,"column":"C","header":"","valueA":"","valueB":"v","status":"only_in_B"}"#
        );
    }

    #[test]
    fn test_diff_sheets_missing_sheet() {
        let mut wb = Workbook::new();
        wb.create_sheet(Some("Only".into())).unwrap();
        let err = diff_sheets(&wb, "Only", "Nope", DiffOptions::default(), GridOptions::default())
            .unwrap_err();
        assert!(matches!(err, NettoolsError::SheetNotFound(name) if name == "Nope"));
    }

    #[test]
    fn test_default_sheet_pair() {
        let mut wb = Workbook::new();
        assert!(default_sheet_pair(&wb).is_err());
        wb.create_sheet(Some("One".into())).unwrap();
        assert_eq!(default_sheet_pair(&wb).unwrap(), ("One".into(), "One".into()));
        wb.create_sheet(Some("Two".into())).unwrap();
        assert_eq!(default_sheet_pair(&wb).unwrap(), ("One".into(), "Two".into()));
    }

    #[test]
    fn test_counts() {
        let a = grid("A", vec![vec!["x", "", "z"]]);
        let b = grid("B", vec![vec!["y", "q", ""]]);
        let result = SheetDiff {
            sheet_a: "A".into(),
            sheet_b: "B".into(),
            options: DiffOptions { use_header_row: false },
            records: diff(&a, &b, DiffOptions { use_header_row: false }),
        };
        let counts = result.counts();
        assert_eq!((counts.different, counts.only_in_a, counts.only_in_b), (1, 1, 1));
        assert_eq!(counts.total(), result.len());
    }
}
