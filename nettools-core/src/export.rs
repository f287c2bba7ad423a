//! Diff report as a single-sheet workbook, and back.

use std::path::Path;

use tracing::debug;

use crate::cell::CellValue;
use crate::diff::{DiffRecord, DiffStatus};
use crate::error::{NettoolsError, Result};
use crate::workbook::Workbook;
use crate::worksheet::Worksheet;

/// Name of the only sheet in an exported report.
pub const EXPORT_SHEET_NAME: &str = "Differences";

/// Header row of an exported report.
pub const EXPORT_HEADER: [&str; 8] = [
    "sheetA", "sheetB", "row", "column", "header", "valueA", "valueB", "status",
];

/// File name used when a report is saved without an explicit name.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "excel-diff.xlsx";

/// Build the report workbook: header row, then one row per record in order.
pub fn export_workbook(records: &[DiffRecord]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.create_sheet(Some(EXPORT_SHEET_NAME.to_string()))?;
    sheet.reserve((records.len() + 1) * EXPORT_HEADER.len());
    sheet.append_row(EXPORT_HEADER);

    for record in records {
        sheet.append_row([
            CellValue::from(record.sheet_a.as_str()),
            CellValue::from(record.sheet_b.as_str()),
            CellValue::Number(f64::from(record.row)),
            CellValue::from(record.column.as_str()),
            CellValue::from(record.header.as_str()),
            CellValue::from(record.value_a.as_str()),
            CellValue::from(record.value_b.as_str()),
            CellValue::from(record.status.as_str()),
        ]);
    }

    Ok(workbook)
}

/// Serialize the report to `.xlsx` bytes.
pub fn export_to_bytes(records: &[DiffRecord]) -> Result<Vec<u8>> {
    let bytes = export_workbook(records)?.save_to_bytes()?;
    debug!(records = records.len(), bytes = bytes.len(), "diff report exported");
    Ok(bytes)
}

/// Write the report to `path`.
pub fn export_to_file(records: &[DiffRecord], path: impl AsRef<Path>) -> Result<()> {
    export_workbook(records)?.save(path)
}

/// Read records back from an exported report.
///
/// The `Differences` sheet must start with the exact export header; rows
/// with no cells are skipped.
pub fn records_from_workbook(workbook: &Workbook) -> Result<Vec<DiffRecord>> {
    let sheet = workbook.get_sheet_by_name(EXPORT_SHEET_NAME).map_err(|_| {
        NettoolsError::parse(format!("report has no '{}' sheet", EXPORT_SHEET_NAME))
    })?;

    for (idx, expected) in EXPORT_HEADER.iter().enumerate() {
        let found = text_at(sheet, 1, idx);
        if found != *expected {
            return Err(NettoolsError::parse(format!(
                "unexpected report header in column {}: '{}' (expected '{}')",
                idx + 1,
                found,
                expected
            )));
        }
    }

    let mut records = Vec::with_capacity(sheet.max_row().saturating_sub(1) as usize);
    for row in 2..=sheet.max_row() {
        if (1..=EXPORT_HEADER.len() as u32).all(|col| sheet.get_cell(row, col).is_none()) {
            continue;
        }

        let row_number = match sheet.get_cell_value(row, 3) {
            Some(CellValue::Number(n)) if *n >= 1.0 && n.fract() == 0.0 => *n as u32,
            Some(other) => other.to_text().trim().parse::<u32>().map_err(|_| {
                NettoolsError::parse(format!("invalid row number '{}' on report row {}", other, row))
            })?,
            None => return Err(NettoolsError::parse(format!("missing row number on report row {}", row))),
        };

        let status_text = text_at(sheet, row, 7);
        let status = DiffStatus::parse(&status_text).ok_or_else(|| {
            NettoolsError::parse(format!("unknown status '{}' on report row {}", status_text, row))
        })?;

        records.push(DiffRecord {
            sheet_a: text_at(sheet, row, 0),
            sheet_b: text_at(sheet, row, 1),
            row: row_number,
            column: text_at(sheet, row, 3),
            header: text_at(sheet, row, 4),
            value_a: text_at(sheet, row, 5),
            value_b: text_at(sheet, row, 6),
            status,
        });
    }

    Ok(records)
}

fn text_at(sheet: &Worksheet, row: u32, field: usize) -> String {
    sheet
        .get_cell_value(row, field as u32 + 1)
        .map(CellValue::to_text)
        .unwrap_or_default()
}
