//! Ragged grid view of a worksheet, the input of the sheet diff.

use crate::cell::CellValue;
use crate::worksheet::Worksheet;

/// How a worksheet is turned into a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    /// Drop rows that hold no value at all.
    pub skip_blank_rows: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions { skip_blank_rows: true }
    }
}

/// A named 2-D grid of cell values addressed by zero-based (row, column).
///
/// Rows may have different lengths; anything past the end of a row, or past
/// the last row, reads as empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// An empty grid.
    pub fn new(name: impl Into<String>) -> Self {
        Grid {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Build a grid from explicit rows.
    pub fn from_rows<R, V>(name: impl Into<String>, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Grid {
            name: name.into(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Extract the grid of a worksheet, anchored at `A1`.
    ///
    /// Each row ends at its last non-empty cell. A sheet whose data starts
    /// at `B3` keeps two leading blank rows (unless skipped) and an empty
    /// first column, so report letters match the sheet's own columns rather
    /// than being shifted to the used range.
    ///
    /// Error cells (`#N/A`, `#DIV/0!`, ...) are read as empty.
    pub fn from_worksheet(worksheet: &Worksheet, options: GridOptions) -> Self {
        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        let mut current: Option<u32> = None;

        for (row, column, data) in worksheet.sorted_cells() {
            if data.value.is_empty() || matches!(data.value, CellValue::Error(_)) {
                continue;
            }
            if current != Some(row) {
                if !options.skip_blank_rows {
                    let filled = current.unwrap_or(0);
                    rows.extend((filled + 1..row).map(|_| Vec::new()));
                }
                rows.push(Vec::new());
                current = Some(row);
            }
            let Some(cells) = rows.last_mut() else { continue };
            let idx = column as usize - 1;
            if cells.len() <= idx {
                cells.resize(idx + 1, CellValue::Empty);
            }
            cells[idx] = data.value.clone();
        }

        if !options.skip_blank_rows {
            let filled = current.unwrap_or(0);
            rows.extend((filled..worksheet.max_row()).map(|_| Vec::new()));
        }

        Grid {
            name: worksheet.title().to_string(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Text of a cell; missing cells render as `""`.
    pub fn text(&self, row: usize, column: usize) -> String {
        self.get(row, column).map(CellValue::to_text).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_ragged() {
        let grid = Grid::from_rows("S", vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.text(1, 0), "d");
        assert_eq!(grid.text(1, 2), "");
        assert_eq!(grid.text(5, 5), "");
    }

    #[test]
    fn test_from_worksheet_fills_gaps() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value(1, 1, CellValue::from("id"));
        ws.set_cell_value(1, 3, CellValue::from("name"));
        ws.set_cell_value(2, 2, CellValue::Number(5.0));

        let grid = Grid::from_worksheet(&ws, GridOptions::default());
        assert_eq!(grid.name(), "Data");
        assert_eq!(grid.rows()[0], vec![CellValue::from("id"), CellValue::Empty, CellValue::from("name")]);
        assert_eq!(grid.rows()[1], vec![CellValue::Empty, CellValue::Number(5.0)]);
    }

    #[test]
    fn test_blank_rows() {
        let mut ws = Worksheet::new("Gaps");
        ws.set_cell_value(1, 1, CellValue::from("top"));
        ws.set_cell_value(4, 1, CellValue::from("bottom"));

        let skipped = Grid::from_worksheet(&ws, GridOptions::default());
        assert_eq!(skipped.row_count(), 2);
        assert_eq!(skipped.text(1, 0), "bottom");

        let kept = Grid::from_worksheet(&ws, GridOptions { skip_blank_rows: false });
        assert_eq!(kept.row_count(), 4);
        assert!(kept.rows()[1].is_empty());
        assert_eq!(kept.text(3, 0), "bottom");
    }

    #[test]
    fn test_sparse_rows_far_down() {
        let mut ws = Worksheet::new("Far");
        ws.set_cell_value(2, 2, CellValue::from("x"));
        ws.set_cell_value(3_000_000_000, 1, CellValue::Number(1.0));

        let grid = Grid::from_worksheet(&ws, GridOptions::default());
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.rows()[0], vec![CellValue::Empty, CellValue::from("x")]);
        assert_eq!(grid.text(1, 0), "1");
    }

    #[test]
    fn test_kept_blank_rows_lead_and_trail() {
        let mut ws = Worksheet::new("Pad");
        ws.set_cell_value(3, 2, CellValue::from("b3"));
        ws.set_cell_value(5, 1, CellValue::Empty);

        let grid = Grid::from_worksheet(&ws, GridOptions { skip_blank_rows: false });
        assert_eq!(grid.row_count(), 5);
        assert!(grid.rows()[0].is_empty() && grid.rows()[1].is_empty());
        assert_eq!(grid.text(2, 1), "b3");
        assert!(grid.rows()[4].is_empty());
    }

    #[test]
    fn test_error_cells_read_as_empty() {
        let mut ws = Worksheet::new("Errs");
        ws.set_cell_value(1, 1, CellValue::from("a"));
        ws.set_cell_value(1, 2, CellValue::Error("#DIV/0!".into()));
        ws.set_cell_value(2, 1, CellValue::Error("#N/A".into()));

        let grid = Grid::from_worksheet(&ws, GridOptions::default());
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.rows()[0], vec![CellValue::from("a")]);

        let kept = Grid::from_worksheet(&ws, GridOptions { skip_blank_rows: false });
        assert_eq!(kept.row_count(), 2);
        assert!(kept.rows()[1].is_empty());
    }

    #[test]
    fn test_empty_worksheet() {
        let ws = Worksheet::new("Empty");
        let grid = Grid::from_worksheet(&ws, GridOptions { skip_blank_rows: false });
        assert!(grid.is_empty());
        assert_eq!(grid.column_count(), 0);
    }
}
