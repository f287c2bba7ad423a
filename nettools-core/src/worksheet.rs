//! Worksheet storage: a sparse cell map with tracked bounds.

#[cfg(feature = "fast-hash")]
type CellMap = hashbrown::HashMap<u64, CellData, ahash::RandomState>;
#[cfg(not(feature = "fast-hash"))]
type CellMap = std::collections::HashMap<u64, CellData>;

use crate::cell::CellValue;
use crate::utils::coordinate_from_row_col;

/// Pack a 1-indexed (row, column) pair into a single map key.
#[inline]
pub fn cell_key(row: u32, column: u32) -> u64 {
    ((row as u64) << 32) | column as u64
}

/// Unpack a key produced by [`cell_key`].
#[inline]
pub fn split_key(key: u64) -> (u32, u32) {
    ((key >> 32) as u32, key as u32)
}

/// A stored cell: its value and, for formula cells, the formula text.
///
/// For formula cells `value` is the cached result written by the producing
/// application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    pub formula: Option<String>,
}

impl CellData {
    pub fn new(value: CellValue) -> Self {
        CellData { value, formula: None }
    }
}

/// A named worksheet.
#[derive(Clone, Debug)]
pub struct Worksheet {
    title: String,
    pub(crate) cells: CellMap,
    max_row: u32,
    max_column: u32,
}

impl Worksheet {
    /// Create an empty worksheet.
    pub fn new(title: impl Into<String>) -> Self {
        Worksheet {
            title: title.into(),
            cells: CellMap::default(),
            max_row: 0,
            max_column: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Highest 1-indexed row holding a stored cell (0 when empty).
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Highest 1-indexed column holding a stored cell (0 when empty).
    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reserve room for `additional` cells.
    pub fn reserve(&mut self, additional: usize) {
        self.cells.reserve(additional);
    }

    /// Set a cell value (1-indexed), clearing any formula.
    pub fn set_cell_value(&mut self, row: u32, column: u32, value: CellValue) {
        self.set_cell_data(row, column, CellData::new(value));
    }

    /// Set a formula and its cached result.
    pub fn set_cell_formula(&mut self, row: u32, column: u32, formula: String, cached: CellValue) {
        self.set_cell_data(
            row,
            column,
            CellData {
                value: cached,
                formula: Some(formula),
            },
        );
    }

    pub fn set_cell_data(&mut self, row: u32, column: u32, data: CellData) {
        self.max_row = self.max_row.max(row);
        self.max_column = self.max_column.max(column);
        self.cells.insert(cell_key(row, column), data);
    }

    pub fn get_cell(&self, row: u32, column: u32) -> Option<&CellData> {
        self.cells.get(&cell_key(row, column))
    }

    pub fn get_cell_value(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.get_cell(row, column).map(|c| &c.value)
    }

    /// Append a row after the last used row, starting at column A.
    pub fn append_row<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let row = self.max_row + 1;
        let mut touched = false;
        for (idx, value) in values.into_iter().enumerate() {
            let value = value.into();
            if value.is_empty() {
                continue;
            }
            self.set_cell_value(row, idx as u32 + 1, value);
            touched = true;
        }
        if !touched {
            self.max_row = row;
        }
    }

    /// Used range as an `A1:C5` reference, or `None` for an empty sheet.
    pub fn dimension(&self) -> Option<String> {
        if self.cells.is_empty() {
            return None;
        }
        Some(format!(
            "A1:{}",
            coordinate_from_row_col(self.max_row.max(1), self.max_column.max(1))
        ))
    }

    /// All stored cells in row-major order.
    pub fn sorted_cells(&self) -> Vec<(u32, u32, &CellData)> {
        let mut keys: Vec<u64> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|key| {
                let (row, column) = split_key(key);
                self.cells.get(&key).map(|data| (row, column, data))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_tracking() {
        let mut ws = Worksheet::new("Data");
        assert_eq!(ws.dimension(), None);
        ws.set_cell_value(3, 2, CellValue::Number(1.0));
        ws.set_cell_value(1, 5, CellValue::from("x"));
        assert_eq!(ws.max_row(), 3);
        assert_eq!(ws.max_column(), 5);
        assert_eq!(ws.dimension().as_deref(), Some("A1:E3"));
    }

    #[test]
    fn test_sorted_cells_row_major() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value(2, 1, CellValue::from("c"));
        ws.set_cell_value(1, 2, CellValue::from("b"));
        ws.set_cell_value(1, 1, CellValue::from("a"));
        let order: Vec<(u32, u32)> = ws.sorted_cells().iter().map(|(r, c, _)| (*r, *c)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_append_row_skips_empty_values() {
        let mut ws = Worksheet::new("Out");
        ws.append_row(vec![CellValue::from("h1"), CellValue::Empty, CellValue::from("h3")]);
        ws.append_row(Vec::<CellValue>::new());
        ws.append_row(vec![CellValue::Number(7.0)]);
        assert_eq!(ws.get_cell_value(1, 3), Some(&CellValue::from("h3")));
        assert!(ws.get_cell(1, 2).is_none());
        assert_eq!(ws.get_cell_value(3, 1), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_formula_keeps_cached_value() {
        let mut ws = Worksheet::new("F");
        ws.set_cell_formula(1, 1, "SUM(B1:B2)".into(), CellValue::Number(3.0));
        let cell = ws.get_cell(1, 1).unwrap();
        assert_eq!(cell.formula.as_deref(), Some("SUM(B1:B2)"));
        assert_eq!(cell.value, CellValue::Number(3.0));
    }
}
