//! Tabular preview returned by the processing API.

use serde_json::{Map, Value};

use crate::diff::DiffRecord;
use crate::error::{NettoolsError, Result};
use crate::export::EXPORT_HEADER;

/// Rows of text under named columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a JSON array of objects.
    ///
    /// Columns follow first-seen key order across all rows; missing keys
    /// render as empty cells.
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| NettoolsError::parse(format!("expected a JSON array, got {}", kind_of(value))))?;

        let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                NettoolsError::parse(format!("row {} is {}, expected an object", idx, kind_of(item)))
            })?;
            objects.push(object);
        }

        let mut columns: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table { columns, rows })
    }

    /// Diff records under the export header.
    pub fn from_records(records: &[DiffRecord]) -> Self {
        Table {
            columns: EXPORT_HEADER.iter().map(|h| h.to_string()).collect(),
            rows: records
                .iter()
                .map(|r| {
                    vec![
                        r.sheet_a.clone(),
                        r.sheet_b.clone(),
                        r.row.to_string(),
                        r.column.clone(),
                        r.header.clone(),
                        r.value_a.clone(),
                        r.value_b.clone(),
                        r.status.to_string(),
                    ]
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Text of a JSON scalar: strings unquoted, null empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
