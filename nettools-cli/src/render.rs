//! Plain-text and JSON rendering of tables and diff results.

use colored::Colorize;
use nettools_core::{DiffStatus, SheetDiff, Table};
use serde_json::{Map, Value};

/// Longest cell rendered before truncation.
const MAX_CELL_WIDTH: usize = 40;

fn clip(text: &str) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut clipped: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

/// Render a table with aligned columns.
pub fn text_table(table: &Table) -> String {
    if table.columns.is_empty() {
        return "(no rows)\n".to_string();
    }

    let header: Vec<String> = table.columns.iter().map(|c| clip(c)).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| clip(c)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    for row in &rows {
        out.push_str(&line(row));
    }
    out
}

/// Table as a JSON array of objects keyed by column.
pub fn json_table(table: &Table) -> Value {
    Value::Array(
        table
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = table
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|cell| Value::String(cell.clone())))
                    .collect();
                Value::Object(object)
            })
            .collect(),
    )
}

/// One-line summary of a diff.
pub fn diff_summary(result: &SheetDiff) -> String {
    let counts = result.counts();
    if result.is_empty() {
        return format!("{} '{}' and '{}' have no differences", "✓".green(), result.sheet_a, result.sheet_b);
    }
    format!(
        "'{}' vs '{}': {} differences ({} {}, {} {}, {} {})",
        result.sheet_a,
        result.sheet_b,
        counts.total().to_string().bold(),
        counts.different,
        DiffStatus::Different.as_str().yellow(),
        counts.only_in_a,
        DiffStatus::OnlyInA.as_str().red(),
        counts.only_in_b,
        DiffStatus::OnlyInB.as_str().green(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            columns: vec!["host".into(), "ip".into()],
            rows: vec![
                vec!["core-sw1".into(), "10.0.0.1".into()],
                vec!["a".into(), "".into()],
            ],
        }
    }

    #[test]
    fn test_text_table_alignment() {
        let text = text_table(&table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "host      ip");
        assert_eq!(lines[1], "--------  --------");
        assert_eq!(lines[2], "core-sw1  10.0.0.1");
        assert_eq!(lines[3], "a");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(text_table(&Table::default()), "(no rows)\n");
    }

    #[test]
    fn test_clip_long_cells() {
        let long = "x".repeat(100);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), MAX_CELL_WIDTH);
        assert!(clipped.ends_with('…'));
        assert_eq!(clip("a\nb"), "a b");
    }

    #[test]
    fn test_json_table() {
        let value = json_table(&table());
        assert_eq!(value[0]["host"], "core-sw1");
        assert_eq!(value[1]["ip"], "");
    }
}
