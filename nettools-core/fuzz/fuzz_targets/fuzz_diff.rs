#![no_main]

//! Properties of the sheet diff on arbitrary grids.

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use nettools_core::{diff, export_to_bytes, records_from_workbook, CellValue, DiffOptions, DiffStatus, Grid, Workbook};

const MAX_ROWS: usize = 30;
const MAX_COLS: usize = 30;

#[derive(Debug, Clone)]
struct FuzzCell(CellValue);

impl<'a> Arbitrary<'a> for FuzzCell {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(FuzzCell(match u.int_in_range(0..=3u8)? {
            0 => CellValue::Empty,
            1 => {
                let choices = ["", "0", "x", "y", " x", "true", "1"];
                CellValue::from(*u.choose(&choices)?)
            }
            2 => CellValue::Number(u.arbitrary::<i16>()? as f64 / 4.0),
            _ => CellValue::Boolean(u.arbitrary()?),
        }))
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    a: Vec<Vec<FuzzCell>>,
    b: Vec<Vec<FuzzCell>>,
    use_header_row: bool,
}

fn to_grid(name: &str, rows: Vec<Vec<FuzzCell>>) -> Grid {
    Grid::from_rows(
        name,
        rows.into_iter()
            .take(MAX_ROWS)
            .map(|row| row.into_iter().take(MAX_COLS).map(|c| c.0).collect::<Vec<_>>()),
    )
}

fuzz_target!(|input: Input| {
    let a = to_grid("A", input.a);
    let b = to_grid("B", input.b);
    let options = DiffOptions { use_header_row: input.use_header_row };

    let records = diff(&a, &b, options);
    let bound = a.row_count().max(b.row_count()) * a.column_count().max(b.column_count());
    assert!(records.len() <= bound);

    for record in &records {
        assert_ne!(record.value_a, record.value_b);
        match record.status {
            DiffStatus::OnlyInA => assert!(record.value_b.is_empty()),
            DiffStatus::OnlyInB => assert!(record.value_a.is_empty()),
            DiffStatus::Different => assert!(!record.value_a.is_empty() && !record.value_b.is_empty()),
        }
    }

    assert!(diff(&a, &a, DiffOptions { use_header_row: false }).is_empty());

    let bytes = export_to_bytes(&records).expect("export");
    let reloaded = Workbook::load_from_bytes(&bytes).expect("reload");
    assert_eq!(records_from_workbook(&reloaded).expect("records"), records);
});
