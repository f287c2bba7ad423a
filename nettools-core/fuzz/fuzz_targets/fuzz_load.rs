#![no_main]

//! Loading arbitrary bytes as a workbook must fail cleanly, never panic.
//!
//! Small inputs are also wrapped as the sheet part of an otherwise valid
//! package so the worksheet parser sees them directly.

use libfuzzer_sys::fuzz_target;
use nettools_core::{diff_sheets, records_from_workbook, DiffOptions, GridOptions, Workbook};
use std::io::{Cursor, Write};

const WORKBOOK_XML: &[u8] = br#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Fuzz" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &[u8] = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

fn exercise(workbook: &Workbook) {
    if let (Some(first), Some(last)) = (workbook.sheet_names().first(), workbook.sheet_names().last()) {
        let _ = diff_sheets(workbook, first, last, DiffOptions::default(), GridOptions::default());
    }
    let _ = records_from_workbook(workbook);
}

/// Wrap `sheet` as xl/worksheets/sheet1.xml in a minimal package.
fn wrap_as_sheet(sheet: &[u8]) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, body) in [
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", sheet),
        ] {
            zip.start_file(name, options).ok()?;
            zip.write_all(body).ok()?;
        }
        zip.finish().ok()?;
    }
    Some(buffer)
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(workbook) = Workbook::load_from_bytes(data) {
        exercise(&workbook);
    }

    if data.len() < 4096 {
        if let Some(package) = wrap_as_sheet(data) {
            if let Ok(workbook) = Workbook::load_from_bytes(&package) {
                exercise(&workbook);
                // anything that loaded must save again
                let _ = workbook.save_to_bytes().map(|bytes| Workbook::load_from_bytes(&bytes));
            }
        }
    }
});
