//! SpreadsheetML part writers used by [`Workbook::save`](crate::Workbook::save).

use std::collections::HashMap;
use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::cell::CellValue;
use crate::error::Result;
use crate::utils::coordinate_from_row_col;
use crate::worksheet::Worksheet;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Escape text for use in XML content or attribute values.
///
/// Characters that XML 1.0 cannot represent are dropped.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

/// Collect every distinct string in the workbook, in first-seen order.
pub fn collect_shared_strings(worksheets: &[Worksheet]) -> (Vec<&str>, HashMap<&str, usize>) {
    let mut strings = Vec::new();
    let mut index = HashMap::new();

    for ws in worksheets {
        for (_, _, data) in ws.sorted_cells() {
            if data.formula.is_some() {
                continue;
            }
            if let CellValue::String(s) = &data.value {
                let s: &str = s;
                if !index.contains_key(s) {
                    index.insert(s, strings.len());
                    strings.push(s);
                }
            }
        }
    }

    (strings, index)
}

fn push_number(out: &mut String, n: f64) {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(n as i64));
    } else {
        let mut buf = ryu::Buffer::new();
        out.push_str(buf.format_finite(n));
    }
}

/// Append the `<c>` element for one cell to `out`.
pub fn format_cell(
    out: &mut String,
    coord: &str,
    value: &CellValue,
    formula: Option<&str>,
    shared_strings: &HashMap<&str, usize>,
) {
    let (type_attr, body) = match value {
        CellValue::Empty => (None, String::new()),
        CellValue::Number(n) if !n.is_finite() => (Some("e"), "#NUM!".to_string()),
        CellValue::Number(n) => {
            let mut s = String::new();
            push_number(&mut s, *n);
            (None, s)
        }
        CellValue::Boolean(b) => (Some("b"), if *b { "1" } else { "0" }.to_string()),
        CellValue::Date(d) => (Some("d"), escape_xml(d)),
        CellValue::Error(e) => (Some("e"), escape_xml(e)),
        CellValue::String(s) => match (formula, shared_strings.get(&**s)) {
            (None, Some(idx)) => (Some("s"), idx.to_string()),
            _ => (Some("str"), escape_xml(s)),
        },
    };

    out.push_str("<c r=\"");
    out.push_str(coord);
    out.push('"');
    if let Some(t) = type_attr {
        out.push_str(" t=\"");
        out.push_str(t);
        out.push('"');
    }

    if formula.is_none() && value.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if let Some(f) = formula {
        out.push_str("<f>");
        out.push_str(&escape_xml(f));
        out.push_str("</f>");
    }
    if !value.is_empty() {
        out.push_str("<v>");
        out.push_str(&body);
        out.push_str("</v>");
    }
    out.push_str("</c>");
}

pub fn write_content_types<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    sheet_count: usize,
    has_shared_strings: bool,
) -> Result<()> {
    zip.start_file("[Content_Types].xml", options)?;

    let mut content = format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        XML_DECL
    );

    for i in 1..=sheet_count {
        content.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
            i
        ));
    }
    if has_shared_strings {
        content.push_str("<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\n");
    }

    content.push_str("</Types>");
    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_rels<W: Write + Seek>(zip: &mut ZipWriter<W>, options: SimpleFileOptions) -> Result<()> {
    zip.start_file("_rels/.rels", options)?;
    let content = format!(
        r#"{}
<Relationships xmlns="{}">
<Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#,
        XML_DECL, NS_PKG_REL, NS_REL, NS_REL
    );
    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_doc_props<W: Write + Seek>(zip: &mut ZipWriter<W>, options: SimpleFileOptions) -> Result<()> {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    zip.start_file("docProps/core.xml", options)?;
    let core = format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>nettools</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
</cp:coreProperties>"#,
        XML_DECL, created
    );
    zip.write_all(core.as_bytes())?;

    zip.start_file("docProps/app.xml", options)?;
    let app = format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>nettools</Application>
</Properties>"#,
        XML_DECL
    );
    zip.write_all(app.as_bytes())?;
    Ok(())
}

pub fn write_workbook_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    sheet_names: &[String],
) -> Result<()> {
    zip.start_file("xl/workbook.xml", options)?;

    let mut content = format!(
        "{}\n<workbook xmlns=\"{}\" xmlns:r=\"{}\">\n<sheets>\n",
        XML_DECL, NS_MAIN, NS_REL
    );
    for (i, name) in sheet_names.iter().enumerate() {
        content.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>\n",
            escape_xml(name),
            i + 1,
            i + 1
        ));
    }
    content.push_str("</sheets>\n</workbook>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_workbook_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    sheet_count: usize,
    has_shared_strings: bool,
) -> Result<()> {
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;

    let mut content = format!("{}\n<Relationships xmlns=\"{}\">\n", XML_DECL, NS_PKG_REL);
    for i in 1..=sheet_count {
        content.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>\n",
            i, NS_REL, i
        ));
    }
    content.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{}/styles\" Target=\"styles.xml\"/>\n",
        sheet_count + 1,
        NS_REL
    ));
    if has_shared_strings {
        content.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/sharedStrings\" Target=\"sharedStrings.xml\"/>\n",
            sheet_count + 2,
            NS_REL
        ));
    }
    content.push_str("</Relationships>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_shared_strings<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    strings: &[&str],
) -> Result<()> {
    zip.start_file("xl/sharedStrings.xml", options)?;

    let mut content = format!(
        "{}\n<sst xmlns=\"{}\" count=\"{}\" uniqueCount=\"{}\">",
        XML_DECL,
        NS_MAIN,
        strings.len(),
        strings.len()
    );
    for s in strings {
        content.push_str("<si><t xml:space=\"preserve\">");
        content.push_str(&escape_xml(s));
        content.push_str("</t></si>");
    }
    content.push_str("</sst>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_styles_xml<W: Write + Seek>(zip: &mut ZipWriter<W>, options: SimpleFileOptions) -> Result<()> {
    zip.start_file("xl/styles.xml", options)?;
    let content = format!(
        r#"{}
<styleSheet xmlns="{}">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#,
        XML_DECL, NS_MAIN
    );
    zip.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_worksheet_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    worksheet: &Worksheet,
    sheet_id: u32,
    shared_strings: &HashMap<&str, usize>,
) -> Result<()> {
    zip.start_file(format!("xl/worksheets/sheet{}.xml", sheet_id), options)?;

    let mut content = format!("{}\n<worksheet xmlns=\"{}\" xmlns:r=\"{}\">\n", XML_DECL, NS_MAIN, NS_REL);
    content.push_str(&format!(
        "<dimension ref=\"{}\"/>\n<sheetData>\n",
        worksheet.dimension().unwrap_or_else(|| "A1".to_string())
    ));

    let mut open_row: Option<u32> = None;
    for (row, column, data) in worksheet.sorted_cells() {
        if open_row != Some(row) {
            if open_row.is_some() {
                content.push_str("</row>\n");
            }
            content.push_str(&format!("<row r=\"{}\">", row));
            open_row = Some(row);
        }
        let coord = coordinate_from_row_col(row, column);
        format_cell(&mut content, &coord, &data.value, data.formula.as_deref(), shared_strings);
    }
    if open_row.is_some() {
        content.push_str("</row>\n");
    }

    content.push_str(
        "</sheetData>\n<pageMargins left=\"0.75\" right=\"0.75\" top=\"1\" bottom=\"1\" header=\"0.5\" footer=\"0.5\"/>\n</worksheet>",
    );

    zip.write_all(content.as_bytes())?;
    Ok(())
}
