//! Workbook representation and file I/O operations.

#[cfg(feature = "fast-hash")]
use hashbrown::HashMap;
#[cfg(not(feature = "fast-hash"))]
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rayon::prelude::*;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive};

use crate::cell::{CellValue, InternedString};
use crate::error::{NettoolsError, Result};
use crate::utils::{
    parse_coordinate, parse_coordinate_bytes, parse_f64_bytes, parse_u32_bytes, MAX_COLUMN, MAX_ROW,
};
use crate::worksheet::{CellData, Worksheet};
use crate::writer;

/// Compression level for saving workbooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1)
    Fast,
    /// Default compression (deflate level 6)
    #[default]
    Default,
    /// Best compression (deflate level 9) - smallest files, slowest
    Best,
}

/// An Excel workbook containing worksheets.
#[derive(Clone, Debug)]
pub struct Workbook {
    /// List of worksheets.
    pub worksheets: Vec<Worksheet>,
    /// Sheet names (parallel to worksheets).
    pub sheet_names: Vec<String>,
    /// Compression level for saving.
    pub compression: CompressionLevel,
}

/// Sheet entry from workbook.xml: (name, sheetId, relationship id).
type SheetInfo = (String, u32, String);

impl Workbook {
    /// Create a new empty workbook.
    pub fn new() -> Self {
        Workbook {
            worksheets: Vec::new(),
            sheet_names: Vec::new(),
            compression: CompressionLevel::default(),
        }
    }

    /// Set compression level for saving.
    pub fn set_compression(&mut self, level: CompressionLevel) {
        self.compression = level;
    }

    /// Load a workbook from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            NettoolsError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open '{}': {}", path.display(), e),
            ))
        })?;

        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut workbook = Workbook::new();
        workbook.parse_workbook(&mut archive)?;

        debug!(path = %path.display(), sheets = workbook.sheet_names.len(), "workbook loaded");
        Ok(workbook)
    }

    /// Load a workbook from bytes (e.g. an uploaded file).
    pub fn load_from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut workbook = Workbook::new();
        workbook.parse_workbook(&mut archive)?;

        debug!(bytes = data.len(), sheets = workbook.sheet_names.len(), "workbook loaded");
        Ok(workbook)
    }

    /// Get the active (first) worksheet.
    pub fn active(&self) -> Result<&Worksheet> {
        self.worksheets.first().ok_or(NettoolsError::NoWorksheets)
    }

    /// Get all worksheets.
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// Get all sheet names, in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Get a worksheet by name.
    pub fn get_sheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        self.sheet_names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.worksheets[idx])
            .ok_or_else(|| NettoolsError::SheetNotFound(name.to_string()))
    }

    /// Get a mutable worksheet by name.
    pub fn get_sheet_by_name_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        match self.sheet_names.iter().position(|n| n == name) {
            Some(idx) => Ok(&mut self.worksheets[idx]),
            None => Err(NettoolsError::SheetNotFound(name.to_string())),
        }
    }

    /// Get a worksheet by index.
    pub fn get_sheet_by_index(&self, index: usize) -> Result<&Worksheet> {
        self.worksheets
            .get(index)
            .ok_or_else(|| NettoolsError::SheetNotFound(format!("index {}", index)))
    }

    /// Create a new worksheet.
    pub fn create_sheet(&mut self, title: Option<String>) -> Result<&mut Worksheet> {
        let sheet_title = title.unwrap_or_else(|| format!("Sheet{}", self.worksheets.len() + 1));

        if self.sheet_names.contains(&sheet_title) {
            return Err(NettoolsError::WorksheetAlreadyExists(sheet_title));
        }

        self.worksheets.push(Worksheet::new(sheet_title.clone()));
        self.sheet_names.push(sheet_title);

        let idx = self.worksheets.len() - 1;
        Ok(&mut self.worksheets[idx])
    }

    /// Remove a worksheet by name.
    pub fn remove_sheet(&mut self, sheet_name: &str) -> Result<()> {
        let idx = self
            .sheet_names
            .iter()
            .position(|n| n == sheet_name)
            .ok_or_else(|| NettoolsError::SheetNotFound(sheet_name.to_string()))?;
        self.worksheets.remove(idx);
        self.sheet_names.remove(idx);
        Ok(())
    }

    /// Save the workbook to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.save_to_writer(file)
    }

    /// Save the workbook to an in-memory byte vector.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        self.write_workbook_contents(&mut zip)?;
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Save the workbook to any writer that implements Write + Seek.
    pub fn save_to_writer<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = zip::ZipWriter::new(writer);
        self.write_workbook_contents(&mut zip)?;
        zip.finish()?;
        Ok(())
    }

    /// Get the file options based on compression settings.
    fn get_file_options(&self) -> SimpleFileOptions {
        let base = SimpleFileOptions::default().large_file(false);
        match self.compression {
            CompressionLevel::None => base.compression_method(CompressionMethod::Stored),
            CompressionLevel::Fast => base
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Default => base
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::Best => base
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }

    /// Write all workbook parts to a ZipWriter.
    fn write_workbook_contents<W: Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> Result<()> {
        if self.worksheets.is_empty() {
            return Err(NettoolsError::NoWorksheets);
        }

        let options = self.get_file_options();
        let (shared_strings, shared_index) = writer::collect_shared_strings(&self.worksheets);
        let has_shared_strings = !shared_strings.is_empty();

        writer::write_content_types(zip, options, self.worksheets.len(), has_shared_strings)?;
        writer::write_rels(zip, options)?;
        writer::write_doc_props(zip, options)?;
        writer::write_workbook_xml(zip, options, &self.sheet_names)?;
        writer::write_workbook_rels(zip, options, self.worksheets.len(), has_shared_strings)?;
        if has_shared_strings {
            writer::write_shared_strings(zip, options, &shared_strings)?;
        }
        writer::write_styles_xml(zip, options)?;

        for (idx, worksheet) in self.worksheets.iter().enumerate() {
            writer::write_worksheet_xml(zip, options, worksheet, (idx + 1) as u32, &shared_index)?;
        }

        Ok(())
    }

    /// Parse workbook from ZIP archive with parallel worksheet parsing.
    fn parse_workbook<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        // Phase 1: pull every needed part into memory (ZIP access is sequential)
        let workbook_xml = Self::read_zip_file_to_vec(archive, "xl/workbook.xml")?;
        let workbook_rels_xml = Self::read_zip_file_to_vec(archive, "xl/_rels/workbook.xml.rels").ok();
        let shared_strings_xml = Self::read_zip_file_to_vec(archive, "xl/sharedStrings.xml").ok();

        let sheet_info = Self::parse_workbook_xml(Cursor::new(&workbook_xml))?;
        let rels_map = match workbook_rels_xml {
            Some(xml) => Self::parse_workbook_rels(Cursor::new(&xml))?,
            None => HashMap::new(),
        };

        let mut sheet_data: Vec<(String, Vec<u8>)> = Vec::with_capacity(sheet_info.len());
        for (sheet_name, sheet_id, sheet_rid) in &sheet_info {
            let sheet_path = match rels_map.get(sheet_rid) {
                Some(target) => match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", target),
                },
                None => format!("xl/worksheets/sheet{}.xml", sheet_id),
            };
            let sheet_xml = Self::read_zip_file_to_vec(archive, &sheet_path)?;
            sheet_data.push((sheet_name.clone(), sheet_xml));
        }

        // Phase 2: shared strings must exist before any sheet is parsed
        let shared_strings = match shared_strings_xml {
            Some(xml) => Self::parse_shared_strings_xml(Cursor::new(&xml))?,
            None => Vec::new(),
        };

        // Phase 3: sheets are independent; fan out when there is more than one
        let parse_one = |(sheet_name, sheet_xml): &(String, Vec<u8>)| -> Result<Worksheet> {
            let mut worksheet = Worksheet::new(sheet_name.clone());
            Self::parse_worksheet_xml(Cursor::new(sheet_xml), &shared_strings, &mut worksheet)?;
            Ok(worksheet)
        };
        let worksheets: Vec<Result<Worksheet>> = if sheet_data.len() > 1 {
            sheet_data.par_iter().map(parse_one).collect()
        } else {
            sheet_data.iter().map(parse_one).collect()
        };

        for result in worksheets {
            let worksheet = result?;
            self.sheet_names.push(worksheet.title().to_string());
            self.worksheets.push(worksheet);
        }

        Ok(())
    }

    /// Read a file from the ZIP archive into a Vec<u8>.
    fn read_zip_file_to_vec<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| NettoolsError::parse(format!("failed to find {} in archive: {}", path, e)))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Get an attribute value by (local) name.
    fn get_attr_str(e: &BytesStart, key: &[u8]) -> Option<String> {
        e.attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == key || attr.key.local_name().as_ref() == key)
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
    }

    /// Parses workbook.xml and returns sheet info (name, sheetId, rId) in order.
    fn parse_workbook_xml<R: BufRead>(reader: R) -> Result<Vec<SheetInfo>> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);

        let mut sheets = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"sheet" {
                        let name = Self::get_attr_str(&e, b"name");
                        let id = Self::get_attr_str(&e, b"sheetId").and_then(|s| s.parse::<u32>().ok());
                        let rid = Self::get_attr_str(&e, b"id");
                        if let (Some(name), Some(id)) = (name, id) {
                            sheets.push((name, id, rid.unwrap_or_default()));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(NettoolsError::parse(format!("XML parsing error in workbook.xml: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Parses workbook.xml.rels and returns a mapping of relationship IDs to target paths.
    fn parse_workbook_rels<R: BufRead>(reader: R) -> Result<HashMap<String, String>> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);

        let mut rels = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        if let (Some(id), Some(target)) =
                            (Self::get_attr_str(&e, b"Id"), Self::get_attr_str(&e, b"Target"))
                        {
                            rels.insert(id, target);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(NettoolsError::parse(format!(
                        "XML parsing error in workbook.xml.rels: {}",
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Parses sharedStrings.xml; rich-text runs are concatenated and
    /// phonetic (`rPh`) runs skipped.
    fn parse_shared_strings_xml<R: BufRead>(reader: R) -> Result<Vec<InternedString>> {
        let mut reader = Reader::from_reader(reader);
        // whitespace inside <t> is significant
        reader.config_mut().trim_text(false);

        let mut strings = Vec::new();
        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"t" => in_t = true,
                    b"rPh" => in_phonetic = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(Arc::from(""));
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_t && !in_phonetic {
                        let text = e
                            .unescape()
                            .map_err(|err| NettoolsError::parse(format!("bad shared string: {}", err)))?;
                        current.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"t" => in_t = false,
                    b"rPh" => in_phonetic = false,
                    b"si" => {
                        strings.push(Arc::from(current.as_str()));
                        current.clear();
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(NettoolsError::parse(format!(
                        "XML parsing error in sharedStrings.xml: {}",
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn estimate_dimension_cells(ref_str: &str) -> Option<usize> {
        let ref_str = ref_str.trim();
        let (start, end) = match ref_str.split_once(':') {
            Some((a, b)) => (parse_coordinate(a).ok()?, parse_coordinate(b).ok()?),
            None => {
                let coord = parse_coordinate(ref_str).ok()?;
                (coord, coord)
            }
        };

        if end.0 < start.0 || end.1 < start.1 {
            return None;
        }

        let rows = (end.0 - start.0 + 1) as u64;
        let cols = (end.1 - start.1 + 1) as u64;
        let cells = rows.saturating_mul(cols);
        let max_reserve = 5_000_000u64;

        if cells == 0 || cells > max_reserve {
            return None;
        }

        Some(cells as usize)
    }

    fn parse_worksheet_xml<R: BufRead>(
        reader: R,
        shared_strings: &[InternedString],
        worksheet: &mut Worksheet,
    ) -> Result<()> {
        let mut reader = Reader::from_reader(reader);
        // whitespace inside <v>/<t> is significant
        reader.config_mut().trim_text(false);

        #[derive(Clone, Copy, PartialEq)]
        enum CellType {
            Number,
            Shared,
            InlineStr,
            Str,
            Bool,
            Error,
            Date,
        }

        fn cell_type(raw: &[u8]) -> CellType {
            match raw {
                b"s" => CellType::Shared,
                b"inlineStr" => CellType::InlineStr,
                b"str" => CellType::Str,
                b"b" => CellType::Bool,
                b"e" => CellType::Error,
                b"d" => CellType::Date,
                _ => CellType::Number,
            }
        }

        let mut buf = Vec::new();
        let mut current_row: u32 = 0;
        let mut last_col: u32 = 0;
        let mut cell_pos: Option<(u32, u32)> = None;
        let mut current_type = CellType::Number;
        let mut value_text = String::new();
        let mut has_value = false;
        let mut formula: Option<String> = None;
        let mut in_v = false;
        let mut in_t = false;
        let mut in_f = false;
        let mut reserved_cells = false;

        // Cell position from the r attribute, or the next column in the row.
        fn position(e: &BytesStart<'_>, current_row: u32, last_col: &mut u32) -> Result<Option<(u32, u32)>> {
            let explicit = e
                .attributes()
                .flatten()
                .find(|attr| attr.key.as_ref() == b"r")
                .and_then(|attr| parse_coordinate_bytes(&attr.value));
            let pos = match explicit {
                Some(pos) => Some(pos),
                None if current_row == 0 => None,
                None if *last_col >= MAX_COLUMN => {
                    return Err(NettoolsError::parse(format!(
                        "row {} runs past column {}",
                        current_row, MAX_COLUMN
                    )))
                }
                None => Some((current_row, *last_col + 1)),
            };
            if let Some((_, col)) = pos {
                *last_col = col;
            }
            Ok(pos)
        }

        // Row number from the r attribute, or the row after the previous one.
        fn row_number(e: &BytesStart<'_>, current_row: u32) -> Result<u32> {
            let row = match Workbook::get_attr_str(e, b"r") {
                Some(r) => parse_u32_bytes(r.as_bytes())
                    .ok_or_else(|| NettoolsError::parse(format!("invalid row number '{}'", r)))?,
                None => current_row.saturating_add(1),
            };
            if row == 0 || row > MAX_ROW {
                return Err(NettoolsError::parse(format!(
                    "row number {} outside 1..={}",
                    row, MAX_ROW
                )));
            }
            Ok(row)
        }

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"dimension" if !reserved_cells => {
                        if let Some(cap) = Self::get_attr_str(&e, b"ref")
                            .and_then(|r| Self::estimate_dimension_cells(&r))
                        {
                            worksheet.reserve(cap);
                            reserved_cells = true;
                        }
                    }
                    b"row" => {
                        current_row = row_number(&e, current_row)?;
                        last_col = 0;
                    }
                    b"c" => {
                        cell_pos = position(&e, current_row, &mut last_col)?;
                        current_type = Self::get_attr_str(&e, b"t")
                            .map(|t| cell_type(t.as_bytes()))
                            .unwrap_or(CellType::Number);
                        value_text.clear();
                        has_value = false;
                        formula = None;
                    }
                    b"v" => in_v = true,
                    b"t" => in_t = true,
                    b"f" => in_f = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"dimension" if !reserved_cells => {
                        if let Some(cap) = Self::get_attr_str(&e, b"ref")
                            .and_then(|r| Self::estimate_dimension_cells(&r))
                        {
                            worksheet.reserve(cap);
                            reserved_cells = true;
                        }
                    }
                    b"row" => {
                        current_row = row_number(&e, current_row)?;
                        last_col = 0;
                    }
                    b"c" => {
                        // <c r="A1" t="s"/> carries no value; string-typed ones
                        // are kept as empty strings
                        if let Some((row, col)) = position(&e, current_row, &mut last_col)? {
                            let t = Self::get_attr_str(&e, b"t")
                                .map(|t| cell_type(t.as_bytes()))
                                .unwrap_or(CellType::Number);
                            if matches!(t, CellType::Shared | CellType::InlineStr | CellType::Str) {
                                worksheet.set_cell_value(row, col, CellValue::String(Arc::from("")));
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_v || in_t || in_f {
                        let text = e
                            .unescape()
                            .map_err(|err| NettoolsError::parse(format!("bad cell text: {}", err)))?;
                        if in_f {
                            formula.get_or_insert_with(String::new).push_str(&text);
                        } else {
                            value_text.push_str(&text);
                            has_value = true;
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => {
                        in_v = false;
                        has_value = true;
                    }
                    b"t" => {
                        in_t = false;
                        has_value = true;
                    }
                    b"f" => in_f = false,
                    b"row" => last_col = 0,
                    b"c" => {
                        if let Some((row, col)) = cell_pos.take() {
                            let value = if !has_value {
                                match current_type {
                                    CellType::Shared | CellType::InlineStr | CellType::Str => {
                                        CellValue::String(Arc::from(""))
                                    }
                                    _ => CellValue::Empty,
                                }
                            } else {
                                match current_type {
                                    CellType::Shared => match value_text.trim().parse::<usize>() {
                                        Ok(idx) if idx < shared_strings.len() => {
                                            CellValue::String(shared_strings[idx].clone())
                                        }
                                        _ => {
                                            return Err(NettoolsError::parse(format!(
                                                "shared string index '{}' out of range",
                                                value_text
                                            )))
                                        }
                                    },
                                    CellType::InlineStr | CellType::Str => {
                                        CellValue::String(Arc::from(value_text.as_str()))
                                    }
                                    CellType::Bool => {
                                        let v = value_text.trim();
                                        CellValue::Boolean(v == "1" || v.eq_ignore_ascii_case("true"))
                                    }
                                    CellType::Error => CellValue::Error(value_text.clone()),
                                    CellType::Date => CellValue::Date(value_text.clone()),
                                    CellType::Number if value_text.trim().is_empty() => CellValue::Empty,
                                    CellType::Number => match parse_f64_bytes(value_text.trim().as_bytes()) {
                                        Some(n) => CellValue::Number(n),
                                        None => CellValue::String(Arc::from(value_text.as_str())),
                                    },
                                }
                            };

                            match formula.take() {
                                Some(f) => worksheet.set_cell_formula(row, col, f, value),
                                None if !value.is_empty() => {
                                    worksheet.set_cell_data(row, col, CellData::new(value))
                                }
                                None => {}
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(NettoolsError::parse(format!(
                        "XML parsing error in sheet '{}': {}",
                        worksheet.title(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_new() {
        let wb = Workbook::new();
        assert!(wb.worksheets.is_empty());
        assert!(wb.sheet_names.is_empty());
        assert!(matches!(wb.active(), Err(NettoolsError::NoWorksheets)));
    }

    #[test]
    fn test_create_sheet_duplicate() {
        let mut wb = Workbook::new();
        wb.create_sheet(Some("Sheet1".to_string())).unwrap();
        let result = wb.create_sheet(Some("Sheet1".to_string()));
        assert!(matches!(result, Err(NettoolsError::WorksheetAlreadyExists(_))));
        wb.create_sheet(None).unwrap();
        assert_eq!(wb.sheet_names, vec!["Sheet1", "Sheet2"]);
    }

    #[test]
    fn test_get_sheet_by_name_missing() {
        let mut wb = Workbook::new();
        wb.create_sheet(Some("MySheet".to_string())).unwrap();
        assert_eq!(wb.get_sheet_by_name("MySheet").unwrap().title(), "MySheet");
        assert!(matches!(
            wb.get_sheet_by_name("Other"),
            Err(NettoolsError::SheetNotFound(name)) if name == "Other"
        ));
    }

    #[test]
    fn test_remove_sheet() {
        let mut wb = Workbook::new();
        wb.create_sheet(Some("Sheet1".to_string())).unwrap();
        wb.create_sheet(Some("Sheet2".to_string())).unwrap();
        wb.remove_sheet("Sheet1").unwrap();
        assert_eq!(wb.sheet_names, vec!["Sheet2"]);
        assert!(wb.remove_sheet("Sheet1").is_err());
    }

    #[test]
    fn test_parse_workbook_rels() {
        let rels_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet5.xml"/>
</Relationships>"#;

        let rels = Workbook::parse_workbook_rels(Cursor::new(rels_xml)).unwrap();
        assert_eq!(rels.get("rId1").map(String::as_str), Some("worksheets/sheet1.xml"));
        assert_eq!(rels.get("rId2").map(String::as_str), Some("worksheets/sheet5.xml"));
    }

    #[test]
    fn test_parse_workbook_xml_with_rids() {
        let workbook_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="Data" sheetId="8" r:id="rId1"/>
        <sheet name="Summary" sheetId="2" r:id="rId2"/>
    </sheets>
</workbook>"#;

        let sheets = Workbook::parse_workbook_xml(Cursor::new(workbook_xml)).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0], ("Data".to_string(), 8, "rId1".to_string()));
        assert_eq!(sheets[1], ("Summary".to_string(), 2, "rId2".to_string()));
    }

    #[test]
    fn test_parse_shared_strings_rich_text() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<si><t xml:space="preserve"> plain </t></si>
<si><r><rPr><b/></rPr><t>bold</t></r><r><t>-tail</t></r></si>
<si><t>漢字</t><rPh sb="0" eb="2"><t>かんじ</t></rPh></si>
<si/>
</sst>"#;
        let strings = Workbook::parse_shared_strings_xml(Cursor::new(xml)).unwrap();
        let strings: Vec<&str> = strings.iter().map(|s| s.as_ref()).collect();
        assert_eq!(strings, vec![" plain ", "bold-tail", "漢字", ""]);
    }

    #[test]
    fn test_parse_worksheet_cell_types() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<dimension ref="A1:F2"/>
<sheetData>
<row r="1">
<c r="A1" t="s"><v>1</v></c>
<c r="B1"><v>3.5</v></c>
<c r="C1" t="b"><v>1</v></c>
<c r="D1" t="inlineStr"><is><t>inline</t></is></c>
<c r="E1" t="e"><v>#DIV/0!</v></c>
<c r="F1" t="str"><f>A1&amp;"x"</f><v>12</v></c>
</row>
<row r="2"><c><v>7</v></c><c t="s"><v>0</v></c><c r="E2" s="1"/></row>
</sheetData>
</worksheet>"#;
        let shared: Vec<InternedString> = vec![Arc::from("zero"), Arc::from("one")];
        let mut ws = Worksheet::new("T");
        Workbook::parse_worksheet_xml(Cursor::new(xml), &shared, &mut ws).unwrap();

        assert_eq!(ws.get_cell_value(1, 1), Some(&CellValue::from("one")));
        assert_eq!(ws.get_cell_value(1, 2), Some(&CellValue::Number(3.5)));
        assert_eq!(ws.get_cell_value(1, 3), Some(&CellValue::Boolean(true)));
        assert_eq!(ws.get_cell_value(1, 4), Some(&CellValue::from("inline")));
        assert_eq!(ws.get_cell_value(1, 5), Some(&CellValue::Error("#DIV/0!".into())));

        let formula_cell = ws.get_cell(1, 6).unwrap();
        assert_eq!(formula_cell.value, CellValue::from("12"));
        assert_eq!(formula_cell.formula.as_deref(), Some("A1&\"x\""));

        // cells without an r attribute follow their predecessor
        assert_eq!(ws.get_cell_value(2, 1), Some(&CellValue::Number(7.0)));
        assert_eq!(ws.get_cell_value(2, 2), Some(&CellValue::from("zero")));
        assert!(ws.get_cell(2, 5).is_none());
        assert_eq!(ws.max_column(), 6);
    }

    #[test]
    fn test_shared_string_index_out_of_range() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>9</v></c></row></sheetData></worksheet>"#;
        let mut ws = Worksheet::new("T");
        let err = Workbook::parse_worksheet_xml(Cursor::new(xml), &[], &mut ws).unwrap_err();
        assert!(matches!(err, NettoolsError::ParseFailure(_)));
    }

    #[test]
    fn test_row_numbers_out_of_range() {
        for xml in [
            r#"<worksheet><sheetData><row r="4294967295"/><row><c><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="3000000000"><c><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="1048576"/><row><c><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="0"><c><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="x"><c><v>1</v></c></row></sheetData></worksheet>"#,
        ] {
            let mut ws = Worksheet::new("T");
            let err = Workbook::parse_worksheet_xml(Cursor::new(xml), &[], &mut ws).unwrap_err();
            assert!(matches!(err, NettoolsError::ParseFailure(_)), "{}", xml);
        }

        let mut ws = Worksheet::new("T");
        let xml = r#"<worksheet><sheetData><row r="1048576"><c><v>1</v></c></row></sheetData></worksheet>"#;
        Workbook::parse_worksheet_xml(Cursor::new(xml), &[], &mut ws).unwrap();
        assert_eq!(ws.get_cell_value(1_048_576, 1), Some(&CellValue::Number(1.0)));
    }

    #[test]
    fn test_inferred_column_past_last_column() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="XFD1"><v>1</v></c><c><v>2</v></c></row></sheetData></worksheet>"#;
        let mut ws = Worksheet::new("T");
        let err = Workbook::parse_worksheet_xml(Cursor::new(xml), &[], &mut ws).unwrap_err();
        assert!(matches!(err, NettoolsError::ParseFailure(_)));
    }

    #[test]
    fn test_load_rejects_huge_row_package() {
        let sheet = r#"<worksheet><sheetData><row r="4294967295"/><row><c><v>1</v></c></row></sheetData></worksheet>"#;
        let mut wb = Workbook::new();
        wb.create_sheet(Some("Data".to_string())).unwrap();
        let bytes = wb.save_to_bytes().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            if name == "xl/worksheets/sheet1.xml" {
                data = sheet.as_bytes().to_vec();
            }
            out.start_file(name, SimpleFileOptions::default()).unwrap();
            out.write_all(&data).unwrap();
        }
        let crafted = out.finish().unwrap().into_inner();

        let err = Workbook::load_from_bytes(&crafted).unwrap_err();
        assert!(matches!(err, NettoolsError::ParseFailure(_)));
    }

    #[test]
    fn test_load_from_bytes_rejects_non_zip() {
        let err = Workbook::load_from_bytes(b"this is not a spreadsheet").unwrap_err();
        assert!(matches!(err, NettoolsError::ParseFailure(_)));
    }

    #[test]
    fn test_save_requires_a_sheet() {
        let wb = Workbook::new();
        assert!(matches!(wb.save_to_bytes(), Err(NettoolsError::NoWorksheets)));
    }

    #[test]
    fn test_bytes_roundtrip_with_multiple_sheets() {
        let mut wb = Workbook::new();
        let ws1 = wb.create_sheet(Some("Sheet1".to_string())).unwrap();
        ws1.set_cell_value(1, 1, CellValue::from("Sheet1 Data"));
        ws1.set_cell_value(1, 2, CellValue::Number(123.45));

        let ws2 = wb.create_sheet(Some("Sheet & <2>".to_string())).unwrap();
        ws2.set_cell_value(1, 1, CellValue::from("  padded  "));
        ws2.set_cell_value(2, 2, CellValue::Number(999.0));
        ws2.set_cell_value(3, 1, CellValue::Boolean(false));
        ws2.set_cell_value(3, 2, CellValue::from(""));

        let bytes = wb.save_to_bytes().unwrap();
        assert_eq!(&bytes[0..2], b"PK");

        let wb2 = Workbook::load_from_bytes(&bytes).unwrap();
        assert_eq!(wb2.sheet_names, vec!["Sheet1", "Sheet & <2>"]);

        let s1 = wb2.get_sheet_by_name("Sheet1").unwrap();
        assert_eq!(s1.get_cell_value(1, 1), Some(&CellValue::from("Sheet1 Data")));
        match s1.get_cell_value(1, 2) {
            Some(CellValue::Number(n)) => assert!((n - 123.45).abs() < 1e-9),
            other => panic!("expected number, got {:?}", other),
        }

        let s2 = wb2.get_sheet_by_name("Sheet & <2>").unwrap();
        assert_eq!(s2.get_cell_value(1, 1), Some(&CellValue::from("  padded  ")));
        assert_eq!(s2.get_cell_value(2, 2), Some(&CellValue::Number(999.0)));
        assert_eq!(s2.get_cell_value(3, 1), Some(&CellValue::Boolean(false)));
        assert_eq!(s2.get_cell_value(3, 2), Some(&CellValue::from("")));
    }
}
