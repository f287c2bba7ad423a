//! Cell coordinate helpers: column letters and `A1`-style references.

use crate::error::{NettoolsError, Result};

/// Maximum column number in Excel (XFD = 16384).
pub const MAX_COLUMN: u32 = 16384;
/// Maximum row number in Excel.
pub const MAX_ROW: u32 = 1_048_576;

/// Spreadsheet letter for a zero-based column index (0 -> "A", 26 -> "AA").
///
/// Not bounded by [`MAX_COLUMN`]; diff reports may address any column.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert a 1-indexed column number to letters (1 -> "A", 28 -> "AB").
pub fn column_to_letter(column: u32) -> String {
    if column == 0 {
        return String::new();
    }
    column_letter(column as usize - 1)
}

/// Convert column letters (e.g. "A", "AB", "XFD") to a 1-indexed column number.
pub fn letter_to_column(letters: &str) -> Result<u32> {
    let mut result: u32 = 0;

    for &b in letters.as_bytes() {
        let upper = match b {
            b'a'..=b'z' => b - 32,
            b'A'..=b'Z' => b,
            _ => {
                return Err(NettoolsError::InvalidCoordinate(format!(
                    "invalid character in column: {}",
                    b as char
                )))
            }
        };
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add((upper - b'A' + 1) as u32))
            .filter(|&r| r <= MAX_COLUMN)
            .ok_or_else(|| {
                NettoolsError::InvalidCoordinate(format!(
                    "column '{}' exceeds Excel maximum (XFD = {})",
                    letters, MAX_COLUMN
                ))
            })?;
    }

    if result == 0 {
        return Err(NettoolsError::InvalidCoordinate("empty column letters".to_string()));
    }

    Ok(result)
}

/// Parse a cell reference from bytes (e.g. `b"AB123"`) into 1-indexed (row, column).
///
/// This is the allocation-free path used by the sheet parser.
#[inline]
pub fn parse_coordinate_bytes(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut i = 0usize;
    let mut column: u32 = 0;

    while i < bytes.len() {
        let upper = match bytes[i] {
            b @ b'a'..=b'z' => b - 32,
            b @ b'A'..=b'Z' => b,
            _ => break,
        };
        column = column.checked_mul(26)?.checked_add((upper - b'A' + 1) as u32)?;
        if column > MAX_COLUMN {
            return None;
        }
        i += 1;
    }

    if i == 0 || i >= bytes.len() {
        return None;
    }

    let row = parse_u32_bytes(&bytes[i..])?;
    if row == 0 || row > MAX_ROW {
        return None;
    }

    Some((row, column))
}

/// Parse a cell reference (e.g. "A1") into 1-indexed (row, column).
pub fn parse_coordinate(coord: &str) -> Result<(u32, u32)> {
    let coord = coord.trim();
    parse_coordinate_bytes(coord.as_bytes())
        .ok_or_else(|| NettoolsError::InvalidCoordinate(format!("invalid coordinate: {}", coord)))
}

/// Create an `A1`-style reference from 1-indexed row and column.
pub fn coordinate_from_row_col(row: u32, column: u32) -> String {
    format!("{}{}", column_to_letter(column), row)
}

/// Parse a u32 from ASCII digits without allocating.
#[inline]
pub fn parse_u32_bytes(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }
    Some(result)
}

/// Parse an f64, with a fast path for plain integers.
#[inline]
pub fn parse_f64_bytes(bytes: &[u8]) -> Option<f64> {
    if !bytes.is_empty() && bytes.len() < 16 && bytes.iter().all(|b| b.is_ascii_digit()) {
        let mut result: f64 = 0.0;
        for &b in bytes {
            result = result * 10.0 + (b - b'0') as f64;
        }
        return Some(result);
    }
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}
