//! Cell values and their text rendering.

use std::fmt;
use std::sync::Arc;

/// Interned string shared between cells (shared-string table entries).
pub type InternedString = Arc<str>;

/// The value held by a single cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// No value.
    Empty,
    /// Text, either shared or inline.
    String(InternedString),
    /// Any numeric value, including serial dates stored as numbers.
    Number(f64),
    Boolean(bool),
    /// ISO-8601 date text from a `t="d"` cell.
    Date(String),
    /// Error code such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Returns true when the cell holds no value at all.
    ///
    /// An empty string is still a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the value the way it is compared and reported.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            CellValue::Date(d) => f.write_str(d),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Arc::from(s))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Arc::from(s.as_str()))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Format a number in shortest round-trip form.
///
/// Integral values carry no fraction and magnitudes outside `[1e-6, 1e21)`
/// switch to exponent notation with an explicit sign (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", n);
    }

    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
