//! Error types for nettools.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NettoolsError>;

/// Errors raised while loading workbooks, diffing sheets or calling the
/// remote processing API.
#[derive(Debug, thiserror::Error)]
pub enum NettoolsError {
    /// A required upload or form field was not supplied.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// The requested worksheet does not exist in the workbook.
    #[error("worksheet not found: {0}")]
    SheetNotFound(String),

    /// A worksheet with the same name is already present.
    #[error("worksheet already exists: {0}")]
    WorksheetAlreadyExists(String),

    /// The workbook has no worksheets at all.
    #[error("workbook contains no worksheets")]
    NoWorksheets,

    /// The input could not be read as a spreadsheet (or as the expected
    /// response body).
    #[error("parse error: {0}")]
    ParseFailure(String),

    /// The remote API answered with a non-success status or an error payload.
    #[error("remote call failed ({status}): {message}")]
    RemoteCallFailure { status: u16, message: String },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NettoolsError {
    /// Shorthand for a [`NettoolsError::ParseFailure`].
    pub fn parse(msg: impl Into<String>) -> Self {
        NettoolsError::ParseFailure(msg.into())
    }

    /// Shorthand for a [`NettoolsError::MissingInput`].
    pub fn missing(what: impl Into<String>) -> Self {
        NettoolsError::MissingInput(what.into())
    }

    /// Classify the error into one of the user-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NettoolsError::MissingInput(_) => ErrorKind::MissingInput,
            NettoolsError::SheetNotFound(_) | NettoolsError::NoWorksheets => ErrorKind::SheetNotFound,
            NettoolsError::ParseFailure(_)
            | NettoolsError::InvalidCoordinate(_)
            | NettoolsError::Json(_) => ErrorKind::ParseFailure,
            NettoolsError::RemoteCallFailure { .. } | NettoolsError::Http(_) => {
                ErrorKind::RemoteCallFailure
            }
            NettoolsError::WorksheetAlreadyExists(_)
            | NettoolsError::Config(_)
            | NettoolsError::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<zip::result::ZipError> for NettoolsError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => NettoolsError::Io(e),
            other => NettoolsError::ParseFailure(format!("not a valid xlsx container: {}", other)),
        }
    }
}

impl From<quick_xml::Error> for NettoolsError {
    fn from(err: quick_xml::Error) -> Self {
        NettoolsError::ParseFailure(format!("XML parsing error: {}", err))
    }
}

impl From<reqwest::Error> for NettoolsError {
    fn from(err: reqwest::Error) -> Self {
        NettoolsError::Http(err.to_string())
    }
}

/// Coarse error categories surfaced to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    SheetNotFound,
    ParseFailure,
    RemoteCallFailure,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MissingInput => "missing input",
            ErrorKind::SheetNotFound => "sheet not found",
            ErrorKind::ParseFailure => "parse failure",
            ErrorKind::RemoteCallFailure => "remote call failure",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(NettoolsError::missing("zip").kind(), ErrorKind::MissingInput);
        assert_eq!(
            NettoolsError::SheetNotFound("Sheet9".into()).kind(),
            ErrorKind::SheetNotFound
        );
        assert_eq!(NettoolsError::parse("bad").kind(), ErrorKind::ParseFailure);
        let remote = NettoolsError::RemoteCallFailure { status: 500, message: "boom".into() };
        assert_eq!(remote.kind(), ErrorKind::RemoteCallFailure);
        assert_eq!(remote.to_string(), "remote call failed (500): boom");
    }

    #[test]
    fn test_zip_error_is_parse_failure() {
        let err: NettoolsError = zip::result::ZipError::InvalidArchive("no EOCD".into()).into();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }
}
