//! Uploaded files and the multipart form sent to the processing API.

use std::fs;
use std::path::Path;

use crate::error::{NettoolsError, Result};

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Upload {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the upload is named after the last path component.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            NettoolsError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read '{}': {}", path.display(), e),
            ))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Upload { file_name, bytes })
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Log and archive uploads sorted by extension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortedUploads {
    /// `.log` and `.txt` files.
    pub logs: Vec<Upload>,
    /// `.zip` archives.
    pub zips: Vec<Upload>,
}

impl SortedUploads {
    /// Split uploads by extension (case-insensitive); anything else is dropped.
    pub fn split(uploads: &[Upload]) -> Self {
        let mut sorted = SortedUploads::default();
        for upload in uploads {
            match upload.extension().as_deref() {
                Some("log") | Some("txt") => sorted.logs.push(upload.clone()),
                Some("zip") => sorted.zips.push(upload.clone()),
                _ => {}
            }
        }
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.zips.is_empty()
    }
}

/// Value of one multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(Upload),
}

/// A named multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// An ordered multipart form; the same field name may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Boolean field rendered as `"true"`/`"false"`.
    pub fn flag(self, name: &str, value: bool) -> Self {
        self.text(name, if value { "true" } else { "false" })
    }

    pub fn file(mut self, name: &str, upload: &Upload) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: FormValue::File(upload.clone()),
        });
        self
    }

    pub fn files<'a>(self, name: &str, uploads: impl IntoIterator<Item = &'a Upload>) -> Self {
        uploads.into_iter().fold(self, |form, upload| form.file(name, upload))
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// First text value of a field.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            FormValue::Text(text) if part.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    /// File names attached under a field, in order.
    pub fn file_names(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match &part.value {
                FormValue::File(upload) if part.name == name => Some(upload.file_name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Field names in order, repeats included.
    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.name.as_str()).collect()
    }
}
