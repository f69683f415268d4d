//! `multipart/form-data` body builder for the upload endpoints.
//!
//! `ureq` only sends raw bytes, so uploads assemble their body here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// A file picked for upload, read fully into memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the part after the file's basename.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type guessed from the extension.
    pub fn content_type(&self) -> &'static str {
        let lower = self.name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            "text/csv"
        } else if lower.ends_with(".json") {
            "application/json"
        } else if lower.ends_with(".xlsx") {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        } else {
            "application/octet-stream"
        }
    }
}

/// Incrementally built form body.
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::with_boundary(format!("----fraudwatch{nanos:x}"))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quotes(name)
        ));
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file field.
    pub fn file(mut self, name: &str, file: &UploadFile) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}",
            escape_quotes(name),
            escape_quotes(&file.name),
            file.content_type()
        ));
        self.body.extend_from_slice(&file.bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body and return `(content_type_header, body)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }

    fn open_part(&mut self, headers: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n{}\r\n\r\n", self.boundary, headers).as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('"', "%22").replace(['\r', '\n'], " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
