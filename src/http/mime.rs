//! MIME type lookup by file extension.

use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Immutable extension → MIME type table, built once at startup.
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, String>,
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::from_pairs([
            ("pdf", "application/pdf"),
            ("jpg", "image/jpeg"),
            ("png", "image/png"),
            ("txt", "text/plain"),
            ("html", "text/html"),
        ])
    }
}

impl MimeTable {
    /// Builds a table from `(extension, mime)` pairs; extensions are given
    /// without the leading dot and matched case-insensitively.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let types = pairs
            .into_iter()
            .map(|(ext, mime)| (ext.trim_start_matches('.').to_ascii_lowercase(), mime.to_string()))
            .collect();
        Self { types }
    }

    /// MIME type for `name`, falling back to `application/octet-stream`.
    pub fn lookup(&self, name: &str) -> &str {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.types.get(&ext.to_ascii_lowercase()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_MIME)
    }
}
