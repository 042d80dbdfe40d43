//! `multipart/form-data` decoding for the upload form.
//!
//! This is not a general multipart parser. It looks for a single file field
//! (`filetoupload` for the upload form) and returns the first part that
//! carries it together with a filename. Everything works on raw bytes, so
//! binary uploads pass through untouched.
//!
//! The part content is whatever follows the part's blank line, minus the
//! line break that precedes the next delimiter. There is no formal check
//! for the closing `--boundary--` marker: a body truncated before it is
//! still accepted.

use thiserror::Error;

/// Field name used by the upload form.
pub const UPLOAD_FIELD: &str = "filetoupload";

const PART_HEADERS_END: &[u8] = b"\r\n\r\n";
const FILENAME_ATTR: &[u8] = b"filename=\"";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("content type {0:?} is not multipart/form-data")]
    UnsupportedContentType(String),

    #[error("multipart content type carries no boundary")]
    MissingBoundary,

    #[error("no file part named {0:?} in multipart body")]
    NoFilePart(String),
}

/// One decoded form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name
    pub name: String,
    /// Client-side filename, as sent (not sanitized)
    pub filename: Option<String>,
    /// Raw part bytes
    pub content: Vec<u8>,
}

/// Decodes the upload form's `filetoupload` part.
pub fn decode_upload(content_type: &str, body: &[u8]) -> Result<MultipartPart, MultipartError> {
    decode_file_field(content_type, body, UPLOAD_FIELD)
}

/// Returns the first part of `body` whose disposition names `field` and
/// which carries a non-empty `filename`.
pub fn decode_file_field(
    content_type: &str,
    body: &[u8],
    field: &str,
) -> Result<MultipartPart, MultipartError> {
    if !content_type.contains("multipart/form-data") {
        return Err(MultipartError::UnsupportedContentType(content_type.to_string()));
    }

    let boundary = extract_boundary(content_type).ok_or(MultipartError::MissingBoundary)?;
    let delimiter = format!("--{boundary}");
    let marker = format!("Content-Disposition: form-data; name=\"{field}\"");

    for segment in split_on(body, delimiter.as_bytes()) {
        let Some(head_end) = find(segment, PART_HEADERS_END) else {
            continue;
        };
        let head = &segment[..head_end];

        if find(head, marker.as_bytes()).is_none() {
            continue;
        }
        let Some(filename) = extract_filename(head) else {
            tracing::debug!(field, "skipping part without filename");
            continue;
        };

        let content = trim_boundary_tail(&segment[head_end + PART_HEADERS_END.len()..]);

        return Ok(MultipartPart {
            name: field.to_string(),
            filename: Some(filename),
            content: content.to_vec(),
        });
    }

    Err(MultipartError::NoFilePart(field.to_string()))
}

/// Everything after `boundary=`, with optional surrounding quotes removed.
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    let (_, rest) = content_type.split_once("boundary=")?;
    let boundary = rest.trim().trim_matches('"');
    (!boundary.is_empty()).then_some(boundary)
}

/// Value of the first `filename="..."` attribute; empty values don't count.
fn extract_filename(head: &[u8]) -> Option<String> {
    let start = find(head, FILENAME_ATTR)? + FILENAME_ATTR.len();
    let rest = &head[start..];
    let len = rest.iter().position(|b| matches!(b, b'"' | b'\r' | b'\n'))?;
    if len == 0 || rest[len] != b'"' {
        return None;
    }
    Some(String::from_utf8_lossy(&rest[..len]).into_owned())
}

/// Drops the line break that belongs to the following delimiter.
fn trim_boundary_tail(content: &[u8]) -> &[u8] {
    content
        .strip_suffix(b"\r\n--")
        .or_else(|| content.strip_suffix(b"\r\n"))
        .unwrap_or(content)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_on<'a>(mut haystack: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut segments = Vec::new();
    while let Some(at) = find(haystack, delimiter) {
        segments.push(&haystack[..at]);
        haystack = &haystack[at + delimiter.len()..];
    }
    segments.push(haystack);
    segments
}
