use crate::http::request::{Method, Request, RequestBuilder};
use thiserror::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was received at all.
    #[error("empty request")]
    Empty,

    /// The start-line does not carry both a method and a target.
    #[error("malformed start-line: {0:?}")]
    MalformedRequest(String),
}

/// Parses one fully buffered request.
///
/// The buffer is split at the first blank line. Without one, the whole
/// buffer is treated as the header block and the body is empty; no attempt
/// is made to wait for, or guess at, a missing terminator. Header lines
/// without a colon are skipped.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let (header_bytes, body_bytes) = match find_headers_end(buf) {
        Some(end) => (&buf[..end], &buf[end + HEADER_TERMINATOR.len()..]),
        None => (buf, &[][..]),
    };

    let header_block = String::from_utf8_lossy(header_bytes);
    let mut lines = header_block.split("\r\n");

    // Request line
    let start_line = lines.next().unwrap_or_default();
    let mut parts = start_line.split(' ');

    let (method_str, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return Err(ParseError::MalformedRequest(start_line.to_string())),
    };
    let version = parts
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("HTTP/1.1");

    let mut builder = RequestBuilder::new()
        .method(Method::from_token(&method_str.trim().to_ascii_uppercase()))
        .target(target.trim())
        .version(version);

    // Headers; the builder lower-cases names and the last duplicate wins.
    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        builder = builder.header(key.trim(), value.trim());
    }

    builder
        .body(body_bytes)
        .build()
        .map_err(|_| ParseError::MalformedRequest(start_line.to_string()))
}

/// Offset of the first `\r\n\r\n` in `buf`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}
