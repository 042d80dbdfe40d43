use std::time::SystemTime;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Frames `resp` as HTTP/1.1 bytes.
///
/// Order: status line, `Date`, `Connection: close`, `Server`,
/// `Content-Length`, the extra headers as inserted, blank line, body.
pub fn serialize_response(resp: &Response, server_name: &str) -> Vec<u8> {
    serialize_response_at(resp, server_name, SystemTime::now())
}

/// Like [`serialize_response`] with an explicit `Date`.
pub fn serialize_response_at(resp: &Response, server_name: &str, now: SystemTime) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    push_header(&mut buf, "Date", &httpdate::fmt_http_date(now));
    push_header(&mut buf, "Connection", "close");
    push_header(&mut buf, "Server", server_name);
    push_header(&mut buf, "Content-Length", &resp.body.len().to_string());

    for (k, v) in &resp.headers {
        push_header(&mut buf, k, v);
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(&resp.body);

    buf
}

fn push_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    // A stray CR or LF would split the header line.
    let value: String = value.chars().filter(|c| *c != '\r' && *c != '\n').collect();

    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, server_name: &str) -> Self {
        Self::from_bytes(serialize_response(response, server_name))
    }

    /// Wraps bytes that are already framed.
    pub fn from_bytes(buffer: Vec<u8>) -> Self {
        Self { buffer, written: 0 }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
