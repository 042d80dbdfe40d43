use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};

use crate::files::Router;
use crate::http::parser::{find_headers_end, parse_request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// Per-connection read limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub max_request_bytes: usize,
    pub read_timeout: Duration,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_request_bytes: 64 * 1024 * 1024,
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Serves exactly one request, then closes.
pub struct Connection<S> {
    stream: S,
    buffer: Vec<u8>,
    router: Arc<Router>,
    limits: ConnectionLimits,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing,
    Writing(ResponseWriter),
    Closed,
}

enum ReadOutcome {
    Complete,
    TooLarge,
    Nothing,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, limits: ConnectionLimits) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK),
            router,
            limits,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        ReadOutcome::Complete => ConnectionState::Processing,
                        ReadOutcome::TooLarge => {
                            tracing::warn!(
                                limit = self.limits.max_request_bytes,
                                "request exceeds size limit"
                            );
                            let response = Response::payload_too_large();
                            ConnectionState::Writing(ResponseWriter::new(
                                &response,
                                self.router.server_name(),
                            ))
                        }
                        ReadOutcome::Nothing => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing => {
                    let raw = std::mem::take(&mut self.buffer);
                    let router = Arc::clone(&self.router);
                    let bytes = tokio::task::spawn_blocking(move || router.handle(&raw))
                        .await
                        .context("request handler panicked")?;

                    self.state = ConnectionState::Writing(ResponseWriter::from_bytes(bytes));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    // No keep-alive: every response ends the connection.
                    let _ = self.stream.shutdown().await;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Buffers one request: up to the blank line, then `Content-Length`
    /// body bytes. EOF or the read deadline ends the request early with
    /// whatever has arrived. The deadline covers the whole request, not
    /// each read.
    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        let deadline = Instant::now() + self.limits.read_timeout;
        let mut expected: Option<usize> = None;

        loop {
            if expected.is_none() {
                expected = find_headers_end(&self.buffer).map(|end| {
                    let head = &self.buffer[..end + 4];
                    let body_len = parse_request(head)
                        .map(|req| req.content_length())
                        .unwrap_or(0);
                    // A huge Content-Length saturates and trips the size limit.
                    (end + 4).saturating_add(body_len)
                });
            }

            if let Some(total) = expected {
                if total > self.limits.max_request_bytes {
                    return Ok(ReadOutcome::TooLarge);
                }
                if self.buffer.len() >= total {
                    return Ok(ReadOutcome::Complete);
                }
            }
            if self.buffer.len() > self.limits.max_request_bytes {
                return Ok(ReadOutcome::TooLarge);
            }

            let mut temp = [0u8; READ_CHUNK];
            let n = match timeout_at(deadline, self.stream.read(&mut temp)).await {
                Ok(read) => read?,
                Err(_) => {
                    tracing::debug!(buffered = self.buffer.len(), "read deadline reached");
                    0
                }
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(ReadOutcome::Nothing);
                }
                return Ok(ReadOutcome::Complete);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}
