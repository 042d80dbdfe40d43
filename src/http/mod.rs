//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 layer: every connection carries exactly one
//! request, which is buffered whole before it is parsed.
//!
//! # Architecture
//!
//! - **`connection`**: Buffers one request from the socket, runs the router, writes the reply
//! - **`parser`**: Splits a raw buffer into start-line, headers and body
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and the response builder
//! - **`writer`**: Frames a response (`Date`, `Connection`, `Server`, `Content-Length`)
//! - **`multipart`**: Extracts the uploaded file from a `multipart/form-data` body
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Buffer headers and Content-Length body bytes
//!        └──────┬──────┘
//!               │ Request buffered (or too large → Writing 413)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Router turns bytes into response bytes
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response, then close
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod mime;
pub mod multipart;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
