//! Request dispatch for the file server.
//!
//! | Method | Target            | Action                                   |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/`               | listing page with upload form            |
//! | GET    | `/<name>`         | file bytes, MIME type from the extension |
//! | POST   | `/upload`         | store the `filetoupload` part, 303 to `/`|
//! | POST   | anything else     | 404                                      |
//! | DELETE | `/delete/<name>`  | remove the file                          |
//! | DELETE | anything else     | 400                                      |
//! | other  |                   | 405                                      |

use crate::files::listing::render_index;
use crate::files::storage::{Storage, StorageError, basename};
use crate::http::mime::MimeTable;
use crate::http::multipart::{MultipartError, decode_upload};
use crate::http::parser::parse_request;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::serialize_response;

const UPLOAD_PATH: &str = "/upload";
const DELETE_PREFIX: &str = "/delete/";

pub const DEFAULT_SERVER_NAME: &str = "myserver/1.0";

/// Maps requests onto storage operations. Holds no per-request state, so
/// one instance can serve every connection.
#[derive(Debug, Clone)]
pub struct Router {
    storage: Storage,
    mime: MimeTable,
    server_name: String,
}

impl Router {
    pub fn new(storage: Storage, mime: MimeTable) -> Self {
        Self {
            storage,
            mime,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }

    /// Sets the value of the `Server` response header.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Raw request bytes in, framed response bytes out.
    pub fn handle(&self, raw: &[u8]) -> Vec<u8> {
        serialize_response(&self.respond(raw), &self.server_name)
    }

    /// Parses `raw` and dispatches it; parse failures become 400.
    pub fn respond(&self, raw: &[u8]) -> Response {
        let request = match parse_request(raw) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed request");
                return Response::bad_request("Bad Request");
            }
        };

        let response = self.dispatch(&request);
        tracing::info!(
            method = %request.method,
            target = %request.target,
            status = response.status.as_u16(),
            "request handled"
        );
        response
    }

    pub fn dispatch(&self, req: &Request) -> Response {
        match req.method {
            Method::GET => self.get(&req.target),
            Method::POST if req.target == UPLOAD_PATH => self.upload(req),
            Method::POST => Response::not_found("POST requests only allowed at /upload"),
            Method::DELETE => self.delete(&req.target),
            _ => Response::method_not_allowed(),
        }
    }

    fn get(&self, target: &str) -> Response {
        if target == "/" {
            return self.index();
        }

        let name = target.trim_matches('/');
        match self.storage.read(name) {
            Ok(content) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", self.mime.lookup(name))
                .body(content)
                .build(),
            Err(StorageError::Io { name, source }) => {
                tracing::warn!(file = %name, error = %source, "failed to read file");
                Response::internal_error("Could not read file")
            }
            Err(e) => {
                tracing::debug!(error = %e, "file lookup missed");
                Response::not_found("File or directory not found")
            }
        }
    }

    fn index(&self) -> Response {
        match self.storage.list() {
            Ok(names) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "text/html")
                .body(render_index(&names))
                .build(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list storage root");
                Response::internal_error("Could not list files")
            }
        }
    }

    fn upload(&self, req: &Request) -> Response {
        let part = match decode_upload(req.content_type(), &req.body) {
            Ok(part) => part,
            Err(MultipartError::NoFilePart(field)) => {
                tracing::warn!(field = %field, "upload without a file part");
                return Response::bad_request("Unsupported POST request");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode upload");
                return Response::internal_error("Failed to process upload");
            }
        };

        let filename = part.filename.as_deref().map(basename).unwrap_or_default();
        match self.storage.write(filename, &part.content) {
            Ok(()) => {
                tracing::info!(file = %filename, bytes = part.content.len(), "stored upload");
                Response::see_other("/")
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to store upload");
                Response::internal_error("Failed to process upload")
            }
        }
    }

    fn delete(&self, target: &str) -> Response {
        let Some(name) = target.strip_prefix(DELETE_PREFIX) else {
            return Response::bad_request("Invalid DELETE path");
        };
        if name.is_empty() {
            return Response::bad_request("Filename not specified");
        }

        match self.storage.delete(name) {
            Ok(()) => {
                tracing::info!(file = %name, "deleted file");
                Response::ok("File deleted successfully")
            }
            Err(StorageError::NotFound(_)) => Response::not_found("File not found for deletion"),
            Err(StorageError::InvalidName(_)) => Response::bad_request("Invalid file name"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to delete file");
                Response::internal_error("Could not delete file")
            }
        }
    }
}
