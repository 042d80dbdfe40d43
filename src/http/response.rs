/// HTTP status codes produced by the file server.
///
/// - `Ok` (200): File served, listing rendered, or file deleted
/// - `SeeOther` (303): Upload stored, redirect back to the listing
/// - `BadRequest` (400): Malformed start-line or bad delete path
/// - `NotFound` (404): File missing or unsupported POST target
/// - `MethodNotAllowed` (405): HTTP method not supported
/// - `PayloadTooLarge` (413): Request exceeded the configured size limit
/// - `InternalServerError` (500): Upload or storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 303 See Other
    SeeOther,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use depot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::SeeOther.as_u16(), 303);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::SeeOther => 303,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::SeeOther => "See Other",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Headers the writer always emits itself.
pub const FRAMING_HEADERS: [&str; 4] = ["Date", "Connection", "Server", "Content-Length"];

/// A response ready to be framed by [`crate::http::writer`].
///
/// `headers` holds only the extra headers, in insertion order. The framing
/// headers (`Date`, `Connection`, `Server`, `Content-Length`) are added at
/// serialization time, so `Content-Length` always matches `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Extra headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use depot::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body("hello")
///     .build();
/// assert_eq!(response.header("content-type"), Some("text/plain"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, or replaces the value of one with the same name.
    ///
    /// Framing headers are ignored; the writer owns them.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if FRAMING_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(&key)) {
            tracing::debug!(header = %key, "ignoring framing header set by handler");
            return self;
        }

        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body. Text bodies are stored as their UTF-8 bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A response with a fixed text body and no extra headers.
    pub fn text(status: StatusCode, body: &str) -> Self {
        ResponseBuilder::new(status).body(body).build()
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok).body(body).build()
    }

    /// Creates a 303 redirect to `location` with an empty body.
    pub fn see_other(location: &str) -> Self {
        ResponseBuilder::new(StatusCode::SeeOther)
            .header("Location", location)
            .build()
    }

    pub fn bad_request(body: &str) -> Self {
        Self::text(StatusCode::BadRequest, body)
    }

    pub fn not_found(body: &str) -> Self {
        Self::text(StatusCode::NotFound, body)
    }

    pub fn method_not_allowed() -> Self {
        Self::text(StatusCode::MethodNotAllowed, "Method Not Allowed")
    }

    pub fn payload_too_large() -> Self {
        Self::text(StatusCode::PayloadTooLarge, "Payload Too Large")
    }

    pub fn internal_error(body: &str) -> Self {
        Self::text(StatusCode::InternalServerError, body)
    }

    /// Looks up an extra header by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
