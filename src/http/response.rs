use bytes::Bytes;
use std::collections::HashMap;

use crate::error::ResourceError;

/// Status lines this server can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Connection handed to an upgrade resource.
    SwitchingProtocols,
    Ok,
    /// Malformed head, undecodable payload or bad upgrade handshake.
    BadRequest,
    NotFound,
    MethodNotAllowed,
    /// Body does not fit the resource's accumulation buffer.
    PayloadTooLarge,
    InternalServerError,
    /// Upgrade resource already serving another client.
    ServiceUnavailable,
}

impl StatusCode {
    fn parts(&self) -> (u16, &'static str) {
        match self {
            StatusCode::SwitchingProtocols => (101, "Switching Protocols"),
            StatusCode::Ok => (200, "OK"),
            StatusCode::BadRequest => (400, "Bad Request"),
            StatusCode::NotFound => (404, "Not Found"),
            StatusCode::MethodNotAllowed => (405, "Method Not Allowed"),
            StatusCode::PayloadTooLarge => (413, "Payload Too Large"),
            StatusCode::InternalServerError => (500, "Internal Server Error"),
            StatusCode::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    /// ```
    /// # use lumen::http::response::StatusCode;
    /// assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.parts().0
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.parts().1
    }
}

/// A response sent in one piece: status line, headers and a sized body.
///
/// Dynamic resources do not produce these; their fragments go through
/// [`FragmentWriter`](crate::http::writer::FragmentWriter).
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
    sized: bool,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
            sized: true,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Leaves out `Content-Length`, for heads followed by chunked or
    /// upgraded traffic.
    pub fn unsized_body(mut self) -> Self {
        self.sized = false;
        self
    }

    /// `Content-Length` is filled in from the body unless set explicitly
    /// or the body is unsized.
    pub fn build(mut self) -> Response {
        if self.sized {
            let len = self.body.len();
            self.headers
                .entry("Content-Length".to_string())
                .or_insert_with(|| len.to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Error reply for a request-scoped failure.
    pub fn from_error(err: &ResourceError) -> Self {
        let status = err.status();
        let mut builder = ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(format!("{} {}", status.as_u16(), status.reason_phrase()));

        if let ResourceError::MethodNotAllowed { allowed, .. } = err {
            builder = builder.header("Allow", allowed.allow_header());
        }

        builder.build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
