//! HTTP message model
//!
//! Represents a single HTTP request or response captured by the proxy.

use serde::{Deserialize, Serialize};

use crate::models::headers::HeaderMap;

/// Origin-form request target: path plus optional query, no scheme or host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub path: String,
    pub query: String,
}

impl Target {
    pub fn new(path: &str, query: &str) -> Self {
        Self {
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    /// Render the target as it appears on a request line.
    pub fn origin_form(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty()
    }
}

/// First line of a message. The variant is fixed by the first parsed line
/// and never changes for the lifetime of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartLine {
    Request {
        method: String,
        target: Target,
        http_version: String,
    },
    Response {
        http_version: String,
        status_code: u16,
        status_message: String,
    },
}

/// One captured HTTP request or response.
///
/// The body is an opaque byte blob: once the header block has been parsed,
/// every further byte fed for this exchange is appended verbatim and never
/// reinterpreted. Deciding when a body is complete (via `Content-Length`,
/// connection close, or otherwise) is the owning session's job; the message
/// only exposes the facts that decision needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMessage {
    pub start_line: StartLine,
    pub headers: HeaderMap,
    /// Raw body bytes as received so far.
    pub body: Vec<u8>,
}

impl HttpMessage {
    /// Create a request message with no headers or body.
    pub fn request(method: &str, target: Target, http_version: &str) -> Self {
        Self {
            start_line: StartLine::Request {
                method: method.to_string(),
                target,
                http_version: http_version.to_string(),
            },
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Create a response message with no headers or body.
    pub fn response(http_version: &str, status_code: u16, status_message: &str) -> Self {
        Self {
            start_line: StartLine::Response {
                http_version: http_version.to_string(),
                status_code,
                status_message: status_message.to_string(),
            },
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self.start_line, StartLine::Response { .. })
    }

    /// Request method, if this is a request.
    pub fn method(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Request { method, .. } => Some(method),
            StartLine::Response { .. } => None,
        }
    }

    /// Request target, if this is a request.
    pub fn target(&self) -> Option<&Target> {
        match &self.start_line {
            StartLine::Request { target, .. } => Some(target),
            StartLine::Response { .. } => None,
        }
    }

    /// Status code, if this is a response.
    pub fn status_code(&self) -> Option<u16> {
        match &self.start_line {
            StartLine::Response { status_code, .. } => Some(*status_code),
            StartLine::Request { .. } => None,
        }
    }

    pub fn http_version(&self) -> &str {
        match &self.start_line {
            StartLine::Request { http_version, .. }
            | StartLine::Response { http_version, .. } => http_version,
        }
    }

    /// Number of body bytes accumulated so far.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// `Content-Length` as declared by the peer, if present and numeric.
    pub fn declared_content_length(&self) -> Option<usize> {
        self.headers
            .get_ignore_case("content-length")
            .and_then(|v| v.parse::<usize>().ok())
    }

    /// `Content-Type` header value, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case("content-type")
    }
}
