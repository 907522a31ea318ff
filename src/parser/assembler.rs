//! Incremental HTTP message assembly
//!
//! Turns the byte chunks delivered by the transport into an [`HttpMessage`].
//! Bytes accumulate across chunks until the blank line ending the header
//! block shows up, the block is parsed exactly once, and everything fed
//! after that point is body.

use bytes::BytesMut;
use thiserror::Error;

use crate::models::headers::HeaderMap;
use crate::models::message::{HttpMessage, StartLine, Target};

/// Errors reported while parsing a header block.
///
/// These are diagnostic rather than fatal: the assembler finishes the block
/// either way and the partially populated message stays available, so the
/// owning session decides whether to reject the exchange.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed start line: {line:?}")]
    MalformedStartLine { line: String },
    #[error("invalid status code: {token:?}")]
    InvalidStatusCode { token: String },
}

enum AssemblerState {
    /// Header block not yet complete; fed bytes accumulate here until the
    /// CRLFCRLF delimiter is found.
    Buffering { buffer: BytesMut },
    /// Header block parsed; every further byte belongs to the body.
    Streaming { message: HttpMessage },
}

/// Incremental parser for one in-flight request or response.
///
/// One assembler corresponds to exactly one exchange on one connection.
/// Chunks must be fed in network order with none skipped; calls are
/// synchronous, perform no I/O, and are not internally synchronized.
/// Accumulation is unbounded, so a transport facing untrusted peers must
/// cap [`buffered_len`](Self::buffered_len) itself.
pub struct MessageAssembler {
    state: AssemblerState,
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::Buffering {
                buffer: BytesMut::with_capacity(2048),
            },
        }
    }

    /// Consume one chunk as delivered by the transport.
    ///
    /// Returns an error if the header block turned out malformed; the
    /// message is still built from whatever could be read, and subsequent
    /// feeds keep appending body bytes as usual.
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if data.is_empty() {
            return Ok(());
        }

        match &mut self.state {
            AssemblerState::Streaming { message } => {
                message.body.extend_from_slice(data);
                Ok(())
            }
            AssemblerState::Buffering { buffer } => {
                buffer.extend_from_slice(data);

                // The delimiter may span chunk boundaries, so the search
                // runs over everything accumulated so far.
                let Some(end) = find_header_end(buffer) else {
                    return Ok(());
                };

                let head = buffer.split_to(end);
                let (mut message, result) = parse_header_block(&head[..end - 4]);
                message.body.extend_from_slice(&buffer[..]);

                tracing::debug!(
                    "Header block complete: {} headers, {} body bytes buffered",
                    message.headers.len(),
                    message.body.len()
                );

                self.state = AssemblerState::Streaming { message };
                result
            }
        }
    }

    /// True once the header/body delimiter has been located.
    pub fn header_block_complete(&self) -> bool {
        matches!(self.state, AssemblerState::Streaming { .. })
    }

    /// The assembled message, available once the header block is complete.
    pub fn message(&self) -> Option<&HttpMessage> {
        match &self.state {
            AssemblerState::Streaming { message } => Some(message),
            AssemblerState::Buffering { .. } => None,
        }
    }

    /// Mutable access to the assembled message, for rewriting before
    /// re-serialization.
    pub fn message_mut(&mut self) -> Option<&mut HttpMessage> {
        match &mut self.state {
            AssemblerState::Streaming { message } => Some(message),
            AssemblerState::Buffering { .. } => None,
        }
    }

    /// Consume the assembler, yielding the message if one was assembled.
    pub fn into_message(self) -> Option<HttpMessage> {
        match self.state {
            AssemblerState::Streaming { message } => Some(message),
            AssemblerState::Buffering { .. } => None,
        }
    }

    /// Bytes currently held: header accumulation before the delimiter is
    /// found, body bytes after. Callers bounding memory use check this.
    pub fn buffered_len(&self) -> usize {
        match &self.state {
            AssemblerState::Buffering { buffer } => buffer.len(),
            AssemblerState::Streaming { message } => message.body.len(),
        }
    }
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Parse a complete header block (everything before the blank line).
///
/// Always produces a message; the result carries the first defect seen, if
/// any, so the caller can reject the exchange without losing the capture.
fn parse_header_block(block: &[u8]) -> (HttpMessage, Result<(), ParseError>) {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.split("\r\n");

    let first_line = lines.next().unwrap_or("");
    let (start_line, synthesized_host, result) = parse_start_line(first_line);

    let mut headers = HeaderMap::new();
    for line in lines {
        // Header lines are `<key>: <value>`; anything else is dropped.
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        headers.insert(key, value);
    }

    // A host recovered from an absolute-URI target must not displace an
    // explicit Host header.
    if let Some(host) = synthesized_host {
        if !headers.contains_key("Host") {
            headers.insert("Host", &host);
        }
    }

    let message = HttpMessage {
        start_line,
        headers,
        body: Vec::new(),
    };
    (message, result)
}

fn parse_start_line(line: &str) -> (StartLine, Option<String>, Result<(), ParseError>) {
    // A first line starting with "HTTP" is a status line; anything else is
    // treated as a request line.
    if line.starts_with("HTTP") {
        let (start_line, result) = parse_status_line(line);
        (start_line, None, result)
    } else {
        parse_request_line(line)
    }
}

fn parse_status_line(line: &str) -> (StartLine, Result<(), ParseError>) {
    let mut parts = line.splitn(3, ' ');
    let http_version = parts.next().unwrap_or("").to_string();
    let code_token = parts.next().unwrap_or("");
    // The reason phrase may itself contain spaces.
    let status_message = parts.next().unwrap_or("").to_string();

    let (status_code, result) = match code_token.parse::<u16>() {
        Ok(code) => (code, Ok(())),
        Err(_) => {
            tracing::warn!("Unparseable status code in status line: {line}");
            (
                0,
                Err(ParseError::InvalidStatusCode {
                    token: code_token.to_string(),
                }),
            )
        }
    };

    (
        StartLine::Response {
            http_version,
            status_code,
            status_message,
        },
        result,
    )
}

fn parse_request_line(line: &str) -> (StartLine, Option<String>, Result<(), ParseError>) {
    let mut parts = line.splitn(3, ' ');
    let method = parts.next().unwrap_or("").to_string();
    let raw_target = parts.next();
    let http_version = parts.next();

    let result = if raw_target.is_none() || http_version.is_none() {
        tracing::warn!("Incorrectly formed request line: {line}");
        Err(ParseError::MalformedStartLine {
            line: line.to_string(),
        })
    } else {
        Ok(())
    };

    // On a malformed line the target stays empty rather than guessing.
    let (target, host) = match raw_target {
        Some(raw) if result.is_ok() => parse_target(raw),
        _ => (Target::default(), None),
    };

    (
        StartLine::Request {
            method,
            target,
            http_version: http_version.unwrap_or("").to_string(),
        },
        host,
        result,
    )
}

/// Split a request target into origin-form path + query. Some clients hand
/// a proxy the full URL instead of just the path; for those the host comes
/// back too, so it can land in the Host header.
fn parse_target(raw: &str) -> (Target, Option<String>) {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        let without_scheme = raw
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(raw);
        let (authority, path_part) = match without_scheme.split_once('/') {
            Some((authority, rest)) => (authority, format!("/{rest}")),
            None => (without_scheme, "/".to_string()),
        };
        let host = strip_port(authority);
        let (path, query) = split_path_and_query(&path_part);
        return (Target::new(path, query), Some(host.to_string()));
    }

    let (path, query) = split_path_and_query(raw);
    (Target::new(path, query), None)
}

fn split_path_and_query(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

fn strip_port(authority: &str) -> &str {
    if let Some((host, port)) = authority.rsplit_once(':') {
        if port.parse::<u16>().is_ok() {
            return host;
        }
    }
    authority
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(raw: &[u8]) -> (MessageAssembler, Result<(), ParseError>) {
        let mut assembler = MessageAssembler::new();
        let result = assembler.feed(raw);
        (assembler, result)
    }

    #[test]
    fn empty_feed_is_a_no_op() {
        let mut assembler = MessageAssembler::new();
        assembler.feed(b"").unwrap();
        assert!(!assembler.header_block_complete());
        assert_eq!(assembler.buffered_len(), 0);
    }

    #[test]
    fn request_line_and_headers_parse() {
        let (assembler, result) =
            assemble(b"GET /assets/resources?v=3 HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n");
        result.unwrap();

        let message = assembler.message().unwrap();
        assert!(!message.is_response());
        assert_eq!(message.method(), Some("GET"));
        assert_eq!(message.target().unwrap().path, "/assets/resources");
        assert_eq!(message.target().unwrap().query, "v=3");
        assert_eq!(message.http_version(), "HTTP/1.1");
        assert_eq!(message.headers.get("Host"), Some("example.com"));
        assert_eq!(message.headers.get("Accept"), Some("*/*"));
        assert!(message.body.is_empty());
    }

    #[test]
    fn status_line_with_spaced_reason_parses() {
        let (assembler, result) = assemble(b"HTTP/1.1 404 Not Found\r\n\r\n");
        result.unwrap();

        let message = assembler.message().unwrap();
        assert!(message.is_response());
        assert_eq!(message.status_code(), Some(404));
        assert_eq!(
            message.start_line,
            StartLine::Response {
                http_version: "HTTP/1.1".to_string(),
                status_code: 404,
                status_message: "Not Found".to_string(),
            }
        );
    }

    #[test]
    fn status_line_without_reason_is_accepted() {
        let (assembler, result) = assemble(b"HTTP/1.1 204\r\n\r\n");
        result.unwrap();
        assert_eq!(assembler.message().unwrap().status_code(), Some(204));
    }

    #[test]
    fn non_numeric_status_code_is_reported_but_parsing_continues() {
        let (assembler, result) = assemble(b"HTTP/1.1 abc Strange\r\nServer: test\r\n\r\n");
        assert!(matches!(
            result,
            Err(ParseError::InvalidStatusCode { ref token }) if token == "abc"
        ));

        let message = assembler.message().unwrap();
        assert_eq!(message.status_code(), Some(0));
        assert_eq!(message.headers.get("Server"), Some("test"));
    }

    #[test]
    fn malformed_request_line_keeps_partial_fields() {
        let (assembler, result) = assemble(b"BROKEN\r\nHost: x\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStartLine { .. })));

        let message = assembler.message().unwrap();
        assert_eq!(message.method(), Some("BROKEN"));
        assert!(message.target().unwrap().is_empty());
        assert_eq!(message.headers.get("Host"), Some("x"));
    }

    #[test]
    fn header_lines_without_separator_are_dropped() {
        let (assembler, result) = assemble(b"GET / HTTP/1.1\r\ngarbage line\r\nHost: x\r\n\r\n");
        result.unwrap();

        let message = assembler.message().unwrap();
        assert_eq!(message.headers.len(), 1);
        assert_eq!(message.headers.get("Host"), Some("x"));
    }

    #[test]
    fn header_value_may_contain_colon_space() {
        let (assembler, result) = assemble(b"GET / HTTP/1.1\r\nX-Note: a: b: c\r\n\r\n");
        result.unwrap();
        assert_eq!(
            assembler.message().unwrap().headers.get("X-Note"),
            Some("a: b: c")
        );
    }

    #[test]
    fn body_bytes_after_delimiter_are_never_reparsed() {
        let (mut assembler, result) =
            assemble(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nfirst");
        result.unwrap();

        assembler.feed(b"HTTP/1.1 500 looks like a status line").unwrap();
        let message = assembler.message().unwrap();
        assert_eq!(message.status_code(), Some(200));
        assert_eq!(
            message.body,
            b"firstHTTP/1.1 500 looks like a status line".to_vec()
        );
    }

    #[test]
    fn buffered_len_tracks_both_phases() {
        let mut assembler = MessageAssembler::new();
        assembler.feed(b"GET / HT").unwrap();
        assert_eq!(assembler.buffered_len(), 8);
        assert!(!assembler.header_block_complete());

        assembler.feed(b"TP/1.1\r\n\r\nbody").unwrap();
        assert!(assembler.header_block_complete());
        assert_eq!(assembler.buffered_len(), 4);
    }

    #[test]
    fn strip_port_leaves_portless_authorities_alone() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("user:password"), "user:password");
    }

    #[test]
    fn absolute_target_without_path_maps_to_root() {
        let (target, host) = parse_target("http://example.com");
        assert_eq!(host.as_deref(), Some("example.com"));
        assert_eq!(target.path, "/");
        assert_eq!(target.query, "");
    }
}
