//! Wire and display rendering
//!
//! Turns an [`HttpMessage`] back into the exact bytes handed to the
//! transport, and into a printable form for logs and the inspection pane.

use base64::{engine::general_purpose, Engine as _};
use bytes::{Bytes, BytesMut};

use crate::models::message::{HttpMessage, StartLine};

impl HttpMessage {
    /// Serialize the message back to wire bytes.
    ///
    /// With `headers_only` set, the blank line and body are omitted so a
    /// transport can stream the body separately. Otherwise the output is
    /// the full message: feeding it back through a fresh assembler yields
    /// an equal message.
    pub fn to_wire_bytes(&self, headers_only: bool) -> Bytes {
        let mut data = BytesMut::with_capacity(256 + if headers_only { 0 } else { self.body.len() });

        match &self.start_line {
            StartLine::Response {
                http_version,
                status_code,
                status_message,
            } => {
                data.extend_from_slice(
                    format!("{http_version} {status_code} {status_message}\r\n").as_bytes(),
                );
            }
            StartLine::Request {
                method,
                target,
                http_version,
            } => {
                let target = target.origin_form();
                data.extend_from_slice(format!("{method} {target} {http_version}\r\n").as_bytes());
            }
        }

        for (name, value) in self.headers.iter() {
            data.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }

        if !headers_only {
            data.extend_from_slice(b"\r\n");
            data.extend_from_slice(&self.body);
        }

        data.freeze()
    }

    /// Render a printable form of the message.
    ///
    /// Bodies that do not declare a `text/` content type are emitted as
    /// Base64 so binary payloads stay printable. Diagnostic output only;
    /// the wire form is [`to_wire_bytes`](Self::to_wire_bytes).
    pub fn to_display_string(&self, headers_only: bool) -> String {
        let mut text = String::from_utf8_lossy(&self.to_wire_bytes(true)).into_owned();

        if !headers_only {
            text.push_str("\r\n");
            let is_text = self
                .headers
                .get("Content-Type")
                .map(|value| value.starts_with("text/"))
                .unwrap_or(false);
            if is_text {
                text.push_str(&String::from_utf8_lossy(&self.body));
            } else {
                text.push_str(&general_purpose::STANDARD.encode(&self.body));
            }
        }

        text
    }
}
