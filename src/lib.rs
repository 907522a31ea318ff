//! # Lantern Message Core
//!
//! HTTP message engine for the Lantern network traffic inspector. The
//! surrounding application owns the sockets, the cache, and the UI; this
//! crate owns the protocol work in between.
//!
//! ## Features
//!
//! - Incremental assembly of HTTP/1.x requests and responses from raw,
//!   possibly-fragmented transport chunks
//! - Byte-exact re-serialization for forwarding
//! - Printable rendering for logs and the inspection pane
//! - Exchange records pairing captured requests with their responses
//!
//! ## Architecture
//!
//! ```text
//! transport ──▶ MessageAssembler ──▶ HttpMessage ──▶ to_wire_bytes ──▶ transport
//!                 (parser)            (model)          (render)
//! ```
//!
//! One assembler serves one exchange on one connection; instances share no
//! state and all operations are synchronous.

pub mod models;
pub mod parser;
pub mod render;

pub use models::{Exchange, ExchangeState, HeaderMap, HttpMessage, StartLine, Target};
pub use parser::{MessageAssembler, ParseError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
