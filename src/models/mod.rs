//! Data models for captured traffic

pub mod exchange;
pub mod headers;
pub mod message;

pub use exchange::*;
pub use headers::*;
pub use message::*;
