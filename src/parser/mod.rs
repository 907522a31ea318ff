//! Incremental HTTP message parsing

mod assembler;

pub use assembler::{MessageAssembler, ParseError};
