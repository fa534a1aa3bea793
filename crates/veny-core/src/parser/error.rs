//! The parser's one and only error type.
//!
//! There is no recovery in this version (see the design note on parser
//! error recovery in the source spec): the first `ParseError` raised
//! aborts parsing of the current file.

use crate::source_map::Position;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}
