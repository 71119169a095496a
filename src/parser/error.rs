//! Error types
//!
//! Syntax problems in the input are not failures: they are recorded as
//! [`SyntaxError`] values on the [`Parse`](super::engine::Parse) and
//! reflected as error/missing nodes in the tree. The only caller-visible
//! `Result` failures are malformed API inputs, covered by [`EditError`].

use text_size::TextRange;
use thiserror::Error;

/// A syntax error contained in an otherwise complete parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        SyntaxError {
            message: message.into(),
            range,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

/// Invalid edit coordinates handed to the incremental API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit start {start} is past the old end {old_end}")]
    InvertedRange { start: u32, old_end: u32 },

    #[error("edit range {start}..{old_end} exceeds the parsed length {len}")]
    OutOfBounds { start: u32, old_end: u32, len: u32 },

    #[error("new text is {actual} bytes, edit coordinates require {expected}")]
    LengthMismatch { expected: u32, actual: u32 },
}
