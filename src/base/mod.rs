//! Foundation types shared across the crate
//!
//! Byte-offset ranges come from the `text-size` crate (the same types
//! rowan uses); [`LineIndex`] converts them to line/column coordinates for
//! editor consumers.

pub mod line_index;

pub use line_index::{LineCol, LineIndex};
pub use text_size::{TextRange, TextSize};
