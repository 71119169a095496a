//! SystemRDL parsing: lossless, error-tolerant, incremental
//!
//! # Architecture
//!
//! ```text
//!   source text
//!       |
//!   [lexer]      logos tokens + hand-written comment/string/number rules,
//!       |        keywords resolved against the engine's valid-token set
//!   [engine]     table-driven shift/reduce over [tables] (SLR, built once
//!       |        from [grammar]), green tree assembled bottom-up,
//!       |        bounded error recovery
//!   [reparse]    byte-range edits, old-subtree reuse with a safety margin
//!       |
//!   rowan CST    immutable green tree + red navigation ([syntax_kind]),
//!                typed views in [ast]
//! ```
//!
//! The tree is lossless: every byte of input, trivia and garbage included,
//! appears in exactly one token, so the root always spans the whole file.
//! Syntax problems never fail the API; they surface as `ERROR`/`MISSING`
//! nodes plus [`SyntaxError`] values on the [`Parse`]. The only fallible
//! calls are the incremental ones, which validate edit coordinates.

pub mod ast;
pub(crate) mod engine;
pub mod error;
pub(crate) mod grammar;
pub mod keywords;
pub mod lexer;
pub mod reparse;
pub mod syntax_kind;
pub(crate) mod tables;
pub mod token_set;

pub use engine::{Parse, parse};
pub use error::{EditError, SyntaxError};
pub use reparse::{Edit, PendingEdit, parse_with, reparse};
pub use syntax_kind::{
    RdlLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodeChildren, SyntaxToken,
};
pub use tables::{LanguageInfo, language};
