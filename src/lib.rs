//! # rdl-cst
//!
//! An incremental, error-tolerant parser for SystemRDL register
//! descriptions, producing a lossless concrete syntax tree for editor
//! tooling.
//!
//! ## Modules (in dependency order)
//!
//! ```text
//! base    -> foundation: text ranges, line index
//! parser  -> scanner, automaton tables, parse engine, incremental
//!            re-parse, syntax tree, typed AST views
//! ```
//!
//! ## Quick start
//!
//! ```
//! use rdl_cst::{parse, SyntaxKind};
//!
//! let tree = parse("reg status { sw = rw; } ST;");
//! assert!(tree.ok());
//! assert_eq!(tree.syntax().kind(), SyntaxKind::SOURCE_FILE);
//! ```
//!
//! Malformed input still produces a tree spanning the entire text, with
//! `ERROR`/`MISSING` nodes marking the broken regions:
//!
//! ```
//! use rdl_cst::parse;
//!
//! let tree = parse("reg {");
//! assert!(!tree.ok());
//! assert_eq!(u32::from(tree.syntax().text_range().end()), 5);
//! ```

pub mod base;
pub mod parser;

pub use base::{LineCol, LineIndex, TextRange, TextSize};
pub use parser::{
    Edit, EditError, LanguageInfo, Parse, PendingEdit, RdlLanguage, SyntaxElement, SyntaxError,
    SyntaxKind, SyntaxNode, SyntaxToken, language, parse, parse_with, reparse,
};
