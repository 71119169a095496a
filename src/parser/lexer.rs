//! Scanner for SystemRDL source text
//!
//! Regular token classes are recognized by a logos-generated automaton;
//! the context-sensitive parts are hand-written callbacks:
//!
//! - block comments nest (`/* a /* b */ c */` is one token),
//! - strings handle backslash escapes, and an unterminated string becomes a
//!   single error token running to end of input,
//! - radix-prefixed numeric literals (`0xFF`, `8'hDE`, `16'd1_000`) lex
//!   greedily; a literal glued to identifier characters degrades to an
//!   identifier-shaped token instead of two half-tokens.
//!
//! Keyword recognition is driven by the parse engine: `next_token` takes the
//! set of token kinds valid in the current parse state, and a reserved word
//! only becomes a keyword when that set expects it. The scanner is
//! restartable at any token boundary, which the incremental re-parser relies
//! on to skip over reused subtrees.

use logos::Logos;
use text_size::TextSize;

use super::keywords;
use super::syntax_kind::SyntaxKind;
use super::token_set::TokenSet;

/// A single lexed token borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl<'a> Token<'a> {
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Raw token classes before keyword resolution.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    /// Payload is false when the closing quote was never found.
    #[token("\"", lex_string)]
    Str(bool),

    /// Payload is false when the literal ran into identifier characters
    /// and was extended into an identifier-shaped token.
    #[regex(
        r"[0-9][0-9_]*('[bB][01xzXZ_]+|'[oO][0-7xzXZ_]+|'[dD][0-9_]+|'[hH][0-9a-fA-FxzXZ_]+)?",
        lex_number
    )]
    #[regex(r"0[xX][0-9a-fA-F_]+", lex_number)]
    Number(bool),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("@")]
    At,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
}

/// Consume a possibly-nested block comment. The opening `/*` is already
/// matched; an unterminated comment swallows the rest of the input.
fn lex_block_comment(lex: &mut logos::Lexer<RawToken>) {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                lex.bump(i);
                return;
            }
        } else {
            i += 1;
        }
    }
    lex.bump(bytes.len());
}

/// Consume a string body after the opening quote. Returns false if the
/// closing quote is missing, in which case the token runs to end of input.
fn lex_string(lex: &mut logos::Lexer<RawToken>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                lex.bump(i + 1);
                return true;
            }
            _ => i += 1,
        }
    }
    lex.bump(bytes.len());
    false
}

/// Extend a numeric literal over any trailing identifier characters.
/// Returns false when it did, marking the token identifier-shaped
/// (`123abc` or `0x12g` is one bad identifier, not a number plus garbage).
fn lex_number(lex: &mut logos::Lexer<RawToken>) -> bool {
    let mut clean = true;
    loop {
        let rem = lex.remainder();
        let Some(c) = rem.chars().next() else { break };
        if c.is_ascii_alphanumeric() || c == '_' {
            lex.bump(c.len_utf8());
            clean = false;
        } else {
            break;
        }
    }
    clean
}

/// Restartable scanner over a source buffer.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Scanner { text, pos: 0 }
    }

    /// Byte offset of the next token to be lexed.
    pub fn position(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    /// Reposition the scanner. Offset must lie on a token boundary; the
    /// incremental re-parser guarantees this by restarting only at the end
    /// of a reused subtree.
    pub fn restart_at(&mut self, offset: TextSize) {
        self.pos = u32::from(offset) as usize;
    }

    /// Lex the next token, resolving keywords against `valid`. Returns
    /// `None` at end of input. Trivia is returned as ordinary tokens
    /// regardless of the valid set.
    pub fn next_token(&mut self, valid: TokenSet) -> Option<Token<'a>> {
        if self.pos >= self.text.len() {
            return None;
        }
        let mut lex = RawToken::lexer(&self.text[self.pos..]);
        let raw = lex.next()?;
        let text = lex.slice();
        let offset = TextSize::new(self.pos as u32);
        self.pos += text.len();

        let kind = match raw {
            Ok(RawToken::Whitespace) => SyntaxKind::WHITESPACE,
            Ok(RawToken::LineComment) => SyntaxKind::LINE_COMMENT,
            Ok(RawToken::BlockComment) => SyntaxKind::BLOCK_COMMENT,
            Ok(RawToken::Str(true)) => SyntaxKind::STRING,
            Ok(RawToken::Str(false)) => SyntaxKind::ERROR_TOKEN,
            Ok(RawToken::Number(true)) => SyntaxKind::NUMBER,
            Ok(RawToken::Number(false)) => SyntaxKind::IDENT,
            Ok(RawToken::Ident) => match keywords::keyword_kind(text) {
                Some(kw) if valid.contains(kw) => kw,
                _ => SyntaxKind::IDENT,
            },
            Ok(RawToken::LBrace) => SyntaxKind::L_BRACE,
            Ok(RawToken::RBrace) => SyntaxKind::R_BRACE,
            Ok(RawToken::LBracket) => SyntaxKind::L_BRACKET,
            Ok(RawToken::RBracket) => SyntaxKind::R_BRACKET,
            Ok(RawToken::LParen) => SyntaxKind::L_PAREN,
            Ok(RawToken::RParen) => SyntaxKind::R_PAREN,
            Ok(RawToken::Semicolon) => SyntaxKind::SEMICOLON,
            Ok(RawToken::Colon) => SyntaxKind::COLON,
            Ok(RawToken::Comma) => SyntaxKind::COMMA,
            Ok(RawToken::Dot) => SyntaxKind::DOT,
            Ok(RawToken::Eq) => SyntaxKind::EQ,
            Ok(RawToken::At) => SyntaxKind::AT,
            Ok(RawToken::Arrow) => SyntaxKind::ARROW,
            Ok(RawToken::Plus) => SyntaxKind::PLUS,
            Ok(RawToken::Minus) => SyntaxKind::MINUS,
            Ok(RawToken::Star) => SyntaxKind::STAR,
            Ok(RawToken::Slash) => SyntaxKind::SLASH,
            Err(()) => SyntaxKind::ERROR_TOKEN,
        };

        Some(Token { kind, text, offset })
    }
}
