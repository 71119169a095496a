//! SystemRDL reserved words
//!
//! All keywords are contextual. The scanner lexes a word as a keyword only
//! when the current valid-token set says one is expected; see
//! [`Scanner::next_token`](super::lexer::Scanner::next_token).

use super::syntax_kind::SyntaxKind;

/// Every reserved word together with its token kind.
pub const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("addrmap", SyntaxKind::ADDRMAP_KW),
    ("regfile", SyntaxKind::REGFILE_KW),
    ("reg", SyntaxKind::REG_KW),
    ("field", SyntaxKind::FIELD_KW),
    ("mem", SyntaxKind::MEM_KW),
    ("signal", SyntaxKind::SIGNAL_KW),
    ("enum", SyntaxKind::ENUM_KW),
    ("default", SyntaxKind::DEFAULT_KW),
    ("external", SyntaxKind::EXTERNAL_KW),
    ("internal", SyntaxKind::INTERNAL_KW),
    ("true", SyntaxKind::TRUE_KW),
    ("false", SyntaxKind::FALSE_KW),
];

/// Look up the keyword kind for an identifier-shaped word.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|&(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_table() {
        for (text, kind) in KEYWORDS {
            assert_eq!(keyword_kind(text), Some(*kind));
            assert!(kind.is_keyword());
        }
        assert_eq!(keyword_kind("register"), None);
        assert_eq!(keyword_kind(""), None);
    }
}
