//! Bitset over token kinds
//!
//! The parse engine hands the scanner a [`TokenSet`] of terminals it could
//! act on in the current state. The scanner uses it to decide whether a word
//! like `reg` is a keyword here or just an identifier.

use super::syntax_kind::SyntaxKind;

/// A compact set of token kinds, backed by a `u128` bitmask.
///
/// Only terminal kinds fit (all of them sit below `SyntaxKind::EOF`,
/// comfortably under 128).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, kind: SyntaxKind) {
        self.0 |= mask(kind);
    }
}

const fn mask(kind: SyntaxKind) -> u128 {
    debug_assert!((kind as u16) < 128);
    1u128 << (kind as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_union() {
        let a = TokenSet::new(&[SyntaxKind::REG_KW, SyntaxKind::FIELD_KW]);
        let b = TokenSet::new(&[SyntaxKind::IDENT]);

        assert!(a.contains(SyntaxKind::REG_KW));
        assert!(!a.contains(SyntaxKind::IDENT));

        let both = a.union(b);
        assert!(both.contains(SyntaxKind::FIELD_KW));
        assert!(both.contains(SyntaxKind::IDENT));
        assert!(!both.contains(SyntaxKind::SEMICOLON));
    }

    #[test]
    fn test_insert() {
        let mut set = TokenSet::EMPTY;
        assert!(set.is_empty());
        set.insert(SyntaxKind::SEMICOLON);
        assert!(set.contains(SyntaxKind::SEMICOLON));
    }
}
