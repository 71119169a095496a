//! Syntax kinds for the rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Token kinds come first so they can double as indices into the automaton
//! tables and into [`TokenSet`](super::token_set::TokenSet) bitsets.

/// All syntax kinds (tokens and nodes) in SystemRDL
///
/// Tokens are leaf kinds (identifiers, keywords, punctuation).
/// Nodes are composite (component definitions, property assignments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // identifier (also reserved words outside keyword positions)
    NUMBER, // 42, 0xFF, 8'hDE, 16'd1_000
    STRING, // "description text"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_BRACKET, // [
    R_BRACKET, // ]
    L_PAREN,   // (
    R_PAREN,   // )
    SEMICOLON, // ;
    COLON,     // :
    COMMA,     // ,
    DOT,       // .
    EQ,        // =
    AT,        // @
    ARROW,     // ->
    PLUS,      // +
    MINUS,     // -
    STAR,      // *
    SLASH,     // /

    // =========================================================================
    // KEYWORDS
    //
    // All keywords are contextual: the scanner only produces a keyword kind
    // when the engine's valid-token set contains it, otherwise the text lexes
    // as IDENT. This keeps reserved words usable as instance and property
    // names in positions where no keyword is expected.
    // =========================================================================
    ADDRMAP_KW,
    REGFILE_KW,
    REG_KW,
    FIELD_KW,
    MEM_KW,
    SIGNAL_KW,
    ENUM_KW,
    DEFAULT_KW,
    EXTERNAL_KW,
    INTERNAL_KW,
    TRUE_KW,
    FALSE_KW,

    // =========================================================================
    // SPECIAL TERMINALS
    // =========================================================================
    /// A byte sequence matching no valid token, or an unterminated string
    /// literal. Consumed by error recovery.
    ERROR_TOKEN,
    /// End of input. Only appears in the automaton tables, never in a tree.
    EOF,

    // =========================================================================
    // COMPOSITE NODES (non-terminals in the grammar)
    // =========================================================================
    SOURCE_FILE,

    COMPONENT_DEF,  // reg my_reg { ... } inst1, inst2;
    COMPONENT_BODY, // { ... }
    PROPERTY_ASSIGN,
    INSTANCE_REF, // a.b.c (dynamic assignment target)
    ENUM_DEF,
    ENUM_ENTRY,
    EXPLICIT_INST, // some_type inst1, inst2;
    INSTANCE,      // inst[3:0] @ 0x10
    ARRAY_SPEC,    // [8]
    BIT_RANGE,     // [7:0]
    ADDRESS_SPEC,  // @ 0x10
    BINARY_EXPR,
    PAREN_EXPR,

    // =========================================================================
    // RECOVERY NODES
    // =========================================================================
    /// Unexpected input folded into a placeholder by error recovery.
    ERROR,
    /// A required-but-absent construct; contains a single zero-width token.
    MISSING,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::ADDRMAP_KW as u16) && (self as u16) <= (Self::FALSE_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::SLASH as u16)
    }

    /// Check if this kind is a terminal (token) rather than a composite node
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Check if this kind is a composite node
    pub fn is_node(self) -> bool {
        !self.is_token() && self != Self::__LAST
    }

    /// Stable display name for the symbol, as exposed through
    /// [`LanguageInfo`](super::tables::LanguageInfo).
    pub fn name(self) -> &'static str {
        match self {
            Self::WHITESPACE => "whitespace",
            Self::LINE_COMMENT => "line_comment",
            Self::BLOCK_COMMENT => "block_comment",
            Self::IDENT => "identifier",
            Self::NUMBER => "number",
            Self::STRING => "string",
            Self::L_BRACE => "{",
            Self::R_BRACE => "}",
            Self::L_BRACKET => "[",
            Self::R_BRACKET => "]",
            Self::L_PAREN => "(",
            Self::R_PAREN => ")",
            Self::SEMICOLON => ";",
            Self::COLON => ":",
            Self::COMMA => ",",
            Self::DOT => ".",
            Self::EQ => "=",
            Self::AT => "@",
            Self::ARROW => "->",
            Self::PLUS => "+",
            Self::MINUS => "-",
            Self::STAR => "*",
            Self::SLASH => "/",
            Self::ADDRMAP_KW => "addrmap",
            Self::REGFILE_KW => "regfile",
            Self::REG_KW => "reg",
            Self::FIELD_KW => "field",
            Self::MEM_KW => "mem",
            Self::SIGNAL_KW => "signal",
            Self::ENUM_KW => "enum",
            Self::DEFAULT_KW => "default",
            Self::EXTERNAL_KW => "external",
            Self::INTERNAL_KW => "internal",
            Self::TRUE_KW => "true",
            Self::FALSE_KW => "false",
            Self::ERROR_TOKEN => "error_token",
            Self::EOF => "end_of_input",
            Self::SOURCE_FILE => "source_file",
            Self::COMPONENT_DEF => "component_def",
            Self::COMPONENT_BODY => "component_body",
            Self::PROPERTY_ASSIGN => "property_assign",
            Self::INSTANCE_REF => "instance_ref",
            Self::ENUM_DEF => "enum_def",
            Self::ENUM_ENTRY => "enum_entry",
            Self::EXPLICIT_INST => "explicit_inst",
            Self::INSTANCE => "instance",
            Self::ARRAY_SPEC => "array_spec",
            Self::BIT_RANGE => "bit_range",
            Self::ADDRESS_SPEC => "address_spec",
            Self::BINARY_EXPR => "binary_expr",
            Self::PAREN_EXPR => "paren_expr",
            Self::ERROR => "error",
            Self::MISSING => "missing",
            Self::__LAST => "",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RdlLanguage {}

impl rowan::Language for RdlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<RdlLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<RdlLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<RdlLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<RdlLanguage>;
