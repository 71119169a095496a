//! SystemRDL grammar productions
//!
//! The grammar is declarative data: a flat production list plus operator
//! precedence, compiled into action/goto tables by [`tables`](super::tables)
//! once per process. Productions carry an optional node kind; productions
//! without one are transparent and splice their children into the parent
//! (lists, optional clauses, expression chains).
//!
//! The expression productions are deliberately ambiguous; precedence and
//! associativity declarations resolve every resulting table conflict, the
//! same way a yacc `%left` block would.

use super::syntax_kind::SyntaxKind;

/// Non-terminal symbols, used as goto-table indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub(crate) enum NonTerminal {
    Start,
    Root,
    ItemList,
    Item,
    ComponentDef,
    CompType,
    OptName,
    Body,
    PropAssign,
    PropTarget,
    InstRef,
    EnumDef,
    EnumList,
    EnumEntry,
    ExplicitInst,
    OptInsts,
    InstList,
    Inst,
    OptArray,
    OptAddr,
    Expr,
    Primary,
}

pub(crate) const NONTERMINAL_COUNT: usize = NonTerminal::Primary as usize + 1;

/// One grammar symbol: terminal (token kind) or non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Symbol {
    T(SyntaxKind),
    N(NonTerminal),
}

/// A single production. `node` names the CST node wrapped around the
/// children on reduce; `None` splices them into the parent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Production {
    pub lhs: NonTerminal,
    pub rhs: &'static [Symbol],
    pub node: Option<SyntaxKind>,
}

/// Operator associativity for conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assoc {
    Left,
    #[allow(dead_code)]
    Right,
}

/// Precedence level and associativity of a terminal, if declared.
pub(crate) fn terminal_prec(kind: SyntaxKind) -> Option<(u8, Assoc)> {
    match kind {
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((1, Assoc::Left)),
        SyntaxKind::STAR | SyntaxKind::SLASH => Some((2, Assoc::Left)),
        _ => None,
    }
}

/// Precedence of a production: that of its rightmost terminal.
pub(crate) fn production_prec(prod: &Production) -> Option<(u8, Assoc)> {
    prod.rhs.iter().rev().find_map(|sym| match sym {
        Symbol::T(kind) => terminal_prec(*kind),
        Symbol::N(_) => None,
    })
}

use self::NonTerminal as Nt;
use self::Symbol::{N, T};
use super::syntax_kind::SyntaxKind as K;

/// The production list. Index 0 is the augmented start production; the
/// engine accepts when it reduces it.
pub(crate) const PRODUCTIONS: &[Production] = &[
    // 0: augmented start
    prod(Nt::Start, &[N(Nt::Root)], None),
    // 1
    prod(Nt::Root, &[N(Nt::ItemList)], None),
    // 2-3: item list
    prod(Nt::ItemList, &[], None),
    prod(Nt::ItemList, &[N(Nt::ItemList), N(Nt::Item)], None),
    // 4-7: item alternatives
    prod(Nt::Item, &[N(Nt::ComponentDef)], None),
    prod(Nt::Item, &[N(Nt::PropAssign)], None),
    prod(Nt::Item, &[N(Nt::EnumDef)], None),
    prod(Nt::Item, &[N(Nt::ExplicitInst)], None),
    // 8-10: component definition, optionally external/internal
    prod(
        Nt::ComponentDef,
        &[
            N(Nt::CompType),
            N(Nt::OptName),
            N(Nt::Body),
            N(Nt::OptInsts),
            T(K::SEMICOLON),
        ],
        Some(K::COMPONENT_DEF),
    ),
    prod(
        Nt::ComponentDef,
        &[
            T(K::EXTERNAL_KW),
            N(Nt::CompType),
            N(Nt::OptName),
            N(Nt::Body),
            N(Nt::OptInsts),
            T(K::SEMICOLON),
        ],
        Some(K::COMPONENT_DEF),
    ),
    prod(
        Nt::ComponentDef,
        &[
            T(K::INTERNAL_KW),
            N(Nt::CompType),
            N(Nt::OptName),
            N(Nt::Body),
            N(Nt::OptInsts),
            T(K::SEMICOLON),
        ],
        Some(K::COMPONENT_DEF),
    ),
    // 11-16: component type keywords
    prod(Nt::CompType, &[T(K::ADDRMAP_KW)], None),
    prod(Nt::CompType, &[T(K::REGFILE_KW)], None),
    prod(Nt::CompType, &[T(K::REG_KW)], None),
    prod(Nt::CompType, &[T(K::FIELD_KW)], None),
    prod(Nt::CompType, &[T(K::MEM_KW)], None),
    prod(Nt::CompType, &[T(K::SIGNAL_KW)], None),
    // 17-18: optional type name
    prod(Nt::OptName, &[], None),
    prod(Nt::OptName, &[T(K::IDENT)], None),
    // 19: body
    prod(
        Nt::Body,
        &[T(K::L_BRACE), N(Nt::ItemList), T(K::R_BRACE)],
        Some(K::COMPONENT_BODY),
    ),
    // 20-23: property assignment, optionally default-prefixed
    prod(
        Nt::PropAssign,
        &[N(Nt::PropTarget), T(K::SEMICOLON)],
        Some(K::PROPERTY_ASSIGN),
    ),
    prod(
        Nt::PropAssign,
        &[N(Nt::PropTarget), T(K::EQ), N(Nt::Expr), T(K::SEMICOLON)],
        Some(K::PROPERTY_ASSIGN),
    ),
    prod(
        Nt::PropAssign,
        &[T(K::DEFAULT_KW), N(Nt::PropTarget), T(K::SEMICOLON)],
        Some(K::PROPERTY_ASSIGN),
    ),
    prod(
        Nt::PropAssign,
        &[
            T(K::DEFAULT_KW),
            N(Nt::PropTarget),
            T(K::EQ),
            N(Nt::Expr),
            T(K::SEMICOLON),
        ],
        Some(K::PROPERTY_ASSIGN),
    ),
    // 24-25: assignment target, plain or dynamic (a.b->prop)
    prod(Nt::PropTarget, &[T(K::IDENT)], None),
    prod(
        Nt::PropTarget,
        &[N(Nt::InstRef), T(K::ARROW), T(K::IDENT)],
        None,
    ),
    // 26-27: dotted instance reference
    prod(Nt::InstRef, &[T(K::IDENT)], None),
    prod(
        Nt::InstRef,
        &[N(Nt::InstRef), T(K::DOT), T(K::IDENT)],
        Some(K::INSTANCE_REF),
    ),
    // 28: enum definition
    prod(
        Nt::EnumDef,
        &[
            T(K::ENUM_KW),
            T(K::IDENT),
            T(K::L_BRACE),
            N(Nt::EnumList),
            T(K::R_BRACE),
            T(K::SEMICOLON),
        ],
        Some(K::ENUM_DEF),
    ),
    // 29-30: enum entry list
    prod(Nt::EnumList, &[], None),
    prod(Nt::EnumList, &[N(Nt::EnumList), N(Nt::EnumEntry)], None),
    // 31-32: enum entries
    prod(
        Nt::EnumEntry,
        &[T(K::IDENT), T(K::SEMICOLON)],
        Some(K::ENUM_ENTRY),
    ),
    prod(
        Nt::EnumEntry,
        &[T(K::IDENT), T(K::EQ), N(Nt::Expr), T(K::SEMICOLON)],
        Some(K::ENUM_ENTRY),
    ),
    // 33-35: explicit instantiation of a named type
    prod(
        Nt::ExplicitInst,
        &[T(K::IDENT), N(Nt::InstList), T(K::SEMICOLON)],
        Some(K::EXPLICIT_INST),
    ),
    prod(
        Nt::ExplicitInst,
        &[
            T(K::EXTERNAL_KW),
            T(K::IDENT),
            N(Nt::InstList),
            T(K::SEMICOLON),
        ],
        Some(K::EXPLICIT_INST),
    ),
    prod(
        Nt::ExplicitInst,
        &[
            T(K::INTERNAL_KW),
            T(K::IDENT),
            N(Nt::InstList),
            T(K::SEMICOLON),
        ],
        Some(K::EXPLICIT_INST),
    ),
    // 36-37: optional instance list after a body
    prod(Nt::OptInsts, &[], None),
    prod(Nt::OptInsts, &[N(Nt::InstList)], None),
    // 38-39: comma-separated instances
    prod(Nt::InstList, &[N(Nt::Inst)], None),
    prod(
        Nt::InstList,
        &[N(Nt::InstList), T(K::COMMA), N(Nt::Inst)],
        None,
    ),
    // 40: one instance with optional array/bit-range and address
    prod(
        Nt::Inst,
        &[T(K::IDENT), N(Nt::OptArray), N(Nt::OptAddr)],
        Some(K::INSTANCE),
    ),
    // 41-43: optional array or bit range
    prod(Nt::OptArray, &[], None),
    prod(
        Nt::OptArray,
        &[T(K::L_BRACKET), N(Nt::Expr), T(K::R_BRACKET)],
        Some(K::ARRAY_SPEC),
    ),
    prod(
        Nt::OptArray,
        &[
            T(K::L_BRACKET),
            N(Nt::Expr),
            T(K::COLON),
            N(Nt::Expr),
            T(K::R_BRACKET),
        ],
        Some(K::BIT_RANGE),
    ),
    // 44-45: optional address allocation
    prod(Nt::OptAddr, &[], None),
    prod(
        Nt::OptAddr,
        &[T(K::AT), N(Nt::Expr)],
        Some(K::ADDRESS_SPEC),
    ),
    // 46-49: binary expressions, ambiguity resolved by precedence
    prod(
        Nt::Expr,
        &[N(Nt::Expr), T(K::PLUS), N(Nt::Expr)],
        Some(K::BINARY_EXPR),
    ),
    prod(
        Nt::Expr,
        &[N(Nt::Expr), T(K::MINUS), N(Nt::Expr)],
        Some(K::BINARY_EXPR),
    ),
    prod(
        Nt::Expr,
        &[N(Nt::Expr), T(K::STAR), N(Nt::Expr)],
        Some(K::BINARY_EXPR),
    ),
    prod(
        Nt::Expr,
        &[N(Nt::Expr), T(K::SLASH), N(Nt::Expr)],
        Some(K::BINARY_EXPR),
    ),
    // 50-56: primaries
    prod(Nt::Expr, &[N(Nt::Primary)], None),
    prod(Nt::Primary, &[T(K::NUMBER)], None),
    prod(Nt::Primary, &[T(K::STRING)], None),
    prod(Nt::Primary, &[T(K::TRUE_KW)], None),
    prod(Nt::Primary, &[T(K::FALSE_KW)], None),
    prod(Nt::Primary, &[T(K::IDENT)], None),
    prod(
        Nt::Primary,
        &[T(K::L_PAREN), N(Nt::Expr), T(K::R_PAREN)],
        Some(K::PAREN_EXPR),
    ),
];

const fn prod(
    lhs: NonTerminal,
    rhs: &'static [Symbol],
    node: Option<SyntaxKind>,
) -> Production {
    Production { lhs, rhs, node }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_nonterminal_has_a_production() {
        for nt_idx in 1..NONTERMINAL_COUNT {
            let found = PRODUCTIONS.iter().any(|p| p.lhs as usize == nt_idx);
            assert!(found, "no production for non-terminal #{nt_idx}");
        }
    }

    #[test]
    fn test_node_kinds_are_nodes() {
        for p in PRODUCTIONS {
            if let Some(kind) = p.node {
                assert!(kind.is_node(), "{kind:?} used as a production node");
            }
        }
    }

    #[test]
    fn test_binary_productions_carry_precedence() {
        for p in PRODUCTIONS {
            if p.node == Some(SyntaxKind::BINARY_EXPR) {
                assert!(production_prec(p).is_some());
            }
        }
    }
}
