//! Typed AST wrappers over the CST
//!
//! Thin, zero-cost views: each wrapper holds a `SyntaxNode` and exposes the
//! children that matter for its construct. Casting never copies the tree.

use super::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A typed view over a syntax node.
pub trait AstNode {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$attr:meta])* $name:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(
    /// The root of a parsed file.
    SourceFile,
    SOURCE_FILE
);
ast_node!(
    /// A component definition: `reg my_reg { ... } r1, r2;`
    ComponentDef,
    COMPONENT_DEF
);
ast_node!(ComponentBody, COMPONENT_BODY);
ast_node!(
    /// A property assignment: `sw = rw;` or `target->prop = 1;`
    PropertyAssign,
    PROPERTY_ASSIGN
);
ast_node!(EnumDef, ENUM_DEF);
ast_node!(EnumEntry, ENUM_ENTRY);
ast_node!(
    /// Instantiation of a previously defined type: `my_reg r1, r2;`
    ExplicitInst,
    EXPLICIT_INST
);
ast_node!(Instance, INSTANCE);

/// Any top-level or body-level construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    ComponentDef(ComponentDef),
    PropertyAssign(PropertyAssign),
    EnumDef(EnumDef),
    ExplicitInst(ExplicitInst),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::COMPONENT_DEF
                | SyntaxKind::PROPERTY_ASSIGN
                | SyntaxKind::ENUM_DEF
                | SyntaxKind::EXPLICIT_INST
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            SyntaxKind::COMPONENT_DEF => ComponentDef::cast(syntax).map(Item::ComponentDef),
            SyntaxKind::PROPERTY_ASSIGN => PropertyAssign::cast(syntax).map(Item::PropertyAssign),
            SyntaxKind::ENUM_DEF => EnumDef::cast(syntax).map(Item::EnumDef),
            SyntaxKind::EXPLICIT_INST => ExplicitInst::cast(syntax).map(Item::ExplicitInst),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::ComponentDef(it) => it.syntax(),
            Item::PropertyAssign(it) => it.syntax(),
            Item::EnumDef(it) => it.syntax(),
            Item::ExplicitInst(it) => it.syntax(),
        }
    }
}

fn token_of(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

impl SourceFile {
    pub fn items(&self) -> impl Iterator<Item = Item> {
        self.syntax.children().filter_map(Item::cast)
    }
}

impl ComponentDef {
    /// The component-type keyword (`reg`, `field`, ...).
    pub fn component_type(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().is_keyword() && t.kind() != SyntaxKind::EXTERNAL_KW
                && t.kind() != SyntaxKind::INTERNAL_KW)
    }

    /// The optional type name between the keyword and the body.
    pub fn type_name(&self) -> Option<SyntaxToken> {
        token_of(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn body(&self) -> Option<ComponentBody> {
        self.syntax.children().find_map(ComponentBody::cast)
    }

    pub fn instances(&self) -> impl Iterator<Item = Instance> {
        self.syntax.children().filter_map(Instance::cast)
    }
}

impl ComponentBody {
    pub fn items(&self) -> impl Iterator<Item = Item> {
        self.syntax.children().filter_map(Item::cast)
    }
}

impl PropertyAssign {
    /// Whether the assignment is `default`-prefixed.
    pub fn is_default(&self) -> bool {
        token_of(&self.syntax, SyntaxKind::DEFAULT_KW).is_some()
    }

    /// The assigned property name: the last identifier before `=` (or `;`).
    pub fn name(&self) -> Option<SyntaxToken> {
        let mut name = None;
        for element in self.syntax.children_with_tokens() {
            if let Some(token) = element.into_token() {
                match token.kind() {
                    SyntaxKind::IDENT => name = Some(token),
                    SyntaxKind::EQ | SyntaxKind::SEMICOLON => break,
                    _ => {}
                }
            }
        }
        name
    }

    /// Everything between `=` and `;`, if a value is present.
    pub fn value(&self) -> Option<super::syntax_kind::SyntaxElement> {
        let mut seen_eq = false;
        for element in self.syntax.children_with_tokens() {
            match &element {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::EQ => seen_eq = true,
                rowan::NodeOrToken::Token(t)
                    if seen_eq && !t.kind().is_trivia() && t.kind() != SyntaxKind::SEMICOLON =>
                {
                    return Some(element);
                }
                rowan::NodeOrToken::Node(_) if seen_eq => return Some(element),
                _ => {}
            }
        }
        None
    }
}

impl EnumDef {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn entries(&self) -> impl Iterator<Item = EnumEntry> {
        self.syntax.children().filter_map(EnumEntry::cast)
    }
}

impl EnumEntry {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of(&self.syntax, SyntaxKind::IDENT)
    }
}

impl ExplicitInst {
    /// The instantiated type name.
    pub fn type_name(&self) -> Option<SyntaxToken> {
        token_of(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn instances(&self) -> impl Iterator<Item = Instance> {
        self.syntax.children().filter_map(Instance::cast)
    }
}

impl Instance {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn array_spec(&self) -> Option<SyntaxNode> {
        self.syntax
            .children()
            .find(|n| matches!(n.kind(), SyntaxKind::ARRAY_SPEC | SyntaxKind::BIT_RANGE))
    }

    pub fn address(&self) -> Option<SyntaxNode> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::ADDRESS_SPEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::engine::parse;

    #[test]
    fn test_navigate_component() {
        let parse = parse("reg status { sw = rw; } ST[4] @ 0x40;");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let file = SourceFile::cast(parse.syntax()).unwrap();

        let items: Vec<_> = file.items().collect();
        assert_eq!(items.len(), 1);
        let Item::ComponentDef(def) = &items[0] else {
            panic!("expected a component definition");
        };

        assert_eq!(def.component_type().unwrap().kind(), SyntaxKind::REG_KW);
        assert_eq!(def.type_name().unwrap().text(), "status");

        let body = def.body().unwrap();
        let body_items: Vec<_> = body.items().collect();
        assert_eq!(body_items.len(), 1);
        let Item::PropertyAssign(assign) = &body_items[0] else {
            panic!("expected a property assignment");
        };
        assert_eq!(assign.name().unwrap().text(), "sw");
        assert!(!assign.is_default());
        assert!(assign.value().is_some());

        let instances: Vec<_> = def.instances().collect();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].name().unwrap().text(), "ST");
        assert!(instances[0].array_spec().is_some());
        assert!(instances[0].address().is_some());
    }

    #[test]
    fn test_navigate_enum() {
        let parse = parse("enum access_t { rw; ro = 1; };");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let file = SourceFile::cast(parse.syntax()).unwrap();
        let Some(Item::EnumDef(def)) = file.items().next() else {
            panic!("expected an enum definition");
        };
        assert_eq!(def.name().unwrap().text(), "access_t");
        let entries: Vec<_> = def.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name().unwrap().text(), "ro");
    }
}
