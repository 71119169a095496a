//! Parsing well-formed SystemRDL sources

use rdl_cst::{Parse, SyntaxKind, SyntaxNode, language, parse};
use rstest::rstest;

fn assert_full_span(parse: &Parse, text: &str) {
    assert_eq!(
        u32::from(parse.syntax().text_range().end()),
        text.len() as u32,
        "tree must span the whole input"
    );
    assert_eq!(parse.syntax().text().to_string(), text);
}

/// Children tile their parent exactly: contiguous, in order, contained.
fn assert_containment(node: &SyntaxNode) {
    let mut cursor = node.text_range().start();
    for child in node.children_with_tokens() {
        assert_eq!(child.text_range().start(), cursor);
        cursor = child.text_range().end();
        if let Some(child_node) = child.into_node() {
            assert_containment(&child_node);
        }
    }
    assert_eq!(cursor, node.text_range().end());
}

#[rstest]
#[case::empty("")]
#[case::only_comment("// just a comment\n")]
#[case::property("sw = rw;")]
#[case::default_property("default sw = rw;")]
#[case::dynamic_assign("a.b->prop = 1;")]
#[case::string_value("desc = \"status register\";")]
#[case::anonymous_component("reg { sw = rw; } R1;")]
#[case::named_component("reg status { sw = rw; };")]
#[case::external_component("external mem {} m;")]
#[case::internal_component("internal reg {} r;")]
#[case::explicit_inst("my_type inst1, inst2[8];")]
#[case::external_inst("external my_type i1;")]
#[case::bit_range("field {} f[7:0];")]
#[case::address("reg {} r @ 0x1000;")]
#[case::enum_def("enum access_t { rw; ro = 1; };")]
#[case::expression("x = (1 + 2) * 3 - 4 / 2;")]
#[case::radix_literals("n = 8'hFF + 0x10 + 4'b1010;")]
#[case::booleans("a = true; b = false;")]
#[case::nested(
    "addrmap top {\n  regfile rf {\n    reg { field { sw = rw; } f; } r @ 0x0;\n  } blocks[2];\n};"
)]
#[case::signals("signal {} clk;")]
#[case::comments("// head\nreg {} r; /* tail */")]
fn test_parses_clean(#[case] text: &str) {
    let parse = parse(text);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    assert_full_span(&parse, text);
    assert_containment(&parse.syntax());
    assert_eq!(parse.reused_nodes, 0);
}

#[test]
fn test_nested_component_structure() {
    let text = "reg { field { sw=rw; } F1; };";
    let parse = parse(text);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    assert_full_span(&parse, text);

    let root = parse.syntax();
    let outer = root
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_DEF)
        .expect("outer definition");
    let outer_body = outer
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_BODY)
        .expect("outer body");
    let inner = outer_body
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_DEF)
        .expect("inner field definition");
    let inner_body = inner
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_BODY)
        .expect("inner body");
    assert!(
        inner_body
            .children()
            .any(|n| n.kind() == SyntaxKind::PROPERTY_ASSIGN),
        "sw=rw must sit inside the field body"
    );

    let instance = inner
        .children()
        .find(|n| n.kind() == SyntaxKind::INSTANCE)
        .expect("instance of the field");
    let name = instance
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == SyntaxKind::IDENT)
        .expect("instance name");
    assert_eq!(name.text(), "F1");
}

#[test]
fn test_nested_comment_is_single_token() {
    let text = "/* a /* b */ c */";
    let parse = parse(text);
    assert!(parse.ok());
    assert_full_span(&parse, text);

    let tokens: Vec<_> = parse
        .syntax()
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind(), SyntaxKind::BLOCK_COMMENT);
    assert_eq!(tokens[0].text(), text);
}

#[rstest]
#[case("n = 1 + 2 * 3;", SyntaxKind::PLUS)]
#[case("n = 1 * 2 + 3;", SyntaxKind::PLUS)]
#[case("n = 1 - 2 / 3;", SyntaxKind::MINUS)]
fn test_operator_precedence(#[case] text: &str, #[case] top_op: SyntaxKind) {
    let parse = parse(text);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    let outer = parse
        .syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::BINARY_EXPR)
        .expect("binary expression");
    let op = outer
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind().is_punct())
        .expect("operator token");
    assert_eq!(op.kind(), top_op, "lowest-precedence operator is on top");
}

#[test]
fn test_language_descriptor() {
    let info = language();
    assert_eq!(info.name(), "systemrdl");
    assert!(info.state_count() > 0);
    assert!(info.symbol_count() > 0);
    assert_eq!(info.symbol_name(SyntaxKind::ADDRMAP_KW), "addrmap");
    assert!(info.is_node_kind(SyntaxKind::SOURCE_FILE));
    assert!(info.is_token_kind(SyntaxKind::IDENT));
}

#[test]
fn test_parse_is_cheap_to_share() {
    let parse = parse("reg {} r;");
    let copy = parse.clone();
    // Clones share the same green tree.
    assert_eq!(
        format!("{:#?}", parse.syntax()),
        format!("{:#?}", copy.syntax())
    );
}
