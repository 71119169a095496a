//! Error recovery: malformed input must still yield a full-span tree

use rdl_cst::{Parse, SyntaxKind, SyntaxNode, parse};
use rstest::rstest;

fn assert_full_span(parse: &Parse, text: &str) {
    assert_eq!(
        u32::from(parse.syntax().text_range().end()),
        text.len() as u32,
        "tree must span the whole input"
    );
    assert_eq!(parse.syntax().text().to_string(), text);
}

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

fn has_defect_node(parse: &Parse) -> bool {
    parse
        .syntax()
        .descendants()
        .any(|n| matches!(n.kind(), SyntaxKind::ERROR | SyntaxKind::MISSING))
}

#[rstest]
#[case::stray_bytes("%%%")]
#[case::lone_keyword("reg")]
#[case::unbalanced("}}}{{{")]
#[case::semicolons_only(";;;")]
#[case::cut_off("reg { field")]
#[case::dangling_arrow("a ->")]
#[case::value_without_target("= 5;")]
#[case::address_garbage("@@ 0x")]
#[case::enum_without_name("enum {")]
#[case::non_ascii("🦀 reg {} r; 🦀")]
#[case::deep_garbage("reg { { { ; } = ")]
fn test_garbage_terminates_with_full_span(#[case] text: &str) {
    let parse = parse(text);
    assert!(!parse.ok(), "expected errors for {text:?}");
    assert!(!parse.errors.is_empty());
    assert_full_span(&parse, text);
    assert_containment(&parse.syntax());
    assert!(has_defect_node(&parse) || !parse.errors.is_empty());
}

#[test]
fn test_unterminated_string_spans_to_eof() {
    let text = "\"abc";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);

    // The whole remainder is one error-flagged token inside an error node.
    let error = parse
        .syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::ERROR)
        .expect("error node");
    let token = error
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == SyntaxKind::ERROR_TOKEN)
        .expect("error token");
    assert_eq!(token.text(), text);
}

#[test]
fn test_unterminated_string_inside_component() {
    let text = "reg { desc = \"abc";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);
    assert_containment(&parse.syntax());
}

#[test]
fn test_missing_closing_brace_heals() {
    let text = "reg { sw = rw;";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);

    // The definition is still recognized, with zero-width missing tokens
    // standing in for the absent `}` and `;`.
    let def = parse
        .syntax()
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_DEF)
        .expect("component definition survives");
    let missing: Vec<_> = def
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::MISSING)
        .collect();
    assert!(missing.len() >= 2);
    for node in missing {
        assert!(node.text_range().is_empty(), "missing nodes are zero-width");
    }
}

#[test]
fn test_extra_closer_is_isolated() {
    let text = "reg {} r1; }";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);

    // The valid definition parses normally despite the stray brace.
    assert!(
        parse
            .syntax()
            .children()
            .any(|n| n.kind() == SyntaxKind::COMPONENT_DEF)
    );
    assert!(has_defect_node(&parse));
}

#[test]
fn test_interior_garbage_skipped() {
    let text = "reg { 123 } r;";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);

    // The stray number is folded away; the surrounding structure holds.
    let def = parse
        .syntax()
        .children()
        .find(|n| n.kind() == SyntaxKind::COMPONENT_DEF)
        .expect("component definition survives");
    assert!(def.descendants().any(|n| n.kind() == SyntaxKind::INSTANCE));
    assert!(
        def.descendants()
            .any(|n| n.kind() == SyntaxKind::ERROR)
    );
}

#[test]
fn test_error_ranges_point_into_input() {
    let text = "reg { %% } r;";
    let parse = parse(text);
    assert!(!parse.ok());
    for error in &parse.errors {
        assert!(u32::from(error.range.end()) <= text.len() as u32);
    }
}

#[test]
fn test_good_items_around_bad_one() {
    let text = "sw = rw;\nreg { & } r;\nhw = r;";
    let parse = parse(text);
    assert!(!parse.ok());
    assert_full_span(&parse, text);

    let assigns = parse
        .syntax()
        .children()
        .filter(|n| n.kind() == SyntaxKind::PROPERTY_ASSIGN)
        .count();
    assert_eq!(assigns, 2, "assignments before and after still parse");
}
