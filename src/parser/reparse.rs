//! Incremental re-parse after a byte-range edit
//!
//! An [`Edit`] describes one replaced byte range. `Parse::edit` validates
//! its coordinates (the one place the API can fail), `reparse` runs the
//! engine over the new text with a [`ReuseCursor`] looking over its
//! shoulder: at every clean token boundary the cursor maps the position
//! back into the old tree and offers an unchanged item-level subtree for
//! wholesale reuse. Reused green nodes are shared by reference, so large
//! untouched regions cost neither lexing nor allocation.
//!
//! Old green nodes store lengths, not absolute offsets, and are immutable;
//! the coordinate shift implied by the edit is applied lazily while
//! mapping, never by rewriting the old tree.
//!
//! The result is always structurally identical to a from-scratch parse of
//! the new text; reuse is an optimization, not a semantics change.

use rowan::{GreenNode, NodeOrToken};
use text_size::{TextRange, TextSize};
use tracing::debug;

use super::engine::{Parse, parse, parse_with_reuse};
use super::error::EditError;
use super::syntax_kind::{SyntaxKind, SyntaxNode};

/// Bytes around the damaged range within which old nodes are not trusted,
/// covering token-boundary effects of the edit (merged identifiers,
/// extended literals).
const DAMAGE_MARGIN: u32 = 1;

/// A single byte-range edit: `start..old_end` in the old text was replaced
/// by content occupying `start..new_end` in the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start: TextSize,
    pub old_end: TextSize,
    pub new_end: TextSize,
}

impl Edit {
    /// Replacement of `range` by `new_len` bytes.
    pub fn replace(range: TextRange, new_len: TextSize) -> Edit {
        Edit {
            start: range.start(),
            old_end: range.end(),
            new_end: range.start() + new_len,
        }
    }

    /// Pure insertion of `len` bytes at `at`.
    pub fn insert(at: TextSize, len: TextSize) -> Edit {
        Edit {
            start: at,
            old_end: at,
            new_end: at + len,
        }
    }

    /// Pure deletion of `range`.
    pub fn delete(range: TextRange) -> Edit {
        Edit {
            start: range.start(),
            old_end: range.end(),
            new_end: range.start(),
        }
    }
}

/// An edit validated against the tree it applies to.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    old: Parse,
    edit: Edit,
}

impl Parse {
    /// Validate `edit` against this tree's coordinates. This is the only
    /// failure mode of the incremental API; syntax problems in the edited
    /// text are never errors, they become error nodes in the next tree.
    pub fn edit(&self, edit: &Edit) -> Result<PendingEdit, EditError> {
        let len = self.green.text_len();
        if edit.start > edit.old_end || edit.start > edit.new_end {
            return Err(EditError::InvertedRange {
                start: edit.start.into(),
                old_end: edit.old_end.min(edit.new_end).into(),
            });
        }
        if edit.old_end > len {
            return Err(EditError::OutOfBounds {
                start: edit.start.into(),
                old_end: edit.old_end.into(),
                len: len.into(),
            });
        }
        Ok(PendingEdit {
            old: self.clone(),
            edit: *edit,
        })
    }
}

/// Re-parse the edited text, reusing unaffected subtrees of the old tree.
pub fn reparse(pending: &PendingEdit, new_text: &str) -> Result<Parse, EditError> {
    let old_len = u32::from(pending.old.green.text_len());
    let edit = pending.edit;
    let expected = old_len - u32::from(edit.old_end) + u32::from(edit.new_end);
    let actual = new_text.len() as u32;
    if expected != actual {
        return Err(EditError::LengthMismatch { expected, actual });
    }
    debug!(
        start = u32::from(edit.start),
        old_end = u32::from(edit.old_end),
        new_end = u32::from(edit.new_end),
        "incremental reparse"
    );
    let cursor = ReuseCursor::new(pending.old.syntax(), edit);
    Ok(parse_with_reuse(new_text, cursor))
}

/// Parse entry point with an optional previous tree: full parse when
/// `prior` is `None`, validated incremental re-parse otherwise.
pub fn parse_with(text: &str, prior: Option<(&Parse, &Edit)>) -> Result<Parse, EditError> {
    match prior {
        None => Ok(parse(text)),
        Some((old, edit)) => reparse(&old.edit(edit)?, text),
    }
}

/// Maps positions in the new text onto reusable nodes of the old tree.
pub(crate) struct ReuseCursor {
    root: SyntaxNode,
    edit: Edit,
    /// Damage range in old coordinates, widened by the safety margin.
    damage_start: u32,
    damage_end: u32,
    old_len: u32,
}

impl ReuseCursor {
    fn new(root: SyntaxNode, edit: Edit) -> ReuseCursor {
        let old_len = u32::from(root.text_range().end());
        ReuseCursor {
            root,
            edit,
            damage_start: u32::from(edit.start).saturating_sub(DAMAGE_MARGIN),
            damage_end: u32::from(edit.old_end) + DAMAGE_MARGIN,
            old_len,
        }
    }

    /// A reusable subtree starting exactly at `new_pos`, if one exists.
    ///
    /// The node must map onto the old tree outside the widened damage
    /// range, be an item-level kind, and contain no error or missing
    /// nodes (their shape may depend on context that the edit changed).
    /// The topmost qualifying node wins.
    pub(crate) fn candidate(&self, new_pos: TextSize) -> Option<GreenNode> {
        let new_pos = u32::from(new_pos);
        let old_pos = if new_pos < u32::from(self.edit.start) {
            new_pos
        } else if new_pos >= u32::from(self.edit.new_end) {
            let delta = i64::from(u32::from(self.edit.new_end)) - i64::from(u32::from(self.edit.old_end));
            let mapped = i64::from(new_pos) - delta;
            if mapped < 0 {
                return None;
            }
            mapped as u32
        } else {
            return None;
        };
        if old_pos >= self.old_len {
            return None;
        }

        let probe = TextRange::at(TextSize::new(old_pos), TextSize::new(1));
        let mut node = match self.root.covering_element(probe) {
            NodeOrToken::Node(n) => n,
            NodeOrToken::Token(t) => t.parent()?,
        };

        let mut best = None;
        loop {
            let range = node.text_range();
            if u32::from(range.start()) == old_pos
                && reusable_kind(node.kind())
                && self.outside_damage(range)
                && !has_defects(&node)
            {
                best = Some(node.clone());
            }
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        best.map(|n| n.green().into_owned())
    }

    fn outside_damage(&self, range: TextRange) -> bool {
        u32::from(range.end()) <= self.damage_start || u32::from(range.start()) >= self.damage_end
    }
}

/// Item-level constructs are the reuse granularity: they hang off a single
/// goto and are plentiful enough that finer sharing buys little.
fn reusable_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::COMPONENT_DEF
            | SyntaxKind::PROPERTY_ASSIGN
            | SyntaxKind::ENUM_DEF
            | SyntaxKind::EXPLICIT_INST
    )
}

fn has_defects(node: &SyntaxNode) -> bool {
    node.descendants()
        .any(|n| matches!(n.kind(), SyntaxKind::ERROR | SyntaxKind::MISSING))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_validation() {
        let parse = parse("sw = rw;");
        let len = u32::from(parse.green.text_len());
        assert_eq!(len, 8);

        let inverted = Edit {
            start: 5.into(),
            old_end: 2.into(),
            new_end: 6.into(),
        };
        assert!(matches!(
            parse.edit(&inverted),
            Err(EditError::InvertedRange { .. })
        ));

        let oob = Edit {
            start: 2.into(),
            old_end: 99.into(),
            new_end: 99.into(),
        };
        assert!(matches!(
            parse.edit(&oob),
            Err(EditError::OutOfBounds { .. })
        ));

        let fine = Edit::insert(8.into(), 4.into());
        assert!(parse.edit(&fine).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let old = parse("sw = rw;");
        let edit = Edit::insert(8.into(), 5.into());
        let pending = old.edit(&edit).unwrap();
        assert!(matches!(
            reparse(&pending, "sw = rw;"),
            Err(EditError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_append_reuses_first_item() {
        let old_text = "sw = rw;\n";
        let new_text = "sw = rw;\n hw = r;";
        let old = parse(old_text);
        assert!(old.ok());

        let edit = Edit::insert(
            TextSize::of(old_text),
            TextSize::of(new_text) - TextSize::of(old_text),
        );
        let new = parse_with(new_text, Some((&old, &edit))).unwrap();
        assert!(new.ok(), "errors: {:?}", new.errors);
        assert!(new.reused_nodes > 0, "expected the old assignment reused");

        let scratch = parse(new_text);
        assert_eq!(format!("{:#?}", new.syntax()), format!("{:#?}", scratch.syntax()));
    }

    #[test]
    fn test_edit_helpers() {
        let range = TextRange::new(3.into(), 7.into());
        assert_eq!(
            Edit::replace(range, 2.into()),
            Edit {
                start: 3.into(),
                old_end: 7.into(),
                new_end: 5.into(),
            }
        );
        assert_eq!(
            Edit::delete(range),
            Edit {
                start: 3.into(),
                old_end: 7.into(),
                new_end: 3.into(),
            }
        );
    }
}
