//! Table-driven shift/reduce parse engine
//!
//! Runs the SLR automaton from [`tables`](super::tables) over the scanner's
//! token stream and builds a rowan green tree bottom-up: each stack entry
//! carries the green elements accumulated for its symbol, reduce pops and
//! (for productions with a node kind) wraps them, accept drains the stack
//! into a `SOURCE_FILE` root.
//!
//! Trivia never reaches the automaton; it is buffered and attached to the
//! entry of the next non-trivia token, so every byte of input lands in the
//! tree exactly once.
//!
//! When a token has no action, recovery tries, in order: dropping the token
//! (if its successor can act here), inserting a zero-width missing token
//! (bounded per error site), and synchronization (skip tokens and pop
//! states until some state on the stack can act). Whatever happens, the
//! resulting tree spans the whole input.

use rowan::{GreenNode, GreenToken, NodeOrToken};
use text_size::{TextRange, TextSize};
use tracing::{debug, trace};

use super::error::SyntaxError;
use super::grammar::{NonTerminal, PRODUCTIONS};
use super::lexer::{Scanner, Token};
use super::reparse::ReuseCursor;
use super::syntax_kind::{SyntaxKind, SyntaxNode};
use super::tables::{Action, ParseTables, tables};
use super::token_set::TokenSet;

pub(crate) type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Zero-width insertions allowed in a row before recovery gives up on a site.
const MAX_INSERTIONS: u32 = 4;
/// Reductions attempted while deciding whether a reused subtree fits.
const MAX_NODE_REDUCES: u32 = 16;
/// Recovery steps allowed once the input is exhausted.
const MAX_EOF_STEPS: u32 = 64;

/// The result of a parse: an immutable green tree plus contained errors.
///
/// Always covers the entire input, errors included. Cheap to clone (the
/// green tree is shared by reference).
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
    /// Subtrees carried over verbatim from a previous tree during
    /// incremental re-parse. Zero for a from-scratch parse.
    pub reused_nodes: usize,
}

impl Parse {
    /// Root of the red tree for navigation.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse SystemRDL source from scratch.
pub fn parse(text: &str) -> Parse {
    Engine::new(text, None).run()
}

/// Parse with an old tree available for subtree reuse.
pub(crate) fn parse_with_reuse(text: &str, cursor: ReuseCursor) -> Parse {
    Engine::new(text, Some(cursor)).run()
}

enum Lookahead<'a> {
    Token(Token<'a>),
    /// A subtree lifted wholesale from the previous tree.
    Node(GreenNode),
    Eof,
}

struct StackEntry {
    state: u32,
    elements: Vec<GreenElement>,
}

struct Engine<'a> {
    scanner: Scanner<'a>,
    tables: &'static ParseTables,
    stack: Vec<StackEntry>,
    /// Trivia waiting to be attached to the next shifted token.
    pending: Vec<GreenElement>,
    lookahead: Option<Lookahead<'a>>,
    errors: Vec<SyntaxError>,
    reused_nodes: usize,
    cursor: Option<ReuseCursor>,
    /// Position where a reuse candidate was rejected; do not offer it again.
    skip_reuse_at: Option<TextSize>,
    insert_streak: u32,
    eof_steps: u32,
    text_len: TextSize,
}

impl<'a> Engine<'a> {
    fn new(text: &'a str, cursor: Option<ReuseCursor>) -> Engine<'a> {
        Engine {
            scanner: Scanner::new(text),
            tables: tables(),
            stack: vec![StackEntry {
                state: 0,
                elements: Vec::new(),
            }],
            pending: Vec::new(),
            lookahead: None,
            errors: Vec::new(),
            reused_nodes: 0,
            cursor,
            skip_reuse_at: None,
            insert_streak: 0,
            eof_steps: 0,
            text_len: TextSize::of(text),
        }
    }

    fn run(mut self) -> Parse {
        debug!(len = u32::from(self.text_len), "parse start");
        loop {
            let la = match self.lookahead.take() {
                Some(la) => la,
                None => self.fill_lookahead(),
            };
            match la {
                Lookahead::Node(node) => self.handle_reused(node),
                Lookahead::Token(tok) => match self.current().action(tok.kind) {
                    Some(Action::Shift(next)) => self.shift(tok, next),
                    Some(Action::Reduce(p)) => {
                        self.lookahead = Some(Lookahead::Token(tok));
                        self.reduce(p);
                    }
                    Some(Action::Accept) => return self.finish(),
                    None => self.recover(tok),
                },
                Lookahead::Eof => match self.current().action(SyntaxKind::EOF) {
                    Some(Action::Accept) => return self.finish(),
                    Some(Action::Reduce(p)) => {
                        self.lookahead = Some(Lookahead::Eof);
                        self.reduce(p);
                    }
                    // The tables never shift end-of-input.
                    Some(Action::Shift(_)) => return self.finish(),
                    None => {
                        if !self.recover_at_eof() {
                            self.errors.push(SyntaxError::new(
                                "unexpected end of input",
                                TextRange::empty(self.text_len),
                            ));
                            return self.finish();
                        }
                    }
                },
            }
        }
    }

    fn state(&self) -> usize {
        self.stack.last().map(|e| e.state as usize).unwrap_or(0)
    }

    fn current(&self) -> &'static super::tables::State {
        &self.tables.states[self.state()]
    }

    /// Produce the next lookahead: a reusable old subtree when the cursor
    /// offers one at the current boundary, otherwise the next token.
    fn fill_lookahead(&mut self) -> Lookahead<'a> {
        let pos = self.scanner.position();
        if self.pending.is_empty() && self.skip_reuse_at != Some(pos) {
            if let Some(cursor) = &self.cursor {
                if let Some(node) = cursor.candidate(pos) {
                    return Lookahead::Node(node);
                }
            }
        }
        let valid = self.current().valid_tokens();
        loop {
            match self.scanner.next_token(valid) {
                Some(tok) if tok.kind.is_trivia() => {
                    self.pending
                        .push(NodeOrToken::Token(GreenToken::new(tok.kind.into(), tok.text)));
                }
                Some(tok) => return Lookahead::Token(tok),
                None => return Lookahead::Eof,
            }
        }
    }

    /// Splice a reused subtree into the parse as one pre-built `Item`.
    ///
    /// The current state may first need reductions to reach one with an
    /// `Item` goto (list tails, just-finished definitions); they are driven
    /// by the subtree's first terminal, exactly as the real token would.
    /// The subtree's own final reduction depends on one token of right
    /// context, so the token following it in the new text must be
    /// actionable in the goto target; a from-scratch parse would otherwise
    /// recover before that reduction and shape the item differently. If
    /// either check fails the candidate is demoted and its text is lexed
    /// normally.
    fn handle_reused(&mut self, node: GreenNode) {
        let pos = self.scanner.position();
        let Some(first) = first_terminal(&node) else {
            self.skip_reuse_at = Some(pos);
            return;
        };
        let mut steps = 0;
        loop {
            if let Some(target) = self.current().goto(NonTerminal::Item) {
                let len = node.text_len();
                if !self.follow_token_acts(pos + len, target) {
                    self.skip_reuse_at = Some(pos);
                    return;
                }
                trace!(
                    offset = u32::from(pos),
                    len = u32::from(len),
                    "reusing subtree"
                );
                self.stack.push(StackEntry {
                    state: target,
                    elements: vec![NodeOrToken::Node(node)],
                });
                self.scanner.restart_at(pos + len);
                self.reused_nodes += 1;
                self.insert_streak = 0;
                return;
            }
            match self.current().action(first) {
                Some(Action::Reduce(p)) if steps < MAX_NODE_REDUCES => {
                    self.reduce(p);
                    steps += 1;
                }
                _ => {
                    self.skip_reuse_at = Some(pos);
                    return;
                }
            }
        }
    }

    /// Whether the first non-trivia token at `at` has an action in `state`.
    /// Right-context check for subtree reuse.
    fn follow_token_acts(&self, at: TextSize, state_id: u32) -> bool {
        let state = &self.tables.states[state_id as usize];
        let mut peek = self.scanner.clone();
        peek.restart_at(at);
        loop {
            match peek.next_token(state.valid_tokens()) {
                Some(t) if t.kind.is_trivia() => {}
                Some(t) => return state.action(t.kind).is_some(),
                None => return state.action(SyntaxKind::EOF).is_some(),
            }
        }
    }

    fn shift(&mut self, tok: Token<'a>, next: u32) {
        trace!(kind = tok.kind.name(), offset = u32::from(tok.offset), "shift");
        let mut elements = std::mem::take(&mut self.pending);
        elements.push(NodeOrToken::Token(GreenToken::new(tok.kind.into(), tok.text)));
        self.stack.push(StackEntry {
            state: next,
            elements,
        });
        self.insert_streak = 0;
    }

    fn reduce(&mut self, p: u16) {
        let prod = &PRODUCTIONS[p as usize];
        trace!(production = p, lhs = ?prod.lhs, "reduce");
        let split = self.stack.len() - prod.rhs.len();
        let mut elements: Vec<GreenElement> = Vec::new();
        for entry in self.stack.drain(split..) {
            elements.extend(entry.elements);
        }
        let state = self.state();
        let Some(target) = self.tables.states[state].goto(prod.lhs) else {
            // Unreachable with self-consistent tables; keep the text anyway.
            debug_assert!(false, "missing goto for {:?} in state {state}", prod.lhs);
            self.stack.push(StackEntry {
                state: state as u32,
                elements,
            });
            return;
        };
        let entry_elements = match prod.node {
            Some(kind) => vec![NodeOrToken::Node(GreenNode::new(kind.into(), elements))],
            None => elements,
        };
        self.stack.push(StackEntry {
            state: target,
            elements: entry_elements,
        });
    }

    fn finish(mut self) -> Parse {
        let mut elements: Vec<GreenElement> = Vec::new();
        for entry in self.stack.drain(..) {
            elements.extend(entry.elements);
        }
        elements.append(&mut self.pending);
        let green = GreenNode::new(SyntaxKind::SOURCE_FILE.into(), elements);
        debug!(
            errors = self.errors.len(),
            reused = self.reused_nodes,
            "parse done"
        );
        Parse {
            green,
            errors: self.errors,
            reused_nodes: self.reused_nodes,
        }
    }

    // -- recovery ----------------------------------------------------------

    fn recover(&mut self, tok: Token<'a>) {
        self.errors.push(SyntaxError::new(
            format!("unexpected `{}`", tok.text),
            TextRange::at(tok.offset, tok.len()),
        ));
        debug!(
            kind = tok.kind.name(),
            offset = u32::from(tok.offset),
            "recovering"
        );

        if self.successor_acts() {
            self.delete(tok);
            return;
        }
        if self.insert_streak < MAX_INSERTIONS && self.try_insert(tok.kind, tok.offset) {
            self.insert_streak += 1;
            self.lookahead = Some(Lookahead::Token(tok));
            return;
        }
        self.synchronize(tok);
    }

    /// Recovery once the input is exhausted. A state whose reduce actions
    /// all agree can take that reduction by default, steering the stack
    /// toward a state where a missing closer or semicolon can be inserted
    /// and the parse accepted.
    fn recover_at_eof(&mut self) -> bool {
        if self.eof_steps >= MAX_EOF_STEPS {
            return false;
        }
        self.eof_steps += 1;
        if let Some(p) = self.current().unique_reduce() {
            if p != 0 {
                self.reduce(p);
                self.lookahead = Some(Lookahead::Eof);
                return true;
            }
        }
        if self.insert_streak < MAX_INSERTIONS && self.try_insert(SyntaxKind::EOF, self.text_len) {
            self.insert_streak += 1;
            self.lookahead = Some(Lookahead::Eof);
            return true;
        }
        false
    }

    /// Would the token after the offending one have an action right here?
    /// If so, plain deletion is the cheapest repair.
    fn successor_acts(&self) -> bool {
        let state = self.current();
        let mut peek = self.scanner.clone();
        loop {
            match peek.next_token(state.valid_tokens()) {
                Some(t) if t.kind.is_trivia() => {}
                Some(t) => return state.action(t.kind).is_some(),
                None => return state.action(SyntaxKind::EOF).is_some(),
            }
        }
    }

    /// Drop the offending token into an `ERROR` node glued to the tree.
    fn delete(&mut self, tok: Token<'a>) {
        trace!(offset = u32::from(tok.offset), "recovery: delete token");
        let mut elements = std::mem::take(&mut self.pending);
        elements.push(NodeOrToken::Token(GreenToken::new(tok.kind.into(), tok.text)));
        let error = GreenNode::new(SyntaxKind::ERROR.into(), elements);
        if let Some(top) = self.stack.last_mut() {
            top.elements.push(NodeOrToken::Node(error));
        }
    }

    /// Insert a zero-width token of some shiftable kind, if doing so makes
    /// the offending lookahead actionable in the target state. At end of
    /// input a target that still needs its own default reduction also
    /// qualifies, so `reg {` can close both the body and the definition.
    fn try_insert(&mut self, offending: SyntaxKind, at: TextSize) -> bool {
        let state = self.current();
        for (kind, target) in state.shiftable() {
            let target_state = &self.tables.states[target as usize];
            let helps = target_state.action(offending).is_some()
                || (offending == SyntaxKind::EOF && target_state.unique_reduce().is_some());
            if !helps {
                continue;
            }
            trace!(kind = kind.name(), offset = u32::from(at), "recovery: insert missing");
            self.errors.push(SyntaxError::new(
                format!("missing `{}`", kind.name()),
                TextRange::empty(at),
            ));
            let token = GreenToken::new(kind.into(), "");
            let missing = GreenNode::new(SyntaxKind::MISSING.into(), [NodeOrToken::Token(token)]);
            self.stack.push(StackEntry {
                state: target,
                elements: vec![NodeOrToken::Node(missing)],
            });
            return true;
        }
        false
    }

    /// Last resort: skip tokens until one is actionable somewhere on the
    /// stack, then pop states (folding their text into the error node)
    /// until the top can act on it.
    fn synchronize(&mut self, tok: Token<'a>) {
        trace!(offset = u32::from(tok.offset), "recovery: synchronize");
        let mut sync = TokenSet::EMPTY;
        for entry in &self.stack {
            sync = sync.union(self.tables.states[entry.state as usize].valid_tokens());
        }

        let mut skipped = std::mem::take(&mut self.pending);
        skipped.push(NodeOrToken::Token(GreenToken::new(tok.kind.into(), tok.text)));

        let mut resume = None;
        loop {
            match self.scanner.next_token(sync) {
                None => break,
                Some(t) if !t.kind.is_trivia() && sync.contains(t.kind) => {
                    resume = Some(t);
                    break;
                }
                Some(t) => {
                    skipped.push(NodeOrToken::Token(GreenToken::new(t.kind.into(), t.text)));
                }
            }
        }

        match resume {
            Some(t) => {
                while self.stack.len() > 1 && self.current().action(t.kind).is_none() {
                    if let Some(entry) = self.stack.pop() {
                        let mut elements = entry.elements;
                        elements.append(&mut skipped);
                        skipped = elements;
                    }
                }
                self.lookahead = Some(Lookahead::Token(t));
            }
            None => self.lookahead = Some(Lookahead::Eof),
        }

        if !skipped.is_empty() {
            let error = GreenNode::new(SyntaxKind::ERROR.into(), skipped);
            if let Some(top) = self.stack.last_mut() {
                top.elements.push(NodeOrToken::Node(error));
            }
        }
    }
}

/// First non-trivia token kind inside a green subtree.
fn first_terminal(node: &rowan::GreenNodeData) -> Option<SyntaxKind> {
    for child in node.children() {
        match child {
            NodeOrToken::Token(tok) => {
                let kind = SyntaxKind::from(tok.kind());
                if !kind.is_trivia() {
                    return Some(kind);
                }
            }
            NodeOrToken::Node(n) => {
                if let Some(kind) = first_terminal(n) {
                    return Some(kind);
                }
            }
        }
    }
    None
}
