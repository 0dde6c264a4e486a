//! Compilation of grammar definition text into production graphs.
//!
//! The compiler walks each definition with an explicit stack of grouping
//! frames. Every operand (terminal chain, rule reference, closed group)
//! yields an `(entry set, exit set)` pair; concatenation folds pairs left to
//! right, alternation unions them, repetition adds exit-to-entry back-edges,
//! and optionality marks the entry set as skippable. The skip marker must be
//! resolved away by the time a rule's top level is reached, otherwise the
//! rule could match the empty sequence and is rejected.

use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::GrammarError;
use crate::grammar::graph::{Grammar, NodeId, Production, RuleId, Symbol, SymbolData};

/// Entry set of a partially built subgraph. `epsilon` marks "this subgraph
/// may be skipped entirely" and only exists during construction.
#[derive(Debug, Default, Clone)]
struct EntrySet {
    nodes: SmallVec<[NodeId; 4]>,
    epsilon: bool,
}

/// A compiled operand: where a match of it may start and end.
#[derive(Debug, Clone)]
struct Piece {
    entry: EntrySet,
    exit: SmallVec<[NodeId; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Group,
    Repeat,
    Optional,
}

/// One open grouping construct: alternatives of concatenated operands.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    alts: Vec<Vec<Piece>>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            alts: vec![Vec::new()],
        }
    }

    fn push_piece(&mut self, piece: Piece) {
        self.alts
            .last_mut()
            .expect("frame always has a current alternative")
            .push(piece);
    }
}

/// A classified word of a rule body.
enum Tok {
    /// Quoted terminal text or a punctuation keyword expansion.
    Literal(CompactString),
    /// Reference to an earlier rule.
    Ref(CompactString),
    Open(FrameKind),
    Close(FrameKind),
    Alt,
    Concat,
}

/// Compile grammar definition text into a [`Grammar`].
///
/// Compilation is a pure function of its input: the same text always yields
/// a structurally identical grammar, with rule ids equal to declaration
/// order.
///
/// # Errors
///
/// Returns a [`GrammarError`] for unterminated rules or groupings, undeclared
/// or duplicate rule names, malformed literals, and rules that could match
/// the empty sequence. Any error aborts compilation of the whole grammar.
pub fn compile(text: &str) -> Result<Grammar, GrammarError> {
    let mut compiler = Compiler::default();
    let mut words = text.split_whitespace();

    while let Some(name) = words.next() {
        if !is_plain_name(name) {
            return Err(GrammarError::MalformedDefinition {
                found: name.to_string(),
            });
        }
        match words.next() {
            Some(":") => {}
            Some(other) => {
                return Err(GrammarError::MalformedDefinition {
                    found: other.to_string(),
                })
            }
            None => {
                return Err(GrammarError::UnterminatedRule {
                    rule: name.to_string(),
                })
            }
        }

        let mut body = Vec::new();
        let mut terminated = false;
        for word in words.by_ref() {
            if word == ";" {
                terminated = true;
                break;
            }
            body.push(word);
        }
        if !terminated {
            return Err(GrammarError::UnterminatedRule {
                rule: name.to_string(),
            });
        }

        compiler.compile_rule(name, &body)?;
    }

    Ok(compiler.finish())
}

fn is_plain_name(word: &str) -> bool {
    !word.starts_with('\'')
        && !word.starts_with('"')
        && word
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_')
        && word.chars().any(char::is_alphabetic)
}

/// Punctuation stand-ins usable where the characters themselves are taken by
/// the grammar notation.
fn keyword_terminal(word: &str) -> Option<char> {
    match word {
        "COMMA" => Some(','),
        "SEMICOLON" => Some(';'),
        "LEFT_PAREN" => Some('('),
        "RIGHT_PAREN" => Some(')'),
        "LEFT_BRACKET" => Some('['),
        "RIGHT_BRACKET" => Some(']'),
        "LEFT_BRACE" => Some('{'),
        "RIGHT_BRACE" => Some('}'),
        _ => None,
    }
}

fn classify(word: &str, rule: &str) -> Result<Tok, GrammarError> {
    match word {
        "(" => return Ok(Tok::Open(FrameKind::Group)),
        ")" => return Ok(Tok::Close(FrameKind::Group)),
        "{" => return Ok(Tok::Open(FrameKind::Repeat)),
        "}" => return Ok(Tok::Close(FrameKind::Repeat)),
        "[" => return Ok(Tok::Open(FrameKind::Optional)),
        "]" => return Ok(Tok::Close(FrameKind::Optional)),
        "|" => return Ok(Tok::Alt),
        "," => return Ok(Tok::Concat),
        ":" => {
            return Err(GrammarError::MalformedDefinition {
                found: word.to_string(),
            })
        }
        _ => {}
    }

    if let Some(quote) = word.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let bad = || GrammarError::BadLiteral {
            rule: rule.to_string(),
            literal: word.to_string(),
        };
        if word.len() < 3 || !word.ends_with(quote) {
            return Err(bad());
        }
        let inner = &word[1..word.len() - 1];
        if inner.is_empty() || (quote == '\'' && inner.chars().count() != 1) {
            return Err(bad());
        }
        return Ok(Tok::Literal(inner.into()));
    }

    if let Some(ch) = keyword_terminal(word) {
        return Ok(Tok::Literal(CompactString::from(ch.to_string())));
    }

    // Remaining all-uppercase words are lowercased rule references; words
    // with any lowercase letter reference a rule as written.
    if word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase) {
        return Ok(Tok::Ref(word.to_lowercase().into()));
    }

    Ok(Tok::Ref(word.into()))
}

#[derive(Default)]
struct Compiler {
    nodes: Vec<SymbolData>,
    rules: Vec<Production>,
    by_name: HashMap<CompactString, RuleId, ahash::RandomState>,
    rodeo: lasso::Rodeo,
}

impl Compiler {
    fn compile_rule(&mut self, name: &str, body: &[&str]) -> Result<(), GrammarError> {
        if self.by_name.contains_key(name) {
            return Err(GrammarError::DuplicateRule {
                rule: name.to_string(),
            });
        }

        let id = RuleId::new(self.rules.len());
        let arena_start = self.nodes.len();
        let mut frames = vec![Frame::new(FrameKind::Group)];

        for word in body {
            match classify(word, name)? {
                Tok::Literal(text) => {
                    let piece = self.chain(&text);
                    frames
                        .last_mut()
                        .expect("frame stack is never empty")
                        .push_piece(piece);
                }
                Tok::Ref(reference) => {
                    let Some(&rid) = self.by_name.get(reference.as_str()) else {
                        return Err(GrammarError::UndeclaredReference {
                            rule: name.to_string(),
                            reference: reference.to_string(),
                        });
                    };
                    let node = self.alloc(Symbol::Rule(rid));
                    let piece = Piece {
                        entry: EntrySet {
                            nodes: SmallVec::from_slice(&[node]),
                            epsilon: false,
                        },
                        exit: SmallVec::from_slice(&[node]),
                    };
                    frames
                        .last_mut()
                        .expect("frame stack is never empty")
                        .push_piece(piece);
                }
                Tok::Open(kind) => frames.push(Frame::new(kind)),
                Tok::Close(kind) => {
                    let frame = frames.pop().expect("frame stack is never empty");
                    if frames.is_empty() || frame.kind != kind {
                        return Err(GrammarError::UnbalancedGroup {
                            rule: name.to_string(),
                        });
                    }
                    let piece = self.resolve_frame(frame, name)?;
                    frames
                        .last_mut()
                        .expect("parent frame exists after pop check")
                        .push_piece(piece);
                }
                Tok::Alt => frames
                    .last_mut()
                    .expect("frame stack is never empty")
                    .alts
                    .push(Vec::new()),
                Tok::Concat => {}
            }
        }

        if frames.len() != 1 {
            return Err(GrammarError::UnbalancedGroup {
                rule: name.to_string(),
            });
        }
        let piece = self.resolve_frame(frames.pop().expect("bottom frame exists"), name)?;
        if piece.entry.epsilon {
            return Err(GrammarError::EmptyMatch {
                rule: name.to_string(),
            });
        }

        for &n in &piece.entry.nodes {
            self.nodes[n.index()].is_entry = true;
        }
        for &n in &piece.exit {
            self.nodes[n.index()].is_exit = true;
        }
        self.validate_graph(arena_start, &piece, name)?;

        let spur = self.rodeo.get_or_intern(name);
        self.by_name.insert(name.into(), id);
        self.rules.push(Production {
            id,
            name: spur,
            entry: piece.entry.nodes,
            exit: piece.exit,
        });
        Ok(())
    }

    fn alloc(&mut self, sym: Symbol) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SymbolData::new(sym));
        id
    }

    /// A terminal chain: one node per character, linked in order.
    fn chain(&mut self, text: &str) -> Piece {
        let mut first = None;
        let mut prev: Option<NodeId> = None;
        for ch in text.chars() {
            let node = self.alloc(Symbol::Char(ch));
            if let Some(p) = prev {
                self.nodes[p.index()].right.push(node);
                self.nodes[node.index()].left.push(p);
            } else {
                first = Some(node);
            }
            prev = Some(node);
        }
        let first = first.expect("literal text is never empty");
        let last = prev.expect("literal text is never empty");
        Piece {
            entry: EntrySet {
                nodes: SmallVec::from_slice(&[first]),
                epsilon: false,
            },
            exit: SmallVec::from_slice(&[last]),
        }
    }

    fn link(&mut self, from: &[NodeId], to: &[NodeId]) {
        for &f in from {
            for &t in to {
                let right = &mut self.nodes[f.index()].right;
                if !right.contains(&t) {
                    right.push(t);
                }
                let left = &mut self.nodes[t.index()].left;
                if !left.contains(&f) {
                    left.push(f);
                }
            }
        }
    }

    /// Fold a concatenated sequence of pieces into one.
    ///
    /// Every exit of the accumulated prefix links to the next operand's entry
    /// nodes. When an operand may be skipped, the prefix's exits stay live
    /// and its entry nodes leak into the accumulated entry set until a
    /// non-skippable operand is reached.
    fn resolve_sequence(
        &mut self,
        pieces: Vec<Piece>,
        rule: &str,
    ) -> Result<Piece, GrammarError> {
        let mut iter = pieces.into_iter();
        let Some(mut acc) = iter.next() else {
            return Err(GrammarError::EmptyGroup {
                rule: rule.to_string(),
            });
        };
        for piece in iter {
            self.link(&acc.exit, &piece.entry.nodes);
            if acc.entry.epsilon {
                extend_unique(&mut acc.entry.nodes, &piece.entry.nodes);
                acc.entry.epsilon = piece.entry.epsilon;
            }
            let mut exit = piece.exit;
            if piece.entry.epsilon {
                extend_unique(&mut exit, &acc.exit);
            }
            acc.exit = exit;
        }
        Ok(acc)
    }

    /// Resolve alternation inside a frame, then apply the frame's operator.
    fn resolve_frame(&mut self, frame: Frame, rule: &str) -> Result<Piece, GrammarError> {
        let mut entry = EntrySet::default();
        let mut exit: SmallVec<[NodeId; 4]> = SmallVec::new();
        for alt in frame.alts {
            let piece = self.resolve_sequence(alt, rule)?;
            extend_unique(&mut entry.nodes, &piece.entry.nodes);
            entry.epsilon |= piece.entry.epsilon;
            extend_unique(&mut exit, &piece.exit);
        }

        match frame.kind {
            FrameKind::Group => {}
            FrameKind::Repeat => {
                // Back-edges enable one-or-more repeats; the epsilon marker
                // covers the zero-repeat case.
                let entries = entry.nodes.clone();
                self.link(&exit, &entries);
                entry.epsilon = true;
            }
            FrameKind::Optional => entry.epsilon = true,
        }

        Ok(Piece { entry, exit })
    }

    /// Every node of the rule's subgraph must be reachable from an entry node
    /// and able to reach an exit node.
    fn validate_graph(
        &self,
        arena_start: usize,
        piece: &Piece,
        rule: &str,
    ) -> Result<(), GrammarError> {
        let count = self.nodes.len() - arena_start;
        let mut forward = vec![false; count];
        let mut backward = vec![false; count];

        let mut work: Vec<NodeId> = piece.entry.nodes.to_vec();
        while let Some(n) = work.pop() {
            let slot = n.index() - arena_start;
            if forward[slot] {
                continue;
            }
            forward[slot] = true;
            work.extend(self.nodes[n.index()].right.iter().copied());
        }

        let mut work: Vec<NodeId> = piece.exit.to_vec();
        while let Some(n) = work.pop() {
            let slot = n.index() - arena_start;
            if backward[slot] {
                continue;
            }
            backward[slot] = true;
            work.extend(self.nodes[n.index()].left.iter().copied());
        }

        if forward.iter().zip(&backward).all(|(f, b)| *f && *b) {
            Ok(())
        } else {
            Err(GrammarError::MalformedProduction {
                rule: rule.to_string(),
            })
        }
    }

    fn finish(self) -> Grammar {
        Grammar {
            nodes: self.nodes,
            rules: self.rules,
            by_name: self.by_name,
            names: self.rodeo.into_reader(),
        }
    }
}

fn extend_unique(dst: &mut SmallVec<[NodeId; 4]>, src: &[NodeId]) {
    for &n in src {
        if !dst.contains(&n) {
            dst.push(n);
        }
    }
}
