//! # Shift-Reduce Parser
//!
//! Greedy shift-reduce parsing over production graphs.
//!
//! ## Overview
//!
//! [`parse`] consumes a pre-tokenized snippet left to right, keeping a stack
//! of raw tokens and completed subtrees. For each token it first tries to
//! **shift**: the token is pushed when some suffix of the stack, matched
//! forward from a rule's entry nodes, leaves the token reachable - where
//! reachability descends through rule references like a pushdown automaton.
//! When no shift applies it **reduces**: every rule's exit nodes are walked
//! backward over the stack in lockstep, and the deepest suffix that spans a
//! full production is replaced by a single subtree (ties go to the rule
//! declared first). A token that can neither be shifted nor enabled by
//! reductions rejects the snippet.
//!
//! Matching is exact at stack level: a raw token only matches a contiguous
//! chain of character nodes inside one production, and a subtree only matches
//! a reference node for its rule. Descent happens solely in the shift
//! lookahead.
//!
//! All matching is live graph traversal; nothing is precomputed from the
//! grammar. Snippets here are short declarations, so the per-step cost stays
//! trivial.
//!
//! ## Usage
//!
//! ```rust
//! use shadevar::{compile, parse};
//!
//! let grammar = compile("digit : '0' | '1' ; number : digit , { digit } ;")?;
//! let tree = parse(&grammar, &["1", "0"])?;
//! assert_eq!(tree.name(), Some("number"));
//! assert_eq!(tree.leaves(), vec!["1", "0"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use smallvec::SmallVec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ParseError;
use crate::grammar::{Grammar, NodeId, Production, RuleId, Symbol};
use crate::syntax::SyntaxNode;

/// One parse stack element: a token not yet folded into a tree, or a
/// completed subtree.
#[derive(Debug, Clone)]
enum StackSym {
    Token(compact_str::CompactString),
    Node(SyntaxNode),
}

/// Parse one snippet into a syntax tree.
///
/// Tokens are matched verbatim; tokenization is the caller's concern (see
/// [`tokenize`](crate::shader::tokenize) for shader declaration text).
///
/// # Errors
///
/// [`ParseError::Rejected`] when a token can neither be shifted nor enabled
/// by reductions, [`ParseError::IncompleteParse`] when the input is consumed
/// but the stack does not collapse to a single tree, and
/// [`ParseError::EmptyInput`] for an empty token sequence.
pub fn parse<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Result<SyntaxNode, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut stack: Vec<StackSym> = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        loop {
            if shift_viable(grammar, &stack, token) {
                stack.push(StackSym::Token(token.into()));
                break;
            }
            if !reduce_once(grammar, &mut stack) {
                return Err(ParseError::Rejected {
                    snippet: snippet_text(tokens),
                    stack: render_stack(&stack),
                });
            }
        }
    }

    while reduce_once(grammar, &mut stack) {}

    if let [StackSym::Node(_)] = stack.as_slice() {
        let Some(StackSym::Node(node)) = stack.pop() else {
            unreachable!("single-element stack was just matched");
        };
        return Ok(node);
    }
    // A lone raw token never spans a production.
    Err(ParseError::IncompleteParse {
        snippet: snippet_text(tokens),
        stack: render_stack(&stack),
        remaining: stack.len(),
    })
}

/// Parse many snippets; each result stands alone, so one failing snippet
/// never affects the others. With the `parallel` feature the batch runs on
/// the rayon thread pool.
pub fn parse_batch<S: AsRef<str> + Sync>(
    grammar: &Grammar,
    snippets: &[Vec<S>],
) -> Vec<Result<SyntaxNode, ParseError>> {
    #[cfg(feature = "parallel")]
    {
        snippets
            .par_iter()
            .map(|tokens| parse(grammar, tokens))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        snippets
            .iter()
            .map(|tokens| parse(grammar, tokens))
            .collect()
    }
}

fn snippet_text<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_stack(stack: &[StackSym]) -> String {
    let mut out = String::from("[");
    for (i, sym) in stack.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match sym {
            StackSym::Token(text) => {
                out.push('\'');
                out.push_str(text);
                out.push('\'');
            }
            StackSym::Node(node) => out.push_str(node.name().unwrap_or("?")),
        }
    }
    out.push(']');
    out
}

// ---------------------------------------------------------------------------
// Shift

/// Whether `token` can be pushed on top of the current stack.
///
/// Some stack suffix (empty only when the whole stack is empty) must match
/// forward from a rule's entry nodes, and the token must then be reachable
/// from the frontier the match stops at.
fn shift_viable(grammar: &Grammar, stack: &[StackSym], token: &str) -> bool {
    if stack.is_empty() {
        let starts: Vec<NodeId> = grammar
            .rules()
            .flat_map(|rule| rule.entry().iter().copied())
            .collect();
        return lookahead_viable(grammar, starts, token);
    }
    for rule in grammar.rules() {
        for k in 1..=stack.len() {
            if let Some(next) = window_match(grammar, rule, &stack[stack.len() - k..]) {
                if !next.is_empty() && lookahead_viable(grammar, next, token) {
                    return true;
                }
            }
        }
    }
    false
}

/// Match a stack suffix forward from `rule`'s entry nodes.
///
/// Returns the candidate nodes that would consume the *next* stack element,
/// or `None` when the suffix does not match at all. Matching is exact: no
/// descent into referenced rules.
fn window_match(grammar: &Grammar, rule: &Production, suffix: &[StackSym]) -> Option<Vec<NodeId>> {
    let mut candidates: Vec<NodeId> = rule.entry().to_vec();
    for sym in suffix {
        let ends = match sym {
            StackSym::Node(node) => {
                let matched = node.rule().expect("stack subtrees carry a rule");
                candidates
                    .iter()
                    .copied()
                    .filter(|&n| grammar.node(n).sym == Symbol::Rule(matched))
                    .collect::<Vec<_>>()
            }
            StackSym::Token(text) => {
                let mut chars = text.chars();
                let first = chars.next()?;
                let mut cur: Vec<NodeId> = candidates
                    .iter()
                    .copied()
                    .filter(|&n| grammar.node(n).sym == Symbol::Char(first))
                    .collect();
                for c in chars {
                    let mut next = Vec::new();
                    for &n in &cur {
                        for &r in &grammar.node(n).right {
                            if grammar.node(r).sym == Symbol::Char(c) && !next.contains(&r) {
                                next.push(r);
                            }
                        }
                    }
                    cur = next;
                    if cur.is_empty() {
                        break;
                    }
                }
                cur
            }
        };
        if ends.is_empty() {
            return None;
        }
        let mut next = Vec::new();
        for &n in &ends {
            for &r in &grammar.node(n).right {
                if !next.contains(&r) {
                    next.push(r);
                }
            }
        }
        candidates = next;
    }
    Some(candidates)
}

/// A position in the pushdown lookahead: a candidate node plus the stack of
/// reference nodes to resume at when inner rules complete.
#[derive(Debug, Clone)]
struct Config {
    node: NodeId,
    rets: SmallVec<[NodeId; 4]>,
}

/// Whether `token` can be consumed starting from `starts`, descending
/// through rule references and popping back out at inner exits.
fn lookahead_viable(grammar: &Grammar, starts: Vec<NodeId>, token: &str) -> bool {
    let mut configs: Vec<Config> = starts
        .into_iter()
        .map(|node| Config {
            node,
            rets: SmallVec::new(),
        })
        .collect();
    configs = expand(grammar, configs);

    let mut chars = token.chars().peekable();
    while let Some(c) = chars.next() {
        let matched: Vec<Config> = configs
            .into_iter()
            .filter(|cfg| grammar.node(cfg.node).sym == Symbol::Char(c))
            .collect();
        if matched.is_empty() {
            return false;
        }
        if chars.peek().is_none() {
            return true;
        }
        let mut advanced = Vec::new();
        for cfg in &matched {
            push_successors(grammar, cfg.node, &cfg.rets, &mut advanced);
        }
        configs = expand(grammar, advanced);
    }
    false
}

/// Replace every rule-reference config with configs at the referenced rule's
/// entry nodes, pushing the reference as a return point. Terminates because
/// rules only reference earlier rules.
fn expand(grammar: &Grammar, configs: Vec<Config>) -> Vec<Config> {
    let mut out = Vec::new();
    let mut work = configs;
    while let Some(cfg) = work.pop() {
        match grammar.node(cfg.node).sym {
            Symbol::Char(_) => out.push(cfg),
            Symbol::Rule(rule) => {
                for &entry in grammar.rule(rule).entry() {
                    let mut rets = cfg.rets.clone();
                    rets.push(cfg.node);
                    work.push(Config { node: entry, rets });
                }
            }
        }
    }
    out
}

/// Successors of a consumed node: its right neighbours, plus - when it can
/// end its production - the right neighbours of each return point, popped
/// transitively.
fn push_successors(grammar: &Grammar, node: NodeId, rets: &[NodeId], out: &mut Vec<Config>) {
    let data = grammar.node(node);
    for &r in &data.right {
        out.push(Config {
            node: r,
            rets: SmallVec::from_slice(rets),
        });
    }
    if data.is_exit {
        if let Some((&ret, rest)) = rets.split_last() {
            push_successors(grammar, ret, rest, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Reduce

/// Apply the best available reduction, if any.
fn reduce_once(grammar: &Grammar, stack: &mut Vec<StackSym>) -> bool {
    let Some((rule, depth)) = find_reduction(grammar, stack) else {
        return false;
    };
    let children: Vec<SyntaxNode> = stack
        .drain(stack.len() - depth..)
        .map(|sym| match sym {
            StackSym::Token(text) => SyntaxNode::leaf(text),
            StackSym::Node(node) => node,
        })
        .collect();
    stack.push(StackSym::Node(SyntaxNode::Branch {
        rule,
        name: grammar.rule_name(rule).into(),
        children,
    }));
    true
}

/// The deepest reducible stack suffix across all rules. Ties between rules
/// at equal depth go to the lowest id, i.e. the rule declared first.
fn find_reduction(grammar: &Grammar, stack: &[StackSym]) -> Option<(RuleId, usize)> {
    let mut best: Option<(usize, RuleId)> = None;
    for rule in grammar.rules() {
        if let Some(depth) = deepest_completion(grammar, rule, stack) {
            if best.map_or(true, |(d, _)| depth > d) {
                best = Some((depth, rule.id()));
            }
        }
    }
    best.map(|(depth, rule)| (rule, depth))
}

/// Walk `rule`'s production backward from its exit nodes over the stack top.
/// Records a completion whenever a stack-element boundary lands on an entry
/// node; the deepest one wins.
fn deepest_completion(grammar: &Grammar, rule: &Production, stack: &[StackSym]) -> Option<usize> {
    let mut candidates: Vec<NodeId> = rule.exit().to_vec();
    let mut best = None;
    for depth in 1..=stack.len() {
        let starts = match_back(grammar, &candidates, &stack[stack.len() - depth]);
        if starts.is_empty() {
            break;
        }
        if starts.iter().any(|&n| grammar.node(n).is_entry) {
            best = Some(depth);
        }
        let mut next = Vec::new();
        for &n in &starts {
            for &l in &grammar.node(n).left {
                if !next.contains(&l) {
                    next.push(l);
                }
            }
        }
        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }
    best
}

/// Match one stack element backward against candidate end nodes, returning
/// the nodes where the element's match begins.
fn match_back(grammar: &Grammar, candidates: &[NodeId], sym: &StackSym) -> Vec<NodeId> {
    match sym {
        StackSym::Node(node) => {
            let matched = node.rule().expect("stack subtrees carry a rule");
            candidates
                .iter()
                .copied()
                .filter(|&n| grammar.node(n).sym == Symbol::Rule(matched))
                .collect()
        }
        StackSym::Token(text) => {
            let mut chars: Vec<char> = text.chars().collect();
            let Some(last) = chars.pop() else {
                return Vec::new();
            };
            let mut cur: Vec<NodeId> = candidates
                .iter()
                .copied()
                .filter(|&n| grammar.node(n).sym == Symbol::Char(last))
                .collect();
            for &c in chars.iter().rev() {
                let mut prev = Vec::new();
                for &n in &cur {
                    for &l in &grammar.node(n).left {
                        if grammar.node(l).sym == Symbol::Char(c) && !prev.contains(&l) {
                            prev.push(l);
                        }
                    }
                }
                cur = prev;
                if cur.is_empty() {
                    break;
                }
            }
            cur
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile;

    fn digits() -> Grammar {
        compile("digit : '0' | '1' ; number : digit , { digit } ;").unwrap()
    }

    #[test]
    fn single_digit_number() {
        let g = digits();
        let tree = parse(&g, &["1"]).unwrap();
        assert_eq!(tree.name(), Some("number"));
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].name(), Some("digit"));
    }

    #[test]
    fn repeated_digits_become_siblings() {
        let g = digits();
        let tree = parse(&g, &["1", "0", "1"]).unwrap();
        assert_eq!(tree.name(), Some("number"));
        assert_eq!(tree.children().len(), 3);
        for child in tree.children() {
            assert_eq!(child.name(), Some("digit"));
            assert_eq!(child.children().len(), 1);
        }
        assert_eq!(tree.leaves(), vec!["1", "0", "1"]);
    }

    #[test]
    fn string_literal_matches_one_token() {
        let g = compile("kw : \"ab\" ;").unwrap();
        let tree = parse(&g, &["ab"]).unwrap();
        assert_eq!(tree.name(), Some("kw"));
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].text(), Some("ab"));
    }

    #[test]
    fn over_long_token_is_rejected() {
        let g = compile("kw : \"ab\" ;").unwrap();
        assert!(matches!(
            parse(&g, &["abc"]).unwrap_err(),
            ParseError::Rejected { .. }
        ));
    }

    #[test]
    fn token_outside_the_alphabet_is_rejected() {
        let g = digits();
        let err = parse(&g, &["2"]).unwrap_err();
        let ParseError::Rejected { snippet, .. } = err else {
            panic!("expected rejection");
        };
        assert_eq!(snippet, "2");
    }

    #[test]
    fn longer_suffix_wins_over_shorter_rule() {
        // 'x' alone matches `x`, but the full input spans `xy`.
        let g = compile("x : 'x' ; xy : 'x' , 'y' ;").unwrap();
        let tree = parse(&g, &["x", "y"]).unwrap();
        assert_eq!(tree.name(), Some("xy"));
        assert_eq!(tree.leaves(), vec!["x", "y"]);
    }

    #[test]
    fn equal_depth_ties_go_to_the_first_declared_rule() {
        let g = compile("p : 'a' ; q : 'a' ;").unwrap();
        let tree = parse(&g, &["a"]).unwrap();
        assert_eq!(tree.name(), Some("p"));
    }

    #[test]
    fn partial_production_is_incomplete() {
        let g = compile("ab : 'a' , 'b' ;").unwrap();
        let err = parse(&g, &["a"]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::IncompleteParse { remaining: 1, .. }
        ));
    }

    #[test]
    fn leftover_subtrees_are_incomplete() {
        let g = compile("a : 'a' ; aab : a , a , 'b' ;").unwrap();
        let err = parse(&g, &["a", "a"]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::IncompleteParse { remaining: 2, .. }
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        let g = digits();
        assert_eq!(
            parse::<&str>(&g, &[]).unwrap_err(),
            ParseError::EmptyInput
        );
    }

    #[test]
    fn rejection_reports_the_stack() {
        let g = digits();
        let err = parse(&g, &["1", "x"]).unwrap_err();
        let ParseError::Rejected { stack, .. } = err else {
            panic!("expected rejection");
        };
        // The shifted digit reduces all the way to a number before the
        // parser gives up on 'x'.
        assert_eq!(stack, "[number]");
    }

    #[test]
    fn batch_results_are_independent() {
        let g = digits();
        let snippets = vec![
            vec!["1", "0"],
            vec!["x"],
            vec!["0", "0", "1"],
        ];
        let results = parse_batch(&g, &snippets);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(results[2].as_ref().unwrap().children().len(), 3);
    }
}
