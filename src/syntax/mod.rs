//! # Syntax Trees
//!
//! Parse results and queries over them.
//!
//! ## Overview
//!
//! A successful parse yields one [`SyntaxNode`] tree. Leaves hold the raw
//! token text; branches record which rule produced them and own their
//! children in match order, so the in-order leaves of any subtree spell the
//! exact input slice it covers.
//!
//! Trees are plain owned values. Queries ([`SyntaxNode::find_leaf`],
//! [`SyntaxNode::find_by_rule`], [`SyntaxNode::leaves`]) borrow from the tree
//! and never mutate it.

use compact_str::CompactString;
use std::collections::VecDeque;
use std::fmt;

use crate::grammar::RuleId;

/// One node of a parse result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxNode {
    /// A matched input token, stored verbatim.
    Leaf { text: CompactString },
    /// A completed rule match. Children appear in the order they were
    /// matched.
    Branch {
        rule: RuleId,
        name: CompactString,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    /// Build a leaf from token text.
    #[must_use]
    pub fn leaf(text: impl Into<CompactString>) -> Self {
        Self::Leaf { text: text.into() }
    }

    /// The rule that produced this node, or `None` for a leaf.
    #[must_use]
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            Self::Leaf { .. } => None,
            Self::Branch { rule, .. } => Some(*rule),
        }
    }

    /// The producing rule's name, or `None` for a leaf.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Leaf { .. } => None,
            Self::Branch { name, .. } => Some(name),
        }
    }

    /// The token text of a leaf, or `None` for a branch.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Leaf { text } => Some(text),
            Self::Branch { .. } => None,
        }
    }

    /// Child nodes in match order; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Branch { children, .. } => children,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// The first leaf (in depth-first order, this node included) whose text
    /// equals `text`.
    #[must_use]
    pub fn find_leaf(&self, text: &str) -> Option<&SyntaxNode> {
        if self.text() == Some(text) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_leaf(text))
    }

    /// All nodes produced by `rule`, this node included, in breadth-first
    /// order. Nodes nested inside a match of the same rule are found too.
    #[must_use]
    pub fn find_by_rule(&self, rule: RuleId) -> Vec<&SyntaxNode> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            if node.rule() == Some(rule) {
                found.push(node);
            }
            queue.extend(node.children());
        }
        found
    }

    /// The leaf texts of this subtree, in input order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Leaf { text } => out.push(text),
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        match self {
            Self::Leaf { text } => writeln!(f, "'{text}'"),
            Self::Branch { name, children, .. } => {
                writeln!(f, "{name}")?;
                for child in children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SyntaxNode, RuleId, RuleId) {
        let digit = RuleId::new(0);
        let number = RuleId::new(1);
        let tree = SyntaxNode::Branch {
            rule: number,
            name: "number".into(),
            children: vec![
                SyntaxNode::Branch {
                    rule: digit,
                    name: "digit".into(),
                    children: vec![SyntaxNode::leaf("1")],
                },
                SyntaxNode::Branch {
                    rule: digit,
                    name: "digit".into(),
                    children: vec![SyntaxNode::leaf("0")],
                },
            ],
        };
        (tree, digit, number)
    }

    #[test]
    fn accessors_distinguish_leaf_and_branch() {
        let (tree, _, number) = sample();
        assert_eq!(tree.rule(), Some(number));
        assert_eq!(tree.name(), Some("number"));
        assert_eq!(tree.text(), None);
        assert_eq!(tree.children().len(), 2);

        let leaf = SyntaxNode::leaf("0");
        assert!(leaf.is_leaf());
        assert_eq!(leaf.text(), Some("0"));
        assert_eq!(leaf.rule(), None);
        assert!(leaf.children().is_empty());
    }

    #[test]
    fn find_leaf_walks_depth_first() {
        let (tree, _, _) = sample();
        assert!(tree.find_leaf("0").is_some());
        assert!(tree.find_leaf("7").is_none());
    }

    #[test]
    fn find_by_rule_includes_self_and_nested_matches() {
        let (tree, digit, number) = sample();
        assert_eq!(tree.find_by_rule(digit).len(), 2);
        let roots = tree.find_by_rule(number);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name(), Some("number"));
    }

    #[test]
    fn leaves_come_back_in_input_order() {
        let (tree, _, _) = sample();
        assert_eq!(tree.leaves(), vec!["1", "0"]);
    }

    #[test]
    fn display_indents_by_depth() {
        let (tree, _, _) = sample();
        let text = tree.to_string();
        assert!(text.starts_with("number\n"));
        assert!(text.contains("  digit\n"));
        assert!(text.contains("    '1'\n"));
    }
}
