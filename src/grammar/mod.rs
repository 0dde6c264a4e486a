//! # Grammar Module
//!
//! Grammar compilation and production graphs.
//!
//! ## Overview
//!
//! A grammar is written as repeated definitions of the form
//!
//! ```text
//! name : rule-tokens ;
//! ```
//!
//! where the rule tokens are whitespace-separated and a definition may span
//! multiple lines; it ends at the first `;` token. Inside a rule:
//!
//! - `'x'` is a single-character terminal and `"xyz"` a literal string
//!   terminal (compiled to one node per character), both matched verbatim;
//! - an unquoted lowercase name references an **earlier** rule (forward
//!   references are a compile error);
//! - `( )` groups, `{ }` repeats zero or more times, `[ ]` is optional,
//!   `|` separates alternatives, and `,` separates concatenated items;
//! - reserved uppercase keywords (`COMMA`, `SEMICOLON`, `LEFT_PAREN`,
//!   `RIGHT_PAREN`, `LEFT_BRACKET`, `RIGHT_BRACKET`, `LEFT_BRACE`,
//!   `RIGHT_BRACE`) stand for the corresponding punctuation terminal, and any
//!   other uppercase token is lowercased and treated as a rule reference.
//!
//! [`compile`] turns this text into a [`Grammar`]: one production graph per
//! rule, where every valid ordering of symbols is a path from an entry node
//! to an exit node. Repetition introduces back-edges, so the graphs are
//! cyclic; all nodes live in a single arena indexed by [`NodeId`] and
//! adjacency is stored as index lists.
//!
//! A rule that could match the empty sequence (for example one defined only
//! as `[ 'a' ]`) is rejected at compile time.
//!
//! ## Usage
//!
//! ```rust
//! use shadevar::grammar::compile;
//!
//! let grammar = compile("digit : '0' | '1' ; number : digit , { digit } ;")?;
//! assert_eq!(grammar.len(), 2);
//! assert!(grammar.rule_named("number").is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compile;
mod graph;

pub use compile::compile;
pub use graph::{Grammar, NodeId, Production, RuleId, Symbol};
