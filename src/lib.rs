//! # Shadevar
//!
//! A grammar-driven code generator for shader interface declarations.
//!
//! ## Overview
//!
//! Shadevar compiles an EBNF grammar description into an executable
//! production-rule graph, shift-reduce-parses short shader-interface
//! declarations (uniforms, vertex attributes) against that graph, and turns
//! the resulting syntax trees into a typed shader-variable model that renders
//! back out as struct declarations.
//!
//! The parsing engine is built from scratch: each grammar rule becomes a
//! directed graph of symbol nodes, and the parser matches stack suffixes by
//! live graph traversal (greedy longest-suffix reduction) instead of
//! precomputed transition tables. Grammars here are small and snippets are
//! short declarations, so per-step traversal is cheap and the implementation
//! stays simple.
//!
//! ## Quick Start
//!
//! ```rust
//! use shadevar::{compile, parse};
//!
//! // 1. Compile a grammar. Rules may only reference earlier rules.
//! let grammar = compile(
//!     "digit : '0' | '1' ;
//!      number : digit , { digit } ;",
//! )?;
//!
//! // 2. Parse a pre-tokenized snippet.
//! let tree = parse(&grammar, &["1", "0", "1"])?;
//!
//! // 3. Inspect the syntax tree.
//! let number = grammar.rule_named("number").expect("rule exists");
//! let digit = grammar.rule_named("digit").expect("rule exists");
//! assert_eq!(tree.rule(), Some(number));
//! assert_eq!(tree.find_by_rule(digit).len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Building and emitting shader types:
//!
//! ```rust
//! use shadevar::{ShaderType, TypeRegistry};
//!
//! let registry = TypeRegistry::builtin();
//! let vec3 = registry.scalar("vec3")?;
//! let positions = ShaderType::array(vec3, 4)?;
//! assert_eq!(positions.size(), 48);
//!
//! let lights = ShaderType::strukt("Lights", vec![("positions".into(), positions)])?;
//! assert!(lights.render().contains("glm::vec3 positions[4];"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Grammar compilation and production graphs
//! - [`parser`] - The shift-reduce parser
//! - [`syntax`] - Syntax tree types and queries
//! - [`shader`] - Type registry, shader type model, declaration reading
//! - [`error`] - Error types for every layer

pub mod error;
pub mod grammar;
pub mod parser;
pub mod shader;
pub mod syntax;

// Re-export commonly used types
pub use error::{GrammarError, ParseError, TypeError};
pub use grammar::{compile, Grammar, RuleId};
pub use parser::{parse, parse_batch};
pub use shader::{tokenize, ShaderType, TypeRegistry, Uniform, VarDeclaration, VertexAttribute};
pub use syntax::SyntaxNode;
