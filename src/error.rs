//! # Error Types
//!
//! Error types for grammar compilation, parsing, and the shader type model.
//!
//! ## Overview
//!
//! Each layer has its own error enum:
//!
//! - [`GrammarError`]: author errors in the grammar definition text. These are
//!   fatal; compilation of the whole grammar aborts.
//! - [`ParseError`]: a snippet that cannot be parsed. Recoverable at the
//!   granularity of "skip this declaration" - one snippet's failure never
//!   aborts a batch.
//! - [`TypeError`]: validation failures while building the shader type model
//!   from extracted declarations. Also recoverable per declaration.
//!
//! Every error carries enough context (rule/type/member name, snippet text,
//! stack state) to diagnose without re-running with extra instrumentation.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors additionally derive
//! [`miette::Diagnostic`] for rich report rendering.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors raised while compiling grammar definition text.
///
/// All variants name the offending rule; grammar text is a build-time
/// artifact, so these abort compilation instead of being recovered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("rule '{rule}' is not terminated by ';'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unterminated_rule)))]
    UnterminatedRule { rule: String },

    #[error("unbalanced grouping in rule '{rule}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unbalanced_group)))]
    UnbalancedGroup { rule: String },

    #[error("empty group or alternative in rule '{rule}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_group)))]
    EmptyGroup { rule: String },

    #[error("rule '{rule}' references undeclared rule '{reference}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undeclared_reference)))]
    UndeclaredReference { rule: String, reference: String },

    #[error("rule '{rule}' is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule { rule: String },

    #[error("rule '{rule}' can match the empty sequence")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_match)))]
    EmptyMatch { rule: String },

    #[error("malformed literal {literal} in rule '{rule}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::bad_literal)))]
    BadLiteral { rule: String, literal: String },

    #[error("expected a 'name : tokens ;' definition, found '{found}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::malformed_definition)))]
    MalformedDefinition { found: String },

    #[error("production graph for rule '{rule}' has unreachable nodes")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::malformed_production)))]
    MalformedProduction { rule: String },
}

/// Errors raised while parsing a single snippet.
///
/// A parse failure is scoped to its snippet: callers batching many snippets
/// report the failure and move on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// Neither a shift nor a reduction applies. The snippet text and the
    /// parse stack at the point of failure are carried for diagnosis.
    #[error("snippet cannot be parsed: no shift or reduction applies\n  snippet: {snippet}\n  stack:   {stack}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::rejected)))]
    Rejected { snippet: String, stack: String },

    /// Input was consumed but the stack did not collapse to a single tree.
    #[error("snippet did not reduce to a single tree ({remaining} elements left)\n  snippet: {snippet}\n  stack:   {stack}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::incomplete)))]
    IncompleteParse {
        snippet: String,
        stack: String,
        remaining: usize,
    },

    #[error("empty token sequence")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::empty_input)))]
    EmptyInput,
}

impl ParseError {
    /// The snippet this error refers to, when one is available.
    #[must_use]
    pub fn snippet(&self) -> Option<&str> {
        match self {
            Self::Rejected { snippet, .. } | Self::IncompleteParse { snippet, .. } => {
                Some(snippet)
            }
            Self::EmptyInput => None,
        }
    }
}

/// Validation errors from the shader type model and declaration reader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum TypeError {
    #[error("unknown shader type '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::unknown_type)))]
    UnknownType { name: String },

    #[error("array length must be positive for '{context}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::non_positive_array_length)))]
    NonPositiveArrayLength { context: String },

    #[error("array for '{context}' has no elements")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::empty_array)))]
    EmptyArray { context: String },

    #[error("array elements for '{context}' are not all the same type")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::heterogeneous_array)))]
    HeterogeneousArray { context: String },

    #[error("total size of '{context}' overflows the size range")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::oversized_type)))]
    OversizedType { context: String },

    #[error("duplicate member '{member}' in struct '{strukt}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::duplicate_member)))]
    DuplicateMember { strukt: String, member: String },

    #[error("declaration is missing a type name: {snippet}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::missing_type)))]
    MissingType { snippet: String },

    #[error("declaration is missing a variable name: {snippet}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::missing_name)))]
    MissingName { snippet: String },

    #[error("malformed declaration ({detail}): {snippet}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(types::malformed_declaration)))]
    MalformedDeclaration { detail: String, snippet: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_error_names_the_rule() {
        let err = GrammarError::EmptyMatch {
            rule: "maybe".to_string(),
        };
        assert!(format!("{err}").contains("maybe"));
    }

    #[test]
    fn parse_error_carries_snippet_and_stack() {
        let err = ParseError::Rejected {
            snippet: "uniform vec3".to_string(),
            stack: "['uniform' 'vec3']".to_string(),
        };
        let text = format!("{err}");
        assert!(text.contains("uniform vec3"));
        assert!(text.contains("['uniform' 'vec3']"));
        assert_eq!(err.snippet(), Some("uniform vec3"));
    }

    #[test]
    fn empty_input_has_no_snippet() {
        assert_eq!(ParseError::EmptyInput.snippet(), None);
    }

    #[test]
    fn type_error_names_the_member() {
        let err = TypeError::DuplicateMember {
            strukt: "Lights".to_string(),
            member: "color".to_string(),
        };
        let text = format!("{err}");
        assert!(text.contains("Lights"));
        assert!(text.contains("color"));
    }
}
