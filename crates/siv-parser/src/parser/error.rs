//! Parse error types

use crate::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken {
        /// What the parser would have accepted
        expected: String,
        /// What it found instead
        found: Token,
    },

    /// Unexpected end of file
    UnexpectedEof {
        /// What the parser would have accepted
        expected: String,
    },

    /// Invalid syntax
    InvalidSyntax {
        /// Why the construct is invalid
        reason: String,
    },

    /// Unknown type name in an annotation
    UnknownType {
        /// The name that is not a type
        name: String,
    },
}

impl ParseError {
    /// Build the error for an unexpected token.
    pub fn unexpected(expected: impl Into<String>, found: Token, span: Span) -> Self {
        let expected = expected.into();
        let message = if matches!(found, Token::Eof) {
            format!("Expected {}, found end of input", expected)
        } else {
            format!("Expected {}, found `{}`", expected, found)
        };
        let kind = if matches!(found, Token::Eof) {
            ParseErrorKind::UnexpectedEof { expected }
        } else {
            ParseErrorKind::UnexpectedToken { expected, found }
        };
        ParseError { kind, span, message }
    }

    /// Build the error for invalid syntax with a reason.
    pub fn invalid(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        ParseError {
            message: reason.clone(),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
        }
    }

    /// Build the error for an unknown type name.
    pub fn unknown_type(name: impl Into<String>, span: Span) -> Self {
        let name = name.into();
        ParseError {
            message: format!("Unknown type `{}`", name),
            kind: ParseErrorKind::UnknownType { name },
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.span.line, self.span.column
        )
    }
}

impl std::error::Error for ParseError {}
