//! Siv Language Parser
//!
//! Lexer and parser for the Siv declaration language: function prototypes
//! with optional `requires(...)` parameter constraints, `const`/`let`
//! bindings, and call-expression statements.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};
