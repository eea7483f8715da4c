//! Siv Constraint Checker
//!
//! Parameter-constrained overload resolution for Siv.
//!
//! This crate provides:
//! - Declaration validation for `requires(...)` constraints
//! - The constant-expression evaluator (`consteval`)
//! - The constraint evaluator producing per-call viability verdicts
//! - Overload resolution with constraint pruning and subsumption ordering
//! - Diagnostics with source context
//!
//! # Usage
//!
//! ```
//! use siv_checker::analyze;
//!
//! let source = r#"
//!     function pow(base: number, iexp: int): number;
//!     function pow(base: number, iexp: int) requires(iexp == 2): number;
//!     pow(1.0, 2);
//! "#;
//!
//! let analysis = analyze(source).expect("syntax error");
//! assert!(analysis.result.is_ok());
//! assert_eq!(
//!     analysis.result.resolutions[0].selected.as_deref(),
//!     Some("pow(number, int) requires((iexp == 2))")
//! );
//! ```

#![warn(missing_docs)]

pub mod constraint;
pub mod consteval;
pub mod declarations;
pub mod diagnostic;
pub mod error;
pub mod resolve;
pub mod subsume;

pub use constraint::{evaluate, Outcome, Verdict};
pub use declarations::Candidate;
pub use diagnostic::Diagnostic;
pub use error::CheckError;
pub use resolve::{CheckResult, Checker, Resolution};

use siv_parser::ast::Module;
use siv_parser::{LexError, ParseError, Parser};

/// A syntax-level failure: the module never reached checking.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrors {
    /// Lexing failed
    Lex(Vec<LexError>),
    /// Parsing failed
    Parse(Vec<ParseError>),
}

/// A checked module: the AST plus everything resolution produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The parsed module
    pub module: Module,
    /// Resolutions and errors
    pub result: CheckResult,
}

/// Parse and check a source file.
pub fn analyze(source: &str) -> Result<Analysis, SyntaxErrors> {
    let parser = Parser::new(source).map_err(SyntaxErrors::Lex)?;
    let module = parser.parse().map_err(SyntaxErrors::Parse)?;
    let result = resolve::check_module(&module);
    Ok(Analysis { module, result })
}
