//! Check errors
//!
//! Two families, matching where they are reported: declaration-time errors
//! (E1xxx, against a prototype or binding) and call-site errors (E2xxx).
//! Candidates pruned during resolution are deliberately absent here; pruning
//! is not an error.

use siv_parser::Span;
use thiserror::Error;

/// Errors produced by declaration validation and call resolution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckError {
    /// A constraint names something that is neither a parameter of its
    /// function nor a previously declared `const`
    #[error("Unknown identifier `{name}` in constraint")]
    UnknownConstraintIdentifier {
        /// The unknown name
        name: String,
        /// Where it is used
        span: Span,
    },

    /// A constraint whose type is not `bool`
    #[error("Constraint must be `bool`, this one is `{found}`")]
    NonBooleanConstraint {
        /// The constraint's actual type
        found: String,
        /// The constraint expression
        span: Span,
    },

    /// A call expression inside a constraint
    #[error("Calls are not allowed inside constraints")]
    CallInConstraint {
        /// The call expression
        span: Span,
    },

    /// A declaration that repeats an existing one
    #[error("`{name}` is already declared")]
    Redeclaration {
        /// The redeclared name
        name: String,
        /// The new declaration
        span: Span,
        /// The previous declaration
        previous: Span,
    },

    /// A `const` whose initializer is not a constant expression
    #[error("Initializer of `const {name}` is not a constant expression")]
    NonConstantInit {
        /// The binding name
        name: String,
        /// The initializer
        span: Span,
    },

    /// Constant evaluation failed independently of any argument values
    #[error("Constant evaluation failed: {message}")]
    ConstEval {
        /// What went wrong
        message: String,
        /// The failing subexpression
        span: Span,
    },

    /// An operator applied to operand types it is not defined for
    #[error("Operator `{op}` is not defined for `{lhs}` and `{rhs}`")]
    InvalidOperands {
        /// Operator text
        op: String,
        /// Left operand type
        lhs: String,
        /// Right operand type
        rhs: String,
        /// The operation
        span: Span,
    },

    /// A unary operator applied to an operand type it is not defined for
    #[error("Operator `{op}` is not defined for `{operand}`")]
    InvalidOperand {
        /// Operator text
        op: String,
        /// Operand type
        operand: String,
        /// The operation
        span: Span,
    },

    /// An expression names an undeclared binding
    #[error("Unknown identifier `{name}`")]
    UnknownIdentifier {
        /// The unknown name
        name: String,
        /// Where it is used
        span: Span,
    },

    /// A call to a function with no prototype
    #[error("Unknown function `{name}`")]
    UnknownFunction {
        /// The called name
        name: String,
        /// The call
        span: Span,
    },

    /// Every candidate was removed from the overload set
    #[error("No viable overload of `{name}` for this call")]
    NoViableOverload {
        /// The called name
        name: String,
        /// The call
        span: Span,
        /// Why each candidate was removed
        notes: Vec<String>,
    },

    /// More than one equally good candidate survived pruning and ordering
    #[error("Ambiguous call to `{name}`")]
    AmbiguousCall {
        /// The called name
        name: String,
        /// The call
        span: Span,
        /// The surviving candidate signatures
        candidates: Vec<String>,
    },

    /// Resolution selected a candidate marked `deny`
    #[error("Call selects a denied overload of `{name}`")]
    DeniedCandidate {
        /// The called name
        name: String,
        /// The call
        span: Span,
        /// The denied prototype
        decl_span: Span,
        /// The deny message, if the prototype carries one
        message: Option<String>,
    },

    /// A binding initializer whose type does not convert to the annotation
    #[error("Type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        /// The annotated type
        expected: String,
        /// The initializer's type
        actual: String,
        /// The initializer
        span: Span,
    },
}

impl CheckError {
    /// The primary source location of this error.
    pub fn span(&self) -> Span {
        match self {
            CheckError::UnknownConstraintIdentifier { span, .. }
            | CheckError::NonBooleanConstraint { span, .. }
            | CheckError::CallInConstraint { span }
            | CheckError::Redeclaration { span, .. }
            | CheckError::NonConstantInit { span, .. }
            | CheckError::ConstEval { span, .. }
            | CheckError::InvalidOperands { span, .. }
            | CheckError::InvalidOperand { span, .. }
            | CheckError::UnknownIdentifier { span, .. }
            | CheckError::UnknownFunction { span, .. }
            | CheckError::NoViableOverload { span, .. }
            | CheckError::AmbiguousCall { span, .. }
            | CheckError::DeniedCandidate { span, .. }
            | CheckError::TypeMismatch { span, .. } => *span,
        }
    }

    /// Whether this error is reported against a declaration rather than a
    /// call site.
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            CheckError::UnknownConstraintIdentifier { .. }
                | CheckError::NonBooleanConstraint { .. }
                | CheckError::CallInConstraint { .. }
                | CheckError::Redeclaration { .. }
                | CheckError::NonConstantInit { .. }
        )
    }
}
