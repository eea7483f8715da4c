//! Expression AST nodes

use crate::token::Span;
use std::fmt;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal: 42
    IntLiteral {
        /// The value
        value: i64,
        /// Source location
        span: Span,
    },

    /// Float literal: 3.14
    FloatLiteral {
        /// The value
        value: f64,
        /// Source location
        span: Span,
    },

    /// String literal: "hello"
    StringLiteral {
        /// The unescaped value
        value: String,
        /// Source location
        span: Span,
    },

    /// Boolean literal: true, false
    BoolLiteral {
        /// The value
        value: bool,
        /// Source location
        span: Span,
    },

    /// Identifier
    Identifier(Identifier),

    /// Unary operation: -x, !x
    Unary {
        /// The operator
        op: UnaryOp,
        /// The operand
        operand: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Binary operation: a + b, a == b, a && b
    Binary {
        /// The operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expression>,
        /// Right operand
        rhs: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Call: f(a, b)
    Call {
        /// The called function name
        callee: Identifier,
        /// Argument expressions
        args: Vec<Expression>,
        /// Source location
        span: Span,
    },
}

impl Expression {
    /// The source location of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::IntLiteral { span, .. } => *span,
            Expression::FloatLiteral { span, .. } => *span,
            Expression::StringLiteral { span, .. } => *span,
            Expression::BoolLiteral { span, .. } => *span,
            Expression::Identifier(ident) => ident.span,
            Expression::Unary { span, .. } => *span,
            Expression::Binary { span, .. } => *span,
            Expression::Call { span, .. } => *span,
        }
    }

    /// Check if this expression is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::IntLiteral { .. }
                | Expression::FloatLiteral { .. }
                | Expression::StringLiteral { .. }
                | Expression::BoolLiteral { .. }
        )
    }

    /// Visit every identifier in this expression, left to right.
    pub fn for_each_identifier<'a>(&'a self, f: &mut impl FnMut(&'a Identifier)) {
        match self {
            Expression::Identifier(ident) => f(ident),
            Expression::Unary { operand, .. } => operand.for_each_identifier(f),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.for_each_identifier(f);
                rhs.for_each_identifier(f);
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.for_each_identifier(f);
                }
            }
            _ => {}
        }
    }

    /// Visit every call in this expression, left to right.
    pub fn for_each_call<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        match self {
            Expression::Unary { operand, .. } => operand.for_each_call(f),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.for_each_call(f);
                rhs.for_each_call(f);
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.for_each_call(f);
                }
                f(self);
            }
            _ => {}
        }
    }
}

/// A name with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name text
    pub name: String,
    /// Source location
    pub span: Span,
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation: -x
    Neg,
    /// Logical not: !x
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Whether this operator produces a boolean from comparable operands.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Whether this operator is `&&` or `||`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", text)
    }
}
