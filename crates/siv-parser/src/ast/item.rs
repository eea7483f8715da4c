//! Top-level item AST nodes

use super::expression::{Expression, Identifier};
use crate::token::Span;
use siv_types::Type;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Top-level items in declaration order
    pub items: Vec<Item>,
    /// Source location of the whole module
    pub span: Span,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Function prototype
    Function(FunctionDecl),
    /// `const name = expr;`
    Const(ConstDecl),
    /// `let name: type;` or `let name = expr;`
    Let(LetDecl),
    /// Expression statement (a call site)
    Expression(ExpressionStatement),
}

impl Item {
    /// The source location of this item.
    pub fn span(&self) -> Span {
        match self {
            Item::Function(decl) => decl.span,
            Item::Const(decl) => decl.span,
            Item::Let(decl) => decl.span,
            Item::Expression(stmt) => stmt.span,
        }
    }
}

/// A formal parameter: `name: type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: Identifier,
    /// Declared type
    pub ty: Type,
    /// Source location
    pub span: Span,
}

/// A `deny` prefix on a prototype: selecting the candidate is an error.
///
/// Mirrors pairing a constrained overload with `= delete`; the optional
/// message is reported at the offending call site.
#[derive(Debug, Clone, PartialEq)]
pub struct DenyPolicy {
    /// Message shown when the candidate is selected
    pub message: Option<String>,
    /// Source location of the `deny` prefix
    pub span: Span,
}

/// Function prototype:
/// `[deny("msg")] function name(params) [requires(expr)]: type;`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name
    pub name: Identifier,
    /// Formal parameters in order
    pub params: Vec<Param>,
    /// Optional parameter constraint over the formal parameters
    pub constraint: Option<Expression>,
    /// Optional deny policy
    pub deny: Option<DenyPolicy>,
    /// Declared return type
    pub return_type: Type,
    /// Source location of the whole prototype
    pub span: Span,
}

/// `const name = expr;` — the initializer must fold to a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// Binding name
    pub name: Identifier,
    /// Initializer expression
    pub init: Expression,
    /// Source location
    pub span: Span,
}

/// `let name: type;` or `let name [: type] = expr;`
///
/// A `let` models a runtime variable: it is always dynamic to the constant
/// evaluator, even when its initializer would fold.
#[derive(Debug, Clone, PartialEq)]
pub struct LetDecl {
    /// Binding name
    pub name: Identifier,
    /// Declared type, if annotated
    pub ty: Option<Type>,
    /// Initializer, if present
    pub init: Option<Expression>,
    /// Source location
    pub span: Span,
}

/// An expression used as a statement; each call inside is a call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression
    pub expression: Expression,
    /// Source location
    pub span: Span,
}
