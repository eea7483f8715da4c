//! AST for the Siv declaration language
//!
//! A module is a flat sequence of items: function prototypes, `const` and
//! `let` bindings, and expression statements (the call sites to resolve).

pub mod expression;
pub mod item;

pub use expression::{BinaryOp, Expression, Identifier, UnaryOp};
pub use item::{
    ConstDecl, DenyPolicy, ExpressionStatement, FunctionDecl, Item, LetDecl, Module, Param,
};
