//! Siv Type Layer
//!
//! Shared value and type definitions for the Siv front end.
//!
//! This crate provides:
//! - The `Value` type produced by constant-expression evaluation
//! - The `Type` lattice (int, number, bool, string) and widening rules
//! - The `Constness` tag every call-site argument carries

#![warn(missing_docs)]

pub mod ty;
pub mod value;

pub use ty::Type;
pub use value::{Constness, Value};
