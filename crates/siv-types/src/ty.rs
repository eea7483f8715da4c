//! Core type definitions for the Siv type lattice

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive types in Siv
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The `int` type (64-bit signed integer)
    Int,
    /// The `number` type (IEEE 754 double precision)
    Number,
    /// The `bool` type
    Bool,
    /// The `string` type
    Str,
}

impl Type {
    /// Parse a type name as it appears in source annotations.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "number" => Some(Type::Number),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::Str),
            _ => None,
        }
    }

    /// Whether a value of `self` is accepted by a parameter of `param`.
    ///
    /// Exact matches always convert; the only non-trivial conversion is the
    /// int → number widening.
    pub fn converts_to(self, param: Type) -> bool {
        self == param || (self == Type::Int && param == Type::Number)
    }

    /// Whether converting `self` to `param` is a widening (non-exact) step.
    pub fn widens_to(self, param: Type) -> bool {
        self != param && self.converts_to(param)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Number => write!(f, "number"),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_number_only() {
        assert!(Type::Int.converts_to(Type::Number));
        assert!(Type::Int.widens_to(Type::Number));
        assert!(!Type::Number.converts_to(Type::Int));
        assert!(!Type::Int.widens_to(Type::Int));
        assert!(!Type::Bool.converts_to(Type::Number));
        assert!(!Type::Str.converts_to(Type::Bool));
    }

    #[test]
    fn type_names_round_trip() {
        for ty in [Type::Int, Type::Number, Type::Bool, Type::Str] {
            assert_eq!(Type::from_name(&ty.to_string()), Some(ty));
        }
        assert_eq!(Type::from_name("void"), None);
    }
}
