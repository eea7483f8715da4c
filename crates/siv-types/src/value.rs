//! Constant values and the per-argument constness tag

use crate::ty::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value produced by constant-expression evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// IEEE 754 double
    Number(f64),
    /// Boolean
    Bool(bool),
    /// String
    Str(String),
}

impl Value {
    /// The type of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Number(_) => Type::Number,
            Value::Bool(_) => Type::Bool,
            Value::Str(_) => Type::Str,
        }
    }

    /// Numeric view for mixed int/number arithmetic, if numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean view, if boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Whether an expression's value is known at compile time.
///
/// Every call-site argument carries this tag explicitly; nothing relies on
/// implicit host-language constant detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constness {
    /// The value is a compile-time constant.
    Const(Value),
    /// The value is only known at runtime.
    Dynamic,
}

impl Constness {
    /// Whether this is a compile-time constant.
    pub fn is_const(&self) -> bool {
        matches!(self, Constness::Const(_))
    }

    /// The constant value, if known.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Constness::Const(v) => Some(v),
            Constness::Dynamic => None,
        }
    }
}

impl fmt::Display for Constness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constness::Const(v) => write!(f, "constant {}", v),
            Constness::Dynamic => write!(f, "runtime value"),
        }
    }
}
