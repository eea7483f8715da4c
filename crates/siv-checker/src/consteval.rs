//! Constant-expression evaluator
//!
//! Folds an expression to `Const(value)` or `Dynamic` under an environment
//! of bindings. This is the single evaluator in the crate: `const`
//! initializers, constraint expressions, and call-site argument
//! classification all go through `fold`.
//!
//! `Dynamic` is not an error: it means some leaf of the expression is only
//! known at runtime. Evaluation failures (division by zero, integer
//! overflow) are a third outcome so that callers can distinguish "cannot
//! know" from "knowably wrong".

use rustc_hash::FxHashMap;
use siv_parser::ast::{BinaryOp, Expression, UnaryOp};
use siv_parser::Span;
use siv_types::{Constness, Type, Value};
use thiserror::Error;

/// A constant-evaluation failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// Integer division or remainder by zero
    #[error("division by zero")]
    DivisionByZero {
        /// The failing operation
        span: Span,
    },

    /// Integer arithmetic out of range
    #[error("integer overflow")]
    Overflow {
        /// The failing operation
        span: Span,
    },

    /// Operator applied to operand types it is not defined for
    #[error("operator `{op}` is not defined for `{lhs}` and `{rhs}`")]
    InvalidOperands {
        /// Operator text
        op: String,
        /// Left operand type
        lhs: Type,
        /// Right operand type
        rhs: Type,
        /// The failing operation
        span: Span,
    },

    /// Unary operator applied to an operand type it is not defined for
    #[error("operator `{op}` is not defined for `{operand}`")]
    InvalidOperand {
        /// Operator text
        op: String,
        /// Operand type
        operand: Type,
        /// The failing operation
        span: Span,
    },
}

impl EvalError {
    /// The source location of the failing operation.
    pub fn span(&self) -> Span {
        match self {
            EvalError::DivisionByZero { span }
            | EvalError::Overflow { span }
            | EvalError::InvalidOperands { span, .. }
            | EvalError::InvalidOperand { span, .. } => *span,
        }
    }
}

/// What a name is bound to during folding.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// The name has a known constant value
    Const(Value),
    /// The name exists but its value is only known at runtime
    Dynamic,
}

/// Name environment for folding.
///
/// Names not present fold as `Dynamic`; unknown-name diagnostics are the
/// responsibility of static validation, which runs first.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: FxHashMap<String, Binding>,
}

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a constant value.
    pub fn bind_const(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), Binding::Const(value));
    }

    /// Bind `name` as a runtime value.
    pub fn bind_dynamic(&mut self, name: impl Into<String>) {
        self.bindings.insert(name.into(), Binding::Dynamic);
    }

    /// Look up a binding.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

/// Fold `expr` under `env`.
pub fn fold(expr: &Expression, env: &Env) -> Result<Constness, EvalError> {
    match expr {
        Expression::IntLiteral { value, .. } => Ok(Constness::Const(Value::Int(*value))),
        Expression::FloatLiteral { value, .. } => Ok(Constness::Const(Value::Number(*value))),
        Expression::StringLiteral { value, .. } => {
            Ok(Constness::Const(Value::Str(value.clone())))
        }
        Expression::BoolLiteral { value, .. } => Ok(Constness::Const(Value::Bool(*value))),

        Expression::Identifier(ident) => match env.lookup(&ident.name) {
            Some(Binding::Const(value)) => Ok(Constness::Const(value.clone())),
            Some(Binding::Dynamic) | None => Ok(Constness::Dynamic),
        },

        // Function results are never constants in Siv.
        Expression::Call { .. } => Ok(Constness::Dynamic),

        Expression::Unary { op, operand, span } => {
            match fold(operand, env)? {
                Constness::Dynamic => Ok(Constness::Dynamic),
                Constness::Const(value) => fold_unary(*op, value, *span),
            }
        }

        Expression::Binary { op, lhs, rhs, span } => fold_binary(*op, lhs, rhs, *span, env),
    }
}

fn fold_unary(op: UnaryOp, value: Value, span: Span) -> Result<Constness, EvalError> {
    let folded = match (op, &value) {
        (UnaryOp::Neg, Value::Int(i)) => {
            Value::Int(i.checked_neg().ok_or(EvalError::Overflow { span })?)
        }
        (UnaryOp::Neg, Value::Number(n)) => Value::Number(-n),
        (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
        _ => {
            return Err(EvalError::InvalidOperand {
                op: op.to_string(),
                operand: value.ty(),
                span,
            })
        }
    };
    Ok(Constness::Const(folded))
}

fn fold_binary(
    op: BinaryOp,
    lhs: &Expression,
    rhs: &Expression,
    span: Span,
    env: &Env,
) -> Result<Constness, EvalError> {
    if op.is_logical() {
        return fold_logical(op, lhs, rhs, env);
    }

    let left = fold(lhs, env)?;
    let right = fold(rhs, env)?;
    let (left, right) = match (left, right) {
        (Constness::Const(l), Constness::Const(r)) => (l, r),
        _ => return Ok(Constness::Dynamic),
    };

    let invalid = |l: &Value, r: &Value| EvalError::InvalidOperands {
        op: op.to_string(),
        lhs: l.ty(),
        rhs: r.ty(),
        span,
    };

    let folded = if op.is_comparison() {
        match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Value::Bool(compare_ord(op, l.cmp(r))),
            (Value::Bool(l), Value::Bool(r)) if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
                Value::Bool(if op == BinaryOp::Eq { l == r } else { l != r })
            }
            (Value::Str(l), Value::Str(r)) if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
                Value::Bool(if op == BinaryOp::Eq { l == r } else { l != r })
            }
            _ => match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => Value::Bool(compare_f64(op, l, r)),
                _ => return Err(invalid(&left, &right)),
            },
        }
    } else {
        // Arithmetic
        match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Value::Int(int_arith(op, *l, *r, span)?),
            _ => match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => Value::Number(float_arith(op, l, r)),
                _ => return Err(invalid(&left, &right)),
            },
        }
    };

    Ok(Constness::Const(folded))
}

/// `&&` and `||` short-circuit over constants: a decisive constant operand
/// determines the result even when the other side is dynamic.
fn fold_logical(
    op: BinaryOp,
    lhs: &Expression,
    rhs: &Expression,
    env: &Env,
) -> Result<Constness, EvalError> {
    let bool_of = |side: Constness, expr: &Expression| -> Result<Option<bool>, EvalError> {
        match side {
            Constness::Dynamic => Ok(None),
            Constness::Const(Value::Bool(b)) => Ok(Some(b)),
            Constness::Const(other) => Err(EvalError::InvalidOperand {
                op: op.to_string(),
                operand: other.ty(),
                span: expr.span(),
            }),
        }
    };

    let left = bool_of(fold(lhs, env)?, lhs)?;
    match (op, left) {
        (BinaryOp::And, Some(false)) => return Ok(Constness::Const(Value::Bool(false))),
        (BinaryOp::Or, Some(true)) => return Ok(Constness::Const(Value::Bool(true))),
        _ => {}
    }

    let right = bool_of(fold(rhs, env)?, rhs)?;
    let folded = match (op, left, right) {
        (BinaryOp::And, _, Some(false)) => Some(false),
        (BinaryOp::Or, _, Some(true)) => Some(true),
        (_, Some(l), Some(r)) => Some(if op == BinaryOp::And { l && r } else { l || r }),
        _ => None,
    };

    Ok(match folded {
        Some(b) => Constness::Const(Value::Bool(b)),
        None => Constness::Dynamic,
    })
}

fn compare_ord(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Eq => ord.is_eq(),
        BinaryOp::Ne => ord.is_ne(),
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::Le => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        BinaryOp::Ge => ord.is_ge(),
        _ => unreachable!("not a comparison"),
    }
}

fn compare_f64(op: BinaryOp, l: f64, r: f64) -> bool {
    match op {
        BinaryOp::Eq => l == r,
        BinaryOp::Ne => l != r,
        BinaryOp::Lt => l < r,
        BinaryOp::Le => l <= r,
        BinaryOp::Gt => l > r,
        BinaryOp::Ge => l >= r,
        _ => unreachable!("not a comparison"),
    }
}

fn int_arith(op: BinaryOp, l: i64, r: i64, span: Span) -> Result<i64, EvalError> {
    let checked = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Div => {
            if r == 0 {
                return Err(EvalError::DivisionByZero { span });
            }
            l.checked_div(r)
        }
        BinaryOp::Rem => {
            if r == 0 {
                return Err(EvalError::DivisionByZero { span });
            }
            l.checked_rem(r)
        }
        _ => unreachable!("not arithmetic"),
    };
    checked.ok_or(EvalError::Overflow { span })
}

fn float_arith(op: BinaryOp, l: f64, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Rem => l % r,
        _ => unreachable!("not arithmetic"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siv_parser::Parser;

    fn expr(source: &str) -> Expression {
        let mut parser = Parser::new(source).expect("lex failed");
        parser.parse_expression().expect("parse failed")
    }

    fn fold_str(source: &str, env: &Env) -> Result<Constness, EvalError> {
        fold(&expr(source), env)
    }

    #[test]
    fn folds_arithmetic_and_comparisons() {
        let env = Env::new();
        assert_eq!(
            fold_str("1 + 2 * 3", &env),
            Ok(Constness::Const(Value::Int(7)))
        );
        assert_eq!(
            fold_str("7 % 3 == 1", &env),
            Ok(Constness::Const(Value::Bool(true)))
        );
        assert_eq!(
            fold_str("1 < 2 && 2 < 1", &env),
            Ok(Constness::Const(Value::Bool(false)))
        );
    }

    #[test]
    fn mixes_int_and_number() {
        let env = Env::new();
        assert_eq!(
            fold_str("1 + 0.5", &env),
            Ok(Constness::Const(Value::Number(1.5)))
        );
        assert_eq!(
            fold_str("2 == 2.0", &env),
            Ok(Constness::Const(Value::Bool(true)))
        );
    }

    #[test]
    fn unbound_names_are_dynamic() {
        let env = Env::new();
        assert_eq!(fold_str("n + 1", &env), Ok(Constness::Dynamic));
    }

    #[test]
    fn bound_names_fold() {
        let mut env = Env::new();
        env.bind_const("two", Value::Int(2));
        env.bind_dynamic("n");
        assert_eq!(
            fold_str("two * 3", &env),
            Ok(Constness::Const(Value::Int(6)))
        );
        assert_eq!(fold_str("two * n", &env), Ok(Constness::Dynamic));
    }

    #[test]
    fn calls_never_fold() {
        let mut env = Env::new();
        env.bind_const("x", Value::Int(1));
        assert_eq!(fold_str("f(x)", &env), Ok(Constness::Dynamic));
    }

    #[test]
    fn logical_short_circuit_beats_dynamic() {
        let mut env = Env::new();
        env.bind_dynamic("n");
        assert_eq!(
            fold_str("false && n == 1", &env),
            Ok(Constness::Const(Value::Bool(false)))
        );
        assert_eq!(
            fold_str("true || n == 1", &env),
            Ok(Constness::Const(Value::Bool(true)))
        );
        assert_eq!(fold_str("true && n == 1", &env), Ok(Constness::Dynamic));
        // A decisive constant on the right also decides.
        assert_eq!(
            fold_str("n == 1 && false", &env),
            Ok(Constness::Const(Value::Bool(false)))
        );
    }

    #[test]
    fn division_by_zero_is_an_error_not_dynamic() {
        let env = Env::new();
        assert!(matches!(
            fold_str("1 / 0", &env),
            Err(EvalError::DivisionByZero { .. })
        ));
        assert!(matches!(
            fold_str("1 % 0", &env),
            Err(EvalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let env = Env::new();
        assert!(matches!(
            fold_str("9223372036854775807 + 1", &env),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn mismatched_operands_are_an_error() {
        let env = Env::new();
        assert!(matches!(
            fold_str("1 + true", &env),
            Err(EvalError::InvalidOperands { .. })
        ));
        assert!(matches!(
            fold_str("!3", &env),
            Err(EvalError::InvalidOperand { .. })
        ));
        assert!(matches!(
            fold_str("\"a\" < \"b\"", &env),
            Err(EvalError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn string_equality_folds() {
        let env = Env::new();
        assert_eq!(
            fold_str("\"a\" == \"a\"", &env),
            Ok(Constness::Const(Value::Bool(true)))
        );
        assert_eq!(
            fold_str("\"a\" != \"b\"", &env),
            Ok(Constness::Const(Value::Bool(true)))
        );
    }
}
