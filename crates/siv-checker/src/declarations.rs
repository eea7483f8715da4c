//! Overload candidates and declaration-time validation
//!
//! A candidate is built once from a prototype and never changes. Validation
//! here is static: it depends only on the declaration (and the consts in
//! scope before it), never on a call site. A constraint that fails these
//! checks is a diagnostic against the declaration; it is a different thing
//! from a candidate being discarded at some call.

use crate::consteval::{self, Binding, Env};
use crate::error::CheckError;
use crate::subsume;
use siv_parser::ast::{BinaryOp, DenyPolicy, Expression, FunctionDecl, UnaryOp};
use siv_parser::Span;
use siv_types::Type;

/// A formal parameter of a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateParam {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Type,
}

/// An overload candidate: one function prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Function name
    pub name: String,
    /// Formal parameters in order
    pub params: Vec<CandidateParam>,
    /// Optional constraint over the formal parameters
    pub constraint: Option<Expression>,
    /// Optional deny policy
    pub deny: Option<DenyPolicy>,
    /// Declared return type
    pub return_type: Type,
    /// The prototype's source location
    pub span: Span,
}

impl Candidate {
    /// Build a candidate from a parsed prototype.
    pub fn from_decl(decl: &FunctionDecl) -> Self {
        Candidate {
            name: decl.name.name.clone(),
            params: decl
                .params
                .iter()
                .map(|p| CandidateParam {
                    name: p.name.name.clone(),
                    ty: p.ty,
                })
                .collect(),
            constraint: decl.constraint.clone(),
            deny: decl.deny.clone(),
            return_type: decl.return_type,
            span: decl.span,
        }
    }

    /// Index of the parameter called `name`, if any.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Human-readable signature for diagnostics:
    /// `pow(number, int) requires(iexp == 2)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        let mut text = format!("{}({})", self.name, params.join(", "));
        if let Some(constraint) = &self.constraint {
            text.push_str(&format!(" requires({})", subsume::render(constraint)));
        }
        text
    }

    /// Whether `other` declares the same signature: same parameter types and
    /// a structurally equal constraint. Spans are ignored.
    pub fn same_signature(&self, other: &Candidate) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
            && match (&self.constraint, &other.constraint) {
                (None, None) => true,
                (Some(a), Some(b)) => subsume::render(a) == subsume::render(b),
                _ => false,
            }
    }
}

/// Validate a prototype's constraint against the declaration itself.
///
/// `globals` holds the consts declared before this prototype. Appends one
/// error per problem; an empty delta means the candidate is well-formed.
pub fn validate(decl: &FunctionDecl, globals: &Env, errors: &mut Vec<CheckError>) {
    let Some(constraint) = &decl.constraint else {
        return;
    };

    let before = errors.len();

    constraint.for_each_call(&mut |call| {
        errors.push(CheckError::CallInConstraint { span: call.span() });
    });

    constraint.for_each_identifier(&mut |ident| {
        let is_param = decl.params.iter().any(|p| p.name.name == ident.name);
        let is_const = matches!(globals.lookup(&ident.name), Some(Binding::Const(_)));
        if !is_param && !is_const {
            errors.push(CheckError::UnknownConstraintIdentifier {
                name: ident.name.clone(),
                span: ident.span,
            });
        }
    });

    if errors.len() > before {
        return;
    }

    match constraint_type(constraint, decl, globals) {
        Ok(Type::Bool) => {}
        Ok(other) => {
            errors.push(CheckError::NonBooleanConstraint {
                found: other.to_string(),
                span: constraint.span(),
            });
            return;
        }
        Err(err) => {
            errors.push(err);
            return;
        }
    }

    // With every parameter dynamic, any failure is independent of argument
    // values and belongs to the declaration.
    let mut env = globals.clone();
    for param in &decl.params {
        env.bind_dynamic(param.name.name.clone());
    }
    if let Err(err) = consteval::fold(constraint, &env) {
        errors.push(CheckError::ConstEval {
            message: err.to_string(),
            span: err.span(),
        });
    }
}

/// Type of a constraint expression, with parameters at their declared types
/// and consts at the type of their value.
fn constraint_type(
    expr: &Expression,
    decl: &FunctionDecl,
    globals: &Env,
) -> Result<Type, CheckError> {
    match expr {
        Expression::IntLiteral { .. } => Ok(Type::Int),
        Expression::FloatLiteral { .. } => Ok(Type::Number),
        Expression::StringLiteral { .. } => Ok(Type::Str),
        Expression::BoolLiteral { .. } => Ok(Type::Bool),
        Expression::Identifier(ident) => {
            if let Some(param) = decl.params.iter().find(|p| p.name.name == ident.name) {
                return Ok(param.ty);
            }
            if let Some(Binding::Const(value)) = globals.lookup(&ident.name) {
                return Ok(value.ty());
            }
            Err(CheckError::UnknownConstraintIdentifier {
                name: ident.name.clone(),
                span: ident.span,
            })
        }
        Expression::Call { span, .. } => Err(CheckError::CallInConstraint { span: *span }),
        Expression::Unary { op, operand, span } => {
            let operand_ty = constraint_type(operand, decl, globals)?;
            unary_result(*op, operand_ty, *span)
        }
        Expression::Binary { op, lhs, rhs, span } => {
            let lhs_ty = constraint_type(lhs, decl, globals)?;
            let rhs_ty = constraint_type(rhs, decl, globals)?;
            binary_result(*op, lhs_ty, rhs_ty, *span)
        }
    }
}

fn is_numeric(ty: Type) -> bool {
    matches!(ty, Type::Int | Type::Number)
}

/// Result type of a unary operation, shared by constraint typing and the
/// call-site checker.
pub(crate) fn unary_result(op: UnaryOp, operand: Type, span: Span) -> Result<Type, CheckError> {
    match op {
        UnaryOp::Neg if is_numeric(operand) => Ok(operand),
        UnaryOp::Not if operand == Type::Bool => Ok(Type::Bool),
        _ => Err(CheckError::InvalidOperand {
            op: op.to_string(),
            operand: operand.to_string(),
            span,
        }),
    }
}

/// Result type of a binary operation, shared by constraint typing and the
/// call-site checker.
pub(crate) fn binary_result(
    op: BinaryOp,
    lhs: Type,
    rhs: Type,
    span: Span,
) -> Result<Type, CheckError> {
    let invalid = || {
        Err(CheckError::InvalidOperands {
            op: op.to_string(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
            span,
        })
    };

    if op.is_logical() {
        return if lhs == Type::Bool && rhs == Type::Bool {
            Ok(Type::Bool)
        } else {
            invalid()
        };
    }

    if op.is_comparison() {
        let comparable = if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            (is_numeric(lhs) && is_numeric(rhs)) || lhs == rhs
        } else {
            is_numeric(lhs) && is_numeric(rhs)
        };
        return if comparable { Ok(Type::Bool) } else { invalid() };
    }

    // Arithmetic
    if is_numeric(lhs) && is_numeric(rhs) {
        if lhs == Type::Int && rhs == Type::Int {
            Ok(Type::Int)
        } else {
            Ok(Type::Number)
        }
    } else {
        invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siv_parser::ast::Item;
    use siv_parser::Parser;
    use siv_types::Value;

    fn decl(source: &str) -> FunctionDecl {
        let module = Parser::new(source).unwrap().parse().expect("parse failed");
        match module.items.into_iter().next() {
            Some(Item::Function(decl)) => decl,
            other => panic!("expected a function item, got {:?}", other),
        }
    }

    fn validate_one(source: &str, globals: &Env) -> Vec<CheckError> {
        let mut errors = Vec::new();
        validate(&decl(source), globals, &mut errors);
        errors
    }

    #[test]
    fn unconstrained_prototype_is_valid() {
        let errors = validate_one("function pow(base: number, iexp: int): number;", &Env::new());
        assert!(errors.is_empty());
    }

    #[test]
    fn constraint_over_own_parameters_is_valid() {
        let errors = validate_one(
            "function pow(base: number, iexp: int) requires(iexp == 2): number;",
            &Env::new(),
        );
        assert!(errors.is_empty(), "got {:?}", errors);
    }

    #[test]
    fn constraint_may_reference_consts() {
        let mut globals = Env::new();
        globals.bind_const("limit", Value::Int(255));
        let errors = validate_one(
            "function f(c: int) requires(c > limit): bool;",
            &globals,
        );
        assert!(errors.is_empty(), "got {:?}", errors);
    }

    #[test]
    fn unknown_identifier_in_constraint() {
        let errors = validate_one("function f(x: int) requires(y == 1): int;", &Env::new());
        assert!(matches!(
            errors[0],
            CheckError::UnknownConstraintIdentifier { ref name, .. } if name == "y"
        ));
    }

    #[test]
    fn non_boolean_constraint() {
        let errors = validate_one("function f(x: int) requires(x + 1): int;", &Env::new());
        assert!(matches!(
            errors[0],
            CheckError::NonBooleanConstraint { ref found, .. } if found == "int"
        ));
    }

    #[test]
    fn call_in_constraint() {
        let errors = validate_one("function f(x: int) requires(g(x) == 1): int;", &Env::new());
        assert!(matches!(errors[0], CheckError::CallInConstraint { .. }));
    }

    #[test]
    fn value_independent_failure_is_a_declaration_error() {
        let errors = validate_one("function f(x: int) requires(1 / 0 == 1): int;", &Env::new());
        assert!(
            matches!(errors[0], CheckError::ConstEval { .. }),
            "got {:?}",
            errors
        );
    }

    #[test]
    fn mistyped_constraint_operands_are_reported() {
        let errors = validate_one(
            "function f(x: int, s: string) requires(x < s): int;",
            &Env::new(),
        );
        assert!(matches!(errors[0], CheckError::InvalidOperands { .. }));
    }

    #[test]
    fn signature_rendering_and_equality() {
        let a = Candidate::from_decl(&decl(
            "function pow(base: number, iexp: int) requires(iexp == 2): number;",
        ));
        let b = Candidate::from_decl(&decl(
            "function pow(b: number, e: int)   requires(e == 2) : number;",
        ));
        assert_eq!(a.signature(), "pow(number, int) requires((iexp == 2))");
        // Same parameter types but different constraint spelling: not the
        // same signature.
        assert!(!a.same_signature(&b));
        assert!(a.same_signature(&a.clone()));
    }
}
