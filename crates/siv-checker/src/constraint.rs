//! The constraint evaluator
//!
//! Decides, for one candidate and one call site, whether the candidate's
//! `requires(...)` clause keeps it in the overload set. The verdict is
//! recomputed for every call site; constness of an argument is a property of
//! the call, not of the candidate.
//!
//! The rule:
//! - no constraint: the candidate is viable;
//! - any parameter referenced by the constraint bound to a runtime argument:
//!   the candidate is discarded before evaluation is attempted;
//! - otherwise the referenced parameters are bound to their constant values
//!   and the clause goes through the ordinary constant evaluator; true keeps
//!   the candidate, false discards it.
//!
//! Discarding is not an error. A clause that fails to evaluate under the
//! bound values (overflow, division by zero) also discards the candidate;
//! failures independent of the arguments were already rejected at the
//! declaration.

use crate::consteval::{self, Env, EvalError};
use crate::declarations::Candidate;
use rustc_hash::FxHashSet;
use serde::Serialize;
use siv_types::{Constness, Value};

/// Whether a candidate stays in the overload set for one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The candidate remains in the overload set
    Viable,
    /// The candidate is pruned from the overload set
    Discarded,
}

/// The detailed outcome of checking one candidate's constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No constraint, or the constraint held
    Satisfied,
    /// A referenced parameter is bound to a runtime argument
    DynamicArgument {
        /// Index of the parameter
        index: usize,
    },
    /// The constraint evaluated to false
    False,
    /// The constraint failed to evaluate under the bound values
    EvalFailed(EvalError),
}

impl Outcome {
    /// Collapse to the verdict the overload-resolution engine consumes.
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Satisfied => Verdict::Viable,
            _ => Verdict::Discarded,
        }
    }
}

/// Indices of the formal parameters referenced by the candidate's
/// constraint. Empty when there is no constraint.
pub fn referenced_params(candidate: &Candidate) -> FxHashSet<usize> {
    let mut referenced = FxHashSet::default();
    if let Some(constraint) = &candidate.constraint {
        constraint.for_each_identifier(&mut |ident| {
            if let Some(index) = candidate.param_index(&ident.name) {
                referenced.insert(index);
            }
        });
    }
    referenced
}

/// Evaluate one candidate against one call site.
///
/// `args` carries the constness of each argument, in parameter order;
/// `globals` the consts in scope. Arity is the caller's concern and must
/// already match.
pub fn evaluate(candidate: &Candidate, args: &[Constness], globals: &Env) -> Verdict {
    check(candidate, args, globals).verdict()
}

/// As [`evaluate`], keeping the reason a candidate was discarded.
pub fn check(candidate: &Candidate, args: &[Constness], globals: &Env) -> Outcome {
    debug_assert_eq!(args.len(), candidate.params.len());

    let Some(constraint) = &candidate.constraint else {
        return Outcome::Satisfied;
    };

    let referenced = referenced_params(candidate);

    // Short-circuit: a single runtime argument among the referenced
    // parameters settles it, no evaluation attempted.
    let mut indices: Vec<usize> = referenced.iter().copied().collect();
    indices.sort_unstable();
    for &index in &indices {
        if !args[index].is_const() {
            return Outcome::DynamicArgument { index };
        }
    }

    let mut env = globals.clone();
    for &index in &indices {
        let value = args[index]
            .value()
            .cloned()
            .unwrap_or_else(|| unreachable!("checked const above"));
        env.bind_const(candidate.params[index].name.clone(), value);
    }

    match consteval::fold(constraint, &env) {
        Ok(Constness::Const(Value::Bool(true))) => Outcome::Satisfied,
        Ok(Constness::Const(Value::Bool(_))) => Outcome::False,
        // Unreachable after declaration validation (the constraint types as
        // bool and every referenced name is bound to a constant), but a
        // wrong answer here must still prune rather than select.
        Ok(_) => Outcome::False,
        Err(err) => Outcome::EvalFailed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siv_parser::ast::Item;
    use siv_parser::Parser;
    use siv_types::Constness;

    fn candidate(source: &str) -> Candidate {
        let module = Parser::new(source).unwrap().parse().expect("parse failed");
        match module.items.into_iter().next() {
            Some(Item::Function(decl)) => Candidate::from_decl(&decl),
            other => panic!("expected a function item, got {:?}", other),
        }
    }

    fn constant(v: i64) -> Constness {
        Constness::Const(Value::Int(v))
    }

    #[test]
    fn unconstrained_is_always_viable() {
        let c = candidate("function pow(base: number, iexp: int): number;");
        let cases: &[&[Constness]] = &[
            &[constant(1), constant(2)],
            &[Constness::Dynamic, Constness::Dynamic],
            &[constant(1), Constness::Dynamic],
        ];
        for args in cases {
            assert_eq!(evaluate(&c, args, &Env::new()), Verdict::Viable);
        }
    }

    #[test]
    fn dynamic_referenced_argument_discards_without_evaluation() {
        // The constraint would divide by zero if evaluated with iexp bound;
        // the dynamic argument must short-circuit first.
        let c = candidate(
            "function f(base: number, iexp: int) requires(iexp / iexp == 1): number;",
        );
        let args = [Constness::Dynamic, Constness::Dynamic];
        assert_eq!(
            check(&c, &args, &Env::new()),
            Outcome::DynamicArgument { index: 1 }
        );
    }

    #[test]
    fn only_referenced_parameters_matter() {
        let c = candidate("function pow(base: number, iexp: int) requires(iexp == 2): number;");
        // base is dynamic but unreferenced: still viable.
        let args = [Constness::Dynamic, constant(2)];
        assert_eq!(evaluate(&c, &args, &Env::new()), Verdict::Viable);
    }

    #[test]
    fn constant_binding_decides_by_value() {
        let c = candidate("function pow(base: number, iexp: int) requires(iexp == 2): number;");
        assert_eq!(
            evaluate(&c, &[Constness::Dynamic, constant(2)], &Env::new()),
            Verdict::Viable
        );
        assert_eq!(
            evaluate(&c, &[Constness::Dynamic, constant(3)], &Env::new()),
            Verdict::Discarded
        );
    }

    #[test]
    fn constraint_may_use_consts_in_scope() {
        let mut globals = Env::new();
        globals.bind_const("limit", Value::Int(255));
        let c = candidate("function f(c: int) requires(c > limit): bool;");
        assert_eq!(evaluate(&c, &[constant(300)], &globals), Verdict::Viable);
        assert_eq!(evaluate(&c, &[constant(10)], &globals), Verdict::Discarded);
    }

    #[test]
    fn value_dependent_evaluation_failure_discards() {
        let c = candidate(
            "function f(x: int) requires(9223372036854775807 + x > 0): bool;",
        );
        assert_eq!(
            check(&c, &[constant(1)], &Env::new()),
            Outcome::EvalFailed(consteval::EvalError::Overflow {
                span: match &c.constraint {
                    Some(expr) => match expr {
                        siv_parser::ast::Expression::Binary { lhs, .. } => lhs.span(),
                        _ => unreachable!(),
                    },
                    None => unreachable!(),
                }
            })
        );
        assert_eq!(evaluate(&c, &[constant(1)], &Env::new()), Verdict::Discarded);
        assert_eq!(evaluate(&c, &[constant(0)], &Env::new()), Verdict::Viable);
    }

    #[test]
    fn parameter_shadows_const_of_same_name() {
        let mut globals = Env::new();
        globals.bind_const("x", Value::Int(100));
        let c = candidate("function f(x: int) requires(x == 2): bool;");
        assert_eq!(evaluate(&c, &[constant(2)], &globals), Verdict::Viable);
        assert_eq!(evaluate(&c, &[constant(100)], &globals), Verdict::Discarded);
    }
}
