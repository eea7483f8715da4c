//! Constraint subsumption
//!
//! Specialization ordering between constrained candidates: a candidate whose
//! constraint strictly refines another's is preferred, the way more
//! specialized template overloads are preferred.
//!
//! Implication is syntactic, over atomic constraints: the constraint is
//! normalized to disjunctive normal form, where an atom is any subexpression
//! that is not an `&&`/`||`, identified by a canonical rendering. P implies Q
//! iff every disjunct of P contains some disjunct of Q. Semantically equal
//! but structurally different atoms (`iexp == 2` vs `2 == iexp`) do not
//! subsume each other.
//!
//! An absent constraint is the trivial constraint `true` (one empty
//! disjunct): every constraint implies it, and it implies nothing but
//! itself. That single rule makes a viable constrained candidate beat an
//! unconstrained one.

use rustc_hash::FxHashSet;
use siv_parser::ast::Expression;

/// Whether constraint `p` implies constraint `q`. `None` is `true`.
pub fn implies(p: Option<&Expression>, q: Option<&Expression>) -> bool {
    let p_clauses = dnf(p);
    let q_clauses = dnf(q);
    p_clauses
        .iter()
        .all(|cp| q_clauses.iter().any(|cq| cq.is_subset(cp)))
}

/// Whether `p` implies `q` and `q` does not imply `p`.
pub fn strictly_refines(p: Option<&Expression>, q: Option<&Expression>) -> bool {
    implies(p, q) && !implies(q, p)
}

/// Canonical rendering of an expression, used as atom identity and in
/// diagnostics.
pub fn render(expr: &Expression) -> String {
    match expr {
        Expression::IntLiteral { value, .. } => value.to_string(),
        Expression::FloatLiteral { value, .. } => {
            // Keep a trailing ".0" so `2` and `2.0` stay distinct atoms.
            if value.fract() == 0.0 && value.is_finite() {
                format!("{:.1}", value)
            } else {
                value.to_string()
            }
        }
        Expression::StringLiteral { value, .. } => format!("{:?}", value),
        Expression::BoolLiteral { value, .. } => value.to_string(),
        Expression::Identifier(ident) => ident.name.clone(),
        Expression::Unary { op, operand, .. } => format!("{}{}", op, render(operand)),
        Expression::Binary { op, lhs, rhs, .. } => {
            format!("({} {} {})", render(lhs), op, render(rhs))
        }
        Expression::Call { callee, args, .. } => {
            let args: Vec<String> = args.iter().map(render).collect();
            format!("{}({})", callee.name, args.join(", "))
        }
    }
}

/// Disjunctive normal form over atom keys. `None` is `true`.
fn dnf(constraint: Option<&Expression>) -> Vec<FxHashSet<String>> {
    match constraint {
        None => vec![FxHashSet::default()],
        Some(expr) => clauses(expr),
    }
}

fn clauses(expr: &Expression) -> Vec<FxHashSet<String>> {
    use siv_parser::ast::BinaryOp;

    match expr {
        Expression::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
            ..
        } => {
            let mut out = clauses(lhs);
            out.extend(clauses(rhs));
            out
        }
        Expression::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
            ..
        } => {
            let left = clauses(lhs);
            let right = clauses(rhs);
            let mut out = Vec::with_capacity(left.len() * right.len());
            for cl in &left {
                for cr in &right {
                    let mut clause = cl.clone();
                    clause.extend(cr.iter().cloned());
                    out.push(clause);
                }
            }
            out
        }
        atom => {
            let mut clause = FxHashSet::default();
            clause.insert(render(atom));
            vec![clause]
        }
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

    fn implies_str(p: &str, q: &str) -> bool {
        implies(Some(&expr(p)), Some(&expr(q)))
    }

    #[test]
    fn every_constraint_implies_true() {
        let p = expr("iexp == 2");
        assert!(implies(Some(&p), None));
        assert!(!implies(None, Some(&p)));
        assert!(strictly_refines(Some(&p), None));
    }

    #[test]
    fn true_implies_true() {
        assert!(implies(None, None));
        assert!(!strictly_refines(None, None));
    }

    #[test]
    fn conjunction_refines_its_conjuncts() {
        assert!(implies_str("a == 1 && b == 2", "a == 1"));
        assert!(!implies_str("a == 1", "a == 1 && b == 2"));
        assert!(strictly_refines(
            Some(&expr("a == 1 && b == 2")),
            Some(&expr("b == 2"))
        ));
    }

    #[test]
    fn disjunct_is_implied_by_its_members() {
        assert!(implies_str("a == 1", "a == 1 || a == 2"));
        assert!(!implies_str("a == 1 || a == 2", "a == 1"));
    }

    #[test]
    fn identical_constraints_imply_each_other() {
        assert!(implies_str("c <= -1 || c > 255", "c <= -1 || c > 255"));
        assert!(!strictly_refines(
            Some(&expr("c <= -1 || c > 255")),
            Some(&expr("c <= -1 || c > 255"))
        ));
    }

    #[test]
    fn implication_is_syntactic_not_semantic() {
        // Semantically equivalent, structurally different: no subsumption.
        assert!(!implies_str("iexp == 2", "2 == iexp"));
        assert!(!implies_str("a < 1", "a <= 1"));
    }

    #[test]
    fn distribution_over_and_or() {
        // (a && b) || (a && c) implies a
        assert!(implies_str("a == 1 && b == 2 || a == 1 && c == 3", "a == 1"));
        // but not b
        assert!(!implies_str("a == 1 && b == 2 || a == 1 && c == 3", "b == 2"));
    }

    #[test]
    fn unrelated_constraints_do_not_order() {
        assert!(!strictly_refines(Some(&expr("a == 1")), Some(&expr("b == 2"))));
        assert!(!strictly_refines(Some(&expr("b == 2")), Some(&expr("a == 1"))));
    }
}
