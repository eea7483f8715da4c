//! Overload resolution
//!
//! Walks a module in declaration order, building the overload table and the
//! const environment, then resolves every call site: gather candidates by
//! name, drop arity/type mismatches, apply the constraint evaluator, rank by
//! conversion cost, and order equally ranked survivors by constraint
//! subsumption. Exactly one survivor is selected; zero or several is a
//! diagnostic.
//!
//! Every call site also yields a serializable [`Resolution`] report with the
//! per-candidate verdicts, which `siv resolve` prints.

use crate::constraint::{self, Outcome, Verdict};
use crate::consteval::{self, Binding, Env};
use crate::declarations::{self, Candidate};
use crate::error::CheckError;
use crate::subsume;
use rustc_hash::FxHashMap;
use serde::Serialize;
use siv_parser::ast::{
    ConstDecl, Expression, ExpressionStatement, FunctionDecl, Identifier, Item, LetDecl, Module,
};
use siv_parser::Span;
use siv_types::{Constness, Type};

/// How a call site came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// One candidate selected
    Selected,
    /// One candidate selected, but it is marked `deny`
    Denied,
    /// Every candidate was pruned
    NoViableOverload,
    /// More than one maximal candidate survived
    Ambiguous,
}

/// One argument of a call, as the resolver saw it.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentReport {
    /// The argument's type
    pub ty: String,
    /// `constant <value>` or `runtime value`
    pub constness: String,
}

/// One candidate's fate at a call site.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    /// The candidate signature
    pub signature: String,
    /// Viable or Discarded
    pub verdict: Verdict,
    /// Why the candidate was discarded, or how it was ranked
    pub detail: Option<String>,
}

/// The resolver's full answer for one call site.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The called name
    pub callee: String,
    /// 1-based line of the call
    pub line: u32,
    /// 1-based column of the call
    pub column: u32,
    /// The arguments in order
    pub arguments: Vec<ArgumentReport>,
    /// Every candidate's fate
    pub candidates: Vec<CandidateReport>,
    /// Signature of the selected candidate, if resolution succeeded
    pub selected: Option<String>,
    /// How the call came out
    pub outcome: CallOutcome,
}

/// Result of checking a module.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// One report per call site, in source order (innermost calls first)
    pub resolutions: Vec<Resolution>,
    /// All errors, in source order
    pub errors: Vec<CheckError>,
}

impl CheckResult {
    /// Whether the module checked cleanly.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Overload resolver and module checker.
pub struct Checker {
    /// Overload table: name → candidates in declaration order
    overloads: FxHashMap<String, Vec<Candidate>>,

    /// Consts (constant) and lets (dynamic), for the constant evaluator
    env: Env,

    /// Declared types of `let` bindings
    locals: FxHashMap<String, Type>,

    /// Declaration spans of consts and lets, for redeclaration reporting
    binding_spans: FxHashMap<String, Span>,

    errors: Vec<CheckError>,
    resolutions: Vec<Resolution>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    /// Create an empty checker.
    pub fn new() -> Self {
        Checker {
            overloads: FxHashMap::default(),
            env: Env::new(),
            locals: FxHashMap::default(),
            binding_spans: FxHashMap::default(),
            errors: Vec::new(),
            resolutions: Vec::new(),
        }
    }

    /// Check a module: validate declarations and resolve every call site.
    pub fn check_module(mut self, module: &Module) -> CheckResult {
        for item in &module.items {
            match item {
                Item::Function(decl) => self.declare_function(decl),
                Item::Const(decl) => self.declare_const(decl),
                Item::Let(decl) => self.declare_let(decl),
                Item::Expression(stmt) => self.check_expression_statement(stmt),
            }
        }

        CheckResult {
            resolutions: self.resolutions,
            errors: self.errors,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declare_function(&mut self, decl: &FunctionDecl) {
        let before = self.errors.len();
        declarations::validate(decl, &self.env, &mut self.errors);
        if self.errors.len() > before {
            // An ill-formed candidate never joins the overload set.
            return;
        }

        let candidate = Candidate::from_decl(decl);
        let entry = self.overloads.entry(candidate.name.clone()).or_default();
        if let Some(previous) = entry.iter().find(|c| c.same_signature(&candidate)) {
            self.errors.push(CheckError::Redeclaration {
                name: candidate.name.clone(),
                span: decl.span,
                previous: previous.span,
            });
            return;
        }
        entry.push(candidate);
    }

    fn declare_const(&mut self, decl: &ConstDecl) {
        if self.check_rebinding(&decl.name) {
            return;
        }

        let Some((_, constness)) = self.analyze_expr(&decl.init) else {
            return;
        };
        match constness {
            Constness::Const(value) => {
                self.env.bind_const(decl.name.name.clone(), value);
                self.binding_spans.insert(decl.name.name.clone(), decl.span);
            }
            Constness::Dynamic => {
                self.errors.push(CheckError::NonConstantInit {
                    name: decl.name.name.clone(),
                    span: decl.init.span(),
                });
            }
        }
    }

    fn declare_let(&mut self, decl: &LetDecl) {
        if self.check_rebinding(&decl.name) {
            return;
        }

        let init_ty = match &decl.init {
            Some(init) => match self.analyze_expr(init) {
                Some((ty, _)) => Some(ty),
                None => return,
            },
            None => None,
        };

        let ty = match (decl.ty, init_ty) {
            (Some(annotated), Some(actual)) => {
                if !actual.converts_to(annotated) {
                    self.errors.push(CheckError::TypeMismatch {
                        expected: annotated.to_string(),
                        actual: actual.to_string(),
                        span: decl.init.as_ref().map(|e| e.span()).unwrap_or(decl.span),
                    });
                    return;
                }
                annotated
            }
            (Some(annotated), None) => annotated,
            (None, Some(actual)) => actual,
            // The parser rejects `let x;`
            (None, None) => return,
        };

        self.env.bind_dynamic(decl.name.name.clone());
        self.locals.insert(decl.name.name.clone(), ty);
        self.binding_spans.insert(decl.name.name.clone(), decl.span);
    }

    /// Report and skip a `const`/`let` that reuses a bound name.
    fn check_rebinding(&mut self, name: &Identifier) -> bool {
        if let Some(previous) = self.binding_spans.get(&name.name) {
            self.errors.push(CheckError::Redeclaration {
                name: name.name.clone(),
                span: name.span,
                previous: *previous,
            });
            return true;
        }
        false
    }

    fn check_expression_statement(&mut self, stmt: &ExpressionStatement) {
        self.analyze_expr(&stmt.expression);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Type and constness of an expression; `None` when an error was already
    /// reported for it.
    fn analyze_expr(&mut self, expr: &Expression) -> Option<(Type, Constness)> {
        let ty = self.type_of(expr)?;
        match consteval::fold(expr, &self.env) {
            Ok(constness) => Some((ty, constness)),
            Err(err) => {
                self.errors.push(CheckError::ConstEval {
                    message: err.to_string(),
                    span: err.span(),
                });
                None
            }
        }
    }

    /// Type of an expression, resolving any calls inside it.
    fn type_of(&mut self, expr: &Expression) -> Option<Type> {
        match expr {
            Expression::IntLiteral { .. } => Some(Type::Int),
            Expression::FloatLiteral { .. } => Some(Type::Number),
            Expression::StringLiteral { .. } => Some(Type::Str),
            Expression::BoolLiteral { .. } => Some(Type::Bool),

            Expression::Identifier(ident) => match self.env.lookup(&ident.name) {
                Some(Binding::Const(value)) => Some(value.ty()),
                Some(Binding::Dynamic) => self.locals.get(&ident.name).copied(),
                None => {
                    self.errors.push(CheckError::UnknownIdentifier {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                    None
                }
            },

            Expression::Unary { op, operand, span } => {
                let operand_ty = self.type_of(operand)?;
                match declarations::unary_result(*op, operand_ty, *span) {
                    Ok(ty) => Some(ty),
                    Err(err) => {
                        self.errors.push(err);
                        None
                    }
                }
            }

            Expression::Binary { op, lhs, rhs, span } => {
                let lhs_ty = self.type_of(lhs);
                let rhs_ty = self.type_of(rhs);
                match declarations::binary_result(*op, lhs_ty?, rhs_ty?, *span) {
                    Ok(ty) => Some(ty),
                    Err(err) => {
                        self.errors.push(err);
                        None
                    }
                }
            }

            Expression::Call { callee, args, span } => self.resolve_call(callee, args, *span),
        }
    }

    // ========================================================================
    // Call resolution
    // ========================================================================

    fn resolve_call(
        &mut self,
        callee: &Identifier,
        args: &[Expression],
        span: Span,
    ) -> Option<Type> {
        // Arguments first: inner calls resolve before the outer one.
        let mut analyzed = Vec::with_capacity(args.len());
        let mut failed = false;
        for arg in args {
            match self.analyze_expr(arg) {
                Some(entry) => analyzed.push(entry),
                None => failed = true,
            }
        }
        if failed {
            return None;
        }

        let Some(candidates) = self.overloads.get(&callee.name).cloned() else {
            self.errors.push(CheckError::UnknownFunction {
                name: callee.name.clone(),
                span,
            });
            return None;
        };

        let arg_types: Vec<Type> = analyzed.iter().map(|(ty, _)| *ty).collect();
        let arg_consts: Vec<Constness> = analyzed.iter().map(|(_, c)| c.clone()).collect();

        let mut reports = Vec::with_capacity(candidates.len());
        let mut viable = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.judge(candidate, &arg_types, &arg_consts) {
                Ok(()) => {
                    viable.push(index);
                    reports.push(CandidateReport {
                        signature: candidate.signature(),
                        verdict: Verdict::Viable,
                        detail: None,
                    });
                }
                Err(detail) => {
                    reports.push(CandidateReport {
                        signature: candidate.signature(),
                        verdict: Verdict::Discarded,
                        detail: Some(detail),
                    });
                }
            }
        }

        let arguments = analyzed
            .iter()
            .map(|(ty, constness)| ArgumentReport {
                ty: ty.to_string(),
                constness: constness.to_string(),
            })
            .collect();
        let mut resolution = Resolution {
            callee: callee.name.clone(),
            line: span.line,
            column: span.column,
            arguments,
            candidates: reports,
            selected: None,
            outcome: CallOutcome::NoViableOverload,
        };

        if viable.is_empty() {
            let notes = resolution
                .candidates
                .iter()
                .map(|report| {
                    format!(
                        "{}: {}",
                        report.signature,
                        report.detail.as_deref().unwrap_or("discarded")
                    )
                })
                .collect();
            self.errors.push(CheckError::NoViableOverload {
                name: callee.name.clone(),
                span,
                notes,
            });
            self.resolutions.push(resolution);
            return None;
        }

        // Rank by conversion cost: all-exact beats any widening.
        let cost = |index: usize| -> usize {
            candidates[index]
                .params
                .iter()
                .zip(&arg_types)
                .filter(|(param, arg)| arg.widens_to(param.ty))
                .count()
        };
        let best_cost = viable.iter().map(|&i| cost(i)).min().unwrap_or(0);
        let best: Vec<usize> = viable.into_iter().filter(|&i| cost(i) == best_cost).collect();

        // Specialization ordering: drop candidates strictly refined by
        // another surviving candidate.
        let maximal: Vec<usize> = best
            .iter()
            .copied()
            .filter(|&i| {
                !best.iter().any(|&j| {
                    j != i
                        && subsume::strictly_refines(
                            candidates[j].constraint.as_ref(),
                            candidates[i].constraint.as_ref(),
                        )
                })
            })
            .collect();

        if maximal.len() > 1 {
            let names: Vec<String> = maximal
                .iter()
                .map(|&i| candidates[i].signature())
                .collect();
            self.errors.push(CheckError::AmbiguousCall {
                name: callee.name.clone(),
                span,
                candidates: names,
            });
            resolution.outcome = CallOutcome::Ambiguous;
            self.resolutions.push(resolution);
            return None;
        }

        let chosen = &candidates[maximal[0]];
        resolution.selected = Some(chosen.signature());
        resolution.outcome = CallOutcome::Selected;

        if let Some(deny) = &chosen.deny {
            self.errors.push(CheckError::DeniedCandidate {
                name: callee.name.clone(),
                span,
                decl_span: chosen.span,
                message: deny.message.clone(),
            });
            resolution.outcome = CallOutcome::Denied;
        }

        self.resolutions.push(resolution);
        Some(chosen.return_type)
    }

    /// Ordinary pruning plus the constraint verdict for one candidate.
    /// `Err` carries the reason the candidate left the overload set.
    fn judge(
        &self,
        candidate: &Candidate,
        arg_types: &[Type],
        arg_consts: &[Constness],
    ) -> Result<(), String> {
        if candidate.params.len() != arg_types.len() {
            return Err(format!(
                "takes {} argument(s), call has {}",
                candidate.params.len(),
                arg_types.len()
            ));
        }

        for (index, (param, arg)) in candidate.params.iter().zip(arg_types).enumerate() {
            if !arg.converts_to(param.ty) {
                return Err(format!(
                    "argument {} has type `{}`, parameter `{}` is `{}`",
                    index + 1,
                    arg,
                    param.name,
                    param.ty
                ));
            }
        }

        match constraint::check(candidate, arg_consts, &self.env) {
            Outcome::Satisfied => Ok(()),
            Outcome::DynamicArgument { index } => Err(format!(
                "constraint references `{}`, which is bound to a runtime argument",
                candidate.params[index].name
            )),
            Outcome::False => Err("constraint evaluated to false".to_string()),
            Outcome::EvalFailed(err) => Err(format!("constraint failed to evaluate: {}", err)),
        }
    }
}

/// Check a parsed module.
pub fn check_module(module: &Module) -> CheckResult {
    Checker::new().check_module(module)
}
