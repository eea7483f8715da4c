//! Integration tests for `deny` prototypes
//!
//! The `isdigit` scenario: a constrained overload exists only to catch
//! out-of-range constant arguments at compile time. Runtime arguments must
//! sail past it to the ordinary overload.

use siv_checker::resolve::CallOutcome;
use siv_checker::{analyze, CheckError};

const ISDIGIT: &str = r#"
    function isdigit(c: int): bool;
    deny("isdigit called with an out-of-range constant")
    function isdigit(c: int) requires(c <= -1 || c > 255): bool;
"#;

fn with_prelude(body: &str) -> String {
    format!("{}\n{}", ISDIGIT, body)
}

#[test]
fn out_of_range_constant_hits_the_denied_overload() {
    let analysis = analyze(&with_prelude("isdigit(-10);")).expect("syntax error");
    match &analysis.result.errors[0] {
        CheckError::DeniedCandidate { name, message, .. } => {
            assert_eq!(name, "isdigit");
            assert_eq!(
                message.as_deref(),
                Some("isdigit called with an out-of-range constant")
            );
        }
        other => panic!("expected DeniedCandidate, got {:?}", other),
    }
    assert_eq!(analysis.result.resolutions[0].outcome, CallOutcome::Denied);
}

#[test]
fn in_range_constant_selects_the_ordinary_overload() {
    let analysis = analyze(&with_prelude("isdigit(65);")).expect("syntax error");
    assert!(analysis.result.is_ok(), "got {:?}", analysis.result.errors);
    assert_eq!(
        analysis.result.resolutions[0].selected.as_deref(),
        Some("isdigit(int)")
    );
}

#[test]
fn runtime_argument_never_triggers_the_denial() {
    let analysis = analyze(&with_prelude("let c: int;\nisdigit(c);")).expect("syntax error");
    assert!(analysis.result.is_ok(), "got {:?}", analysis.result.errors);
    assert_eq!(
        analysis.result.resolutions[0].selected.as_deref(),
        Some("isdigit(int)")
    );
}

#[test]
fn boundary_values_follow_the_constraint_exactly() {
    for (arg, denied) in [("-1", true), ("0", false), ("255", false), ("256", true)] {
        let analysis =
            analyze(&with_prelude(&format!("isdigit({});", arg))).expect("syntax error");
        let hit = analysis
            .result
            .errors
            .iter()
            .any(|e| matches!(e, CheckError::DeniedCandidate { .. }));
        assert_eq!(hit, denied, "isdigit({}) denial mismatch", arg);
    }
}

#[test]
fn denied_overload_without_message_still_errors() {
    let analysis = analyze(
        r#"
        function f(x: int): int;
        deny function f(x: int) requires(x == 0): int;
        f(0);
        "#,
    )
    .expect("syntax error");
    assert!(matches!(
        analysis.result.errors[0],
        CheckError::DeniedCandidate { message: None, .. }
    ));
}

#[test]
fn denial_reports_both_call_and_declaration() {
    let analysis = analyze(&with_prelude("isdigit(-10);")).expect("syntax error");
    let CheckError::DeniedCandidate { span, decl_span, .. } = &analysis.result.errors[0] else {
        panic!("expected DeniedCandidate");
    };
    assert_ne!(span, decl_span);
    assert!(decl_span.start < span.start, "declaration precedes the call");
}
