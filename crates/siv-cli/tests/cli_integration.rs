//! Integration tests for the Siv CLI pipeline.
//!
//! Tests the checker API that powers `siv check` and `siv resolve` against
//! on-disk fixtures, including the JSON report shape `--json` emits.

use siv_checker::resolve::CallOutcome;
use siv_checker::{analyze, CheckError};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn analyze_fixture(name: &str) -> siv_checker::Analysis {
    let path = fixtures_dir().join(name);
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    analyze(&source).expect("fixture should be syntactically valid")
}

#[test]
fn test_pow_fixture_checks_cleanly() {
    let analysis = analyze_fixture("pow.siv");
    assert!(analysis.result.is_ok(), "errors: {:?}", analysis.result.errors);
    assert_eq!(analysis.result.resolutions.len(), 3);
}

#[test]
fn test_pow_fixture_selects_constrained_overload_for_constants() {
    let analysis = analyze_fixture("pow.siv");
    let resolutions = &analysis.result.resolutions;

    // pow(2.0, SQUARE): SQUARE folds to 2, the requires(iexp == 2) overload wins.
    assert_eq!(
        resolutions[0].selected.as_deref(),
        Some("pow(number, int) requires((iexp == 2))")
    );
    // pow(2.0, 3): the constraint is false, only the general overload remains.
    assert_eq!(
        resolutions[1].selected.as_deref(),
        Some("pow(number, int)")
    );
    // pow(2.0, n): n is a runtime value, the constrained overload is discarded.
    assert_eq!(
        resolutions[2].selected.as_deref(),
        Some("pow(number, int)")
    );
}

#[test]
fn test_denied_fixture_reports_denied_candidate() {
    let analysis = analyze_fixture("denied.siv");
    let resolutions = &analysis.result.resolutions;

    assert_eq!(resolutions[0].outcome, CallOutcome::Selected);
    assert_eq!(resolutions[1].outcome, CallOutcome::Denied);
    assert_eq!(analysis.result.errors.len(), 1);
    match &analysis.result.errors[0] {
        CheckError::DeniedCandidate { message, .. } => {
            assert_eq!(message.as_deref(), Some("classify only accepts digit codes"));
        }
        other => panic!("expected DeniedCandidate, got {:?}", other),
    }
}

#[test]
fn test_json_report_shape() {
    let analysis = analyze_fixture("pow.siv");
    let json = serde_json::to_string_pretty(&analysis.result.resolutions)
        .expect("resolutions should serialize");
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let first = &parsed[0];
    assert_eq!(first["callee"], "pow");
    assert_eq!(first["outcome"], "selected");
    assert_eq!(first["arguments"].as_array().unwrap().len(), 2);
    assert_eq!(first["candidates"].as_array().unwrap().len(), 2);
    assert!(first["candidates"][0]["verdict"].is_string());
}
