//! Most-derived selection over a discriminant
//!
//! Sibling overloads whose constraints are mutually exclusive and
//! collectively exhaustive over a discriminant's value space: exactly one
//! candidate is viable for every constant discriminant. The evaluator does
//! not enforce that design obligation; overlapping constraints simply make
//! affected calls ambiguous, and gaps make them non-viable.

use siv_checker::{analyze, Analysis, CheckError, Verdict};

// Tags 0..=3, partitioned without overlap.
const WRAPPERS: &str = r#"
    function wrap(tag: int): string;
    function wrap(tag: int) requires(tag == 0): string;
    function wrap(tag: int) requires(tag == 1): string;
    function wrap(tag: int) requires(tag == 2 || tag == 3): string;
"#;

fn run(source: &str) -> Analysis {
    analyze(source).expect("syntax error")
}

#[test]
fn exactly_one_constrained_candidate_per_discriminant_value() {
    for tag in 0..=3 {
        let analysis = run(&format!("{}\nwrap({});", WRAPPERS, tag));
        assert!(analysis.result.is_ok(), "tag {}: {:?}", tag, analysis.result.errors);

        let resolution = &analysis.result.resolutions[0];
        let viable_constrained = resolution
            .candidates
            .iter()
            .filter(|c| c.verdict == Verdict::Viable && c.signature.contains("requires"))
            .count();
        assert_eq!(viable_constrained, 1, "tag {}: {:?}", tag, resolution.candidates);

        // And the constrained one wins over the unconstrained fallback.
        assert!(
            resolution.selected.as_deref().unwrap().contains("requires"),
            "tag {}: picked {:?}",
            tag,
            resolution.selected
        );
    }
}

#[test]
fn each_discriminant_picks_its_own_wrapper() {
    let analysis = run(&format!("{}\nwrap(1);\nwrap(3);", WRAPPERS));
    let picks: Vec<&str> = analysis
        .result
        .resolutions
        .iter()
        .map(|r| r.selected.as_deref().unwrap())
        .collect();
    assert!(picks[0].contains("tag == 1"), "got {:?}", picks);
    assert!(picks[1].contains("tag == 2") && picks[1].contains("tag == 3"), "got {:?}", picks);
}

#[test]
fn runtime_discriminant_falls_back_to_the_unconstrained_wrapper() {
    let analysis = run(&format!("{}\nlet tag: int;\nwrap(tag);", WRAPPERS));
    assert!(analysis.result.is_ok(), "got {:?}", analysis.result.errors);
    assert_eq!(
        analysis.result.resolutions[0].selected.as_deref(),
        Some("wrap(int)")
    );
}

#[test]
fn overlapping_constraints_make_the_call_ambiguous() {
    // The obligation is on the author of the overload set: when two sibling
    // constraints both hold, resolution must report an ambiguity, not pick.
    let analysis = run(
        r#"
        function wrap(tag: int) requires(tag == 0 || tag == 1): string;
        function wrap(tag: int) requires(tag == 1 || tag == 2): string;
        wrap(1);
        "#,
    );
    assert!(matches!(
        analysis.result.errors[0],
        CheckError::AmbiguousCall { .. }
    ));

    // Values covered by only one constraint still resolve.
    let analysis = run(
        r#"
        function wrap(tag: int) requires(tag == 0 || tag == 1): string;
        function wrap(tag: int) requires(tag == 1 || tag == 2): string;
        wrap(0);
        "#,
    );
    assert!(analysis.result.is_ok(), "got {:?}", analysis.result.errors);
}

#[test]
fn a_gap_in_the_partition_leaves_no_viable_candidate() {
    let analysis = run(
        r#"
        function wrap(tag: int) requires(tag == 0): string;
        function wrap(tag: int) requires(tag == 1): string;
        wrap(7);
        "#,
    );
    assert!(matches!(
        analysis.result.errors[0],
        CheckError::NoViableOverload { .. }
    ));
}
