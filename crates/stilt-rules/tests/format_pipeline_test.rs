//! End-to-end tests running the full built-in catalog through the engine.

use stilt_core::{parse_source, ResolvedConfig, Violation};
use stilt_rules::builtin_engine;

fn format(source: &str) -> (String, Vec<(Violation, bool)>, bool) {
    let engine = builtin_engine().unwrap();
    let mut reported = Vec::new();
    let outcome = engine
        .format_source(source, &ResolvedConfig::new(), |violation, corrected| {
            reported.push((violation.clone(), corrected));
        })
        .unwrap();
    (outcome.text, reported, outcome.converged)
}

#[test]
fn a_clean_file_is_untouched() {
    let source = "fun main() {\n    greet(\"world\", 1)\n}\n";
    let (text, reported, converged) = format(source);
    assert_eq!(text, source);
    assert!(reported.is_empty());
    assert!(converged);
}

#[test]
fn multiple_rules_fix_one_file_together() {
    let source = "fun main() {  \n    x(1,  3)\n    val n = 12345678\n}\n";
    let (text, reported, converged) = format(source);
    assert_eq!(text, "fun main() {\n    x(1, 3)\n    val n = 12_345_678\n}\n");
    assert!(converged);
    // Trailing space, double space, ungrouped literal: each reported once,
    // each corrected.
    assert_eq!(reported.len(), 3);
    assert!(reported.iter().all(|(_, corrected)| *corrected));
}

#[test]
fn corrected_and_remaining_violations_stream_in_position_order() {
    // The enum entry is report-only, the double space is corrected.
    let source = "enum class E { _FOO }\nval a  = 1\n";
    let engine = builtin_engine().unwrap();
    let mut reported = Vec::new();
    let outcome = engine
        .format_source(source, &ResolvedConfig::new(), |violation, corrected| {
            reported.push((violation.line, violation.column, corrected));
        })
        .unwrap();
    assert_eq!(outcome.text, "enum class E { _FOO }\nval a = 1\n");
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[0], (1, 16, false));
    assert_eq!(reported[1], (2, 7, true));
    assert_eq!(outcome.violations.len(), 1);
    assert!(!outcome.violations[0].can_be_autocorrected);
}

#[test]
fn lint_reports_fixable_violations_without_touching_the_tree() {
    let source = "x(1,  3)\n";
    let engine = builtin_engine().unwrap();
    let mut tree = parse_source(source).unwrap();
    let violations = engine
        .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
        .unwrap();
    assert_eq!(tree.text(), source);
    assert_eq!(violations.len(), 1);
    assert!(violations[0].can_be_autocorrected);
    assert_eq!((violations[0].line, violations[0].column), (1, 6));
}

#[test]
fn formatting_is_idempotent() {
    let source = "fun main() {   \n    x(1,  3)   \n}\nval n = 12345678  ";
    let (first, _, converged) = format(source);
    assert!(converged);
    let (second, reported, _) = format(&first);
    assert_eq!(second, first);
    assert!(reported.is_empty());
}

#[test]
fn an_unparseable_file_reports_position_and_runs_no_rule() {
    let engine = builtin_engine().unwrap();
    let err = engine
        .format_source("val s = \"oops", &ResolvedConfig::new(), |_, _| {
            panic!("no rule should run");
        })
        .unwrap_err();
    match err {
        stilt_core::StiltError::ParseError { line, column, .. } => {
            assert_eq!((line, column), (1, 9));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn per_rule_configuration_disables_a_stable_rule() {
    let mut config = ResolvedConfig::new();
    config.set(
        stilt_core::rule_execution_key(stilt_rules::builtin::NO_MULTI_SPACES),
        "disabled",
    );
    let engine = builtin_engine().unwrap();
    let outcome = engine
        .format_source("x(1,  3)\n", &config, |_, _| {})
        .unwrap();
    assert_eq!(outcome.text, "x(1,  3)\n");
}

#[test]
fn positions_count_characters_not_bytes() {
    // `é` is two bytes; the report on the second space must still land on
    // column 6.
    let source = "vélo  = 1\n";
    let engine = builtin_engine().unwrap();
    let mut tree = parse_source(source).unwrap();
    let violations = engine
        .lint(&mut tree, &ResolvedConfig::new(), |_, _| {})
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!((violations[0].line, violations[0].column), (1, 6));
}
