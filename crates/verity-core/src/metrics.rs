//! The four evaluation metrics.
//!
//! Each calculator is a pure function of the bundle (the semantic-error
//! rate takes the detector's findings instead, accuracy also takes an
//! optional ground-truth map). None depends on another, and each defines
//! its own value for empty input instead of failing.
//!
//! | Metric | Empty input |
//! |--------|-------------|
//! | semantic-error rate | no queries → 0.0 |
//! | execution-success rate | no logs → 1.0 |
//! | empty-result rate | no results → 1.0 |
//! | accuracy rate | see [`accuracy_rate`] |

use crate::bundle::AnalysisBundle;
use crate::compare::values_match_within;
use crate::config::ConsistencyPenalties;
use crate::keywords::{contains_any, COUNT_KEYWORDS, INVALID_RESULT_TOKENS, RATE_METRIC_KEYWORDS};
use crate::rules::SemanticFinding;
use crate::types::{AccuracySource, ResultMap, Value};

/// Share of issued queries with a semantic finding.
///
/// `findings` comes from [`crate::rules::SemanticErrorDetector::findings`], which yields at
/// most one finding per query.
pub fn semantic_error_rate(findings: &[SemanticFinding], query_count: usize) -> f64 {
    if query_count == 0 {
        return 0.0;
    }

    ratio(findings.len(), query_count)
}

/// Share of execution logs that succeeded.
///
/// Without logs there is no evidence of failure, so the rate is 1.0.
pub fn execution_success_rate(bundle: &AnalysisBundle) -> f64 {
    if bundle.execution_logs.is_empty() {
        return 1.0;
    }

    let succeeded = bundle
        .execution_logs
        .iter()
        .filter(|log| log.succeeded())
        .count();

    ratio(succeeded, bundle.execution_logs.len())
}

/// Share of results that are empty or invalid.
///
/// No results at all is the worst case: 1.0.
pub fn empty_result_rate(bundle: &AnalysisBundle) -> f64 {
    if bundle.results.is_empty() {
        return 1.0;
    }

    let empty = bundle
        .results
        .values()
        .filter(|v| is_empty_or_invalid(v))
        .count();

    ratio(empty, bundle.results.len())
}

/// Whether a result value carries no usable answer.
///
/// Null, empty collections, blank text, non-finite numbers, and text that
/// reads like an error message all count.
pub fn is_empty_or_invalid(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(entries) => entries.is_empty(),
        Value::Text(s) => s.trim().is_empty() || contains_any(s, INVALID_RESULT_TOKENS),
        Value::Number(n) => !n.is_finite(),
        Value::Bool(_) => false,
    }
}

/// Accuracy rate and the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    pub rate: f64,
    pub source: AccuracySource,
}

/// Accuracy by the first applicable tier:
///
/// 1. Bundle reference results present: share of shared keys that match;
///    0.0 if no keys are shared.
/// 2. Ground truth supplied: same computation; 1.0 if no keys are shared.
/// 3. Neither: [`consistency_score`] of the results.
pub fn accuracy_rate(
    bundle: &AnalysisBundle,
    ground_truth: Option<&ResultMap>,
    tolerance: f64,
    penalties: &ConsistencyPenalties,
) -> Accuracy {
    if let Some(reference) = bundle.reference() {
        return Accuracy {
            rate: shared_key_accuracy(&bundle.results, reference, tolerance).unwrap_or(0.0),
            source: AccuracySource::Reference,
        };
    }

    if let Some(truth) = ground_truth {
        return Accuracy {
            rate: shared_key_accuracy(&bundle.results, truth, tolerance).unwrap_or(1.0),
            source: AccuracySource::GroundTruth,
        };
    }

    Accuracy {
        rate: consistency_score(&bundle.results, penalties),
        source: AccuracySource::Consistency,
    }
}

/// Share of keys present on both sides whose values match.
///
/// `None` when the two maps share no keys.
pub fn shared_key_accuracy(results: &ResultMap, expected: &ResultMap, tolerance: f64) -> Option<f64> {
    let mut compared = 0;
    let mut matched = 0;

    for (metric, candidate) in results {
        if let Some(reference) = expected.get(metric) {
            compared += 1;
            if values_match_within(candidate, reference, tolerance) {
                matched += 1;
            }
        }
    }

    (compared > 0).then(|| ratio(matched, compared))
}

/// Plausibility score in `[0, 1]` for results with nothing to compare to.
///
/// Starts at 1.0 and deducts, per offending value:
/// - a negative number, when any key or text in the results mentions counting;
/// - a number above the large-value limit;
/// - a rate/ratio-named metric outside `[0, 100]`.
pub fn consistency_score(results: &ResultMap, penalties: &ConsistencyPenalties) -> f64 {
    let mentions_count = results
        .iter()
        .any(|(k, v)| contains_any(k, COUNT_KEYWORDS) || COUNT_KEYWORDS.iter().any(|kw| v.mentions(kw)));

    let mut score = 1.0;

    for n in results.values().filter_map(Value::as_number) {
        if n < 0.0 && mentions_count {
            score -= penalties.negative_count;
        }
        if n > penalties.large_value_limit {
            score -= penalties.large_value;
        }
    }

    for (metric, value) in results {
        let Some(n) = value.as_number() else {
            continue;
        };
        if contains_any(metric, RATE_METRIC_KEYWORDS) && !(0.0..=100.0).contains(&n) {
            score -= penalties.rate_out_of_range;
        }
    }

    f64::max(score, 0.0)
}

fn ratio(part: usize, total: usize) -> f64 {
    part as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SemanticErrorDetector;
    use crate::types::ExecutionLog;
    use serde_json::json;

    fn results(value: serde_json::Value) -> ResultMap {
        serde_json::from_value(value).unwrap()
    }

    fn flagged_rate(bundle: &AnalysisBundle) -> f64 {
        let findings = SemanticErrorDetector::new().findings(bundle);
        semantic_error_rate(&findings, bundle.queries.len())
    }

    #[test]
    fn test_semantic_error_rate_empty_queries() {
        assert_eq!(semantic_error_rate(&[], 0), 0.0);
        assert_eq!(flagged_rate(&AnalysisBundle::new("q")), 0.0);
    }

    #[test]
    fn test_semantic_error_rate_counts_flagged_queries() {
        let bundle = AnalysisBundle::new("users")
            .with_query("db.users.find({active: true})")
            .with_query("count == 0 AND exists")
            .with_query("db.users.find({})")
            .with_query("db.users.find({a: {$gt: 1}})");

        assert_eq!(flagged_rate(&bundle), 0.25);
    }

    #[test]
    fn test_semantic_error_rate_one_finding_per_query() {
        // Both the self-comparison and the sentinel rule match; only the first counts.
        let bundle = AnalysisBundle::new("users")
            .with_query("n == n && n > 999999999")
            .with_query("db.users.find()");

        assert_eq!(flagged_rate(&bundle), 0.5);
    }

    #[test]
    fn test_evaluator_uses_semantic_error_rate() {
        let bundle = AnalysisBundle::new("users")
            .with_query("status != status")
            .with_query("db.users.find()")
            .with_query("db.users.find({})")
            .with_result("n", 1);

        let metrics = crate::evaluator::Evaluator::new().evaluate(&bundle);
        assert_eq!(
            metrics.semantic_error_rate,
            semantic_error_rate(&metrics.semantic_findings, bundle.queries.len())
        );
        assert!((metrics.semantic_error_rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_execution_success_rate_empty_logs() {
        let bundle = AnalysisBundle::new("q");
        assert_eq!(execution_success_rate(&bundle), 1.0);
    }

    #[test]
    fn test_execution_success_rate_mixed() {
        let bundle = AnalysisBundle::new("q").with_execution_logs(vec![
            ExecutionLog::success(),
            ExecutionLog::failure("timeout"),
            ExecutionLog::default(),
            ExecutionLog::failure("connection refused"),
        ]);
        assert_eq!(execution_success_rate(&bundle), 0.5);
    }

    #[test]
    fn test_empty_result_rate_no_results() {
        let bundle = AnalysisBundle::new("q");
        assert_eq!(empty_result_rate(&bundle), 1.0);
    }

    #[test]
    fn test_empty_result_rate_mixed() {
        let bundle = AnalysisBundle::new("q").with_results(results(json!({
            "a": 1,
            "b": null,
            "c": "   ",
            "d": "ok",
            "e": [],
            "f": {},
            "g": [1],
            "h": "Query failed"
        })));
        assert_eq!(empty_result_rate(&bundle), 5.0 / 8.0);
    }

    #[test]
    fn test_is_empty_or_invalid() {
        assert!(is_empty_or_invalid(&Value::Null));
        assert!(is_empty_or_invalid(&Value::Number(f64::NAN)));
        assert!(is_empty_or_invalid(&Value::Number(f64::INFINITY)));
        assert!(is_empty_or_invalid(&Value::from("TypeError: undefined")));
        assert!(is_empty_or_invalid(&Value::from("NULL")));
        assert!(is_empty_or_invalid(&Value::from("")));
        assert!(!is_empty_or_invalid(&Value::Number(0.0)));
        assert!(!is_empty_or_invalid(&Value::Bool(false)));
        assert!(!is_empty_or_invalid(&Value::from("active")));
    }

    #[test]
    fn test_accuracy_from_reference() {
        let bundle = AnalysisBundle::new("q")
            .with_result("user_count", 3)
            .with_result("chat_count", 8)
            .with_result("only_candidate", 1)
            .with_reference("user_count", 3)
            .with_reference("chat_count", 7);

        let accuracy = accuracy_rate(&bundle, None, 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.source, AccuracySource::Reference);
        assert_eq!(accuracy.rate, 0.5);
    }

    #[test]
    fn test_accuracy_reference_without_shared_keys() {
        let bundle = AnalysisBundle::new("q")
            .with_result("a", 1)
            .with_reference("b", 1);

        let accuracy = accuracy_rate(&bundle, None, 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.rate, 0.0);
    }

    #[test]
    fn test_accuracy_reference_beats_ground_truth() {
        let bundle = AnalysisBundle::new("q")
            .with_result("n", 10)
            .with_reference("n", 11);
        let truth = results(json!({"n": 10}));

        let accuracy = accuracy_rate(&bundle, Some(&truth), 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.source, AccuracySource::Reference);
        assert_eq!(accuracy.rate, 0.0);
    }

    #[test]
    fn test_accuracy_from_ground_truth() {
        let bundle = AnalysisBundle::new("q")
            .with_result("total_users", 1250)
            .with_result("active_users", 980)
            .with_result("status", "Healthy");
        let truth = results(json!({"total_users": 1250, "active_users": 982, "status": "healthy"}));

        let accuracy = accuracy_rate(&bundle, Some(&truth), 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.source, AccuracySource::GroundTruth);
        assert!((accuracy.rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_ground_truth_without_shared_keys_is_vacuous() {
        let bundle = AnalysisBundle::new("q").with_result("a", 1);
        let truth = results(json!({"b": 2}));

        let accuracy = accuracy_rate(&bundle, Some(&truth), 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.rate, 1.0);
    }

    #[test]
    fn test_accuracy_empty_reference_falls_through() {
        let bundle = AnalysisBundle::new("q")
            .with_result("a", 1)
            .with_reference_results(ResultMap::new());

        let accuracy = accuracy_rate(&bundle, None, 0.01, &ConsistencyPenalties::default());
        assert_eq!(accuracy.source, AccuracySource::Consistency);
        assert_eq!(accuracy.rate, 1.0);
    }

    #[test]
    fn test_consistency_clean_results() {
        let map = results(json!({"total_users": 100, "active_users": 75}));
        assert_eq!(consistency_score(&map, &ConsistencyPenalties::default()), 1.0);
    }

    #[test]
    fn test_consistency_negative_count() {
        let map = results(json!({"user_count": -5}));
        let score = consistency_score(&map, &ConsistencyPenalties::default());
        assert!((score - 0.8).abs() < 1e-12);

        // No counting context, no deduction.
        let map = results(json!({"delta": -5}));
        assert_eq!(consistency_score(&map, &ConsistencyPenalties::default()), 1.0);
    }

    #[test]
    fn test_count_mention_ignores_case() {
        let map = results(json!({"Count": -1}));
        let score = consistency_score(&map, &ConsistencyPenalties::default());
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_large_value() {
        let map = results(json!({"revenue": 25_000_000, "orders": 10_000_000}));
        let score = consistency_score(&map, &ConsistencyPenalties::default());
        assert!((score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_rate_out_of_range() {
        let map = results(json!({"conversion_rate": 135.0, "이탈율": -1, "click_ratio": 50}));
        let score = consistency_score(&map, &ConsistencyPenalties::default());
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_clamped_at_zero() {
        let map = results(json!({
            "a_rate": 1_000_000_000,
            "b_rate": 2_000_000_000,
            "c_rate": -1,
            "count_note": "count"
        }));
        assert_eq!(consistency_score(&map, &ConsistencyPenalties::default()), 0.0);
    }

    #[test]
    fn test_consistency_custom_penalties() {
        let penalties = ConsistencyPenalties {
            large_value: 0.5,
            large_value_limit: 100.0,
            ..ConsistencyPenalties::default()
        };
        let map = results(json!({"orders": 101}));
        assert_eq!(consistency_score(&map, &penalties), 0.5);
    }
}
