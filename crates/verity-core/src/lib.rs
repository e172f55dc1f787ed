//! # verity-core
//!
//! Deterministic trust evaluation for generated data-analysis answers.
//!
//! An analysis bundle holds a natural-language intent, the database queries
//! issued for it, the computed results, execution logs, and optionally an
//! independently computed reference. This crate answers:
//! - Do the queries mean what the intent asked for?
//! - Did they run, and did they return anything usable?
//! - Do the results agree with the reference?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same bundle always produces the same metrics
//! 2. **Infallible evaluation**: Every empty input has a defined rate
//! 3. **Strict verdict**: PASS only if all four metrics meet their thresholds
//! 4. **Traceable**: Every flagged query names the rule that fired
//!
//! ## Example
//!
//! ```rust,ignore
//! use verity_core::{AnalysisBundle, evaluate};
//!
//! let bundle = AnalysisBundle::from_file("bundle.yaml")?;
//! let metrics = evaluate(&bundle);
//!
//! if metrics.overall_pass {
//!     println!("PASS: accuracy {:.2}", metrics.accuracy_rate);
//! } else {
//!     for row in metrics.comparison_table.mismatches() {
//!         println!("{}: {} vs {}", row.metric, row.candidate, row.reference);
//!     }
//! }
//! ```

pub mod bundle;
pub mod compare;
pub mod config;
pub mod evaluator;
pub mod keywords;
pub mod metrics;
pub mod report;
pub mod rules;
pub mod table;
pub mod types;
pub mod verdict;

// Re-export main types at crate root
pub use bundle::{load_result_map, AnalysisBundle, BundleError};
pub use compare::{values_match, values_match_within, DEFAULT_TOLERANCE};
pub use config::{ConfigError, ConsistencyPenalties, EvaluatorConfig, Thresholds};
pub use evaluator::Evaluator;
pub use rules::{RuleId, SemanticErrorDetector, SemanticFinding, SemanticRule};
pub use table::{ComparisonRow, ComparisonTable, MatchStatus};
pub use types::{AccuracySource, EvaluationMetrics, ExecutionLog, ResultMap, Value};
pub use verdict::{Bound, MetricKind, MetricRates, ThresholdCheck, VerdictGate};

/// Evaluate a bundle with the default configuration.
///
/// This is the main entry point. Accuracy comes from the bundle's reference
/// results when present, otherwise from the consistency heuristic.
pub fn evaluate(bundle: &AnalysisBundle) -> EvaluationMetrics {
    Evaluator::new().evaluate(bundle)
}

/// Evaluate with an external ground truth.
///
/// # Arguments
///
/// * `bundle` - The analysis to evaluate
/// * `ground_truth` - Expected results, used only when the bundle carries no
///   reference results of its own
pub fn evaluate_with_ground_truth(bundle: &AnalysisBundle, ground_truth: &ResultMap) -> EvaluationMetrics {
    Evaluator::new().evaluate_with_ground_truth(bundle, Some(ground_truth))
}
