//! Evaluator: runs every component over one bundle.
//!
//! Flow: bundle → comparison table → four metrics → verdict gate →
//! [`EvaluationMetrics`]. Nothing is mutated and nothing can fail; identical
//! input yields identical output.

use crate::bundle::AnalysisBundle;
use crate::config::{EvaluatorConfig, Thresholds};
use crate::metrics;
use crate::rules::SemanticErrorDetector;
use crate::table::build_table;
use crate::types::{EvaluationMetrics, ResultMap};
use crate::verdict::{MetricRates, VerdictGate};

/// Evaluates analysis bundles under a fixed configuration.
#[derive(Debug)]
pub struct Evaluator {
    config: EvaluatorConfig,
    detector: SemanticErrorDetector,
}

impl Evaluator {
    /// Evaluator with default thresholds, tolerance and penalties.
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self {
            config,
            detector: SemanticErrorDetector::new(),
        }
    }

    /// Default configuration apart from the thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self::with_config(EvaluatorConfig::with_thresholds(thresholds))
    }

    /// Replace the semantic rule set.
    pub fn with_detector(mut self, detector: SemanticErrorDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn detector(&self) -> &SemanticErrorDetector {
        &self.detector
    }

    pub fn gate(&self) -> VerdictGate {
        VerdictGate::new(self.config.thresholds)
    }

    /// Evaluate a bundle without external ground truth.
    pub fn evaluate(&self, bundle: &AnalysisBundle) -> EvaluationMetrics {
        self.evaluate_with_ground_truth(bundle, None)
    }

    /// Evaluate a bundle, using `ground_truth` for accuracy when the bundle
    /// carries no reference results of its own.
    pub fn evaluate_with_ground_truth(
        &self,
        bundle: &AnalysisBundle,
        ground_truth: Option<&ResultMap>,
    ) -> EvaluationMetrics {
        let comparison_table = build_table(bundle, self.config.tolerance);

        let semantic_findings = self.detector.findings(bundle);
        let semantic_error_rate = metrics::semantic_error_rate(&semantic_findings, bundle.queries.len());
        let execution_success_rate = metrics::execution_success_rate(bundle);
        let empty_result_rate = metrics::empty_result_rate(bundle);
        let accuracy = metrics::accuracy_rate(
            bundle,
            ground_truth,
            self.config.tolerance,
            &self.config.penalties,
        );

        tracing::debug!(source = %accuracy.source, rate = accuracy.rate, "Accuracy tier selected");

        let rates = MetricRates {
            semantic_error: semantic_error_rate,
            execution_success: execution_success_rate,
            empty_result: empty_result_rate,
            accuracy: accuracy.rate,
        };
        let overall_pass = self.gate().decide(&rates);

        tracing::debug!(
            semantic_error_rate,
            execution_success_rate,
            empty_result_rate,
            accuracy_rate = accuracy.rate,
            overall_pass,
            "Evaluation complete"
        );

        EvaluationMetrics {
            semantic_error_rate,
            execution_success_rate,
            empty_result_rate,
            accuracy_rate: accuracy.rate,
            overall_pass,
            thresholds: self.config.thresholds,
            accuracy_source: accuracy.source,
            comparison_table,
            semantic_findings,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
