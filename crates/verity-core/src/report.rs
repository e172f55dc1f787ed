//! Markdown rendering of evaluation results.
//!
//! Two flavors share a header and the metric table:
//! - [`render_full`] adds the comparison table, semantic findings and the
//!   issued queries;
//! - [`render_summary`] adds the raw candidate results instead.
//!
//! Rates are shown as percentages with two decimals. Row marks come from the
//! thresholds stored in the metrics, so they always agree with the verdict.

use std::fmt::Write;

use crate::bundle::AnalysisBundle;
use crate::table::ComparisonTable;
use crate::types::EvaluationMetrics;
use crate::verdict::ThresholdCheck;

const PASS_MARK: &str = "✅";
const FAIL_MARK: &str = "❌";

/// Full report: verdict, intent, comparison table, metrics, findings,
/// queries and timestamp.
pub fn render_full(metrics: &EvaluationMetrics, bundle: &AnalysisBundle) -> String {
    let mut out = header(metrics, bundle);

    out.push_str("### Candidate vs Reference\n\n");
    write_comparison(&mut out, &metrics.comparison_table);

    write_metrics(&mut out, metrics);

    if !metrics.semantic_findings.is_empty() {
        out.push_str("### Semantic Findings\n\n");
        for finding in &metrics.semantic_findings {
            let _ = writeln!(
                out,
                "- Query {}: `{}` ({})",
                finding.query_index + 1,
                finding.rule,
                finding.query.trim()
            );
        }
        out.push('\n');
    }

    out.push_str("### Issued Queries\n\n");
    if bundle.queries.is_empty() {
        out.push_str("No queries were issued.\n\n");
    }
    for (i, query) in bundle.queries.iter().enumerate() {
        let _ = writeln!(out, "{}. ```javascript\n{}\n```\n", i + 1, query);
    }

    write_timestamp(&mut out, bundle);
    out
}

/// Summary report: verdict, intent, metrics, raw results and timestamp.
pub fn render_summary(metrics: &EvaluationMetrics, bundle: &AnalysisBundle) -> String {
    let mut out = header(metrics, bundle);

    write_metrics(&mut out, metrics);

    out.push_str("### Computed Results\n\n");
    if bundle.results.is_empty() {
        out.push_str("No results.\n");
    }
    for (metric, value) in &bundle.results {
        let _ = writeln!(out, "- **{}**: {}", metric, value);
    }
    out.push('\n');

    write_timestamp(&mut out, bundle);
    out
}

/// `12.34%` for `0.1234`.
pub fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn verdict_label(pass: bool) -> String {
    if pass {
        format!("{} PASS", PASS_MARK)
    } else {
        format!("{} FAIL", FAIL_MARK)
    }
}

fn header(metrics: &EvaluationMetrics, bundle: &AnalysisBundle) -> String {
    let mut out = String::new();
    out.push_str("# Analysis Evaluation\n\n");
    let _ = writeln!(out, "## Verdict: {}\n", verdict_label(metrics.overall_pass));
    out.push_str("### Analysis Intent\n\n");
    let _ = writeln!(out, "```\n{}\n```\n", bundle.query);
    out
}

fn write_comparison(out: &mut String, table: &ComparisonTable) {
    if table.is_empty() {
        out.push_str("No comparison data.\n\n");
        return;
    }

    out.push_str("| Metric | Candidate | Reference | Status | Difference |\n");
    out.push_str("|--------|-----------|-----------|--------|------------|\n");
    for row in table {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            row.metric, row.candidate, row.reference, row.status, row.difference
        );
    }

    if let Some(ratio) = table.match_ratio() {
        let _ = writeln!(
            out,
            "\n{} of {} compared metrics matched ({}).",
            table.matched_count(),
            table.compared_count(),
            percent(ratio)
        );
    }
    out.push('\n');
}

fn write_metrics(out: &mut String, metrics: &EvaluationMetrics) {
    out.push_str("### Core Metrics\n\n");
    out.push_str("| Metric | Value | Threshold | Status |\n");
    out.push_str("|--------|-------|-----------|--------|\n");

    for check in metrics.checks() {
        write_check(out, &check);
    }

    let _ = writeln!(out, "\nAccuracy source: {}\n", metrics.accuracy_source);
}

fn write_check(out: &mut String, check: &ThresholdCheck) {
    let _ = writeln!(
        out,
        "| {} | {} | {}{} | {} |",
        check.metric,
        percent(check.value),
        check.bound.symbol(),
        percent(check.threshold),
        if check.passed { PASS_MARK } else { FAIL_MARK }
    );
}

fn write_timestamp(out: &mut String, bundle: &AnalysisBundle) {
    let _ = writeln!(out, "**Evaluated at**: {}", bundle.timestamp.to_rfc3339());
}
