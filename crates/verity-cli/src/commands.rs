//! Subcommand handlers.
//!
//! Handlers build their whole output and exit status; `main` only prints
//! and exits. Load failures come back as errors and exit with status 1.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use verity_core::report::{render_full, render_summary};
use verity_core::{
    load_result_map, AnalysisBundle, Evaluator, EvaluatorConfig, SemanticErrorDetector,
};

use crate::cli::{CheckQueryArgs, Commands, EvaluateArgs, OutputFormat, RulesArgs};

/// Exit status when `--strict` is set and the verdict fails.
pub const EXIT_VERDICT_FAILED: i32 = 2;

/// Exit status for any command error.
pub const EXIT_FAILURE: i32 = 1;

/// What a command printed and how the process should exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn success(output: String) -> Self {
        Self { output, exit_code: 0 }
    }
}

pub fn run(command: Commands) -> Result<Outcome> {
    match command {
        Commands::Evaluate(args) => evaluate(args),
        Commands::CheckQuery(args) => Ok(check_query(args)),
        Commands::Rules(args) => rules(args),
    }
}

/// Process exit status for a command result.
pub fn exit_code(result: &Result<Outcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code,
        Err(_) => EXIT_FAILURE,
    }
}

pub fn evaluate(args: EvaluateArgs) -> Result<Outcome> {
    let bundle = AnalysisBundle::from_file(&args.bundle)
        .with_context(|| format!("failed to load bundle {}", args.bundle.display()))?;

    let config = match &args.config {
        Some(path) => EvaluatorConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EvaluatorConfig::default(),
    };

    let ground_truth = match &args.ground_truth {
        Some(path) => Some(
            load_result_map(path)
                .with_context(|| format!("failed to load ground truth {}", path.display()))?,
        ),
        None => None,
    };

    let metrics = Evaluator::with_config(config).evaluate_with_ground_truth(&bundle, ground_truth.as_ref());
    info!(pass = metrics.overall_pass, bundle = %args.bundle.display(), "evaluated bundle");

    let output = match args.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&metrics).context("failed to serialize metrics")?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => render_full(&metrics, &bundle),
        OutputFormat::Summary => render_summary(&metrics, &bundle),
    };

    let exit_code = if args.strict && !metrics.overall_pass {
        EXIT_VERDICT_FAILED
    } else {
        0
    };

    Ok(Outcome { output, exit_code })
}

pub fn check_query(args: CheckQueryArgs) -> Outcome {
    let bundle = AnalysisBundle::new(args.intent).with_query(args.query.clone());
    let detector = SemanticErrorDetector::new();

    let line = match detector.detect(&args.query, &bundle) {
        Some(rule) => {
            let description = detector
                .rules()
                .find(|r| r.id() == rule)
                .map(|r| r.description())
                .unwrap_or_default();
            format!("{}: {}\n", rule, description)
        }
        None => "clean\n".to_string(),
    };

    Outcome::success(line)
}

#[derive(Serialize)]
struct RuleListing {
    id: String,
    description: &'static str,
}

pub fn rules(args: RulesArgs) -> Result<Outcome> {
    let detector = SemanticErrorDetector::new();
    let listing: Vec<RuleListing> = detector
        .rules()
        .map(|r| RuleListing {
            id: r.id().to_string(),
            description: r.description(),
        })
        .collect();

    if args.json {
        let mut json = serde_json::to_string_pretty(&listing).context("failed to serialize rules")?;
        json.push('\n');
        return Ok(Outcome::success(json));
    }

    let output = listing
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {:<20} {}\n", i + 1, rule.id, rule.description))
        .collect();
    Ok(Outcome::success(output))
}
