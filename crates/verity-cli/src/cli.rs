use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "verity",
    version,
    about = "Evaluate generated data-analysis answers against references and heuristics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an analysis bundle and print its metrics
    Evaluate(EvaluateArgs),
    /// Run the semantic detector over a single query
    CheckQuery(CheckQueryArgs),
    /// List semantic rules in evaluation order
    Rules(RulesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Bundle document (.yaml, .yml or .json)
    pub bundle: PathBuf,

    /// Expected results, used when the bundle has no reference results
    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    /// Thresholds, tolerance and penalties
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Exit with status 2 when the verdict fails
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckQueryArgs {
    /// Query text to check
    pub query: String,

    /// Analysis intent, consulted by intent-aware rules
    #[arg(long, default_value = "")]
    pub intent: String,
}

#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_evaluate_args() {
        let cli = Cli::parse_from([
            "verity",
            "evaluate",
            "bundle.yaml",
            "--ground-truth",
            "truth.json",
            "--format",
            "summary",
            "--strict",
        ]);

        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.bundle, PathBuf::from("bundle.yaml"));
        assert_eq!(args.ground_truth, Some(PathBuf::from("truth.json")));
        assert_eq!(args.format, OutputFormat::Summary);
        assert!(args.strict);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_check_query_defaults() {
        let cli = Cli::parse_from(["verity", "check-query", "x == x"]);
        let Commands::CheckQuery(args) = cli.command else {
            panic!("expected check-query");
        };
        assert_eq!(args.query, "x == x");
        assert_eq!(args.intent, "");
    }
}
