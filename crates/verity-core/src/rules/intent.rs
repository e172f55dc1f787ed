//! Rules that check results against what the query or intent asked for.

use crate::bundle::AnalysisBundle;
use crate::keywords::{contains_any, COUNT_KEYWORDS, RATE_INTENT_KEYWORDS};

use super::{RuleId, SemanticRule};

/// A counting query whose results include a negative number.
pub struct NegativeCountRule;

impl SemanticRule for NegativeCountRule {
    fn id(&self) -> RuleId {
        RuleId::NegativeCount
    }

    fn description(&self) -> &'static str {
        "Counting query produced a negative result"
    }

    fn fires(&self, query: &str, bundle: &AnalysisBundle) -> bool {
        contains_any(query, COUNT_KEYWORDS)
            && bundle
                .results
                .values()
                .filter_map(|v| v.as_number())
                .any(|n| n < 0.0)
    }
}

/// A rate or percentage intent whose results include a number above 100.
pub struct RateOverflowRule;

impl SemanticRule for RateOverflowRule {
    fn id(&self) -> RuleId {
        RuleId::RateOverflow
    }

    fn description(&self) -> &'static str {
        "Rate or percentage analysis produced a value above 100"
    }

    fn fires(&self, _query: &str, bundle: &AnalysisBundle) -> bool {
        contains_any(&bundle.query, RATE_INTENT_KEYWORDS)
            && bundle
                .results
                .values()
                .filter_map(|v| v.as_number())
                .any(|n| n > 100.0)
    }
}
