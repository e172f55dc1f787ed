//! Analysis bundles: the input to an evaluation.
//!
//! A bundle carries the analysis intent, the queries the pipeline issued,
//! the results it produced, its execution log, and optionally results from
//! an independent reference execution. Bundles can be built in code or
//! loaded from YAML/JSON documents, which are checked against an embedded
//! JSON Schema first.

mod parser;
mod schema;

pub use parser::{load_result_map, result_map_from_json, result_map_from_yaml, AnalysisBundle, BundleError};
pub use schema::{is_valid_bundle, validate_bundle_schema, BundleSchema};
