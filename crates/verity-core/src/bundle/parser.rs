//! Bundle construction and parsing from YAML/JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{ExecutionLog, ResultMap, Value};

use super::schema::validate_bundle_schema;

/// Errors that can occur when loading bundles or result maps.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read bundle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bundle failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Unsupported file format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

/// A generated analysis answer submitted for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    /// Free-text analysis intent
    pub query: String,

    /// Database queries actually issued, in order
    #[serde(default)]
    pub queries: Vec<String>,

    /// Candidate results keyed by metric name
    #[serde(default)]
    pub results: ResultMap,

    /// Execution records from the pipeline
    #[serde(default)]
    pub execution_logs: Vec<ExecutionLog>,

    /// Results from an independent reference execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_results: Option<ResultMap>,

    /// When the bundle was created
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl AnalysisBundle {
    /// Start a bundle for the given analysis intent, timestamped now.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            queries: Vec::new(),
            results: ResultMap::new(),
            execution_logs: Vec::new(),
            reference_results: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.queries = queries;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn with_results(mut self, results: ResultMap) -> Self {
        self.results = results;
        self
    }

    /// Append one candidate result, keeping insertion order.
    pub fn with_result(mut self, metric: impl Into<String>, value: impl Into<Value>) -> Self {
        self.results.insert(metric.into(), value.into());
        self
    }

    pub fn with_execution_logs(mut self, logs: Vec<ExecutionLog>) -> Self {
        self.execution_logs = logs;
        self
    }

    pub fn with_reference_results(mut self, reference: ResultMap) -> Self {
        self.reference_results = Some(reference);
        self
    }

    /// Append one reference result, creating the reference map if needed.
    pub fn with_reference(mut self, metric: impl Into<String>, value: impl Into<Value>) -> Self {
        self.reference_results
            .get_or_insert_with(ResultMap::new)
            .insert(metric.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Reference results, unless absent or empty.
    ///
    /// An empty reference map carries no evidence and is treated as absent.
    pub fn reference(&self) -> Option<&ResultMap> {
        self.reference_results.as_ref().filter(|r| !r.is_empty())
    }

    /// Parse a bundle from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, BundleError> {
        let document: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_document(document)
    }

    /// Parse a bundle from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Parse a bundle file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = fs::read_to_string(path)?;

        match format {
            Format::Yaml => Self::from_yaml(&contents),
            Format::Json => Self::from_json(&contents),
        }
    }

    /// Validate a parsed document against the schema, then deserialize it.
    fn from_document(document: serde_json::Value) -> Result<Self, BundleError> {
        validate_bundle_schema(&document)?;
        let bundle: AnalysisBundle = serde_json::from_value(document)?;
        Ok(bundle)
    }
}

/// Parse a flat metric-name mapping (e.g. ground truth) from YAML.
pub fn result_map_from_yaml(yaml: &str) -> Result<ResultMap, BundleError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse a flat metric-name mapping (e.g. ground truth) from JSON.
pub fn result_map_from_json(json: &str) -> Result<ResultMap, BundleError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a flat metric-name mapping from a YAML or JSON file.
pub fn load_result_map(path: impl AsRef<Path>) -> Result<ResultMap, BundleError> {
    let path = path.as_ref();
    let format = Format::of(path)?;
    let contents = fs::read_to_string(path)?;

    match format {
        Format::Yaml => result_map_from_yaml(&contents),
        Format::Json => result_map_from_json(&contents),
    }
}

enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, BundleError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            _ => Err(BundleError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BUNDLE: &str = r#"
query: "Analyze users, chats and operator connection rate"
queries:
  - "db.care.find({'message': 'Received retrieval request'})"
  - "db.care.find({'content': {'$regex': 'operator'}})"
results:
  user_count: 3
  chat_count: 8
  operator_connection_rate: 33.33
reference_results:
  user_count: 3
  chat_count: 7
execution_logs:
  - status: success
    query_index: 0
    execution_time: 0.1
  - status: success
    query_index: 1
timestamp: "2025-06-01T12:00:00Z"
"#;

    #[test]
    fn test_parse_valid_bundle() {
        let bundle = AnalysisBundle::from_yaml(VALID_BUNDLE).unwrap();
        assert_eq!(bundle.queries.len(), 2);
        assert_eq!(bundle.results.len(), 3);
        assert_eq!(bundle.results["chat_count"], Value::Number(8.0));
        assert_eq!(bundle.execution_logs.len(), 2);
        assert_eq!(bundle.timestamp.to_rfc3339(), "2025-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_results_keep_document_order() {
        let bundle = AnalysisBundle::from_yaml(VALID_BUNDLE).unwrap();
        let keys: Vec<&str> = bundle.results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["user_count", "chat_count", "operator_connection_rate"]);
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let before = Utc::now();
        let bundle = AnalysisBundle::from_json(r#"{"query": "q"}"#).unwrap();
        assert!(bundle.queries.is_empty());
        assert!(bundle.results.is_empty());
        assert!(bundle.execution_logs.is_empty());
        assert!(bundle.reference_results.is_none());
        assert!(bundle.timestamp >= before);
    }

    #[test]
    fn test_schema_violation_reported() {
        let result = AnalysisBundle::from_json(r#"{"queries": "not a list"}"#);
        match result {
            Err(BundleError::Schema(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let result = AnalysisBundle::from_yaml("query: [unclosed");
        assert!(matches!(result, Err(BundleError::Yaml(_))));
    }

    #[test]
    fn test_empty_reference_treated_as_absent() {
        let bundle = AnalysisBundle::new("q").with_reference_results(ResultMap::new());
        assert!(bundle.reference_results.is_some());
        assert!(bundle.reference().is_none());

        let bundle = bundle.with_reference("n", 1);
        assert_eq!(bundle.reference().map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AnalysisBundle::from_file("does/not/exist/bundle.yaml");
        assert!(matches!(result, Err(BundleError::Io(_))));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let result = AnalysisBundle::from_json("{\"query\": ");
        assert!(matches!(result, Err(BundleError::Json(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_result_map("ground_truth.csv");
        assert!(matches!(result, Err(BundleError::UnsupportedFormat(_))));

        let result = AnalysisBundle::from_file("bundle");
        assert!(matches!(result, Err(BundleError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_result_map_parsing() {
        let map = result_map_from_yaml("total_users: 1247\nactivation_rate: 78.7\n").unwrap();
        assert_eq!(map["total_users"], Value::Number(1247.0));

        let map = result_map_from_json(r#"{"status": "ok", "tags": ["a"]}"#).unwrap();
        assert_eq!(map["status"], Value::Text("ok".into()));
        assert_eq!(map["tags"].collection_len(), Some(1));
    }

    #[test]
    fn test_builder_roundtrips_through_json() {
        let bundle = AnalysisBundle::new("q")
            .with_query("db.c.find()")
            .with_result("n", 1)
            .with_reference("n", 2)
            .with_execution_logs(vec![ExecutionLog::success()]);

        let json = serde_json::to_string(&bundle).unwrap();
        let parsed = AnalysisBundle::from_json(&json).unwrap();
        assert_eq!(parsed, bundle);
    }
}
