//! Shape check for bundle documents.
//!
//! A parsed YAML/JSON document is checked against the draft-07 schema in
//! `schema/analysis_bundle.schema.json` before serde sees it. Every violation
//! is reported as `<instance path>: <message>`, so a bad bundle lists all of
//! its problems at once.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value as Document;

use super::parser::BundleError;

const SCHEMA_SOURCE: &str = include_str!("../../schema/analysis_bundle.schema.json");

/// The bundle schema, compiled on first use.
pub struct BundleSchema {
    validator: Validator,
}

impl BundleSchema {
    /// The shared compiled schema.
    ///
    /// A schema that fails to compile is reported as a single
    /// [`BundleError::Schema`] message on every call.
    pub fn shared() -> Result<&'static BundleSchema, BundleError> {
        static SHARED: OnceLock<Result<BundleSchema, String>> = OnceLock::new();

        SHARED
            .get_or_init(Self::compile)
            .as_ref()
            .map_err(|reason| BundleError::Schema(vec![reason.clone()]))
    }

    fn compile() -> Result<Self, String> {
        let source: Document = serde_json::from_str(SCHEMA_SOURCE)
            .map_err(|e| format!("bundle schema is not valid JSON: {}", e))?;
        let validator = jsonschema::draft7::new(&source)
            .map_err(|e| format!("bundle schema does not compile: {}", e))?;
        Ok(Self { validator })
    }

    /// Every violation in `document`, in validator order.
    pub fn violations(&self, document: &Document) -> Vec<String> {
        self.validator
            .iter_errors(document)
            .map(|error| {
                let path = error.instance_path.to_string();
                let at = if path.is_empty() { "(root)" } else { path.as_str() };
                format!("{}: {}", at, error)
            })
            .collect()
    }

    /// `Ok` for a conforming document, otherwise all violations.
    pub fn check(&self, document: &Document) -> Result<(), BundleError> {
        let violations = self.violations(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BundleError::Schema(violations))
        }
    }
}

/// Check a document against the bundle schema.
pub fn validate_bundle_schema(document: &Document) -> Result<(), BundleError> {
    BundleSchema::shared()?.check(document)
}

/// Whether a document conforms to the bundle schema.
pub fn is_valid_bundle(document: &Document) -> bool {
    BundleSchema::shared().is_ok_and(|schema| schema.validator.is_valid(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations_of(document: Document) -> Vec<String> {
        match validate_bundle_schema(&document) {
            Err(BundleError::Schema(violations)) => violations,
            other => panic!("expected schema violations, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_compiles() {
        assert!(BundleSchema::shared().is_ok());
    }

    #[test]
    fn test_intent_only_bundle_conforms() {
        assert!(validate_bundle_schema(&json!({ "query": "How many users?" })).is_ok());
    }

    #[test]
    fn test_missing_intent_reported_at_root() {
        let violations = violations_of(json!({ "queries": ["db.users.count()"] }));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("(root): "));
        assert!(violations[0].contains("query"));
    }

    #[test]
    fn test_violation_names_instance_path() {
        let violations = violations_of(json!({ "query": "q", "queries": ["ok", 42] }));
        assert!(violations.iter().any(|v| v.starts_with("/queries/1: ")));
    }

    #[test]
    fn test_all_violations_reported() {
        let violations = violations_of(json!({
            "query": 7,
            "results": [1, 2, 3],
            "execution_logs": [{ "status": 200 }]
        }));
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_null_reference_results_allowed() {
        let document = json!({
            "query": "q",
            "results": { "n": 1 },
            "reference_results": null
        });
        assert!(validate_bundle_schema(&document).is_ok());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let violations = violations_of(json!({ "query": "q", "direct_results": {} }));
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_care_bundle_conforms() {
        let document = json!({
            "query": "Analyze users, chats and operator connection rate",
            "queries": [
                "db.care.find({'message': 'Received retrieval request'})",
                "db.care.aggregate([{'$group': {'_id': '$user_id'}}])"
            ],
            "results": {
                "user_count": 3,
                "operator_connection_rate": 33.33,
                "top_users": ["a", "b"],
                "breakdown": { "web": 5, "app": 3 },
                "note": null
            },
            "reference_results": { "user_count": 3 },
            "execution_logs": [
                { "status": "success", "query_index": 0, "execution_time": 0.1 },
                { "status": "error", "error": "timeout" }
            ],
            "timestamp": "2025-06-01T12:00:00Z"
        });
        assert!(is_valid_bundle(&document));
    }

    #[test]
    fn test_is_valid_bundle_rejects_missing_intent() {
        assert!(!is_valid_bundle(&json!({ "results": {} })));
    }
}
