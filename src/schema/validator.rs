//! Structural validation of schema documents

use jsonschema::{ValidationError, Validator};
use once_cell::sync::Lazy;
use serde_json::Value;

/// Yes/no-plus-reasons oracle over a schema's JSON form
pub trait StructureValidator: Send + Sync {
    /// Violations found in the document; empty when it is valid
    fn validate(&self, document: &Value) -> Vec<String>;
}

static TABLE_SCHEMA_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/table-schema.json"))
        .expect("embedded table-schema meta-schema is valid JSON");
    Validator::new(&schema).expect("embedded table-schema meta-schema compiles")
});

/// Validates against the bundled table-schema meta-schema
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSchemaValidator;

impl StructureValidator for MetaSchemaValidator {
    fn validate(&self, document: &Value) -> Vec<String> {
        TABLE_SCHEMA_VALIDATOR
            .iter_errors(document)
            .map(|error| format_validation_error(&error))
            .collect()
    }
}

/// Format validation error with path information
fn format_validation_error(error: &ValidationError<'_>) -> String {
    let path = error.instance_path().to_string();
    let path = if path == "/" || path.is_empty() {
        "root".to_string()
    } else {
        path
    };
    format!("at '{}': {}", path, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let document = json!({
            "fields": [{"name": "id", "type": "integer"}],
            "primaryKey": "id"
        });
        assert!(MetaSchemaValidator.validate(&document).is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let violations = MetaSchemaValidator.validate(&json!({"primaryKey": "id"}));
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_unknown_type_and_format() {
        let violations = MetaSchemaValidator.validate(&json!({
            "fields": [{"name": "a", "type": "decimal"}]
        }));
        assert!(!violations.is_empty());

        let violations = MetaSchemaValidator.validate(&json!({
            "fields": [{"name": "a", "type": "geopoint", "format": "topojson"}]
        }));
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_violation_mentions_path() {
        let violations = MetaSchemaValidator.validate(&json!({
            "fields": [{"name": ""}]
        }));
        assert!(violations.iter().any(|v| v.contains("/fields/0/name")));
    }
}
