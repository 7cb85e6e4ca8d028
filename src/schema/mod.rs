//! Table schemas
//!
//! A [`Schema`] owns an ordered list of [`Field`]s plus primary and foreign key
//! declarations, casts whole rows, and validates its own JSON form through an
//! injected [`StructureValidator`].
//!
//! In strict mode structural problems are returned as errors immediately. In
//! non-strict mode they are recorded and the schema keeps working; callers
//! inspect [`Schema::errors`] to find out what was wrong.
//!
//! ## Example
//!
//! ```rust
//! use table_schema::schema::Schema;
//!
//! let schema = Schema::from_json(
//!     r#"{"fields": [{"name": "id", "type": "integer"}, {"name": "name"}], "primaryKey": "id"}"#,
//!     true,
//! ).unwrap();
//!
//! let row = schema.cast_row(&["1", "Alice"]).unwrap();
//! assert_eq!(row.len(), 2);
//! ```

mod error;
mod keys;
mod validator;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::field::{CastError, CellValue, Field, FieldType};
use crate::inference::{InferenceConfig, InferenceError, TypeInferrer};

pub use error::SchemaError;
pub use keys::{ForeignKey, ForeignKeyReference, KeyFields};
pub use validator::{MetaSchemaValidator, StructureValidator};

/// Serialized form of a schema
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDocument {
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_key: Option<KeyFields>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    foreign_keys: Vec<ForeignKey>,
}

/// Deserialize one field descriptor, naming an unregistered type precisely
fn field_from_value(entry: Value) -> Result<Field, SchemaError> {
    let type_name = entry.get("type").and_then(Value::as_str).map(str::to_string);
    serde_json::from_value(entry).map_err(|e| match type_name {
        Some(name) => match name.parse::<FieldType>() {
            Err(unknown) => SchemaError::UnknownFieldType(unknown),
            Ok(_) => e.into(),
        },
        None => e.into(),
    })
}

/// Ordered collection of fields describing a table
#[derive(Clone)]
pub struct Schema {
    fields: Vec<Field>,
    primary_key: Option<KeyFields>,
    foreign_keys: Vec<ForeignKey>,
    strict: bool,
    errors: Vec<SchemaError>,
    validator: Arc<dyn StructureValidator>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("primary_key", &self.primary_key)
            .field("foreign_keys", &self.foreign_keys)
            .field("strict", &self.strict)
            .field("errors", &self.errors)
            .finish()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Schema {
    /// Empty schema validated against the bundled meta-schema
    pub fn new(strict: bool) -> Self {
        Self::with_validator(strict, Arc::new(MetaSchemaValidator))
    }

    /// Empty schema with a caller-supplied structural validator
    pub fn with_validator(strict: bool, validator: Arc<dyn StructureValidator>) -> Self {
        Self {
            fields: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            strict,
            errors: Vec::new(),
            validator,
        }
    }

    pub fn from_json(json: &str, strict: bool) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(document, strict)
    }

    pub fn from_value(document: Value, strict: bool) -> Result<Self, SchemaError> {
        Self::new(strict).load_document(document)
    }

    /// Build from a document using a caller-supplied validator
    pub fn from_value_with_validator(
        document: Value,
        strict: bool,
        validator: Arc<dyn StructureValidator>,
    ) -> Result<Self, SchemaError> {
        Self::with_validator(strict, validator).load_document(document)
    }

    /// Read a schema document from disk
    pub fn load(path: impl AsRef<Path>, strict: bool) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content, strict)
    }

    /// Write the schema document to disk as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        std::fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }

    fn load_document(mut self, document: Value) -> Result<Self, SchemaError> {
        let violations = self.validator.validate(&document);
        if !violations.is_empty() {
            self.record(SchemaError::Structural(violations))?;
        }

        let parsed = if self.strict {
            serde_json::from_value(document)?
        } else {
            self.parse_leniently(document)
        };
        self.fields = parsed.fields;
        debug!(fields = self.fields.len(), strict = self.strict, "loaded schema document");

        if let Some(primary_key) = parsed.primary_key {
            self.set_primary_key(primary_key)?;
        }
        for foreign_key in parsed.foreign_keys {
            self.add_foreign_key(foreign_key)?;
        }
        Ok(self)
    }

    /// Read a document part by part, recording every entry that does not
    /// deserialize and keeping the rest.
    fn parse_leniently(&mut self, document: Value) -> SchemaDocument {
        let mut parsed = SchemaDocument {
            fields: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
        };
        let Value::Object(mut document) = document else {
            self.note(SchemaError::InvalidDocument("expected a JSON object".to_string()));
            return parsed;
        };

        match document.remove("fields") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    match field_from_value(entry) {
                        Ok(field) => parsed.fields.push(field),
                        Err(e) => self.note(e),
                    }
                }
            }
            Some(other) => self.note(SchemaError::InvalidDocument(format!(
                "fields must be an array, got {}",
                other
            ))),
            None => {}
        }

        if let Some(primary_key) = document.remove("primaryKey") {
            match serde_json::from_value(primary_key) {
                Ok(primary_key) => parsed.primary_key = Some(primary_key),
                Err(e) => self.note(e.into()),
            }
        }

        match document.remove("foreignKeys") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    match serde_json::from_value(entry) {
                        Ok(foreign_key) => parsed.foreign_keys.push(foreign_key),
                        Err(e) => self.note(e.into()),
                    }
                }
            }
            Some(other) => self.note(SchemaError::InvalidDocument(format!(
                "foreignKeys must be an array, got {}",
                other
            ))),
            None => {}
        }

        parsed
    }

    /// Record an error regardless of mode
    fn note(&mut self, error: SchemaError) {
        warn!(error = %error, "recording schema error");
        self.errors.push(error);
    }

    /// Infer a schema from sample rows
    ///
    /// Fails with [`InferenceError::NoRecords`] when a column has no
    /// sample values to infer from.
    pub fn infer<H, R, S>(
        headers: &[H],
        rows: &[R],
        config: &InferenceConfig,
        strict: bool,
    ) -> Result<Self, InferenceError>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut inferrer = TypeInferrer::with_config(headers, config.clone());
        inferrer.add_rows(rows)?;
        inferrer.finalize().into_schema(strict)
    }

    /// Raise in strict mode, record otherwise
    fn record(&mut self, error: SchemaError) -> Result<(), SchemaError> {
        if self.strict {
            return Err(error);
        }
        self.note(error);
        Ok(())
    }

    /// Append a field and re-validate the whole schema.
    ///
    /// Strict mode rejects a field that makes the schema invalid and leaves
    /// the schema unchanged; non-strict mode keeps it and records the error.
    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaError> {
        self.fields.push(field);
        let violations = self.validator.validate(&self.to_value()?);
        if violations.is_empty() {
            return Ok(());
        }
        let error = SchemaError::Structural(violations);
        if self.strict {
            self.fields.pop();
            return Err(error);
        }
        self.record(error)
    }

    /// Re-run structural validation over the current schema
    pub fn validate(&mut self) -> Result<(), SchemaError> {
        let violations = self.validator.validate(&self.to_value()?);
        if violations.is_empty() {
            Ok(())
        } else {
            self.record(SchemaError::Structural(violations))
        }
    }

    pub fn set_primary_key(&mut self, key: impl Into<KeyFields>) -> Result<(), SchemaError> {
        let key = key.into();
        for name in key.names() {
            if !self.has_field(name) {
                self.record(SchemaError::UnknownKeyField {
                    key: "primaryKey",
                    field: name.to_string(),
                })?;
            }
        }
        self.primary_key = Some(key);
        Ok(())
    }

    /// Declare a foreign key.
    ///
    /// Mismatched field list lengths are always an error; undeclared local
    /// fields follow the strict/non-strict policy.
    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> Result<(), SchemaError> {
        let local = foreign_key.fields.len();
        let reference = foreign_key.reference.fields.len();
        if local != reference {
            return Err(SchemaError::KeyCardinality { local, reference });
        }

        for name in foreign_key.fields.names() {
            if !self.has_field(name) {
                self.record(SchemaError::UnknownKeyField {
                    key: "foreignKeys",
                    field: name.to_string(),
                })?;
            }
        }
        if foreign_key.is_self_reference() {
            for name in foreign_key.reference.fields.names() {
                if !self.has_field(name) {
                    self.record(SchemaError::UnknownKeyField {
                        key: "foreignKeys.reference",
                        field: name.to_string(),
                    })?;
                }
            }
        }

        self.foreign_keys.push(foreign_key);
        Ok(())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Declared headers, in column order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn primary_key(&self) -> Option<&KeyFields> {
        self.primary_key.as_ref()
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Errors recorded in non-strict mode
    pub fn errors(&self) -> &[SchemaError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Cast one row, cell by cell.
    ///
    /// The row must have exactly one cell per field. Constraints are not
    /// enforced here; the first failing cell aborts the whole row.
    pub fn cast_row<S: AsRef<str>>(&self, row: &[S]) -> Result<Vec<CellValue>, CastError> {
        if row.len() != self.fields.len() {
            return Err(CastError::RowLength {
                expected: self.fields.len(),
                actual: row.len(),
            });
        }

        self.fields
            .iter()
            .zip(row)
            .enumerate()
            .map(|(index, (field, cell))| {
                let raw = cell.as_ref();
                let parsed = if raw.is_empty() {
                    Ok(CellValue::Null)
                } else {
                    field.parse_value(raw)
                };
                parsed.map_err(|source| CastError::Cell {
                    index,
                    name: field.name.clone(),
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// [`Schema::cast_row`] keyed by field name
    pub fn cast_row_map<S: AsRef<str>>(
        &self,
        row: &[S],
    ) -> Result<BTreeMap<String, CellValue>, CastError> {
        let values = self.cast_row(row)?;
        Ok(self
            .fields
            .iter()
            .map(|f| f.name.clone())
            .zip(values)
            .collect())
    }

    pub fn to_value(&self) -> Result<Value, SchemaError> {
        let document = SchemaDocument {
            fields: self.fields.clone(),
            primary_key: self.primary_key.clone(),
            foreign_keys: self.foreign_keys.clone(),
        };
        Ok(serde_json::to_value(document)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::UnknownFieldType;
    use serde_json::json;

    struct RejectAll;

    struct AcceptAll;

    impl StructureValidator for AcceptAll {
        fn validate(&self, _document: &Value) -> Vec<String> {
            Vec::new()
        }
    }

    impl StructureValidator for RejectAll {
        fn validate(&self, _document: &Value) -> Vec<String> {
            vec!["rejected".to_string()]
        }
    }

    #[test]
    fn test_add_field_valid() {
        let mut schema = Schema::new(true);
        schema.add_field(Field::new("id", FieldType::Integer)).unwrap();
        assert_eq!(schema.field_names(), vec!["id"]);
        assert!(schema.is_valid());
    }

    #[test]
    fn test_add_invalid_field_strict() {
        let mut schema = Schema::new(true);
        let err = schema
            .add_field(Field::new("", FieldType::String))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Structural(_)));
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn test_add_invalid_field_non_strict_keeps_field() {
        let mut schema = Schema::new(false);
        schema.add_field(Field::new("", FieldType::String)).unwrap();
        assert_eq!(schema.fields().len(), 1);
        assert!(!schema.is_valid());
        assert!(matches!(schema.errors()[0], SchemaError::Structural(_)));
    }

    #[test]
    fn test_injected_validator() {
        let mut schema = Schema::with_validator(false, Arc::new(RejectAll));
        schema.add_field(Field::new("id", FieldType::Integer)).unwrap();
        assert_eq!(schema.errors(), &[SchemaError::Structural(vec!["rejected".to_string()])]);
    }

    #[test]
    fn test_primary_key_unknown_field() {
        let mut strict = Schema::new(true);
        strict.add_field(Field::new("id", FieldType::Integer)).unwrap();
        assert_eq!(
            strict.set_primary_key("missing"),
            Err(SchemaError::UnknownKeyField {
                key: "primaryKey",
                field: "missing".to_string()
            })
        );
        assert!(strict.primary_key().is_none());

        let mut lenient = Schema::new(false);
        lenient.add_field(Field::new("id", FieldType::Integer)).unwrap();
        lenient.set_primary_key(vec!["id", "missing"]).unwrap();
        assert_eq!(lenient.errors().len(), 1);
        assert_eq!(lenient.primary_key().map(KeyFields::len), Some(2));
    }

    #[test]
    fn test_foreign_key_cardinality_is_always_fatal() {
        let mut lenient = Schema::new(false);
        lenient.add_field(Field::new("a", FieldType::Integer)).unwrap();
        lenient.add_field(Field::new("b", FieldType::Integer)).unwrap();
        let err = lenient
            .add_foreign_key(ForeignKey::new(vec!["a", "b"], "other", vec!["x"]))
            .unwrap_err();
        assert_eq!(err, SchemaError::KeyCardinality { local: 2, reference: 1 });
        assert!(lenient.foreign_keys().is_empty());
    }

    #[test]
    fn test_self_referencing_foreign_key() {
        let mut schema = Schema::new(true);
        schema.add_field(Field::new("id", FieldType::Integer)).unwrap();
        schema.add_field(Field::new("parent", FieldType::Integer)).unwrap();
        schema
            .add_foreign_key(ForeignKey::new("parent", "", "id"))
            .unwrap();
        assert!(
            schema
                .add_foreign_key(ForeignKey::new("parent", "", "nope"))
                .is_err()
        );
        assert_eq!(schema.foreign_keys().len(), 1);
    }

    #[test]
    fn test_document_round_trip() {
        let document = json!({
            "fields": [
                {"name": "id", "type": "integer", "constraints": {"required": true}},
                {"name": "location", "type": "geopoint", "format": "array"}
            ],
            "primaryKey": "id",
            "foreignKeys": [
                {"fields": "id", "reference": {"resource": "people", "fields": "person_id"}}
            ]
        });
        let schema = Schema::from_value(document.clone(), true).unwrap();
        assert_eq!(schema.to_value().unwrap(), document);
    }

    #[test]
    fn test_non_strict_load_skips_unreadable_entries() {
        let document = json!({
            "fields": [
                {"name": "a", "type": "decimal"},
                {"name": "b", "type": "integer"},
                {"name": "c", "type": "string", "constraints": {"minLength": "two"}}
            ],
            "primaryKey": "a",
            "foreignKeys": [{"fields": 3}]
        });
        let schema = Schema::from_value_with_validator(document, false, Arc::new(AcceptAll)).unwrap();

        assert_eq!(schema.field_names(), vec!["b"]);
        assert_eq!(
            schema.errors()[0],
            SchemaError::UnknownFieldType(UnknownFieldType("decimal".to_string()))
        );
        assert!(matches!(schema.errors()[1], SchemaError::InvalidDocument(_)));
        assert!(matches!(schema.errors()[2], SchemaError::InvalidDocument(_)));
        assert_eq!(
            schema.errors()[3],
            SchemaError::UnknownKeyField {
                key: "primaryKey",
                field: "a".to_string()
            }
        );
        assert_eq!(schema.errors().len(), 4);
    }

    #[test]
    fn test_strict_load_rejects_unknown_type() {
        let document = json!({"fields": [{"name": "a", "type": "decimal"}]});
        let err = Schema::from_value_with_validator(document, true, Arc::new(AcceptAll)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument(_)));
    }

    #[test]
    fn test_non_strict_load_of_non_object() {
        let schema = Schema::from_value_with_validator(json!([1, 2]), false, Arc::new(AcceptAll)).unwrap();
        assert!(schema.fields().is_empty());
        assert!(matches!(schema.errors()[0], SchemaError::InvalidDocument(_)));
    }

    #[test]
    fn test_debug_omits_validator() {
        let schema = Schema::new(true);
        let debug = format!("{:?}", schema);
        assert!(debug.starts_with("Schema {"));
    }
}
