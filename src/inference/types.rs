//! Inference results

use serde::{Deserialize, Serialize};

use super::error::InferenceError;
use crate::field::{CastOptions, Field, FieldType};
use crate::schema::Schema;

/// How many rows a type won for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeScore {
    pub field_type: FieldType,
    pub count: usize,
}

/// Inferred descriptor for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredField {
    /// Column header
    pub name: String,
    /// Winning type; `None` when the column had no evidence
    pub field_type: Option<FieldType>,
    /// Format locked for the winning type
    pub format: Option<String>,
    /// Scores in the order the types first won a row
    pub scores: Vec<TypeScore>,
}

impl InferredField {
    /// True when no row produced evidence for this column
    pub fn is_blank(&self) -> bool {
        self.field_type.is_none()
    }

    /// Score for a given type, zero when it never won a row
    pub fn score(&self, field_type: FieldType) -> usize {
        self.scores
            .iter()
            .find(|s| s.field_type == field_type)
            .map_or(0, |s| s.count)
    }

    /// Field descriptor for this column, `None` for blank columns
    pub fn to_field(&self, options: &CastOptions) -> Option<Field> {
        let field_type = self.field_type?;
        let mut field = Field::new(self.name.clone(), field_type).with_options(options.clone());
        if let Some(format) = &self.format {
            field = field.with_format(format.clone());
        }
        Some(field)
    }
}

/// Complete inference result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    /// One entry per header, in header order
    pub fields: Vec<InferredField>,
    /// Number of rows that were scored
    pub rows_scored: usize,
    /// Options used for the trial casts
    #[serde(default)]
    pub cast_options: CastOptions,
}

impl InferredSchema {
    pub fn field(&self, name: &str) -> Option<&InferredField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build a [`Schema`] from the inferred descriptors.
    ///
    /// Blank columns cannot be typed and fail with
    /// [`InferenceError::NoRecords`].
    pub fn into_schema(self, strict: bool) -> Result<Schema, InferenceError> {
        let mut schema = Schema::new(strict);
        for inferred in &self.fields {
            let field = inferred
                .to_field(&self.cast_options)
                .ok_or_else(|| InferenceError::NoRecords {
                    column: inferred.name.clone(),
                })?;
            schema.add_field(field)?;
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inferred(name: &str, field_type: Option<FieldType>, format: Option<&str>) -> InferredField {
        InferredField {
            name: name.to_string(),
            field_type,
            format: format.map(str::to_string),
            scores: Vec::new(),
        }
    }

    #[test]
    fn test_to_field() {
        let field = inferred("loc", Some(FieldType::GeoPoint), Some("array"))
            .to_field(&CastOptions::default())
            .unwrap();
        assert_eq!(field.field_type, FieldType::GeoPoint);
        assert_eq!(field.format, "array");

        assert!(inferred("empty", None, None).to_field(&CastOptions::default()).is_none());
    }

    #[test]
    fn test_blank_column_is_no_records() {
        let schema = InferredSchema {
            fields: vec![
                inferred("id", Some(FieldType::Integer), Some("default")),
                inferred("empty", None, None),
            ],
            rows_scored: 1,
            cast_options: CastOptions::default(),
        };
        assert_eq!(
            schema.into_schema(true).unwrap_err(),
            InferenceError::NoRecords {
                column: "empty".to_string()
            }
        );
    }

    #[test]
    fn test_into_schema_carries_options() {
        let options = CastOptions::new().with_decimal_char(",");
        let schema = InferredSchema {
            fields: vec![inferred("price", Some(FieldType::Number), Some("default"))],
            rows_scored: 1,
            cast_options: options.clone(),
        }
        .into_schema(true)
        .unwrap();
        assert_eq!(schema.field("price").unwrap().options, options);
    }
}
