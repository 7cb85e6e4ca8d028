//! Fields: one column's type, format and constraint contract
//!
//! A [`Field`] casts raw cell text into a [`CellValue`] according to its
//! [`FieldType`] and format, formats values back to text, and checks cast
//! values against its [`Constraints`].
//!
//! ## Example
//!
//! ```rust
//! use table_schema::field::{CellValue, Field, FieldType};
//! use table_schema::constraints::Constraints;
//!
//! let field = Field::new("age", FieldType::Integer)
//!     .with_constraints(Constraints::new().minimum(0).maximum(150));
//!
//! let value = field.cast_value("42", true).unwrap();
//! assert!(matches!(value, CellValue::Integer(_)));
//!
//! let err = field.cast_value("200", true).unwrap_err();
//! assert!(err.is_constraint_violation());
//! ```

mod error;
mod geo;
mod kind;
mod numeric;
mod options;
mod temporal;
mod text;
mod value;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintKey, Constraints, FieldDomain};

pub use error::CastError;
pub use kind::{DEFAULT_FORMAT, FieldType, UnknownFieldType};
pub use options::{CastOptions, DEFAULT_FALSE_VALUES, DEFAULT_TRUE_VALUES};
pub use value::{CellValue, GeoPoint, IsoDuration, Number, YearMonth};

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn is_default_format(format: &str) -> bool {
    format == DEFAULT_FORMAT
}

/// Field descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Column name
    pub name: String,

    /// Field type; descriptors without a type are strings
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Type-specific format, `default` unless stated
    #[serde(default = "default_format", skip_serializing_if = "is_default_format")]
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// RDF type URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdf_type: Option<String>,

    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,

    /// Casting options, stored flat on the descriptor
    #[serde(flatten)]
    pub options: CastOptions,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: default_format(),
            title: None,
            description: None,
            rdf_type: None,
            constraints: Constraints::default(),
            options: CastOptions::default(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_options(mut self, options: CastOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rdf_type(mut self, rdf_type: impl Into<String>) -> Self {
        self.rdf_type = Some(rdf_type.into());
        self
    }

    /// Cast raw text with this field's type, format and options.
    /// Constraints are not checked.
    pub fn parse_value(&self, raw: &str) -> Result<CellValue, CastError> {
        self.field_type.parse_value(raw, &self.format, &self.options)
    }

    /// Guess the format a sample is written in
    pub fn parse_format(&self, sample: &str) -> &'static str {
        self.field_type.parse_format(sample, &self.options)
    }

    pub fn format_value(&self, value: &CellValue) -> Result<String, CastError> {
        self.field_type.format_value(value, &self.format, &self.options)
    }

    /// Set the format from a sample when it is still `default`.
    ///
    /// Returns true when the format changed.
    pub fn fill_format(&mut self, sample: &str) -> bool {
        if self.format != DEFAULT_FORMAT || sample.is_empty() {
            return false;
        }
        let detected = self.parse_format(sample);
        if detected == DEFAULT_FORMAT {
            return false;
        }
        self.format = detected.to_string();
        true
    }

    /// Every constraint the value breaks; empty when it satisfies all of them
    pub fn check_constraint_violations(&self, value: &CellValue) -> BTreeSet<ConstraintKey> {
        self.constraint_violations_with(value, &self.options)
    }

    fn constraint_violations_with(
        &self,
        value: &CellValue,
        options: &CastOptions,
    ) -> BTreeSet<ConstraintKey> {
        self.constraints.violations(
            value,
            FieldDomain {
                field_type: self.field_type,
                format: &self.format,
                options,
            },
        )
    }

    /// Cast a cell, optionally enforcing constraints.
    ///
    /// Empty text casts to [`CellValue::Null`] without touching the type
    /// grammar; `required` is still enforced on that null.
    pub fn cast_value(&self, raw: &str, enforce_constraints: bool) -> Result<CellValue, CastError> {
        self.cast_value_with(raw, enforce_constraints, &self.options)
    }

    /// [`Field::cast_value`] with options overriding the field's own
    pub fn cast_value_with(
        &self,
        raw: &str,
        enforce_constraints: bool,
        options: &CastOptions,
    ) -> Result<CellValue, CastError> {
        let value = if raw.is_empty() {
            CellValue::Null
        } else {
            self.field_type.parse_value(raw, &self.format, options)?
        };

        if enforce_constraints && !self.constraints.is_empty() {
            let violations = self.constraint_violations_with(&value, options);
            if !violations.is_empty() {
                return Err(CastError::ConstraintViolation {
                    name: self.name.clone(),
                    violations,
                });
            }
        }

        Ok(value)
    }
}
