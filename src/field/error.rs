//! Error types for casting

use std::collections::BTreeSet;

use thiserror::Error;

use super::kind::FieldType;
use crate::constraints::ConstraintKey;

/// Errors raised while casting or formatting cell values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    /// The raw text does not match the grammar of the field type and format
    #[error("cannot cast {value:?} to {field_type}: {reason}")]
    InvalidCast {
        field_type: FieldType,
        value: String,
        reason: String,
    },

    /// A row does not have exactly one cell per field
    #[error("row has {actual} cells, schema declares {expected} fields")]
    RowLength { expected: usize, actual: usize },

    /// A cell failed while casting a whole row
    #[error("cell {index} ({name}): {source}")]
    Cell {
        index: usize,
        name: String,
        #[source]
        source: Box<CastError>,
    },

    /// The value was cast but breaks one or more declared constraints
    #[error("field '{name}' violates constraints: {}", join_keys(.violations))]
    ConstraintViolation {
        name: String,
        violations: BTreeSet<ConstraintKey>,
    },

    /// A value of the wrong kind was handed to `format_value`
    #[error("cannot format {value_kind} value as {field_type}")]
    Format {
        field_type: FieldType,
        value_kind: &'static str,
    },
}

impl CastError {
    pub(crate) fn invalid(
        field_type: FieldType,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        CastError::InvalidCast {
            field_type,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the value was parsed but failed its constraints
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            CastError::ConstraintViolation { .. } => true,
            CastError::Cell { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }

    /// The violated constraint keys, empty for parse failures
    pub fn violations(&self) -> BTreeSet<ConstraintKey> {
        match self {
            CastError::ConstraintViolation { violations, .. } => violations.clone(),
            CastError::Cell { source, .. } => source.violations(),
            _ => BTreeSet::new(),
        }
    }
}

fn join_keys(keys: &BTreeSet<ConstraintKey>) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
