//! Error types for type inference

use thiserror::Error;

use crate::schema::SchemaError;

/// Errors that can occur during type inference
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// A column had no values to infer a type from
    #[error("no sample values for column '{column}'")]
    NoRecords { column: String },

    /// A row has more cells than there are headers
    #[error("row has {actual} cells but only {expected} headers")]
    HeaderCount { expected: usize, actual: usize },

    /// The inferred descriptors do not form a valid schema
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
