//! Error types for schema construction and validation

use thiserror::Error;

use crate::field::UnknownFieldType;

/// Structural problems with a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The schema document fails the table-schema meta-schema
    #[error("schema does not match the table-schema meta-schema: {}", .0.join("; "))]
    Structural(Vec<String>),

    /// A primary or foreign key names a field the schema does not declare
    #[error("{key} references undeclared field '{field}'")]
    UnknownKeyField { key: &'static str, field: String },

    /// Local and referenced foreign key field lists differ in length
    #[error("foreign key lists {local} local field(s) but {reference} referenced field(s)")]
    KeyCardinality { local: usize, reference: usize },

    /// Type name without a registered field type
    #[error(transparent)]
    UnknownFieldType(#[from] UnknownFieldType),

    /// The document is not a schema at all (bad JSON, wrong shape)
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    /// IO error while loading or saving the schema document
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::InvalidDocument(e.to_string())
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(e: std::io::Error) -> Self {
        SchemaError::Io(e.to_string())
    }
}
