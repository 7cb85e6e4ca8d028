//! Table Schema - typed casting, constraints and type inference for tabular data
//!
//! Provides:
//! - Field types with per-format casting and formatting (`field`)
//! - Constraint checking across value domains (`constraints`)
//! - Type and format inference from sample rows (`inference`)
//! - Schemas with row casting and primary/foreign keys (`schema`)

pub mod constraints;
pub mod field;
pub mod inference;
pub mod schema;

// Re-export commonly used types
pub use constraints::{ConstraintKey, Constraints};
pub use field::{CastError, CastOptions, CellValue, Field, FieldType};
pub use inference::{InferenceConfig, InferenceError, InferredSchema, TypeInferrer};
pub use schema::{ForeignKey, KeyFields, Schema, SchemaError};
