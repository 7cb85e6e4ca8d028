//! Type inference for tabular samples
//!
//! Guesses a type and format for every column of a sample by trial-casting
//! each cell against a fixed priority list of candidate types.
//!
//! ## Features
//!
//! - **Priority trial casts** - The first candidate that casts a cell wins that row
//! - **Format locking** - A type's format is fixed by the first row it wins
//! - **Scoring** - The type that wins the most rows becomes the column type
//! - **Sampling** - Score only the first `sample_size` rows
//!
//! ## Example
//!
//! ```rust
//! use table_schema::field::FieldType;
//! use table_schema::inference::TypeInferrer;
//!
//! let mut inferrer = TypeInferrer::new(&["id", "location"]);
//! inferrer.add_row(&["1", "34,23"]).unwrap();
//! inferrer.add_row(&["2", "10,-5"]).unwrap();
//!
//! let inferred = inferrer.finalize();
//! assert_eq!(inferred.fields[0].field_type, Some(FieldType::Integer));
//! assert_eq!(inferred.fields[1].field_type, Some(FieldType::GeoPoint));
//! ```

mod config;
mod error;
mod inferrer;
mod types;

pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use error::InferenceError;
pub use inferrer::{INFERENCE_ORDER, InferenceStats, TypeInferrer};
pub use types::{InferredField, InferredSchema, TypeScore};
