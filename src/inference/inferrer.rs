//! Type inference engine

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::types::{InferredField, InferredSchema, TypeScore};
use crate::field::{CastOptions, FieldType};

/// Candidate casts in trial order, most specific grammar first.
///
/// A `None` format is detected from the sample with
/// [`FieldType::parse_format`].
pub const INFERENCE_ORDER: [(FieldType, Option<&str>); 18] = [
    (FieldType::GeoPoint, Some("default")),
    (FieldType::GeoPoint, Some("array")),
    (FieldType::GeoPoint, Some("object")),
    (FieldType::Duration, None),
    (FieldType::Year, None),
    (FieldType::YearMonth, None),
    (FieldType::Date, None),
    (FieldType::Time, None),
    (FieldType::DateTime, None),
    (FieldType::Integer, None),
    (FieldType::Number, None),
    (FieldType::Boolean, None),
    (FieldType::GeoJson, Some("default")),
    (FieldType::GeoJson, Some("topojson")),
    (FieldType::Object, None),
    (FieldType::Array, None),
    (FieldType::String, None),
    (FieldType::Any, None),
];

/// Statistics from type inference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Rows scored
    pub rows_processed: usize,
    /// Rows past the sample size
    pub rows_ignored: usize,
    /// Empty cells that were not scored
    pub cells_skipped: usize,
}

/// Per-column scratch state
#[derive(Debug, Default)]
struct ColumnState {
    /// Scores in the order types first won a row
    scores: Vec<TypeScore>,
    /// Format locked per type on its first win
    formats: Vec<(FieldType, &'static str)>,
}

impl ColumnState {
    fn locked_format(&self, field_type: FieldType) -> Option<&'static str> {
        self.formats
            .iter()
            .find(|(t, _)| *t == field_type)
            .map(|(_, format)| *format)
    }

    fn record(&mut self, field_type: FieldType, format: &'static str) {
        if self.locked_format(field_type).is_none() {
            self.formats.push((field_type, format));
        }
        match self.scores.iter_mut().find(|s| s.field_type == field_type) {
            Some(score) => score.count += 1,
            None => self.scores.push(TypeScore {
                field_type,
                count: 1,
            }),
        }
    }

    /// Highest score; ties go to the type that scored first
    fn winner(&self) -> Option<FieldType> {
        let mut best: Option<&TypeScore> = None;
        for score in &self.scores {
            if best.is_none_or(|b| score.count > b.count) {
                best = Some(score);
            }
        }
        best.map(|s| s.field_type)
    }

    /// First candidate that casts `raw`, with the format it was cast in
    fn trial_cast(&self, raw: &str, options: &CastOptions) -> Option<(FieldType, &'static str)> {
        let mut tried: Vec<(FieldType, &'static str)> = Vec::with_capacity(INFERENCE_ORDER.len());
        for (field_type, explicit) in INFERENCE_ORDER {
            let format = self
                .locked_format(field_type)
                .or(explicit)
                .unwrap_or_else(|| field_type.parse_format(raw, options));
            if tried.contains(&(field_type, format)) {
                continue;
            }
            tried.push((field_type, format));

            match field_type.parse_value(raw, format, options) {
                Ok(_) => return Some((field_type, format)),
                Err(e) => trace!(candidate = %field_type, format, error = %e, "candidate rejected"),
            }
        }
        None
    }
}

/// Type inference engine
///
/// Scores every sampled cell against [`INFERENCE_ORDER`] and picks the
/// best-scoring type per column. All state lives in the engine value, so
/// independent inference runs use independent engines.
#[derive(Debug)]
pub struct TypeInferrer {
    config: InferenceConfig,
    headers: Vec<String>,
    columns: Vec<ColumnState>,
    stats: InferenceStats,
}

impl TypeInferrer {
    /// Create a new inferrer with default configuration
    pub fn new<H: AsRef<str>>(headers: &[H]) -> Self {
        Self::with_config(headers, InferenceConfig::default())
    }

    /// Create a new inferrer with custom configuration
    pub fn with_config<H: AsRef<str>>(headers: &[H], config: InferenceConfig) -> Self {
        Self {
            config,
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            columns: headers.iter().map(|_| ColumnState::default()).collect(),
            stats: InferenceStats::default(),
        }
    }

    /// Score one row.
    ///
    /// Rows past the configured sample size are ignored. Rows shorter than
    /// the header list contribute nothing for the missing columns.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<(), InferenceError> {
        // Check sample size limit
        if self.config.sample_size > 0 && self.stats.rows_processed >= self.config.sample_size {
            self.stats.rows_ignored += 1;
            return Ok(());
        }

        if row.len() > self.headers.len() {
            return Err(InferenceError::HeaderCount {
                expected: self.headers.len(),
                actual: row.len(),
            });
        }

        self.stats.rows_processed += 1;
        for (column, cell) in self.columns.iter_mut().zip(row) {
            let raw = cell.as_ref();
            if raw.is_empty() && self.config.skip_empty_cells {
                self.stats.cells_skipped += 1;
                continue;
            }
            if let Some((field_type, format)) = column.trial_cast(raw, &self.config.cast_options) {
                column.record(field_type, format);
            }
        }
        Ok(())
    }

    /// Score a batch of rows
    pub fn add_rows<R, S>(&mut self, rows: &[R]) -> Result<(), InferenceError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let seen = self.stats.rows_processed;
        let budget = self
            .config
            .sample_limit(seen.saturating_add(rows.len()))
            .saturating_sub(seen);
        let (sampled, rest) = rows.split_at(budget.min(rows.len()));
        for row in sampled {
            self.add_row(row.as_ref())?;
        }
        self.stats.rows_ignored += rest.len();
        if !rest.is_empty() {
            debug!(ignored = rest.len(), "sample size reached");
        }
        Ok(())
    }

    /// Get current inference statistics
    pub fn stats(&self) -> &InferenceStats {
        &self.stats
    }

    /// Finalize inference and produce one descriptor per header
    pub fn finalize(self) -> InferredSchema {
        let fields: Vec<InferredField> = self
            .headers
            .into_iter()
            .zip(self.columns)
            .map(|(name, column)| {
                let field_type = column.winner();
                let format = field_type
                    .and_then(|t| column.locked_format(t))
                    .map(str::to_string);
                debug!(
                    column = %name,
                    field_type = field_type.map_or("", |t| t.as_str()),
                    "inferred column type"
                );
                InferredField {
                    name,
                    field_type,
                    format,
                    scores: column.scores,
                }
            })
            .collect();

        debug!(
            rows = self.stats.rows_processed,
            columns = fields.len(),
            "type inference finished"
        );

        InferredSchema {
            fields,
            rows_scored: self.stats.rows_processed,
            cast_options: self.config.cast_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(headers: &[&str], rows: &[Vec<&str>]) -> InferredSchema {
        let mut inferrer = TypeInferrer::new(headers);
        inferrer.add_rows(rows).unwrap();
        inferrer.finalize()
    }

    #[test]
    fn test_geopoint_wins_over_number_like_text() {
        let schema = infer(&["loc"], &[vec!["34,23"], vec!["10,-5"]]);
        let field = &schema.fields[0];
        assert_eq!(field.field_type, Some(FieldType::GeoPoint));
        assert_eq!(field.format.as_deref(), Some("default"));
    }

    #[test]
    fn test_integer_and_number_scoring() {
        let schema = infer(&["n"], &[vec!["1"], vec!["2.5"], vec!["17"]]);
        let field = &schema.fields[0];
        assert_eq!(field.field_type, Some(FieldType::Integer));
        assert_eq!(field.score(FieldType::Integer), 2);
        assert_eq!(field.score(FieldType::Number), 1);
    }

    #[test]
    fn test_tie_goes_to_first_scored_type() {
        let schema = infer(&["mixed"], &[vec!["hello"], vec!["12"]]);
        assert_eq!(schema.fields[0].field_type, Some(FieldType::String));

        let schema = infer(&["mixed"], &[vec!["12"], vec!["hello"]]);
        assert_eq!(schema.fields[0].field_type, Some(FieldType::Integer));
    }

    #[test]
    fn test_format_locks_on_first_win() {
        let schema = infer(&["loc"], &[vec!["[1, 2]"], vec!["[3, 4]"], vec!["5,6"]]);
        let field = &schema.fields[0];
        assert_eq!(field.field_type, Some(FieldType::GeoPoint));
        assert_eq!(field.format.as_deref(), Some("array"));
        // "5,6" no longer casts as a geopoint once the array format is locked
        assert_eq!(field.score(FieldType::GeoPoint), 2);
    }

    #[test]
    fn test_string_format_detected() {
        let schema = infer(&["mail"], &[vec!["a@example.com"], vec!["b@example.org"]]);
        let field = &schema.fields[0];
        assert_eq!(field.field_type, Some(FieldType::String));
        assert_eq!(field.format.as_deref(), Some("email"));
    }

    #[test]
    fn test_empty_cells_skipped() {
        let mut inferrer = TypeInferrer::new(&["a", "b"]);
        inferrer.add_row(&["true", ""]).unwrap();
        inferrer.add_row(&["false", ""]).unwrap();
        assert_eq!(inferrer.stats().cells_skipped, 2);

        let schema = inferrer.finalize();
        assert_eq!(schema.fields[0].field_type, Some(FieldType::Boolean));
        assert!(schema.fields[1].is_blank());
        assert!(schema.fields[1].scores.is_empty());
    }

    #[test]
    fn test_empty_cells_scored_when_not_skipped() {
        let config = InferenceConfig::builder().skip_empty_cells(false).build();
        let mut inferrer = TypeInferrer::with_config(&["a"], config);
        inferrer.add_row(&[""]).unwrap();
        let schema = inferrer.finalize();
        assert_eq!(schema.fields[0].field_type, Some(FieldType::String));
    }

    #[test]
    fn test_sample_size_limits_rows() {
        let config = InferenceConfig::builder().sample_size(2).build();
        let mut inferrer = TypeInferrer::with_config(&["v"], config);
        inferrer
            .add_rows(&[vec!["P1D"], vec!["P2D"], vec!["x"], vec!["y"], vec!["z"]])
            .unwrap();
        assert_eq!(inferrer.stats().rows_processed, 2);
        assert_eq!(inferrer.stats().rows_ignored, 3);
        assert_eq!(inferrer.finalize().fields[0].field_type, Some(FieldType::Duration));
    }

    #[test]
    fn test_sample_size_spans_batches() {
        let config = InferenceConfig::builder().sample_size(3).build();
        let mut inferrer = TypeInferrer::with_config(&["v"], config);
        inferrer.add_row(&["1"]).unwrap();
        inferrer.add_rows(&[vec!["2"], vec!["3"], vec!["a", "too", "long"]]).unwrap();
        inferrer.add_rows(&[vec!["x"]]).unwrap();
        assert_eq!(inferrer.stats().rows_processed, 3);
        assert_eq!(inferrer.stats().rows_ignored, 2);
        assert_eq!(inferrer.finalize().fields[0].field_type, Some(FieldType::Integer));
    }

    #[test]
    fn test_row_longer_than_headers() {
        let mut inferrer = TypeInferrer::new(&["a"]);
        assert_eq!(
            inferrer.add_row(&["1", "2"]),
            Err(InferenceError::HeaderCount {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_short_row_scores_present_cells() {
        let mut inferrer = TypeInferrer::new(&["a", "b"]);
        inferrer.add_row(&["2020-01-02"]).unwrap();
        let schema = inferrer.finalize();
        assert_eq!(schema.fields[0].field_type, Some(FieldType::Date));
        assert!(schema.fields[1].is_blank());
    }

    #[test]
    fn test_cast_options_apply_to_trials() {
        let config = InferenceConfig::builder()
            .cast_options(crate::field::CastOptions::new().with_true_values(["oui"]).with_false_values(["non"]))
            .build();
        let mut inferrer = TypeInferrer::with_config(&["flag"], config);
        inferrer.add_rows(&[vec!["oui"], vec!["non"]]).unwrap();
        assert_eq!(inferrer.finalize().fields[0].field_type, Some(FieldType::Boolean));
    }
}
