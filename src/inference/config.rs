//! Configuration for type inference

use serde::{Deserialize, Serialize};

use crate::field::CastOptions;

/// Configuration for type inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Maximum number of rows to score (0 = all)
    pub sample_size: usize,

    /// Empty cells carry no type evidence and are not scored
    pub skip_empty_cells: bool,

    /// Options applied to every trial cast and carried onto inferred fields
    #[serde(default)]
    pub cast_options: CastOptions,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 0, // All rows
            skip_empty_cells: true,
            cast_options: CastOptions::default(),
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    /// Number of rows to score out of `available`
    pub fn sample_limit(&self, available: usize) -> usize {
        if self.sample_size == 0 {
            available
        } else {
            self.sample_size.min(available)
        }
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the sample size (0 = all rows)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Enable or disable skipping of empty cells
    pub fn skip_empty_cells(mut self, skip: bool) -> Self {
        self.config.skip_empty_cells = skip;
        self
    }

    /// Set the options used for trial casts
    pub fn cast_options(mut self, options: CastOptions) -> Self {
        self.config.cast_options = options;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.sample_size, 0);
        assert!(config.skip_empty_cells);
        assert!(config.cast_options.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = InferenceConfig::builder()
            .sample_size(100)
            .skip_empty_cells(false)
            .cast_options(CastOptions::new().with_decimal_char(","))
            .build();

        assert_eq!(config.sample_size, 100);
        assert!(!config.skip_empty_cells);
        assert_eq!(config.cast_options.decimal_char(), ",");
    }

    #[test]
    fn test_sample_limit_clamping() {
        let all = InferenceConfig::default();
        assert_eq!(all.sample_limit(7), 7);

        let limited = InferenceConfig::builder().sample_size(3).build();
        assert_eq!(limited.sample_limit(7), 3);
        // Larger than the data is clamped
        assert_eq!(limited.sample_limit(2), 2);
    }
}
