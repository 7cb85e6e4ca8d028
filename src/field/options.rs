//! Casting options carried on a field descriptor

use serde::{Deserialize, Serialize};

/// Tokens recognised as `true` when a field does not override them
pub const DEFAULT_TRUE_VALUES: [&str; 5] = ["true", "yes", "y", "t", "1"];

/// Tokens recognised as `false` when a field does not override them
pub const DEFAULT_FALSE_VALUES: [&str; 5] = ["false", "no", "n", "f", "0"];

/// Casting options
///
/// Serialized flat on the field descriptor (`trueValues`, `decimalChar`, ...).
/// Unset options fall back to the defaults exposed by the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastOptions {
    /// Tokens cast to `true` by boolean fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_values: Option<Vec<String>>,

    /// Tokens cast to `false` by boolean fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_values: Option<Vec<String>>,

    /// Decimal separator for number fields (default `.`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_char: Option<String>,

    /// Thousands separator for number fields, removed before parsing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_char: Option<String>,

    /// When `false`, leading and trailing non-numeric symbols are stripped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bare_number: Option<bool>,
}

impl CastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_true_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.true_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_false_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.false_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_decimal_char(mut self, decimal_char: impl Into<String>) -> Self {
        self.decimal_char = Some(decimal_char.into());
        self
    }

    pub fn with_group_char(mut self, group_char: impl Into<String>) -> Self {
        self.group_char = Some(group_char.into());
        self
    }

    pub fn with_bare_number(mut self, bare_number: bool) -> Self {
        self.bare_number = Some(bare_number);
        self
    }

    pub fn true_values(&self) -> Vec<&str> {
        match &self.true_values {
            Some(values) => values.iter().map(String::as_str).collect(),
            None => DEFAULT_TRUE_VALUES.to_vec(),
        }
    }

    pub fn false_values(&self) -> Vec<&str> {
        match &self.false_values {
            Some(values) => values.iter().map(String::as_str).collect(),
            None => DEFAULT_FALSE_VALUES.to_vec(),
        }
    }

    pub fn decimal_char(&self) -> &str {
        self.decimal_char.as_deref().unwrap_or(".")
    }

    pub fn group_char(&self) -> Option<&str> {
        self.group_char.as_deref().filter(|g| !g.is_empty())
    }

    pub fn bare_number(&self) -> bool {
        self.bare_number.unwrap_or(true)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CastOptions::default();
        assert_eq!(options.true_values(), DEFAULT_TRUE_VALUES.to_vec());
        assert_eq!(options.false_values(), DEFAULT_FALSE_VALUES.to_vec());
        assert_eq!(options.decimal_char(), ".");
        assert_eq!(options.group_char(), None);
        assert!(options.bare_number());
        assert!(options.is_empty());
    }

    #[test]
    fn test_builder() {
        let options = CastOptions::new()
            .with_true_values(["agreed"])
            .with_decimal_char(",")
            .with_group_char(".")
            .with_bare_number(false);

        assert_eq!(options.true_values(), vec!["agreed"]);
        assert_eq!(options.decimal_char(), ",");
        assert_eq!(options.group_char(), Some("."));
        assert!(!options.bare_number());
    }

    #[test]
    fn test_serializes_camel_case_and_skips_unset() {
        let options = CastOptions::new().with_group_char(",");
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({"groupChar": ","}));
    }
}
