//! Field constraints
//!
//! A [`Constraints`] set is checked against a value that has already been cast.
//! Every declared constraint is evaluated, so callers get the complete set of
//! violated keys rather than the first failure.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::field::{CastOptions, CellValue, FieldType};

/// Name of a single constraint, as written in a field descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKey {
    Required,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    Pattern,
    Enum,
}

impl ConstraintKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKey::Required => "required",
            ConstraintKey::MinLength => "minLength",
            ConstraintKey::MaxLength => "maxLength",
            ConstraintKey::Minimum => "minimum",
            ConstraintKey::Maximum => "maximum",
            ConstraintKey::Pattern => "pattern",
            ConstraintKey::Enum => "enum",
        }
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared constraints of a field
///
/// `minimum`, `maximum` and `enum` entries are kept as raw JSON and are
/// interpreted in the domain of the field being checked: `"2020-01-01"` is a
/// date bound for a date field, `5` an integer bound for an integer field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip)]
    compiled_pattern: PatternCache,
}

/// Compiled `pattern`, keyed by its source text
#[derive(Debug, Clone, Default)]
struct PatternCache(OnceCell<(String, Regex)>);

impl PartialEq for PatternCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// What a constraint check needs to know about the field
#[derive(Debug, Clone, Copy)]
pub struct FieldDomain<'a> {
    pub field_type: FieldType,
    pub format: &'a str,
    pub options: &'a CastOptions,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn minimum(mut self, bound: impl Into<Value>) -> Self {
        self.minimum = Some(bound.into());
        self
    }

    pub fn maximum(mut self, bound: impl Into<Value>) -> Self {
        self.maximum = Some(bound.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Full-string match; non-string values never satisfy a pattern
    fn matches_pattern(&self, value: &CellValue, pattern: &str) -> bool {
        let CellValue::String(text) = value else {
            return false;
        };
        match self.pattern_regex(pattern) {
            Ok(regex) => regex.is_match(text),
            Err(e) => {
                warn!(pattern, error = %e, "pattern constraint does not compile");
                false
            }
        }
    }

    fn pattern_regex(&self, pattern: &str) -> Result<Regex, regex::Error> {
        if let Some((source, regex)) = self.compiled_pattern.0.get() {
            if source == pattern {
                return Ok(regex.clone());
            }
        }
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        let _ = self.compiled_pattern.0.set((pattern.to_string(), regex.clone()));
        Ok(regex)
    }

    /// Check a cast value, returning every violated constraint
    pub fn violations(&self, value: &CellValue, domain: FieldDomain<'_>) -> BTreeSet<ConstraintKey> {
        let mut violated = BTreeSet::new();

        if self.required == Some(true) && value.is_null() {
            violated.insert(ConstraintKey::Required);
        }
        if value.is_null() {
            // Only `required` has an opinion about missing values
            return violated;
        }

        if let Some(length) = length_of(value) {
            if self.min_length.is_some_and(|min| length < min) {
                violated.insert(ConstraintKey::MinLength);
            }
            if self.max_length.is_some_and(|max| length > max) {
                violated.insert(ConstraintKey::MaxLength);
            }
        }

        if let Some(bound) = &self.minimum {
            if !within_bound(value, bound, domain, |o| o.is_ge()) {
                violated.insert(ConstraintKey::Minimum);
            }
        }
        if let Some(bound) = &self.maximum {
            if !within_bound(value, bound, domain, |o| o.is_le()) {
                violated.insert(ConstraintKey::Maximum);
            }
        }

        if let Some(pattern) = &self.pattern {
            if !self.matches_pattern(value, pattern) {
                violated.insert(ConstraintKey::Pattern);
            }
        }

        if let Some(entries) = &self.enum_values {
            if !entries.iter().any(|entry| enum_matches(value, entry, domain)) {
                violated.insert(ConstraintKey::Enum);
            }
        }

        violated
    }
}

/// Character count of strings, key count of objects, element count of arrays
fn length_of(value: &CellValue) -> Option<usize> {
    match value {
        CellValue::String(s) => Some(s.chars().count()),
        CellValue::Object(map) => Some(map.len()),
        CellValue::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn within_bound(
    value: &CellValue,
    bound: &Value,
    domain: FieldDomain<'_>,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    let Some(bound_value) = interpret(bound, domain) else {
        warn!(
            field_type = %domain.field_type,
            bound = %bound,
            "constraint bound cannot be read for this field type"
        );
        return false;
    };
    match value.compare(&bound_value) {
        Some(ordering) => accept(ordering),
        None => {
            warn!(
                field_type = %domain.field_type,
                bound = %bound,
                value = value.kind(),
                "value cannot be compared with constraint bound"
            );
            false
        }
    }
}

/// Read a constraint value in the domain of the field
fn interpret(bound: &Value, domain: FieldDomain<'_>) -> Option<CellValue> {
    match bound {
        Value::String(text) => domain
            .field_type
            .parse_value(text, domain.format, domain.options)
            .ok(),
        Value::Number(number) => {
            let text = number.to_string();
            let defaults = CastOptions::default();
            domain
                .field_type
                .parse_value(&text, domain.format, &defaults)
                .ok()
                .filter(|v| !matches!(v, CellValue::String(_)))
                .or_else(|| FieldType::Number.parse_value(&text, "default", &defaults).ok())
        }
        Value::Bool(b) => Some(CellValue::Boolean(*b)),
        _ => None,
    }
}

fn enum_matches(value: &CellValue, entry: &Value, domain: FieldDomain<'_>) -> bool {
    match (value, entry) {
        (CellValue::String(text), Value::String(candidate)) => {
            text.to_lowercase() == candidate.to_lowercase()
        }
        (CellValue::Object(_) | CellValue::Array(_), _) => {
            let candidate = match entry {
                // Objects and arrays may be listed as JSON text
                Value::String(text) => serde_json::from_str::<Value>(text).ok(),
                other => Some(other.clone()),
            };
            candidate.is_some_and(|c| c == value.to_json())
        }
        _ => match interpret(entry, domain) {
            Some(candidate) => {
                candidate == *value
                    || value.compare(&candidate) == Some(std::cmp::Ordering::Equal)
            }
            None => false,
        },
    }
}
