//! Textual casting: string, boolean, object, array

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::error::CastError;
use super::kind::{DEFAULT_FORMAT, FieldType};
use super::options::CastOptions;
use super::value::CellValue;

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|ftp|file)://[^\s/$.?#].[^\s]*$").unwrap());

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Strings are taken as-is; the format only describes the content
pub(crate) fn parse_string(raw: &str, _format: &str) -> Result<CellValue, CastError> {
    Ok(CellValue::String(raw.to_string()))
}

pub(crate) fn detect_string_format(sample: &str) -> &'static str {
    if UUID_REGEX.is_match(sample) {
        "uuid"
    } else if URI_REGEX.is_match(sample) {
        "uri"
    } else if EMAIL_REGEX.is_match(sample) {
        "email"
    } else {
        DEFAULT_FORMAT
    }
}

pub(crate) fn parse_boolean(raw: &str, options: &CastOptions) -> Result<CellValue, CastError> {
    if options
        .true_values()
        .iter()
        .any(|t| t.eq_ignore_ascii_case(raw))
    {
        return Ok(CellValue::Boolean(true));
    }
    if options
        .false_values()
        .iter()
        .any(|f| f.eq_ignore_ascii_case(raw))
    {
        return Ok(CellValue::Boolean(false));
    }
    Err(CastError::invalid(
        FieldType::Boolean,
        raw,
        "not a recognised true or false value",
    ))
}

/// Booleans format back to the first configured token
pub(crate) fn format_boolean(value: bool, options: &CastOptions) -> String {
    let tokens = if value {
        options.true_values()
    } else {
        options.false_values()
    };
    tokens
        .first()
        .map(|t| t.to_string())
        .unwrap_or_else(|| value.to_string())
}

pub(crate) fn parse_object(raw: &str) -> Result<CellValue, CastError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(CellValue::Object(map)),
        Ok(_) => Err(CastError::invalid(FieldType::Object, raw, "expected a JSON object")),
        Err(e) => Err(CastError::invalid(FieldType::Object, raw, e.to_string())),
    }
}

pub(crate) fn parse_array(raw: &str) -> Result<CellValue, CastError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Ok(CellValue::Array(items)),
        Ok(_) => Err(CastError::invalid(FieldType::Array, raw, "expected a JSON array")),
        Err(e) => Err(CastError::invalid(FieldType::Array, raw, e.to_string())),
    }
}
