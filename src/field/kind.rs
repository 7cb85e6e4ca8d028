//! Field type registry and per-type dispatch

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::CastError;
use super::options::CastOptions;
use super::value::CellValue;
use super::{geo, numeric, temporal, text};

/// Format name every field type accepts
pub const DEFAULT_FORMAT: &str = "default";

/// The closed set of Table Schema field types
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
    Year,
    YearMonth,
    Duration,
    GeoPoint,
    GeoJson,
    Object,
    Array,
    Any,
}

/// Unknown type name handed to the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown field type '{0}'")]
pub struct UnknownFieldType(pub String);

impl FieldType {
    /// Every registered type
    pub const ALL: [FieldType; 15] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Year,
        FieldType::YearMonth,
        FieldType::Duration,
        FieldType::GeoPoint,
        FieldType::GeoJson,
        FieldType::Object,
        FieldType::Array,
        FieldType::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Year => "year",
            FieldType::YearMonth => "yearmonth",
            FieldType::Duration => "duration",
            FieldType::GeoPoint => "geopoint",
            FieldType::GeoJson => "geojson",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        }
    }

    /// Formats accepted by this type, `default` first
    pub fn formats(&self) -> &'static [&'static str] {
        match self {
            FieldType::String => &[DEFAULT_FORMAT, "email", "uri", "binary", "uuid"],
            FieldType::GeoPoint => &[DEFAULT_FORMAT, "array", "object"],
            FieldType::GeoJson => &[DEFAULT_FORMAT, "topojson"],
            _ => &[DEFAULT_FORMAT],
        }
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.formats().contains(&format)
    }

    /// Cast raw text into this type's value
    ///
    /// Empty cells are handled by [`Field::cast_value`](super::Field::cast_value);
    /// this is the bare grammar check.
    pub fn parse_value(
        &self,
        raw: &str,
        format: &str,
        options: &CastOptions,
    ) -> Result<CellValue, CastError> {
        match self {
            FieldType::String => text::parse_string(raw, format),
            FieldType::Integer => numeric::parse_integer(raw),
            FieldType::Number => numeric::parse_number(raw, options),
            FieldType::Boolean => text::parse_boolean(raw, options),
            FieldType::Date => temporal::parse_date(raw),
            FieldType::Time => temporal::parse_time(raw),
            FieldType::DateTime => temporal::parse_datetime(raw),
            FieldType::Year => temporal::parse_year(raw),
            FieldType::YearMonth => temporal::parse_year_month(raw),
            FieldType::Duration => temporal::parse_duration(raw),
            FieldType::GeoPoint => geo::parse_geopoint(raw, format),
            FieldType::GeoJson => geo::parse_geojson(raw, format),
            FieldType::Object => text::parse_object(raw),
            FieldType::Array => text::parse_array(raw),
            FieldType::Any => Ok(CellValue::String(raw.to_string())),
        }
    }

    /// Guess which of this type's formats a sample value is written in
    pub fn parse_format(&self, sample: &str, _options: &CastOptions) -> &'static str {
        match self {
            FieldType::String => text::detect_string_format(sample),
            FieldType::GeoPoint => geo::detect_geopoint_format(sample),
            FieldType::GeoJson => geo::detect_geojson_format(sample),
            _ => DEFAULT_FORMAT,
        }
    }

    /// Render a value back to text; the inverse of [`FieldType::parse_value`]
    pub fn format_value(
        &self,
        value: &CellValue,
        format: &str,
        options: &CastOptions,
    ) -> Result<String, CastError> {
        if value.is_null() {
            return Ok(String::new());
        }
        let formatted = match (self, value) {
            (FieldType::String, CellValue::String(s)) => Some(s.clone()),
            (FieldType::Integer, CellValue::Integer(i)) => Some(i.to_string()),
            (FieldType::Number, CellValue::Number(n)) => Some(numeric::format_number(n, options)),
            (FieldType::Number, CellValue::Integer(i)) => Some(i.to_string()),
            (FieldType::Boolean, CellValue::Boolean(b)) => Some(text::format_boolean(*b, options)),
            (FieldType::Date, CellValue::Date(d)) => Some(temporal::format_date(d)),
            (FieldType::Time, CellValue::Time(t)) => Some(temporal::format_time(t)),
            (FieldType::DateTime, CellValue::DateTime(dt)) => Some(temporal::format_datetime(dt)),
            (FieldType::Year, CellValue::Year(y)) => Some(format!("{:04}", y)),
            (FieldType::YearMonth, CellValue::YearMonth(ym)) => Some(ym.to_string()),
            (FieldType::Duration, CellValue::Duration(d)) => Some(d.to_string()),
            (FieldType::GeoPoint, CellValue::GeoPoint(p)) => Some(geo::format_geopoint(p, format)),
            (FieldType::GeoJson | FieldType::Object, CellValue::Object(map)) => {
                Some(serde_json::Value::Object(map.clone()).to_string())
            }
            (FieldType::Array, CellValue::Array(items)) => {
                Some(serde_json::Value::Array(items.clone()).to_string())
            }
            (FieldType::Any, CellValue::String(s)) => Some(s.clone()),
            (FieldType::Any, other) => Some(match other.to_json() {
                serde_json::Value::String(s) => s,
                json => json.to_string(),
            }),
            _ => None,
        };
        formatted.ok_or(CastError::Format {
            field_type: *self,
            value_kind: value.kind(),
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trip() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.as_str().parse::<FieldType>(), Ok(field_type));
        }
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            "decimal".parse::<FieldType>(),
            Err(UnknownFieldType("decimal".to_string()))
        );
    }

    #[test]
    fn test_serde_names_match_registry() {
        for field_type in FieldType::ALL {
            let json = serde_json::to_value(field_type).unwrap();
            assert_eq!(json, serde_json::Value::String(field_type.as_str().to_string()));
        }
    }

    #[test]
    fn test_supported_formats() {
        assert!(FieldType::GeoPoint.supports_format("array"));
        assert!(FieldType::GeoJson.supports_format("topojson"));
        assert!(FieldType::String.supports_format("uuid"));
        assert!(!FieldType::Integer.supports_format("uuid"));
        assert!(FieldType::Integer.supports_format(DEFAULT_FORMAT));
    }

    #[test]
    fn test_format_rejects_wrong_kind() {
        let err = FieldType::Date
            .format_value(&CellValue::Boolean(true), DEFAULT_FORMAT, &CastOptions::default())
            .unwrap_err();
        assert!(matches!(err, CastError::Format { value_kind: "boolean", .. }));
    }

    #[test]
    fn test_format_null_is_empty() {
        let formatted = FieldType::Integer
            .format_value(&CellValue::Null, DEFAULT_FORMAT, &CastOptions::default())
            .unwrap();
        assert_eq!(formatted, "");
    }
}
