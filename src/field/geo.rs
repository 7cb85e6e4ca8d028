//! Geographic casting: geopoint and geojson

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};

use super::error::CastError;
use super::kind::{DEFAULT_FORMAT, FieldType};
use super::value::{CellValue, GeoPoint};

static GEOJSON_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/geojson.json"))
        .expect("embedded GeoJSON schema is valid JSON");
    Validator::new(&schema).expect("embedded GeoJSON schema compiles")
});

static TOPOJSON_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/topojson.json"))
        .expect("embedded TopoJSON schema is valid JSON");
    Validator::new(&schema).expect("embedded TopoJSON schema compiles")
});

pub(crate) fn parse_geopoint(raw: &str, format: &str) -> Result<CellValue, CastError> {
    let point = match format {
        "array" => geopoint_from_array(raw),
        "object" => geopoint_from_object(raw),
        _ => geopoint_from_pair(raw),
    };
    point
        .map(CellValue::GeoPoint)
        .map_err(|reason| CastError::invalid(FieldType::GeoPoint, raw, reason))
}

/// `"lon,lat"`
fn geopoint_from_pair(raw: &str) -> Result<GeoPoint, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return Err("expected two comma separated numbers".to_string());
    }
    let lon = coordinate(parts[0].trim())?;
    let lat = coordinate(parts[1].trim())?;
    Ok(GeoPoint::new(lon, lat))
}

/// `[lon, lat]`
fn geopoint_from_array(raw: &str) -> Result<GeoPoint, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) if items.len() == 2 => {
            match (items[0].as_f64(), items[1].as_f64()) {
                (Some(lon), Some(lat)) => Ok(GeoPoint::new(lon, lat)),
                _ => Err("array items must be numbers".to_string()),
            }
        }
        Ok(_) => Err("expected a JSON array of two numbers".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// `{"lon": .., "lat": ..}`
fn geopoint_from_object(raw: &str) -> Result<GeoPoint, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) if map.len() == 2 => {
            match (
                map.get("lon").and_then(Value::as_f64),
                map.get("lat").and_then(Value::as_f64),
            ) {
                (Some(lon), Some(lat)) => Ok(GeoPoint::new(lon, lat)),
                _ => Err("object must hold numeric 'lon' and 'lat'".to_string()),
            }
        }
        Ok(_) => Err("expected a JSON object with exactly 'lon' and 'lat'".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn coordinate(token: &str) -> Result<f64, String> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("'{}' is not a number", token)),
    }
}

pub(crate) fn detect_geopoint_format(sample: &str) -> &'static str {
    if geopoint_from_object(sample).is_ok() {
        "object"
    } else if geopoint_from_array(sample).is_ok() {
        "array"
    } else {
        DEFAULT_FORMAT
    }
}

pub(crate) fn format_geopoint(point: &GeoPoint, format: &str) -> String {
    match format {
        "array" => format!("[{},{}]", point.lon, point.lat),
        "object" => json!({"lon": point.lon, "lat": point.lat}).to_string(),
        _ => format!("{},{}", point.lon, point.lat),
    }
}

pub(crate) fn parse_geojson(raw: &str, format: &str) -> Result<CellValue, CastError> {
    let map = json_object(raw)
        .map_err(|reason| CastError::invalid(FieldType::GeoJson, raw, reason))?;
    let document = Value::Object(map);
    let validator = match format {
        "topojson" => &*TOPOJSON_VALIDATOR,
        _ => &*GEOJSON_VALIDATOR,
    };
    if let Some(error) = validator.iter_errors(&document).next() {
        return Err(CastError::invalid(FieldType::GeoJson, raw, error.to_string()));
    }
    match document {
        Value::Object(map) => Ok(CellValue::Object(map)),
        _ => Err(CastError::invalid(FieldType::GeoJson, raw, "expected a JSON object")),
    }
}

pub(crate) fn detect_geojson_format(sample: &str) -> &'static str {
    let Ok(map) = json_object(sample) else {
        return DEFAULT_FORMAT;
    };
    let document = Value::Object(map);
    if GEOJSON_VALIDATOR.is_valid(&document) {
        DEFAULT_FORMAT
    } else if TOPOJSON_VALIDATOR.is_valid(&document) {
        "topojson"
    } else {
        DEFAULT_FORMAT
    }
}

fn json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
