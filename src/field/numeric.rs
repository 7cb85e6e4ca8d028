//! Integer and number casting

use std::str::FromStr;

use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::error::CastError;
use super::kind::FieldType;
use super::options::CastOptions;
use super::value::{CellValue, Number, scaled_to_string};

/// Significant digits a `Decimal` always holds
const DECIMAL_DIGITS: usize = 28;

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d*\.?\d*$").unwrap());

// Currency and unit symbols around a number, e.g. "$ 12", "95%", "12 EUR"
static LEADING_SYMBOLS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^0-9+\-.]+").unwrap());

static TRAILING_SYMBOLS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]+$").unwrap());

pub(crate) fn parse_integer(raw: &str) -> Result<CellValue, CastError> {
    if !INTEGER_REGEX.is_match(raw) {
        return Err(CastError::invalid(
            FieldType::Integer,
            raw,
            "expected an optionally signed sequence of digits",
        ));
    }
    to_big_int(raw)
        .map(CellValue::Integer)
        .ok_or_else(|| CastError::invalid(FieldType::Integer, raw, "not an integer"))
}

pub(crate) fn parse_number(raw: &str, options: &CastOptions) -> Result<CellValue, CastError> {
    if let Some(special) = special_number(raw) {
        return Ok(CellValue::Number(special));
    }

    let mut value = raw.to_string();
    if let Some(group_char) = options.group_char() {
        value = value.replace(group_char, "");
    }
    let decimal_char = options.decimal_char();
    if decimal_char != "." {
        value = value.replace(decimal_char, ".");
    }
    if !options.bare_number() {
        value = LEADING_SYMBOLS_REGEX.replace(&value, "").into_owned();
        value = TRAILING_SYMBOLS_REGEX.replace(&value, "").into_owned();
    }

    if INTEGER_REGEX.is_match(&value) {
        if let Some(integer) = to_big_int(&value) {
            return Ok(CellValue::Number(Number::Integer(integer)));
        }
    }

    if FLOAT_REGEX.is_match(&value) && value.chars().any(|c| c.is_ascii_digit()) {
        return to_fractional(&value)
            .map(CellValue::Number)
            .ok_or_else(|| {
                CastError::invalid(FieldType::Number, raw, "decimal value out of range")
            });
    }

    Err(CastError::invalid(
        FieldType::Number,
        raw,
        "expected an integer or decimal number",
    ))
}

pub(crate) fn format_number(number: &Number, options: &CastOptions) -> String {
    match number {
        Number::Integer(i) => i.to_string(),
        Number::Decimal(d) => {
            let text = d.to_string();
            match options.decimal_char() {
                "." => text,
                decimal_char => text.replace('.', decimal_char),
            }
        }
        Number::Wide { unscaled, scale } => {
            scaled_to_string(unscaled, *scale, options.decimal_char())
        }
        Number::NaN => "NAN".to_string(),
        Number::Infinity => "INF".to_string(),
        Number::NegInfinity => "-INF".to_string(),
    }
}

fn special_number(raw: &str) -> Option<Number> {
    match raw.to_ascii_uppercase().as_str() {
        "NAN" => Some(Number::NaN),
        "INF" | "+INF" => Some(Number::Infinity),
        "-INF" => Some(Number::NegInfinity),
        _ => None,
    }
}

fn to_big_int(value: &str) -> Option<BigInt> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    BigInt::from_str(digits).ok()
}

/// Parse float-shaped text (`[+-]?\d*\.?\d*`) into an exact number.
///
/// Text with more digits than a `Decimal` holds keeps every digit as
/// [`Number::Wide`].
fn to_fractional(value: &str) -> Option<Number> {
    let (negative, body) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));

    if whole.len() + fraction.len() <= DECIMAL_DIGITS {
        let text = format!(
            "{}.{}",
            if whole.is_empty() { "0" } else { whole },
            if fraction.is_empty() { "0" } else { fraction }
        );
        let decimal = Decimal::from_str(&text).ok()?;
        return Some(Number::Decimal(if negative { -decimal } else { decimal }));
    }

    let digits = BigInt::from_str(&format!("{}{}", whole, fraction)).ok()?;
    let unscaled = if negative { -digits } else { digits };
    match u32::try_from(fraction.len()).ok()? {
        0 => Some(Number::Integer(unscaled)),
        scale => Some(Number::Wide { unscaled, scale }),
    }
}
