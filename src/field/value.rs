//! Typed values produced by casting a raw cell

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat};
use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value, json};

/// A cast cell value
///
/// Every field type casts into exactly one variant. `Null` is produced for
/// empty cells regardless of the field type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    String(String),
    Integer(BigInt),
    Number(Number),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    Year(i32),
    YearMonth(YearMonth),
    Duration(IsoDuration),
    GeoPoint(GeoPoint),
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl CellValue {
    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::String(_) => "string",
            CellValue::Integer(_) => "integer",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
            CellValue::Time(_) => "time",
            CellValue::DateTime(_) => "datetime",
            CellValue::Year(_) => "year",
            CellValue::YearMonth(_) => "yearmonth",
            CellValue::Duration(_) => "duration",
            CellValue::GeoPoint(_) => "geopoint",
            CellValue::Object(_) => "object",
            CellValue::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Order two values of the same domain.
    ///
    /// Integers and numbers compare with each other; durations compare by
    /// their nominal span. Returns `None` for values without a common order.
    pub fn compare(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Integer(a), CellValue::Integer(b)) => Some(a.cmp(b)),
            (CellValue::Integer(a), CellValue::Number(b)) => Number::Integer(a.clone()).compare(b),
            (CellValue::Number(a), CellValue::Integer(b)) => a.compare(&Number::Integer(b.clone())),
            (CellValue::Number(a), CellValue::Number(b)) => a.compare(b),
            (CellValue::Date(a), CellValue::Date(b)) => Some(a.cmp(b)),
            (CellValue::Time(a), CellValue::Time(b)) => Some(a.cmp(b)),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => Some(a.cmp(b)),
            (CellValue::Year(a), CellValue::Year(b)) => Some(a.cmp(b)),
            (CellValue::YearMonth(a), CellValue::YearMonth(b)) => Some(a.cmp(b)),
            (CellValue::Duration(a), CellValue::Duration(b)) => {
                Some(a.nominal_seconds()?.cmp(&b.nominal_seconds()?))
            }
            _ => None,
        }
    }

    /// Convert to a JSON value for row consumers
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Integer(i) => match i64::try_from(i) {
                Ok(small) => json!(small),
                Err(_) => Value::String(i.to_string()),
            },
            CellValue::Number(n) => n.to_json(),
            CellValue::Boolean(b) => Value::Bool(*b),
            CellValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            CellValue::Time(t) => Value::String(t.format("%H:%M:%S").to_string()),
            CellValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            CellValue::Year(y) => json!(y),
            CellValue::YearMonth(ym) => Value::String(ym.to_string()),
            CellValue::Duration(d) => Value::String(d.to_string()),
            CellValue::GeoPoint(p) => json!([p.lon, p.lat]),
            CellValue::Object(map) => Value::Object(map.clone()),
            CellValue::Array(items) => Value::Array(items.clone()),
        }
    }
}

/// Value of a `number` field
///
/// Integer-shaped text keeps arbitrary precision. Float-shaped text is held
/// as an exact decimal, or as an unscaled integer and scale when it has more
/// digits than a decimal can hold. The IEEE special values are kept as tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(BigInt),
    Decimal(Decimal),
    /// `unscaled * 10^-scale`
    Wide { unscaled: BigInt, scale: u32 },
    NaN,
    Infinity,
    NegInfinity,
}

impl Number {
    /// Finite values as an unscaled integer and scale
    fn to_scaled(&self) -> Option<(BigInt, u32)> {
        match self {
            Number::Integer(i) => Some((i.clone(), 0)),
            Number::Decimal(d) => Some((BigInt::from(d.mantissa()), d.scale())),
            Number::Wide { unscaled, scale } => Some((unscaled.clone(), *scale)),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => i.to_string().parse().unwrap_or(f64::NAN),
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            Number::Wide { unscaled, scale } => {
                scaled_to_string(unscaled, *scale, ".").parse().unwrap_or(f64::NAN)
            }
            Number::NaN => f64::NAN,
            Number::Infinity => f64::INFINITY,
            Number::NegInfinity => f64::NEG_INFINITY,
        }
    }

    /// Exact comparison of finite values, float comparison for the special
    /// values. NaN is unordered.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self.to_scaled(), other.to_scaled()) {
            (Some((a, a_scale)), Some((b, b_scale))) => {
                let ten = BigInt::from(10u32);
                let (a, b) = if a_scale < b_scale {
                    (a * ten.pow(b_scale - a_scale), b)
                } else {
                    (a, b * ten.pow(a_scale - b_scale))
                };
                Some(a.cmp(&b))
            }
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Number::Integer(i) => match i64::try_from(i) {
                Ok(small) => json!(small),
                Err(_) => Value::String(i.to_string()),
            },
            Number::Decimal(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(d.to_string())),
            Number::Wide { unscaled, scale } => {
                Value::String(scaled_to_string(unscaled, *scale, "."))
            }
            Number::NaN => Value::String("NAN".to_string()),
            Number::Infinity => Value::String("INF".to_string()),
            Number::NegInfinity => Value::String("-INF".to_string()),
        }
    }
}

/// Render `unscaled * 10^-scale` with the given decimal separator
pub(crate) fn scaled_to_string(unscaled: &BigInt, scale: u32, decimal_char: &str) -> String {
    let sign = if unscaled.sign() == Sign::Minus { "-" } else { "" };
    let digits = unscaled.magnitude().to_string();
    let scale = scale as usize;
    if scale == 0 {
        return format!("{}{}", sign, digits);
    }
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    format!("{}{}{}{}", sign, whole, decimal_char, fraction)
}

/// Calendar year and month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Longitude/latitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// ISO 8601 duration (`PnYnMnDTnHnMnS`)
///
/// Weeks are folded into days when parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsoDuration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: Decimal,
}

const SECONDS_PER_DAY: i64 = 86_400;

impl IsoDuration {
    /// Span in seconds, counting a year as 365 days and a month as 30 days.
    ///
    /// `None` when the span does not fit a decimal.
    pub fn nominal_seconds(&self) -> Option<Decimal> {
        let days = i64::from(self.years) * 365 + i64::from(self.months) * 30 + i64::from(self.days);
        let whole = days * SECONDS_PER_DAY
            + i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60;
        Decimal::from(whole).checked_add(self.seconds)
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        let has_time = self.hours > 0 || self.minutes > 0 || !self.seconds.is_zero();
        if has_time {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if !self.seconds.is_zero() {
                write!(f, "{}S", self.seconds.normalize())?;
            }
        } else if self.years == 0 && self.months == 0 && self.days == 0 {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_integer_and_number_compare() {
        let two = CellValue::Integer(BigInt::from(2));
        let two_and_half = CellValue::Number(Number::Decimal(Decimal::new(25, 1)));
        assert_eq!(two.compare(&two_and_half), Some(Ordering::Less));
        assert_eq!(two_and_half.compare(&two), Some(Ordering::Greater));
    }

    #[test]
    fn test_nan_is_unordered() {
        let nan = CellValue::Number(Number::NaN);
        let one = CellValue::Number(Number::Integer(BigInt::from(1)));
        assert_eq!(nan.compare(&one), None);
    }

    #[test]
    fn test_mismatched_kinds_are_unordered() {
        let year = CellValue::Year(2020);
        let text = CellValue::String("2020".to_string());
        assert_eq!(year.compare(&text), None);
    }

    #[test]
    fn test_duration_display() {
        let duration = IsoDuration {
            years: 1,
            days: 2,
            hours: 3,
            seconds: Decimal::new(45, 1),
            ..Default::default()
        };
        assert_eq!(duration.to_string(), "P1Y2DT3H4.5S");
        assert_eq!(IsoDuration::default().to_string(), "PT0S");
    }

    #[test]
    fn test_duration_nominal_order() {
        let month = IsoDuration {
            months: 1,
            ..Default::default()
        };
        let days = IsoDuration {
            days: 31,
            ..Default::default()
        };
        assert!(month.nominal_seconds() < days.nominal_seconds());
    }

    #[test]
    fn test_duration_overflow_is_unordered() {
        let huge = IsoDuration {
            days: 1,
            seconds: Decimal::MAX,
            ..Default::default()
        };
        let day = IsoDuration {
            days: 1,
            ..Default::default()
        };
        assert_eq!(huge.nominal_seconds(), None);
        assert_eq!(
            CellValue::Duration(huge).compare(&CellValue::Duration(day)),
            None
        );
    }

    #[test]
    fn test_wide_number_compare() {
        let wide = Number::Wide {
            unscaled: BigInt::from_str("1234567890123456789012345678905").unwrap(),
            scale: 1,
        };
        let above = Number::Integer(BigInt::from_str("123456789012345678901234567891").unwrap());
        let below = Number::Decimal(Decimal::new(15, 1));
        assert_eq!(wide.compare(&above), Some(Ordering::Less));
        assert_eq!(wide.compare(&below), Some(Ordering::Greater));
        assert_eq!(wide.compare(&wide.clone()), Some(Ordering::Equal));
    }

    #[test]
    fn test_scaled_to_string() {
        assert_eq!(scaled_to_string(&BigInt::from(-5), 3, "."), "-0.005");
        assert_eq!(scaled_to_string(&BigInt::from(12345), 2, ","), "123,45");
        assert_eq!(scaled_to_string(&BigInt::from(7), 0, "."), "7");
    }

    #[test]
    fn test_nan_json_token() {
        assert_eq!(CellValue::Number(Number::NaN).to_json(), json!("NAN"));
    }

    #[test]
    fn test_year_month_display_and_order() {
        let earlier = YearMonth { year: 2020, month: 12 };
        let later = YearMonth { year: 2021, month: 1 };
        assert_eq!(earlier.to_string(), "2020-12");
        assert!(earlier < later);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(CellValue::Integer(BigInt::from(7)).to_json(), json!(7));
        assert_eq!(CellValue::GeoPoint(GeoPoint::new(34.0, 23.0)).to_json(), json!([34.0, 23.0]));
        assert_eq!(CellValue::Null.to_json(), Value::Null);
    }
}
