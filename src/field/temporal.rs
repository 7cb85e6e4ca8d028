//! Calendar and duration casting: date, time, datetime, year, yearmonth, duration

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::error::CastError;
use super::kind::FieldType;
use super::value::{CellValue, IsoDuration, YearMonth};

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap()
});

// Separators are optional but must be used consistently (10:30:00 or 103000)
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(2[0-3]|[01]\d):([0-5]\d):([0-5]\d)|(2[0-3]|[01]\d)([0-5]\d)([0-5]\d))$")
        .unwrap()
});

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});

static DATETIME_SPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(\.\d+)?$").unwrap());

static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

static YEAR_MONTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])$").unwrap());

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .unwrap()
});

pub(crate) fn parse_date(raw: &str) -> Result<CellValue, CastError> {
    let caps = DATE_REGEX
        .captures(raw)
        .ok_or_else(|| CastError::invalid(FieldType::Date, raw, "expected YYYY-MM-DD"))?;
    let year = capture_number::<i32>(&caps, 1);
    let month = capture_number::<u32>(&caps, 2);
    let day = capture_number::<u32>(&caps, 3);
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d)
            .map(CellValue::Date)
            .ok_or_else(|| CastError::invalid(FieldType::Date, raw, "not a calendar date")),
        _ => Err(CastError::invalid(FieldType::Date, raw, "expected YYYY-MM-DD")),
    }
}

pub(crate) fn parse_time(raw: &str) -> Result<CellValue, CastError> {
    let caps = TIME_REGEX
        .captures(raw)
        .ok_or_else(|| CastError::invalid(FieldType::Time, raw, "expected HH:mm:ss"))?;
    // Groups 1-3 hold the separated form, 4-6 the compact one
    let offset = if caps.get(1).is_some() { 0 } else { 3 };
    let hour = capture_number::<u32>(&caps, offset + 1);
    let minute = capture_number::<u32>(&caps, offset + 2);
    let second = capture_number::<u32>(&caps, offset + 3);
    match (hour, minute, second) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s)
            .map(CellValue::Time)
            .ok_or_else(|| CastError::invalid(FieldType::Time, raw, "not a time of day")),
        _ => Err(CastError::invalid(FieldType::Time, raw, "expected HH:mm:ss")),
    }
}

/// Datetimes without an explicit offset are taken as UTC
pub(crate) fn parse_datetime(raw: &str) -> Result<CellValue, CastError> {
    if let Some(caps) = DATETIME_REGEX.captures(raw) {
        let parsed = if caps.get(2).is_some() {
            DateTime::parse_from_rfc3339(raw).map_err(|e| e.to_string())
        } else {
            naive_utc(raw)
        };
        return parsed
            .map(CellValue::DateTime)
            .map_err(|reason| CastError::invalid(FieldType::DateTime, raw, reason));
    }

    if DATETIME_SPACE_REGEX.is_match(raw) {
        return naive_utc(&raw.replacen(' ', "T", 1))
            .map(CellValue::DateTime)
            .map_err(|reason| CastError::invalid(FieldType::DateTime, raw, reason));
    }

    Err(CastError::invalid(
        FieldType::DateTime,
        raw,
        "expected YYYY-MM-DDThh:mm:ss[.fff][Z|+hh:mm]",
    ))
}

fn naive_utc(value: &str) -> Result<DateTime<FixedOffset>, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| e.to_string())
}

pub(crate) fn parse_year(raw: &str) -> Result<CellValue, CastError> {
    if !YEAR_REGEX.is_match(raw) {
        return Err(CastError::invalid(FieldType::Year, raw, "expected a 4-digit year"));
    }
    raw.parse::<i32>()
        .map(CellValue::Year)
        .map_err(|e| CastError::invalid(FieldType::Year, raw, e.to_string()))
}

pub(crate) fn parse_year_month(raw: &str) -> Result<CellValue, CastError> {
    let caps = YEAR_MONTH_REGEX
        .captures(raw)
        .ok_or_else(|| CastError::invalid(FieldType::YearMonth, raw, "expected YYYY-MM"))?;
    match (capture_number::<i32>(&caps, 1), capture_number::<u32>(&caps, 2)) {
        (Some(year), Some(month)) => Ok(CellValue::YearMonth(YearMonth { year, month })),
        _ => Err(CastError::invalid(FieldType::YearMonth, raw, "expected YYYY-MM")),
    }
}

pub(crate) fn parse_duration(raw: &str) -> Result<CellValue, CastError> {
    let invalid = |reason: &str| CastError::invalid(FieldType::Duration, raw, reason);

    let caps = DURATION_REGEX
        .captures(raw)
        .ok_or_else(|| invalid("expected an ISO 8601 duration such as P1Y2M3DT4H5M6S"))?;
    if (1..=7).all(|i| caps.get(i).is_none()) {
        return Err(invalid("duration has no components"));
    }
    if raw.ends_with('T') {
        return Err(invalid("time designator without time components"));
    }

    let part = |i: usize| -> Result<u32, CastError> {
        match caps.get(i) {
            Some(m) => m
                .as_str()
                .parse::<u32>()
                .map_err(|_| invalid("duration component out of range")),
            None => Ok(0),
        }
    };
    let weeks = part(3)?;
    let plain_days = part(4)?;
    let days = weeks
        .checked_mul(7)
        .and_then(|w| w.checked_add(plain_days))
        .ok_or_else(|| invalid("duration component out of range"))?;
    let seconds = match caps.get(7) {
        Some(m) => Decimal::from_str(m.as_str())
            .map_err(|_| invalid("duration seconds out of range"))?,
        None => Decimal::ZERO,
    };

    Ok(CellValue::Duration(IsoDuration {
        years: part(1)?,
        months: part(2)?,
        days,
        hours: part(5)?,
        minutes: part(6)?,
        seconds,
    }))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub(crate) fn format_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn capture_number<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}
