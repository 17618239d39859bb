//! Deserialization helpers for the shapes the backend is loose about.

use jiff::Timestamp;
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decimal fields arrive as strings (`"12500.00"`), numbers, or null.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a decimal, got {other}"
        ))),
    }
}

/// Same as [`decimal`], defaulting to zero.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    decimal(deserializer).map(Option::unwrap_or_default)
}

/// Identifiers that may be numbers or strings.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Ok(Some(other.to_string())),
    }
}

/// Timestamps with an offset, or naive ones which are taken as UTC.
pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if s.trim().is_empty() {
        return Ok(None);
    }

    parse_timestamp(&s).map(Some).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(s: &str) -> Result<Timestamp, jiff::Error> {
    let s = s.trim();
    s.parse::<Timestamp>().or_else(|err| {
        s.parse::<DateTime>()
            .or_else(|_| s.parse::<Date>().map(|d| d.to_datetime(jiff::civil::Time::midnight())))
            .and_then(|dt| dt.to_zoned(TimeZone::UTC))
            .map(|zdt| zdt.timestamp())
            .map_err(|_| err)
    })
}

/// Nullable strings collapse to the empty string.
pub fn null_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
