//! Coercion of upstream timestamp strings into naive UTC instants.
//!
//! The automation API is inconsistent about how it renders instants: most
//! records carry RFC 3339 strings with a `Z` suffix, older runs emit naive
//! ISO strings, and hand-exported rows sometimes contain bare dates. Every
//! accepted shape is normalised to a timezone-stripped [`NaiveDateTime`] in
//! UTC so rows compare and group consistently.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an upstream timestamp string.
///
/// Offsets are converted to UTC before being stripped. Date-only values map
/// to midnight. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Serde helper for optional timestamp fields in filters and query strings.
///
/// # Errors
///
/// Fails when a value is present but not in any accepted format.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognised timestamp '{value}'"))
        }),
    }
}
