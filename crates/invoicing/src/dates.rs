//! Lenient date input.
//!
//! Forms submit `YYYY-MM-DD`; some clients send a full RFC 3339 timestamp.
//! Both are accepted and reduced to a calendar date.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// `deserialize_with` helper for `Option<NaiveDate>`; empty strings are `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{value}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_date("2025-03-09"), Some(expected));
        assert_eq!(parse_date("2025-03-09T10:00:00.000Z"), Some(expected));
        assert_eq!(parse_date("09/03/2025"), None);
    }
}
