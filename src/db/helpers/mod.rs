use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Percentages are stored as plain integers; anything outside 0..=100 is
/// treated as damage.
pub fn to_percent(value: i64, field: &str) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|percent| *percent <= 100)
        .ok_or_else(|| anyhow!("{field} out of range: {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn encode_areas(areas: &[String]) -> Result<String> {
    serde_json::to_string(areas).context("failed to encode correction areas")
}

pub fn decode_areas(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).context("failed to decode correction areas")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_bounds_are_enforced() {
        assert_eq!(to_percent(100, "score").unwrap(), 100);
        assert!(to_percent(101, "score").is_err());
        assert!(to_percent(-1, "score").is_err());
    }

    #[test]
    fn areas_round_trip_through_json() {
        let areas = vec!["Hips".to_string(), "Front Knee".to_string()];
        let encoded = encode_areas(&areas).unwrap();
        assert_eq!(decode_areas(&encoded).unwrap(), areas);
        assert!(decode_areas("not json").is_err());
    }
}
