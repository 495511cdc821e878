//! UTC timestamp helpers.
//!
//! Entries are written as RFC 3339 with microsecond precision. Files written
//! without an offset (naive ISO-8601) are read back as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

/// Current UTC time, truncated to the precision that survives a save/load.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp as RFC 3339 UTC (`2026-02-21T00:00:00.000000Z`).
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse RFC 3339 (any offset) or a naive ISO-8601 datetime taken as UTC.
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Whole days elapsed from `ts` to `now`. Future timestamps count as zero.
pub fn age_in_days(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    now.signed_duration_since(*ts).num_days().max(0)
}

/// `#[serde(with = "...")]` adapter for entry timestamps.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_iso8601(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso8601(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}
