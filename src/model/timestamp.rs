//! RFC 3339 timestamp codec shared by every date-time field in the feed
//!
//! The feed publishes instants such as `2024-12-17T18:03:20Z`. A missing key or
//! JSON `null` yields the field's default; any other string that is not RFC 3339
//! fails the whole decode.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Prefix of every error message produced by this codec.
///
/// The decoder uses it to tell timestamp failures apart from other schema
/// mismatches, since serde_json reports both as data errors.
pub(crate) const INVALID_TIMESTAMP: &str = "invalid timestamp";

/// Parse one feed timestamp
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp the way the feed publishes it (`Z` suffix, no fraction unless needed)
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_for_serde<E: serde::de::Error>(raw: &str) -> Result<DateTime<Utc>, E> {
    parse(raw).map_err(|e| E::custom(format!("{INVALID_TIMESTAMP} {raw:?}: {e}")))
}

/// `#[serde(with = "timestamp")]` for `DateTime<Utc>` fields
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

/// See [`serialize`]
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_for_serde(&raw),
        None => Ok(DateTime::<Utc>::default()),
    }
}

/// `#[serde(with = "timestamp::option")]` for `Option<DateTime<Utc>>` fields
pub mod option {
    use super::*;

    /// Serialize `None` as `null`
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize `null` as `None`
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_for_serde(&raw))
            .transpose()
    }
}
