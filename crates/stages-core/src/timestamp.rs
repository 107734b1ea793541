//! Timestamp parsing and rendering.
//!
//! Stage timestamps are accepted as RFC 3339 strings with any offset and
//! stored in UTC at whole-second precision. They are always rendered as
//! `YYYY-MM-DDThh:mm:ssZ`, which also sorts lexically in chronological order.

use chrono::{DateTime, SubsecRound, Utc};

/// `strftime` format used when rendering timestamps.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses an ISO-8601 (RFC 3339) timestamp, normalising it to UTC and
/// dropping sub-second precision.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
}

/// Renders a timestamp as `YYYY-MM-DDThh:mm:ssZ`.
pub fn format(value: &DateTime<Utc>) -> String {
    value.format(FORMAT).to_string()
}

/// Serde adapter for required timestamps.
pub mod utc {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serializes as `YYYY-MM-DDThh:mm:ssZ`.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(value))
    }

    /// Deserializes any RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

/// Serde adapter for optional timestamps, rendered as `null` when absent.
pub mod utc_option {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serializes as `YYYY-MM-DDThh:mm:ssZ` or `null`.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an RFC 3339 timestamp or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))))
            .transpose()
    }
}
