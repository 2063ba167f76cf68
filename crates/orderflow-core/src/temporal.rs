//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds precision
//! and rendered as `YYYY-MM-DDTHH:MM:SSZ`. Transition records and snapshots
//! carry this type so their serialized form is stable across hosts.
//!
//! Non-UTC inputs are rejected at parse time; there is no silent conversion.
//! Deserialization goes through [`Timestamp::parse`], so the same rule holds
//! for every record read back from JSON or YAML.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrderflowError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serializes as the `YYYY-MM-DDTHH:MM:SSZ` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted. Explicit offsets, including
    /// `+00:00`, are rejected.
    pub fn parse(s: &str) -> Result<Self, OrderflowError> {
        if !s.ends_with('Z') {
            return Err(OrderflowError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            OrderflowError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = OrderflowError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_iso8601()
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision.
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
