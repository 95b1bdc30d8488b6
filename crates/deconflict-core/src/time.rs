//! Timestamp parsing and conversion to the numeric time base.
//!
//! Trajectories keep time as `f64` seconds since the Unix epoch. Mission
//! files carry ISO-8601 strings, with or without a zone designator.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::{DeconflictError, Result};

/// Anything that can be placed on the trajectory time base.
pub trait EpochSeconds {
    fn epoch_seconds(&self) -> f64;
}

impl EpochSeconds for f64 {
    fn epoch_seconds(&self) -> f64 {
        *self
    }
}

impl EpochSeconds for DateTime<Utc> {
    fn epoch_seconds(&self) -> f64 {
        self.timestamp() as f64 + f64::from(self.timestamp_subsec_nanos()) * 1e-9
    }
}

impl EpochSeconds for DateTime<FixedOffset> {
    fn epoch_seconds(&self) -> f64 {
        self.with_timezone(&Utc).epoch_seconds()
    }
}

impl<T: EpochSeconds + ?Sized> EpochSeconds for &T {
    fn epoch_seconds(&self) -> f64 {
        (**self).epoch_seconds()
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts `2025-11-20T09:00:00`, `2025-11-20T09:00:00Z` and
/// `2025-11-20T09:00:00+05:30`, with optional fractional seconds.
/// Timestamps without a zone are taken as UTC.
pub fn parse_iso8601(value: &str) -> Result<DateTime<Utc>> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    Err(DeconflictError::Input(format!(
        "Invalid ISO-8601 datetime string: {value:?}"
    )))
}

/// Convert epoch seconds back to a UTC timestamp.
pub fn datetime_from_epoch(t: f64) -> Result<DateTime<Utc>> {
    if !t.is_finite() {
        return Err(DeconflictError::Input(format!("Invalid epoch timestamp: {t}")));
    }
    let secs = t.floor();
    let nanos = ((t - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .ok_or_else(|| DeconflictError::Input(format!("Epoch timestamp out of range: {t}")))
}

/// Render an epoch-seconds value as a naive UTC ISO-8601 string.
///
/// Microseconds are printed only when non-zero, e.g. `2025-01-01T10:00:05`
/// or `2025-01-01T10:00:05.500000`.
pub fn iso_from_epoch(t: f64) -> String {
    let micros_total = (t * 1e6).round() as i64;
    let secs = micros_total.div_euclid(1_000_000);
    let micros = micros_total.rem_euclid(1_000_000) as u32;
    match DateTime::from_timestamp(secs, micros * 1_000) {
        Some(dt) if micros == 0 => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        None => format!("{t}"),
    }
}

/// Serde adapters accepting the strings [`parse_iso8601`] understands, or
/// plain epoch seconds.
pub mod flexible {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Epoch(f64),
    }

    impl RawTimestamp {
        /// `None` for a blank string.
        fn resolve(self) -> Result<Option<DateTime<Utc>>> {
            match self {
                RawTimestamp::Text(s) if s.trim().is_empty() => Ok(None),
                RawTimestamp::Text(s) => parse_iso8601(&s).map(Some),
                RawTimestamp::Epoch(t) => datetime_from_epoch(t).map(Some),
            }
        }
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error> {
        RawTimestamp::deserialize(deserializer)?
            .resolve()
            .map_err(serde::de::Error::custom)?
            .ok_or_else(|| serde::de::Error::custom("empty timestamp"))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<RawTimestamp>::deserialize(deserializer)? {
                Some(raw) => raw.resolve().map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
