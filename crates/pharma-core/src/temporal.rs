//! # Temporal Types
//!
//! `Timestamp` is a UTC instant truncated to seconds precision. Documents
//! and expiry checks read the current time through a [`Clock`] so that
//! rendering is reproducible in tests.
//!
//! Ledger records carry manufacture and expiry dates as free text entered
//! by the manufacturer. [`Timestamp::parse_calendar_date`] accepts the
//! forms a date input produces (`YYYY-MM-DD`) as well as full RFC 3339.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC timestamp with no sub-second component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with any offset, normalizing to UTC.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s.trim())
            .map_err(|e| CoreError::InvalidTimestamp(s.to_string(), e.to_string()))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a calendar date (`YYYY-MM-DD`, read as midnight UTC) or an
    /// RFC 3339 timestamp.
    pub fn parse_calendar_date(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            let dt = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| CoreError::InvalidTimestamp(s.to_string(), "out of range".into()))?;
            return Ok(Self(dt.and_utc()));
        }
        Self::parse(trimmed)
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidTimestamp(secs.to_string(), "out of range".into()))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Date line as printed on documents (`YYYY-MM-DD`).
    pub fn date_display(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Time line as printed on documents (`HH:MM:SS`).
    pub fn time_display(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    /// PDF date string (`D:YYYYMMDDHHMMSSZ`).
    pub fn to_pdf_date(&self) -> String {
        self.0.format("D:%Y%m%d%H%M%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
