//! Protocol timestamps and durations.
//!
//! `Time` counts milliseconds since the Unix epoch, `UnixTime` counts
//! seconds. In both, zero means "no time" and maps to `None` when
//! converting to a `chrono` timestamp.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S UTC";
const ZERO_TIME_DISPLAY: &str = "0001-01-01 00:00:00 UTC";

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(pub i64);

impl Time {
    /// Clamps to the `i64` range instead of wrapping.
    pub fn from_seconds(seconds: i64) -> Self {
        Time(seconds.saturating_mul(1000))
    }

    pub fn from_datetime(t: Option<DateTime<Utc>>) -> Self {
        t.map_or(Time(0), |t| Time(t.timestamp_millis()))
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if self.is_zero() {
            return None;
        }
        DateTime::from_timestamp_millis(self.0)
    }

    pub fn unix_seconds(self) -> i64 {
        self.0.div_euclid(1000)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn after(self, other: Time) -> bool {
        self > other
    }

    pub fn before(self, other: Time) -> bool {
        self < other
    }

    /// `YYYY-MM-DD HH:MM:SS UTC`.
    pub fn format(self) -> String {
        format_datetime(self.to_datetime())
    }
}

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTime(pub i64);

impl UnixTime {
    pub fn from_seconds(seconds: i64) -> Self {
        UnixTime(seconds)
    }

    pub fn from_datetime(t: Option<DateTime<Utc>>) -> Self {
        t.map_or(UnixTime(0), |t| UnixTime(t.timestamp()))
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if self.is_zero() {
            return None;
        }
        DateTime::from_timestamp(self.0, 0)
    }

    pub fn unix_seconds(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn after(self, other: UnixTime) -> bool {
        self > other
    }

    pub fn before(self, other: UnixTime) -> bool {
        self < other
    }

    pub fn format(self) -> String {
        format_datetime(self.to_datetime())
    }
}

impl From<UnixTime> for Time {
    fn from(u: UnixTime) -> Self {
        Time::from_seconds(u.0)
    }
}

fn format_datetime(t: Option<DateTime<Utc>>) -> String {
    match t {
        Some(t) => t.format(TIME_LAYOUT).to_string(),
        None => ZERO_TIME_DISPLAY.to_owned(),
    }
}

/// Duration in (fractional) seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationSec(pub f64);

impl DurationSec {
    pub fn duration(self) -> Duration {
        Duration::from_secs_f64(self.0.max(0.0))
    }
}

/// Duration in (fractional) milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMsec(pub f64);

impl DurationMsec {
    pub fn duration(self) -> Duration {
        Duration::from_secs_f64((self.0 / 1000.0).max(0.0))
    }
}
