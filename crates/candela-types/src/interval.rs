//! Candle interval definitions.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const SECONDS_PER_DAY: u32 = 86_400;

/// Width of a candle bucket.
///
/// Buckets are aligned to the Unix epoch, so every interval must divide a
/// day evenly; a 1-minute bucket always starts at second zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    secs: u32,
}

impl Interval {
    /// One second.
    pub const SECOND: Self = Self { secs: 1 };
    /// One minute (the default).
    pub const MINUTE: Self = Self { secs: 60 };
    /// One hour.
    pub const HOUR: Self = Self { secs: 3_600 };
    /// One day.
    pub const DAY: Self = Self {
        secs: SECONDS_PER_DAY,
    };

    /// Creates an interval from a number of seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if `secs` is zero or does not divide a day evenly.
    pub const fn from_secs(secs: u32) -> Result<Self, IntervalParseError> {
        if secs == 0 {
            return Err(IntervalParseError::Zero);
        }
        if secs > SECONDS_PER_DAY || SECONDS_PER_DAY % secs != 0 {
            return Err(IntervalParseError::Misaligned(secs));
        }
        Ok(Self { secs })
    }

    /// Returns the interval length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.secs
    }

    /// Returns the interval as a [`Duration`], e.g. for timer cadence.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs as u64)
    }

    /// Returns the interval as a chrono [`TimeDelta`].
    #[must_use]
    pub fn as_time_delta(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.secs))
    }

    /// Floors a timestamp to the start of its bucket.
    ///
    /// A timestamp exactly on a boundary is its own bucket start.
    #[must_use]
    pub fn truncate(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        // `timestamp()` floors toward negative infinity, so pre-epoch
        // instants land in the bucket that contains them.
        let into_bucket = timestamp.timestamp().rem_euclid(i64::from(self.secs));
        let nanos = i64::from(timestamp.timestamp_subsec_nanos());
        // Every interval divides a day and `MIN_UTC` is a midnight, so the
        // floor is always representable.
        timestamp
            .checked_sub_signed(TimeDelta::seconds(into_bucket) + TimeDelta::nanoseconds(nanos))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the instant at which the bucket starting at `bucket_start` ends.
    ///
    /// `None` if that instant is past [`DateTime::MAX_UTC`]; such a bucket
    /// never ends.
    #[must_use]
    pub fn bucket_end(&self, bucket_start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        bucket_start.checked_add_signed(self.as_time_delta())
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::MINUTE
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.secs;
        if secs % SECONDS_PER_DAY == 0 {
            write!(f, "{}d", secs / SECONDS_PER_DAY)
        } else if secs % 3_600 == 0 {
            write!(f, "{}h", secs / 3_600)
        } else if secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{secs}s")
        }
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "second" => return Ok(Self::SECOND),
            "minute" => return Ok(Self::MINUTE),
            "hour" => return Ok(Self::HOUR),
            "day" | "daily" => return Ok(Self::DAY),
            _ => {}
        }

        // Bare seconds: "60"
        if let Ok(secs) = lower.parse::<u32>() {
            return Self::from_secs(secs);
        }

        // "5m" or "m5"
        let (count, unit) = match lower.char_indices().find(|(_, c)| c.is_ascii_alphabetic()) {
            Some((0, unit)) => (&lower[1..], unit),
            Some((idx, unit)) if idx == lower.len() - 1 => (&lower[..idx], unit),
            _ => return Err(IntervalParseError::Invalid(s.to_string())),
        };

        let multiplier = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => SECONDS_PER_DAY,
            _ => return Err(IntervalParseError::Invalid(s.to_string())),
        };

        let count: u32 = count
            .parse()
            .map_err(|_| IntervalParseError::Invalid(s.to_string()))?;
        let secs = count
            .checked_mul(multiplier)
            .ok_or_else(|| IntervalParseError::Invalid(s.to_string()))?;

        Self::from_secs(secs)
    }
}

impl TryFrom<String> for Interval {
    type Error = IntervalParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.to_string()
    }
}

/// Error returned when an interval is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalParseError {
    /// The string is not a recognised interval.
    #[error("invalid interval '{0}', expected e.g. 30s, 1m, m5, 15m, 1h, h4, 1d")]
    Invalid(String),

    /// Zero-length interval.
    #[error("interval must be longer than zero seconds")]
    Zero,

    /// The interval does not divide a day into whole buckets.
    #[error("interval of {0}s does not divide a day evenly")]
    Misaligned(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_interval_parse() {
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::MINUTE);
        assert_eq!("m5".parse::<Interval>().unwrap().seconds(), 300);
        assert_eq!("H4".parse::<Interval>().unwrap().seconds(), 14_400);
        assert_eq!("30s".parse::<Interval>().unwrap().seconds(), 30);
        assert_eq!("60".parse::<Interval>().unwrap(), Interval::MINUTE);
        assert_eq!("day".parse::<Interval>().unwrap(), Interval::DAY);
        assert!("invalid".parse::<Interval>().is_err());
        assert!("5x".parse::<Interval>().is_err());
        assert_eq!("0m".parse::<Interval>(), Err(IntervalParseError::Zero));
        assert_eq!(
            "7m".parse::<Interval>(),
            Err(IntervalParseError::Misaligned(420))
        );
        assert!("2d".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(Interval::MINUTE.to_string(), "1m");
        assert_eq!(Interval::from_secs(14_400).unwrap().to_string(), "4h");
        assert_eq!(Interval::from_secs(90).unwrap().to_string(), "90s");
        assert_eq!(Interval::DAY.to_string(), "1d");
    }

    #[test]
    fn test_truncate_minute() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 45).unwrap()
            + TimeDelta::milliseconds(250);
        let bucket = Interval::MINUTE.truncate(ts);

        assert_eq!(bucket, Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 0).unwrap());
        assert_eq!(bucket.nanosecond(), 0);
    }

    #[test]
    fn test_truncate_wider_intervals() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 14, 37, 45).unwrap();
        let m5: Interval = "5m".parse().unwrap();
        let m15: Interval = "15m".parse().unwrap();
        let h4: Interval = "4h".parse().unwrap();

        assert_eq!(m5.truncate(ts).minute(), 35);
        assert_eq!(m15.truncate(ts).minute(), 30);
        assert_eq!(h4.truncate(ts).hour(), 12);
        assert_eq!(Interval::DAY.truncate(ts).hour(), 0);
    }

    #[test]
    fn test_truncate_on_boundary() {
        let boundary = Utc.with_ymd_and_hms(2024, 1, 15, 10, 1, 0).unwrap();
        assert_eq!(Interval::MINUTE.truncate(boundary), boundary);

        let just_before = boundary - TimeDelta::nanoseconds(1);
        assert_eq!(
            Interval::MINUTE.truncate(just_before),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_truncate_before_epoch() {
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 30).unwrap()
            + TimeDelta::milliseconds(500);
        assert_eq!(
            Interval::MINUTE.truncate(ts),
            Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_bucket_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(
            Interval::MINUTE.bucket_end(start),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 1, 0).unwrap())
        );
    }

    #[test]
    fn test_extreme_timestamps() {
        let last = Interval::MINUTE.truncate(DateTime::<Utc>::MAX_UTC);
        assert_eq!(last.second(), 0);
        assert_eq!(Interval::MINUTE.bucket_end(last), None);
        let last_day = Interval::DAY.truncate(DateTime::<Utc>::MAX_UTC);
        assert_eq!(Interval::DAY.bucket_end(last_day), None);

        assert_eq!(
            Interval::HOUR.truncate(DateTime::<Utc>::MIN_UTC),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Interval::MINUTE).unwrap();
        assert_eq!(json, "\"1m\"");
        let parsed: Interval = serde_json::from_str("\"h1\"").unwrap();
        assert_eq!(parsed, Interval::HOUR);
    }
}
