//! Wall-clock access for hosts that stamp actions and save slots.
//!
//! The core never reads time; everything that needs "now" in this crate goes
//! through a [`Clock`] so tests can pin it.

use chrono::{DateTime, SecondsFormat, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `now()` as an RFC 3339 UTC string with millisecond precision.
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock pinned at `millis` after the Unix epoch, or `None` when out of range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        from_epoch_millis(millis).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_millisecond_precision() {
        let clock = FixedClock::from_epoch_millis(1_700_000_000_123).unwrap();
        assert_eq!(clock.timestamp(), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn epoch_zero() {
        assert_eq!(
            format_timestamp(from_epoch_millis(0).unwrap()),
            "1970-01-01T00:00:00.000Z"
        );
    }
}
