//! Wall-clock abstraction.
//!
//! Session timestamps and completion durations read the time through a
//! [`Clock`] so tests can pin it.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system UTC clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whole minutes between `started_at` and `now`, rounded up.
///
/// A negative span (clock skew) yields zero.
pub fn elapsed_minutes_ceil(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed_ms = (now - started_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }
    let minutes = (elapsed_ms + 59_999) / 60_000;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now() - start, Duration::seconds(90));
    }

    #[test]
    fn test_elapsed_minutes_ceil() {
        let start = Utc::now();
        assert_eq!(elapsed_minutes_ceil(start, start), 0);
        assert_eq!(elapsed_minutes_ceil(start, start + Duration::minutes(7)), 7);
        assert_eq!(
            elapsed_minutes_ceil(start, start + Duration::minutes(7) + Duration::milliseconds(1)),
            8
        );
        assert_eq!(elapsed_minutes_ceil(start, start + Duration::seconds(1)), 1);
        assert_eq!(elapsed_minutes_ceil(start, start - Duration::minutes(3)), 0);
    }
}
