//! Manually driven time source.

use crate::ports::TimeSource;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use std::time::Duration;

/// Time source that only moves when told to.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: RwLock<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Start at a Unix timestamp in seconds.
    pub fn at_timestamp(secs: i64) -> Self {
        Self::new(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        if let Ok(delta) = chrono::Duration::from_std(by) {
            *now = now.checked_add_signed(delta).unwrap_or(*now);
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
