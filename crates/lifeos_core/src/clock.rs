//! Time source for task timestamps.

use chrono::{Local, NaiveDate, Utc};

/// Supplies creation timestamps to the task store.
pub trait Clock {
    /// Current time as Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        now_epoch_ms()
    }
}

pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's calendar date in the local timezone.
///
/// Compute once per render pass and pass it to the derived views.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
