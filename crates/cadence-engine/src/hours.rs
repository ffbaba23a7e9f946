//! Market-hours gate.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};

/// Regular session window, interpreted in UTC.
#[derive(Debug, Clone, Copy)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl SessionWindow {
    /// Create a window. Callers validate `open < close` at config load.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Whether the timestamp falls inside a weekday session.
    ///
    /// The close is exclusive: a cycle starting exactly at the close
    /// does not trade.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = now.time();
        time >= self.open && time < self.close
    }
}
