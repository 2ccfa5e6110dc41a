use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Longest window accepted from configuration.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// A trailing `[start, end)` interval queried as a single aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: u32,
}

impl Window {
    /// `None` when the start would fall outside the representable time range.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Option<Self> {
        let start = end.checked_sub_signed(Duration::days(i64::from(days)))?;
        Some(Self { start, end, days })
    }

    pub fn trailing(days: u32) -> Option<Self> {
        Self::ending_at(Utc::now(), days)
    }

    /// Period length covering the whole window.
    pub fn period_secs(&self) -> u64 {
        u64::from(self.days) * SECONDS_PER_DAY
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}
