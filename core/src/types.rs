//! Shared primitive types used across the entire crate.

use crate::error::{FabError, FabResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Store-assigned row identity (SQLite rowid).
pub type RowId = i64;

pub type DeptId = RowId;
pub type MachineId = RowId;
pub type ProductId = RowId;
pub type AlarmId = RowId;

/// Midnight at the start of `day`.
pub fn day_start(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// An inclusive range of calendar days, the key of every dashboard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to:   NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> FabResult<Self> {
        if from > to {
            return Err(FabError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Half-open timestamp bounds: `[from 00:00, to + 1 day 00:00)`.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (day_start(self.from), day_start(self.to) + Duration::days(1))
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let (lo, hi) = self.bounds();
        ts >= lo && ts < hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(DateRange::new(d(2024, 2, 1), d(2024, 1, 1)).is_err());
    }

    #[test]
    fn upper_bound_includes_the_whole_last_day() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
        let late = d(2024, 1, 10).and_hms_opt(23, 59, 0).unwrap();
        assert!(range.contains(late));
        assert!(!range.contains(day_start(d(2024, 1, 11))));
    }
}
