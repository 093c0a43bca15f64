//! Wall clock and the simulated calendar walk.
//!
//! The wall clock is read exactly once per generation run; every
//! past/future decision is made against that single reading.

use crate::types::day_start;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Source of "now" for a generation run.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A frozen clock, used in tests and for reproducible reruns.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl WallClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Past,
    Future,
}

/// Day-by-day walk from the start date through `now + future_days`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimCalendar {
    pub now:         NaiveDateTime,
    pub current_day: NaiveDate,
    pub end:         NaiveDateTime,
}

impl SimCalendar {
    pub fn new(start: NaiveDate, now: NaiveDateTime, future_days: i64) -> Self {
        Self {
            now,
            current_day: start,
            end: now + Duration::days(future_days),
        }
    }

    /// A day is future iff its midnight lies after `now`; today is past.
    pub fn classify(&self, day: NaiveDate) -> DayKind {
        if day_start(day) > self.now {
            DayKind::Future
        } else {
            DayKind::Past
        }
    }

    /// True while the current day's midnight is within the horizon.
    pub fn in_horizon(&self) -> bool {
        day_start(self.current_day) <= self.end
    }

    /// Advance one day. Returns the new current day.
    pub fn advance(&mut self) -> NaiveDate {
        self.current_day += Duration::days(1);
        self.current_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn today_is_past_tomorrow_is_future() {
        let now = d(2024, 1, 10).and_hms_opt(12, 0, 0).unwrap();
        let cal = SimCalendar::new(d(2024, 1, 1), now, 30);
        assert_eq!(cal.classify(d(2024, 1, 10)), DayKind::Past);
        assert_eq!(cal.classify(d(2024, 1, 11)), DayKind::Future);
    }

    #[test]
    fn walk_covers_start_through_now_plus_window() {
        let now = d(2024, 1, 10).and_hms_opt(12, 0, 0).unwrap();
        let mut cal = SimCalendar::new(d(2024, 1, 1), now, 30);
        let mut days = Vec::new();
        while cal.in_horizon() {
            days.push(cal.current_day);
            cal.advance();
        }
        assert_eq!(days.first(), Some(&d(2024, 1, 1)));
        assert_eq!(days.last(), Some(&d(2024, 2, 9)));
        assert_eq!(days.len(), 40);
    }
}
