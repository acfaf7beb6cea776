use crate::station::StationId;
use chrono::{Days, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::mem::replace;

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateSpan { start, end }
    }

    /// The trailing span of `days` calendar days ending at `end` (inclusive).
    /// `days` of zero is treated as one day.
    pub fn recent(end: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        DateSpan { start, end }
    }

    /// January 1 through December 31 of the given year.
    pub fn calendar_year(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
        DateSpan { start, end }
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Iterate every day in the span in order.
    pub fn days(&self) -> SpanDays {
        SpanDays(self.start, self.end)
    }
}

/// Iterator yielding each date from the span start through its end
/// (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct SpanDays(pub NaiveDate, pub NaiveDate);

impl Iterator for SpanDays {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

/// A user-selectable chart window for one station. Doubles as the cache key.
///
/// `year` selects a whole archive calendar year and takes precedence over
/// the rolling `days` count when set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub station: StationId,
    pub days: u32,
    pub year: Option<i32>,
}

impl TimeWindow {
    /// Rolling window over the trailing `days` days.
    pub fn last_days(station: StationId, days: u32) -> Self {
        TimeWindow {
            station,
            days,
            year: None,
        }
    }

    /// A whole past calendar year from the archive.
    pub fn calendar_year(station: StationId, year: i32) -> Self {
        TimeWindow {
            station,
            days: 365,
            year: Some(year),
        }
    }

    pub fn is_archive_year(&self) -> bool {
        self.year.is_some()
    }
}
