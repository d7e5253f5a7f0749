// week.rs — Monday-to-Sunday reporting weeks in UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_WINDOW_WEEKS;

/// Monday of the week containing `date`. Saturates at the calendar's edges.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    // `num_days_from_monday` is the Sunday-indexed weekday shifted by six, mod seven.
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN)
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date)
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX)
}

/// One reporting week, Monday 00:00:00 through Sunday 23:59:59.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Week {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: week_start(date),
            end: week_end(date),
        }
    }

    pub fn current(now: DateTime<Utc>) -> Self {
        Self::containing(now.date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN))
    }
}

/// The `weeks` weeks ending with the current one, oldest first. At most
/// `MAX_WINDOW_WEEKS`.
pub fn trailing_weeks(now: DateTime<Utc>, weeks: u32) -> Vec<Week> {
    let weeks = weeks.min(MAX_WINDOW_WEEKS);
    let mut out = Vec::with_capacity(weeks as usize);
    let mut week = Week::current(now);
    for _ in 0..weeks {
        out.push(week);
        week = week.previous();
    }
    out.reverse();
    out
}

/// Date range covered by an insight window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub weeks: u32,
}

impl WindowRange {
    pub fn new(now: DateTime<Utc>, weeks: u32) -> Self {
        let weeks = weeks.clamp(1, MAX_WINDOW_WEEKS);
        let trailing = trailing_weeks(now, weeks);
        let current = Week::current(now);
        Self {
            from: trailing.first().map(|w| w.start).unwrap_or(current.start),
            to: current.end,
            weeks,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Consecutive weeks, ending at `current`, that contain at least one of
/// `dates`. Looks back at most `limit` weeks.
pub fn streak_weeks(dates: &[NaiveDate], current: Week, limit: u32) -> u32 {
    let mut streak = 0;
    let mut week = current;
    while streak < limit && dates.iter().any(|d| week.contains(*d)) {
        streak += 1;
        week = week.previous();
    }
    streak
}
