//! Date-range resolver
//!
//! Maps a filter (day / week / month) and a reference date to an inclusive
//! `[start, end]` window of Unix millis in the business time zone.

use chrono::{Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;
use shared::models::FilterKind;

use crate::storage::TimeRange;
use crate::utils::time::{day_end_millis, day_start_millis, millis_to_local_rfc3339, parse_date, parse_month};
use crate::utils::AppResult;

/// `?day=` / `?week=` / `?month=` query parameters
///
/// Empty values count as absent. When several are present the narrowest wins:
/// day, then week, then month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub day: Option<String>,
    pub week: Option<String>,
    pub month: Option<String>,
}

/// A parsed date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Day(NaiveDate),
    Week(NaiveDate),
    Month(NaiveDate),
    All,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DateFilter {
    pub fn from_query(query: &DateQuery) -> AppResult<Self> {
        if let Some(day) = present(&query.day) {
            return Ok(Self::Day(parse_date(day, "day")?));
        }
        if let Some(week) = present(&query.week) {
            return Ok(Self::Week(parse_date(week, "week")?));
        }
        if let Some(month) = present(&query.month) {
            return Ok(Self::Month(parse_month(month, "month")?));
        }
        Ok(Self::All)
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Day(_) => FilterKind::Day,
            Self::Week(_) => FilterKind::Week,
            Self::Month(_) => FilterKind::Month,
            Self::All => FilterKind::All,
        }
    }

    /// First and last calendar day covered; `None` when unbounded
    pub fn calendar_days(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Self::Day(date) => Some((date, date)),
            Self::Week(date) => {
                let offset = date.weekday().num_days_from_monday() as u64;
                let monday = date.checked_sub_days(Days::new(offset))?;
                let sunday = monday.checked_add_days(Days::new(6))?;
                Some((monday, sunday))
            }
            Self::Month(date) => {
                let first = date.with_day(1)?;
                let last = first
                    .checked_add_months(chrono::Months::new(1))?
                    .pred_opt()?;
                Some((first, last))
            }
            Self::All => None,
        }
    }

    /// Resolve to an instant window in `tz`
    pub fn resolve(&self, tz: Tz) -> DateWindow {
        let range = self.calendar_days().map(|(first, last)| TimeRange {
            start: day_start_millis(first, tz),
            end: day_end_millis(last, tz),
        });
        DateWindow {
            kind: self.kind(),
            range,
        }
    }
}

/// Resolved window; `range == None` means every order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub kind: FilterKind,
    pub range: Option<TimeRange>,
}

impl DateWindow {
    /// `(from, to)` labels in the business time zone
    pub fn labels(&self, tz: Tz) -> (Option<String>, Option<String>) {
        match self.range {
            Some(r) => (
                Some(millis_to_local_rfc3339(r.start, tz)),
                Some(millis_to_local_rfc3339(r.end, tz)),
            ),
            None => (None, None),
        }
    }
}
