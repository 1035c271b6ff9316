//! Date-window resolution.
//!
//! A request names a target `(month, day)` and a tolerance of `window` days
//! either side. The bounds are computed once in a fixed common reference
//! year, then laid onto each scanned year using that year's own calendar, so
//! a leap year picks up Feb 29 whenever the window spans the end of February.
//!
//! # Year-boundary policy
//!
//! The target date always belongs to the scanned year `Y`. When the window
//! start rolls back past Jan 1 it lands in December of `Y - 1`; when the end
//! rolls past Dec 31 it lands in January of `Y + 1`. With at most 30 days
//! either side only one end can wrap. Days outside the fetched archive are
//! simply absent from the series.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

use crate::model::{AnalysisError, MAX_WINDOW_DAYS};

/// Common (non-leap) year used for window arithmetic.
pub const REFERENCE_YEAR: i32 = 2001;

/// Returns `true` if `year` has a Feb 29.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in `month` of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A calendar position without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    /// Places this month/day in `year`, clamping the day to that month's
    /// length (Feb 29 → Feb 28 in common years).
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        let day = self.day.min(days_in_month(year, self.month));
        NaiveDate::from_ymd_opt(year, self.month, day)
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.month(), date.day())
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Resolved window bounds, independent of any particular year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub start: MonthDay,
    pub end: MonthDay,
    /// 0, or -1 when the start falls in the previous December.
    pub start_year_offset: i32,
    /// 0, or +1 when the end falls in the following January.
    pub end_year_offset: i32,
}

impl WindowSpan {
    /// True when the window crosses Dec 31 → Jan 1.
    pub fn wraps_year(&self) -> bool {
        self.start_year_offset != 0 || self.end_year_offset != 0
    }

    /// Every in-window date for scanned year `year`, in ascending order.
    pub fn dates_for_year(&self, year: i32) -> Vec<NaiveDate> {
        let (Some(first), Some(last)) = (
            self.start.in_year(year + self.start_year_offset),
            self.end.in_year(year + self.end_year_offset),
        ) else {
            return Vec::new();
        };

        let mut dates = Vec::new();
        let mut current = first;
        while current <= last {
            dates.push(current);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }
}

/// Checks `month`, `day` and `window` and resolves the window bounds.
///
/// `day` may be up to the month's leap-year length, so Feb 29 is accepted.
/// With `window == 0` the span is the single requested date. Otherwise a
/// Feb 29 target is treated as Feb 28 for the reference arithmetic; any
/// window that reaches into March still covers Feb 29 in leap years.
pub fn resolve_window(month: u32, day: u32, window: u32) -> Result<WindowSpan, AnalysisError> {
    if !(1..=12).contains(&month) {
        return Err(AnalysisError::InvalidRequest(format!(
            "month must be 1-12, got {}",
            month
        )));
    }
    let max_day = days_in_month(2000, month);
    if day < 1 || day > max_day {
        return Err(AnalysisError::InvalidRequest(format!(
            "day must be 1-{} for month {}, got {}",
            max_day, month, day
        )));
    }
    if window > MAX_WINDOW_DAYS {
        return Err(AnalysisError::InvalidRequest(format!(
            "window must be 0-{} days, got {}",
            MAX_WINDOW_DAYS, window
        )));
    }

    if window == 0 {
        let target = MonthDay::new(month, day);
        return Ok(WindowSpan {
            start: target,
            end: target,
            start_year_offset: 0,
            end_year_offset: 0,
        });
    }

    let anchor = MonthDay::new(month, day)
        .in_year(REFERENCE_YEAR)
        .ok_or_else(|| AnalysisError::InvalidRequest(format!("no such date {:02}-{:02}", month, day)))?;
    let offset = Days::new(u64::from(window));
    let start = anchor
        .checked_sub_days(offset)
        .ok_or_else(|| AnalysisError::InvalidRequest("window start out of range".into()))?;
    let end = anchor
        .checked_add_days(offset)
        .ok_or_else(|| AnalysisError::InvalidRequest("window end out of range".into()))?;

    Ok(WindowSpan {
        start: start.into(),
        end: end.into(),
        start_year_offset: start.year() - REFERENCE_YEAR,
        end_year_offset: end.year() - REFERENCE_YEAR,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2001, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28, "1900 is not a leap year");
        assert_eq!(days_in_month(2001, 4), 30);
        assert_eq!(days_in_month(2001, 12), 31);
        assert_eq!(days_in_month(2001, 13), 0);
    }

    #[test]
    fn test_reference_year_is_common() {
        assert!(!is_leap_year(REFERENCE_YEAR));
    }

    #[test]
    fn test_mid_month_window_stays_in_month() {
        let span = resolve_window(7, 15, 3).unwrap();
        assert_eq!(span.start, MonthDay::new(7, 12));
        assert_eq!(span.end, MonthDay::new(7, 18));
        assert!(!span.wraps_year());
        assert_eq!(span.dates_for_year(1990).len(), 7);
    }

    #[test]
    fn test_window_rolls_into_next_month() {
        let span = resolve_window(4, 28, 5).unwrap();
        assert_eq!(span.start, MonthDay::new(4, 23));
        assert_eq!(span.end, MonthDay::new(5, 3));
        let dates = span.dates_for_year(2010);
        assert_eq!(dates.first(), Some(&date(2010, 4, 23)));
        assert_eq!(dates.last(), Some(&date(2010, 5, 3)));
        assert_eq!(dates.len(), 11);
    }

    #[test]
    fn test_window_zero_is_single_date() {
        let span = resolve_window(6, 30, 0).unwrap();
        assert_eq!(span.dates_for_year(1995), vec![date(1995, 6, 30)]);
    }

    #[test]
    fn test_window_zero_feb_29_clamps_per_year() {
        let span = resolve_window(2, 29, 0).unwrap();
        assert_eq!(span.dates_for_year(2000), vec![date(2000, 2, 29)]);
        assert_eq!(span.dates_for_year(2001), vec![date(2001, 2, 28)]);
    }

    #[test]
    fn test_end_of_february_includes_leap_day_only_in_leap_years() {
        let span = resolve_window(2, 28, 3).unwrap();
        assert_eq!(span.start, MonthDay::new(2, 25));
        assert_eq!(span.end, MonthDay::new(3, 3));

        let leap = span.dates_for_year(2000);
        assert_eq!(leap.len(), 8);
        assert!(leap.contains(&date(2000, 2, 29)));

        let common = span.dates_for_year(2001);
        assert_eq!(common.len(), 7);
        assert_eq!(common[3], date(2001, 2, 28));
        assert_eq!(common[4], date(2001, 3, 1));
    }

    #[test]
    fn test_feb_29_with_window_covers_leap_day() {
        let span = resolve_window(2, 29, 1).unwrap();
        assert_eq!(span.start, MonthDay::new(2, 27));
        assert_eq!(span.end, MonthDay::new(3, 1));
        assert!(span.dates_for_year(2004).contains(&date(2004, 2, 29)));
        assert_eq!(span.dates_for_year(2003).len(), 3);
    }

    #[test]
    fn test_early_january_window_starts_in_previous_december() {
        let span = resolve_window(1, 1, 5).unwrap();
        assert_eq!(span.start, MonthDay::new(12, 27));
        assert_eq!(span.end, MonthDay::new(1, 6));
        assert_eq!(span.start_year_offset, -1);
        assert_eq!(span.end_year_offset, 0);
        assert!(span.wraps_year());

        let dates = span.dates_for_year(1990);
        assert_eq!(dates.len(), 11);
        assert_eq!(dates.first(), Some(&date(1989, 12, 27)));
        assert_eq!(dates.last(), Some(&date(1990, 1, 6)));
    }

    #[test]
    fn test_late_december_window_ends_in_next_january() {
        let span = resolve_window(12, 30, 5).unwrap();
        assert_eq!(span.start, MonthDay::new(12, 25));
        assert_eq!(span.end, MonthDay::new(1, 4));
        assert_eq!(span.end_year_offset, 1);

        let dates = span.dates_for_year(2023);
        assert_eq!(dates.first(), Some(&date(2023, 12, 25)));
        assert_eq!(dates.last(), Some(&date(2024, 1, 4)));
        assert_eq!(dates.len(), 11);
    }

    #[test]
    fn test_dates_are_strictly_ascending_and_unique() {
        let span = resolve_window(3, 1, 30).unwrap();
        let dates = span.dates_for_year(2000);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dates.len(), 62, "Jan 30 .. Mar 31 in a leap year");
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(matches!(resolve_window(0, 1, 3), Err(AnalysisError::InvalidRequest(_))));
        assert!(matches!(resolve_window(13, 1, 3), Err(AnalysisError::InvalidRequest(_))));
        assert!(matches!(resolve_window(4, 31, 3), Err(AnalysisError::InvalidRequest(_))));
        assert!(matches!(resolve_window(2, 30, 3), Err(AnalysisError::InvalidRequest(_))));
        assert!(matches!(resolve_window(5, 0, 3), Err(AnalysisError::InvalidRequest(_))));
        assert!(matches!(resolve_window(5, 10, 31), Err(AnalysisError::InvalidRequest(_))));
        assert!(resolve_window(5, 10, 30).is_ok());
    }

    #[test]
    fn test_month_day_display() {
        assert_eq!(MonthDay::new(3, 7).to_string(), "03-07");
    }
}
