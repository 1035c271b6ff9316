//! Reduction of daily observations to one extremum per year.

use crate::analysis::window::WindowSpan;
use crate::model::{ObservationSeries, YearlyExtremum};

/// Maximum valid observation within `span` for scanned year `year`.
///
/// Missing and sentinel days are skipped. Returns `None` if the year has no
/// valid in-window day.
pub fn year_extremum(series: &ObservationSeries, span: &WindowSpan, year: i32) -> Option<f64> {
    span.dates_for_year(year)
        .into_iter()
        .filter_map(|date| series.get(date))
        .fold(None, |max: Option<f64>, value| match max {
            Some(current) if current >= value => Some(current),
            _ => Some(value),
        })
}

/// One `YearlyExtremum` per year in `start_year..=end_year` that has at least
/// one valid in-window observation, ascending by year.
///
/// Years with no valid observations are omitted, not recorded as zero.
pub fn yearly_extrema(
    series: &ObservationSeries,
    span: &WindowSpan,
    start_year: i32,
    end_year: i32,
) -> Vec<YearlyExtremum> {
    (start_year..=end_year)
        .filter_map(|year| {
            year_extremum(series, span, year).map(|max_value| YearlyExtremum { year, max_value })
        })
        .collect()
}
