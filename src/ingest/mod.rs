/// Historical data ingestion.
///
/// Submodules:
/// - `power`: NASA POWER daily point API client, payload parser, and a
///   file-backed replay source for offline runs.

pub mod power;

use crate::model::{AnalysisError, ObservationSeries};

/// A provider of multi-decade daily series for one variable at one point.
///
/// The analysis engine calls `fetch_daily` exactly once per request, for the
/// whole `[start_year, end_year]` range.
pub trait ObservationSource {
    fn fetch_daily(
        &self,
        variable_code: &str,
        latitude: f64,
        longitude: f64,
        start_year: i32,
        end_year: i32,
    ) -> Result<ObservationSeries, AnalysisError>;
}
