/// Exceedance analysis engine.
///
/// Control flow for one request:
///
/// 1. `validate_request` checks coordinates and threshold, then
///    `window::resolve_window` resolves the calendar window, and
///    `validate_year_range` checks the configured years. All of this runs
///    before any upstream call.
/// 2. The `ObservationSource` is asked once for the whole year range.
/// 3. `extremes::yearly_extrema` reduces each year to its in-window maximum.
/// 4. `summary::summarize` computes probability, interval and percentiles.
/// 5. `assemble::assemble_at` packages the result.
///
/// Submodules:
/// - `window`: target date ± window → per-year date lists.
/// - `extremes`: per-year maximum, skipping missing days.
/// - `summary`: exceedance probability, confidence interval, percentiles.
/// - `assemble`: result and provenance packaging.

pub mod assemble;
pub mod extremes;
pub mod summary;
pub mod window;

use chrono::{DateTime, Datelike, Utc};

use crate::config::AnalysisConfig;
use crate::ingest::ObservationSource;
use crate::logging::{self, DataSource};
use crate::model::{AnalysisError, AnalysisRequest, AnalysisResult, ObservationSeries};
use assemble::Provenance;
use window::WindowSpan;

/// Validates every request field and returns the resolved window.
pub fn validate_request(request: &AnalysisRequest) -> Result<WindowSpan, AnalysisError> {
    if !request.latitude.is_finite() || !(-90.0..=90.0).contains(&request.latitude) {
        return Err(AnalysisError::InvalidRequest(format!(
            "latitude must be within [-90, 90], got {}",
            request.latitude
        )));
    }
    if !request.longitude.is_finite() || !(-180.0..=180.0).contains(&request.longitude) {
        return Err(AnalysisError::InvalidRequest(format!(
            "longitude must be within [-180, 180], got {}",
            request.longitude
        )));
    }
    if !request.threshold.is_finite() {
        return Err(AnalysisError::InvalidRequest(format!(
            "threshold must be a finite number, got {}",
            request.threshold
        )));
    }
    window::resolve_window(request.month, request.day, request.window)
}

/// Rejects year ranges outside the archive or past the year of `now`.
pub fn validate_year_range(settings: &AnalysisConfig, now: DateTime<Utc>) -> Result<(), AnalysisError> {
    settings
        .check_year_range(now.year())
        .map_err(AnalysisError::InvalidRequest)
}

/// Runs the engine over an already-fetched series.
pub fn analyze_series_at(
    request: &AnalysisRequest,
    series: &ObservationSeries,
    settings: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<AnalysisResult, AnalysisError> {
    let span = validate_request(request)?;
    validate_year_range(settings, now)?;

    let yearly = extremes::yearly_extrema(series, &span, settings.start_year, settings.end_year);

    let location = logging::location_tag(request.latitude, request.longitude);
    let years_scanned = (settings.end_year - settings.start_year + 1) as usize;
    logging::log_analysis_summary(&location, years_scanned, yearly.len());

    let summary = summary::summarize(&yearly, request.threshold, settings.interval_method).ok_or(
        AnalysisError::InsufficientData {
            start_year: settings.start_year,
            end_year: settings.end_year,
        },
    )?;

    logging::debug(
        DataSource::Engine,
        Some(&location),
        &format!(
            "{} of {} years exceed {} (window {} → {})",
            summary.exceedances, summary.sample_size, request.threshold, span.start, span.end
        ),
    );

    let provenance = Provenance {
        start_year: settings.start_year,
        end_year: settings.end_year,
        interval_method: settings.interval_method,
    };
    Ok(assemble::assemble_at(request, &span, &summary, yearly, provenance, now))
}

/// Convenience wrapper that stamps the result with the real current time.
pub fn analyze_series(
    request: &AnalysisRequest,
    series: &ObservationSeries,
    settings: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_series_at(request, series, settings, Utc::now())
}

/// Validates `request`, fetches its series from `source`, and analyses it.
///
/// Failures are logged with their classification before being returned.
pub fn run_analysis(
    source: &dyn ObservationSource,
    request: &AnalysisRequest,
    settings: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let location = logging::location_tag(request.latitude, request.longitude);

    let outcome = validate_request(request)
        .and_then(|_| validate_year_range(settings, Utc::now()))
        .and_then(|_| {
            let series = source.fetch_daily(
                request.variable.code(),
                request.latitude,
                request.longitude,
                settings.start_year,
                settings.end_year,
            )?;
            analyze_series(request, &series, settings)
        });

    if let Err(ref err) = outcome {
        logging::log_analysis_failure(&location, "analysis", err);
    }
    outcome
}
