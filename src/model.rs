/// Core data types for the exceedance analysis service.
///
/// This module defines the shared domain model imported by all other modules:
/// the inbound request, the historical observation series, the per-year
/// extrema, the assembled result, and the error taxonomy.
/// It contains no analysis logic and no I/O.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::variables::VariableId;

// ---------------------------------------------------------------------------
// Historical range
// ---------------------------------------------------------------------------

/// First year of the POWER daily archive. Ranges may not start earlier.
pub const EARLIEST_ARCHIVE_YEAR: i32 = 1981;

/// First calendar year of the default analysis range.
pub const DEFAULT_START_YEAR: i32 = EARLIEST_ARCHIVE_YEAR;

/// Last calendar year of the default analysis range.
pub const DEFAULT_END_YEAR: i32 = 2023;

/// Widest accepted window, in days either side of the target date.
pub const MAX_WINDOW_DAYS: u32 = 30;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A single analysis request: location, target calendar date, tolerance
/// window, threshold, and the weather variable to examine.
///
/// Validated by `analysis::validate_request` before any upstream call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub month: u32,
    pub day: u32,
    pub window: u32,
    pub threshold: f64,
    pub variable: VariableId,
}

// ---------------------------------------------------------------------------
// Observation series
// ---------------------------------------------------------------------------

/// Daily values of one variable at one location.
///
/// A `None` entry means the upstream source reported the day with its
/// sentinel fill value (or `null`). Days the source did not report at all are
/// absent from the map. Both cases read back as "no observation".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    pub variable_code: String,
    values: BTreeMap<NaiveDate, Option<f64>>,
}

impl ObservationSeries {
    pub fn new(variable_code: impl Into<String>) -> Self {
        Self {
            variable_code: variable_code.into(),
            values: BTreeMap::new(),
        }
    }

    /// Records the value for `date`, replacing any earlier entry.
    pub fn insert(&mut self, date: NaiveDate, value: Option<f64>) {
        self.values.insert(date, value);
    }

    /// Returns the observed value for `date`, or `None` if the day is
    /// missing or was reported as a sentinel.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied().flatten()
    }

    /// Number of days present in the series, including sentinel days.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of days that were reported without a usable value.
    pub fn missing_count(&self) -> usize {
        self.values.values().filter(|v| v.is_none()).count()
    }

    /// First and last reported dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.values.keys().next()?;
        let last = self.values.keys().next_back()?;
        Some((*first, *last))
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The maximum in-window value observed in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyExtremum {
    pub year: i32,
    pub max_value: f64,
}

/// A two-sided 95% confidence interval on the exceedance probability, in
/// percent. Serialised as a `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl From<(f64, f64)> for ConfidenceInterval {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<ConfidenceInterval> for (f64, f64) {
    fn from(ci: ConfidenceInterval) -> Self {
        (ci.low, ci.high)
    }
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Nearest-rank percentiles of the yearly extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub month: u32,
    pub day: u32,
    pub window_days: u32,
    /// Resolved first day of the window, `MM-DD`.
    pub start: String,
    /// Resolved last day of the window, `MM-DD`.
    pub end: String,
    /// True when the window crosses Dec 31 → Jan 1.
    pub wraps_year: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub id: VariableId,
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_year: i32,
    pub end_year: i32,
}

/// Request and provenance details attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub location: Location,
    pub date_window: DateWindow,
    pub threshold: f64,
    pub variable: VariableInfo,
    pub data_source: String,
    pub api_url: String,
    pub date_range: DateRange,
    pub interval_method: String,
    pub generated_at: String,
}

/// The complete output of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Percentage of analysed years whose extremum strictly exceeds the threshold.
    pub probability: f64,
    pub confidence_interval: ConfidenceInterval,
    pub years_analyzed: usize,
    pub percentiles: Percentiles,
    /// Ascending by year, one entry per year with at least one valid sample.
    pub yearly_data: Vec<YearlyExtremum>,
    pub metadata: ResultMetadata,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that terminate an analysis request. None of them carry a partial
/// result.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A request parameter is malformed or out of range.
    InvalidRequest(String),
    /// The upstream source answered with a non-2xx status or could not be
    /// reached at all (`status` is `None`).
    UpstreamUnavailable { status: Option<u16>, message: String },
    /// No year in the range produced a valid in-window observation.
    InsufficientData { start_year: i32, end_year: i32 },
    /// The upstream body did not have the expected variable/date structure.
    MalformedUpstreamPayload(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AnalysisError::UpstreamUnavailable { status: Some(code), message } => {
                write!(f, "Upstream unavailable (HTTP {}): {}", code, message)
            }
            AnalysisError::UpstreamUnavailable { status: None, message } => {
                write!(f, "Upstream unavailable: {}", message)
            }
            AnalysisError::InsufficientData { start_year, end_year } => write!(
                f,
                "Insufficient data: no year between {} and {} has a valid in-window observation",
                start_year, end_year
            ),
            AnalysisError::MalformedUpstreamPayload(msg) => {
                write!(f, "Malformed upstream payload: {}", msg)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}
