/// NASA POWER Daily Point API Client
///
/// Retrieves daily time series for a single variable at a single point from
/// the NASA Prediction Of Worldwide Energy Resources (POWER) service.
///
/// API Documentation: https://power.larc.nasa.gov/docs/services/api/temporal/daily/
///
/// Response shape (trimmed):
///
/// ```text
/// {
///   "header": { "fill_value": -999.0, ... },
///   "properties": { "parameter": { "T2M_MAX": { "19810101": 3.52, ... } } }
/// }
/// ```
///
/// Days the archive cannot fill are reported with `fill_value`. They are
/// converted to `None` here so no arithmetic downstream ever sees the sentinel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use super::ObservationSource;
use crate::config::SourceConfig;
use crate::logging::{self, DataSource};
use crate::model::{AnalysisError, ObservationSeries};

/// POWER's documented fill value for days without data.
pub const DEFAULT_FILL_VALUE: f64 = -999.0;

/// Longest upstream error body carried into an error message.
const ERROR_EXCERPT_CHARS: usize = 200;

// ============================================================================
// POWER API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PowerDailyResponse {
    #[serde(default)]
    pub header: Option<PowerHeader>,
    #[serde(default)]
    pub properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
pub struct PowerHeader {
    #[serde(default)]
    pub fill_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PowerProperties {
    /// variable code → `YYYYMMDD` → value
    pub parameter: HashMap<String, HashMap<String, Option<f64>>>,
}

// ============================================================================
// URL construction
// ============================================================================

/// Formats a date as the `YYYYMMDD` form POWER expects.
pub fn format_power_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Builds the daily point-data URL for `variable_code` covering
/// `start_year-01-01` through `end_year-12-31`.
pub fn build_daily_url(
    source: &SourceConfig,
    variable_code: &str,
    latitude: f64,
    longitude: f64,
    start_year: i32,
    end_year: i32,
) -> String {
    format!(
        "{}?parameters={}&community={}&longitude={}&latitude={}&start={:04}0101&end={:04}1231&format=JSON",
        source.base_url.trim_end_matches('/'),
        variable_code,
        source.community,
        longitude,
        latitude,
        start_year,
        end_year
    )
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a `YYYYMMDD` key. Returns `None` for anything else.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = key[0..4].parse().ok()?;
    let month: u32 = key[4..6].parse().ok()?;
    let day: u32 = key[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Returns `true` if `value` is the fill sentinel or not a real number.
pub fn is_sentinel(value: f64, fill_value: f64) -> bool {
    !value.is_finite() || (value - fill_value).abs() < 1e-9
}

/// Parses a POWER daily point response body into an `ObservationSeries`.
///
/// Sentinel and `null` values become `None`. A body that is not JSON, lacks
/// `properties.parameter[variable_code]`, or carries a non-date key is a
/// `MalformedUpstreamPayload`.
pub fn parse_daily_response(body: &str, variable_code: &str) -> Result<ObservationSeries, AnalysisError> {
    let response: PowerDailyResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedUpstreamPayload(format!("invalid JSON: {}", e)))?;

    let fill_value = response
        .header
        .and_then(|h| h.fill_value)
        .unwrap_or(DEFAULT_FILL_VALUE);

    let mut parameters = response
        .properties
        .ok_or_else(|| AnalysisError::MalformedUpstreamPayload("response has no properties block".into()))?
        .parameter;

    let daily = parameters.remove(variable_code).ok_or_else(|| {
        AnalysisError::MalformedUpstreamPayload(format!(
            "properties.parameter has no entry for {}",
            variable_code
        ))
    })?;

    let mut series = ObservationSeries::new(variable_code);
    for (key, value) in daily {
        let date = parse_date_key(&key).ok_or_else(|| {
            AnalysisError::MalformedUpstreamPayload(format!(
                "unexpected date key '{}' under {}",
                key, variable_code
            ))
        })?;
        series.insert(date, value.filter(|v| !is_sentinel(*v, fill_value)));
    }

    Ok(series)
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= ERROR_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(ERROR_EXCERPT_CHARS).collect();
        format!("{}…", cut)
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Live POWER source: one blocking GET per request.
pub struct PowerClient {
    client: reqwest::blocking::Client,
    source: SourceConfig,
}

impl PowerClient {
    pub fn new(source: &SourceConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::UpstreamUnavailable {
                status: None,
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            source: source.clone(),
        })
    }
}

impl ObservationSource for PowerClient {
    fn fetch_daily(
        &self,
        variable_code: &str,
        latitude: f64,
        longitude: f64,
        start_year: i32,
        end_year: i32,
    ) -> Result<ObservationSeries, AnalysisError> {
        let url = build_daily_url(&self.source, variable_code, latitude, longitude, start_year, end_year);
        let location = logging::location_tag(latitude, longitude);
        logging::debug(DataSource::Power, Some(&location), &format!("GET {}", url));

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| AnalysisError::UpstreamUnavailable {
                status: None,
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                message: excerpt(&body),
            });
        }

        let body = response.text().map_err(|e| AnalysisError::UpstreamUnavailable {
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {}", e),
        })?;

        let series = parse_daily_response(&body, variable_code)?;
        logging::info(
            DataSource::Power,
            Some(&location),
            &format!(
                "Received {} days of {} ({} missing)",
                series.len(),
                variable_code,
                series.missing_count()
            ),
        );
        Ok(series)
    }
}

// ============================================================================
// Payload replay
// ============================================================================

/// Replays a previously saved POWER response from disk.
///
/// The file decides which days exist; the location and year range passed to
/// `fetch_daily` are only used for logging.
pub struct PayloadFile {
    path: PathBuf,
}

impl PayloadFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ObservationSource for PayloadFile {
    fn fetch_daily(
        &self,
        variable_code: &str,
        latitude: f64,
        longitude: f64,
        _start_year: i32,
        _end_year: i32,
    ) -> Result<ObservationSeries, AnalysisError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| AnalysisError::UpstreamUnavailable {
            status: None,
            message: format!("cannot read payload {}: {}", self.path.display(), e),
        })?;

        logging::info(
            DataSource::Power,
            Some(&logging::location_tag(latitude, longitude)),
            &format!("Replaying {} from {}", variable_code, self.path.display()),
        );
        parse_daily_response(&body, variable_code)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = r#"{
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [-89.6, 40.7, 180.0]},
        "header": {"title": "NASA/POWER", "fill_value": -999.0, "start": "20000101", "end": "20000104"},
        "properties": {
            "parameter": {
                "T2M_MAX": {
                    "20000101": 3.52,
                    "20000102": -999.0,
                    "20000103": null,
                    "20000104": -1.25
                }
            }
        }
    }"#;

    #[test]
    fn test_build_daily_url_covers_full_years() {
        let source = SourceConfig::default();
        let url = build_daily_url(&source, "T2M_MAX", 40.7, -89.6, 1981, 2023);
        assert_eq!(
            url,
            "https://power.larc.nasa.gov/api/temporal/daily/point?parameters=T2M_MAX&community=RE\
             &longitude=-89.6&latitude=40.7&start=19810101&end=20231231&format=JSON"
        );
    }

    #[test]
    fn test_build_daily_url_strips_trailing_slash() {
        let source = SourceConfig {
            base_url: "http://localhost:8080/daily/".into(),
            ..SourceConfig::default()
        };
        let url = build_daily_url(&source, "WS2M", 0.0, 0.0, 2000, 2000);
        assert!(url.starts_with("http://localhost:8080/daily?parameters=WS2M"), "got {}", url);
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(parse_date_key("19810101"), Some(date(1981, 1, 1)));
        assert_eq!(parse_date_key("20000229"), Some(date(2000, 2, 29)));
        assert_eq!(parse_date_key("20010229"), None, "Feb 29 in a common year");
        assert_eq!(parse_date_key("2001-01-01"), None);
        assert_eq!(parse_date_key("ANN"), None);
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_sentinel(-999.0, DEFAULT_FILL_VALUE));
        assert!(is_sentinel(f64::NAN, DEFAULT_FILL_VALUE));
        assert!(!is_sentinel(-99.9, DEFAULT_FILL_VALUE));
        assert!(!is_sentinel(0.0, DEFAULT_FILL_VALUE));
    }

    #[test]
    fn test_parse_converts_sentinel_and_null_to_missing() {
        let series = parse_daily_response(SAMPLE, "T2M_MAX").expect("sample should parse");
        assert_eq!(series.len(), 4);
        assert_eq!(series.missing_count(), 2);
        assert_eq!(series.get(date(2000, 1, 1)), Some(3.52));
        assert_eq!(series.get(date(2000, 1, 2)), None);
        assert_eq!(series.get(date(2000, 1, 3)), None);
        assert_eq!(series.get(date(2000, 1, 4)), Some(-1.25));
    }

    #[test]
    fn test_parse_honours_custom_fill_value() {
        let body = r#"{"header": {"fill_value": -99.0},
                       "properties": {"parameter": {"RH2M": {"20100101": -99.0, "20100102": -999.0}}}}"#;
        let series = parse_daily_response(body, "RH2M").unwrap();
        assert_eq!(series.get(date(2010, 1, 1)), None);
        assert_eq!(series.get(date(2010, 1, 2)), Some(-999.0));
    }

    #[test]
    fn test_parse_missing_variable_is_malformed() {
        let err = parse_daily_response(SAMPLE, "WS2M").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedUpstreamPayload(_)), "got {:?}", err);
    }

    #[test]
    fn test_parse_missing_properties_is_malformed() {
        let err = parse_daily_response(r#"{"messages": ["bad request"]}"#, "T2M_MAX").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedUpstreamPayload(_)));
    }

    #[test]
    fn test_parse_bad_date_key_is_malformed() {
        let body = r#"{"properties": {"parameter": {"T2M_MAX": {"2000-01-01": 1.0}}}}"#;
        let err = parse_daily_response(body, "T2M_MAX").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedUpstreamPayload(_)));
    }

    #[test]
    fn test_parse_non_json_is_malformed() {
        let err = parse_daily_response("<html>gateway timeout</html>", "T2M_MAX").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedUpstreamPayload(_)));
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), ERROR_EXCERPT_CHARS + 1);
        assert_eq!(excerpt("  short  "), "short");
    }

    #[test]
    fn test_payload_file_missing_is_upstream_unavailable() {
        let source = PayloadFile::new("/nonexistent/power.json");
        let err = source.fetch_daily("T2M_MAX", 0.0, 0.0, 1981, 2023).unwrap_err();
        assert!(matches!(err, AnalysisError::UpstreamUnavailable { status: None, .. }));
    }
}
