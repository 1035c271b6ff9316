//! Data Source Verification Module
//!
//! Probes the upstream archive for every registered variable at a location
//! and reports which ones actually return usable daily values.
//!
//! Use this before relying on a new location or variable, since POWER
//! coverage varies (e.g. cloud amount has gaps in early years).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::ingest::ObservationSource;
use crate::logging::{self, DataSource};
use crate::variables::{VARIABLE_REGISTRY, WeatherVariable};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    pub results: Vec<VariableVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableVerification {
    pub code: String,
    pub name: String,
    pub status: VerificationStatus,
    pub valid_days: usize,
    pub missing_days: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Status from day counts: all valid, some valid, or none.
pub fn classify(valid_days: usize, missing_days: usize) -> VerificationStatus {
    match (valid_days, missing_days) {
        (0, _) => VerificationStatus::Failed,
        (_, 0) => VerificationStatus::Success,
        _ => VerificationStatus::PartialSuccess,
    }
}

// ============================================================================
// Verification
// ============================================================================

pub fn verify_variable(
    source: &dyn ObservationSource,
    variable: &WeatherVariable,
    latitude: f64,
    longitude: f64,
    year: i32,
) -> VariableVerification {
    let mut result = VariableVerification {
        code: variable.power_param.to_string(),
        name: variable.name.to_string(),
        status: VerificationStatus::Failed,
        valid_days: 0,
        missing_days: 0,
        error_message: None,
    };

    match source.fetch_daily(variable.power_param, latitude, longitude, year, year) {
        Ok(series) => {
            result.missing_days = series.missing_count();
            result.valid_days = series.len() - result.missing_days;
            result.status = classify(result.valid_days, result.missing_days);
            if result.status == VerificationStatus::Failed {
                result.error_message = Some("No valid daily values returned".to_string());
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

/// Verifies every registered variable, stamping the report with `now`.
pub fn verify_all_at(
    source: &dyn ObservationSource,
    latitude: f64,
    longitude: f64,
    year: i32,
    now: DateTime<Utc>,
) -> VerificationReport {
    let location = logging::location_tag(latitude, longitude);
    let mut results = Vec::with_capacity(VARIABLE_REGISTRY.len());

    for variable in VARIABLE_REGISTRY {
        let outcome = verify_variable(source, variable, latitude, longitude, year);
        match outcome.status {
            VerificationStatus::Success => logging::debug(
                DataSource::Power,
                Some(&location),
                &format!("{}: {} days OK", outcome.code, outcome.valid_days),
            ),
            VerificationStatus::PartialSuccess => logging::warn(
                DataSource::Power,
                Some(&location),
                &format!("{}: {} days missing", outcome.code, outcome.missing_days),
            ),
            VerificationStatus::Failed => logging::error(
                DataSource::Power,
                Some(&location),
                &format!(
                    "{}: {}",
                    outcome.code,
                    outcome.error_message.as_deref().unwrap_or("failed")
                ),
            ),
        }
        results.push(outcome);
    }

    let count = |status: VerificationStatus| results.iter().filter(|r| r.status == status).count();
    let summary = VerificationSummary {
        total: results.len(),
        working: count(VerificationStatus::Success),
        partial: count(VerificationStatus::PartialSuccess),
        failed: count(VerificationStatus::Failed),
    };

    VerificationReport {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        latitude,
        longitude,
        year,
        results,
        summary,
    }
}

pub fn verify_all(source: &dyn ObservationSource, latitude: f64, longitude: f64, year: i32) -> VerificationReport {
    verify_all_at(source, latitude, longitude, year, Utc::now())
}

/// Plain-text table of a report for the terminal.
pub fn render_report(report: &VerificationReport) -> String {
    let mut out = format!(
        "Verification at {:.4}, {:.4} for {}\n",
        report.latitude, report.longitude, report.year
    );
    for r in &report.results {
        out.push_str(&format!(
            "  {:<12} {:<16} valid={:<4} missing={:<4}{}\n",
            r.code,
            format!("{:?}", r.status),
            r.valid_days,
            r.missing_days,
            r.error_message
                .as_deref()
                .map(|e| format!(" ({})", e))
                .unwrap_or_default()
        ));
    }
    out.push_str(&format!(
        "Summary: {}/{} working, {} partial, {} failed\n",
        report.summary.working, report.summary.total, report.summary.partial, report.summary.failed
    ));
    out
}
