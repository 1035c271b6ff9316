//! POWER Payload Integration Tests
//!
//! Builds POWER-shaped JSON bodies, saves them to a temp dir and replays
//! them through `PayloadFile` into the full analysis pipeline. This is the
//! path the CLI takes with `--payload`, so no network is needed.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

use exceedance_service::analysis::run_analysis;
use exceedance_service::analysis::summary::IntervalMethod;
use exceedance_service::config::AnalysisConfig;
use exceedance_service::ingest::ObservationSource;
use exceedance_service::ingest::power::{PayloadFile, format_power_date, parse_daily_response};
use exceedance_service::model::{AnalysisError, AnalysisRequest};
use exceedance_service::variables::VariableId;

fn payload<F>(code: &str, fill_value: f64, first: NaiveDate, last: NaiveDate, f: F) -> String
where
    F: Fn(NaiveDate) -> Value,
{
    let mut daily = Map::new();
    let mut day = first;
    while day <= last {
        daily.insert(format_power_date(day), f(day));
        day = day.succ_opt().unwrap();
    }
    let mut parameter = Map::new();
    parameter.insert(code.to_string(), Value::Object(daily));
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [-89.589, 40.6936, 150.0] },
        "header": { "title": "NASA/POWER", "fill_value": fill_value },
        "properties": { "parameter": parameter },
    })
    .to_string()
}

/// Writes `body` into a fresh temp dir. The dir is removed when the
/// returned guard drops, even if the test panics.
fn save(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("power.json");
    std::fs::write(&path, body).expect("write payload");
    (dir, path)
}

fn settings() -> AnalysisConfig {
    AnalysisConfig {
        start_year: 1981,
        end_year: 2023,
        interval_method: IntervalMethod::Wald,
    }
}

#[test]
fn test_replayed_payload_drives_full_analysis() {
    let first = NaiveDate::from_ymd_opt(1981, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    // 1990 is entirely fill values; other years peak at 30 on even years
    let body = payload("PRECTOTCORR", -999.0, first, last, |d| {
        if d.year() == 1990 {
            json!(-999.0)
        } else if d.year() % 2 == 0 {
            json!(30.0)
        } else {
            json!(20.0)
        }
    });
    let (_dir, path) = save(&body);

    let request = AnalysisRequest {
        latitude: 40.6936,
        longitude: -89.589,
        month: 3,
        day: 15,
        window: 3,
        threshold: 25.0,
        variable: VariableId::Precipitation,
    };
    let result = run_analysis(&PayloadFile::new(&path), &request, &settings()).unwrap();

    assert_eq!(result.years_analyzed, 42);
    assert!(result.yearly_data.iter().all(|e| e.year != 1990));
    // Even years 1982..=2022 minus 1990
    assert_eq!(result.probability, 20.0 / 42.0 * 100.0);
    assert_eq!(result.metadata.variable.id, VariableId::Precipitation);
    assert_eq!(result.metadata.variable.unit, "mm/day");
}

#[test]
fn test_custom_fill_value_and_nulls_are_missing() {
    let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2020, 1, 4).unwrap();
    let body = payload("WS2M", -1.0, first, last, |d| match d.day() {
        1 => json!(-1.0),
        2 => Value::Null,
        3 => json!(-999.0),
        _ => json!(4.5),
    });

    let series = parse_daily_response(&body, "WS2M").unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(series.missing_count(), 2);
    // -999 is an ordinary value once the header declares another fill
    assert_eq!(series.get(NaiveDate::from_ymd_opt(2020, 1, 3).unwrap()), Some(-999.0));
    assert_eq!(series.get(NaiveDate::from_ymd_opt(2020, 1, 4).unwrap()), Some(4.5));
}

#[test]
fn test_payload_without_requested_variable_is_malformed() {
    let day = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    let body = payload("T2M_MIN", -999.0, day, day, |_| json!(12.0));
    let (_dir, path) = save(&body);

    let err = PayloadFile::new(&path)
        .fetch_daily("T2M_MAX", 40.0, -89.0, 2020, 2020)
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MalformedUpstreamPayload(_)), "got {:?}", err);
}

#[test]
fn test_missing_payload_file_is_upstream_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");
    let err = PayloadFile::new(&path)
        .fetch_daily("T2M_MAX", 40.0, -89.0, 2020, 2020)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::UpstreamUnavailable { status: None, .. }));
}

#[test]
fn test_invalid_request_fails_before_reading_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-read.json");
    let request = AnalysisRequest {
        latitude: 40.0,
        longitude: -89.0,
        month: 2,
        day: 30,
        window: 3,
        threshold: 0.0,
        variable: VariableId::MaxTemperature,
    };
    // A read attempt would surface as UpstreamUnavailable instead
    let err = run_analysis(&PayloadFile::new(&path), &request, &settings()).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRequest(_)), "got {:?}", err);
}
