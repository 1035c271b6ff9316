//! Live NASA POWER Tests
//!
//! These hit the real POWER daily point endpoint and are ignored by default.
//! Run them with `cargo test --test power_live -- --ignored` before changing
//! the URL format or the registry codes.

use exceedance_service::analysis::run_analysis;
use exceedance_service::config::{AnalysisConfig, SourceConfig};
use exceedance_service::ingest::ObservationSource;
use exceedance_service::ingest::power::PowerClient;
use exceedance_service::model::AnalysisRequest;
use exceedance_service::variables::{VARIABLE_REGISTRY, VariableId};
use exceedance_service::verify::{self, VerificationStatus};

// Peoria, IL
const LAT: f64 = 40.6936;
const LON: f64 = -89.5890;

#[test]
#[ignore]
fn test_live_single_year_fetch() {
    let client = PowerClient::new(&SourceConfig::default()).unwrap();
    let series = client.fetch_daily("T2M_MAX", LAT, LON, 2020, 2020).unwrap();

    println!("T2M_MAX 2020: {} days, {} missing", series.len(), series.missing_count());
    assert_eq!(series.len(), 366);
    assert!(series.missing_count() < 10);
}

#[test]
#[ignore]
fn test_live_registry_verification() {
    let client = PowerClient::new(&SourceConfig::default()).unwrap();
    let report = verify::verify_all(&client, LAT, LON, 2020);

    print!("{}", verify::render_report(&report));
    assert_eq!(report.summary.total, VARIABLE_REGISTRY.len());
    let temp = report.results.iter().find(|r| r.code == "T2M_MAX").unwrap();
    assert_ne!(temp.status, VerificationStatus::Failed);
    assert!(report.summary.working + report.summary.partial > 0, "No POWER variables are working!");
}

#[test]
#[ignore]
fn test_live_full_analysis() {
    let client = PowerClient::new(&SourceConfig::default()).unwrap();
    let request = AnalysisRequest {
        latitude: LAT,
        longitude: LON,
        month: 7,
        day: 4,
        window: 3,
        threshold: 32.0,
        variable: VariableId::MaxTemperature,
    };
    let result = run_analysis(&client, &request, &AnalysisConfig::default()).unwrap();

    println!(
        "P(T2M_MAX > 32 around 07-04) = {:.1}% [{:.1}, {:.1}] over {} years",
        result.probability, result.confidence_interval.low, result.confidence_interval.high, result.years_analyzed
    );
    assert!(result.years_analyzed >= 40);
    assert!((0.0..=100.0).contains(&result.probability));
}
