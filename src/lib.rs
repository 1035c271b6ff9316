//! Climatological exceedance analysis.
//!
//! Given a location, a calendar date, a ± day window and a threshold, the
//! service fetches decades of daily observations for one weather variable
//! from NASA POWER and reports how often the yearly in-window maximum
//! exceeded the threshold, with a 95% confidence interval and nearest-rank
//! percentiles.
//!
//! ```no_run
//! use exceedance_service::analysis::run_analysis;
//! use exceedance_service::config::Config;
//! use exceedance_service::ingest::power::PowerClient;
//! use exceedance_service::model::AnalysisRequest;
//! use exceedance_service::variables::VariableId;
//!
//! let config = Config::load(None)?;
//! let source = PowerClient::new(&config.source)?;
//! let request = AnalysisRequest {
//!     latitude: 40.69,
//!     longitude: -89.59,
//!     month: 7,
//!     day: 4,
//!     window: 3,
//!     threshold: 32.0,
//!     variable: VariableId::MaxTemperature,
//! };
//! let result = run_analysis(&source, &request, &config.analysis)?;
//! println!("{:.1}%", result.probability);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod variables;
pub mod verify;
