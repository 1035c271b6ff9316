/// Structured logging for the exceedance analysis service
///
/// Provides context-rich logging with location identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging for batch runs.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::AnalysisError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// NASA POWER daily point API.
    Power,
    /// Window resolution, reduction and statistics.
    Engine,
    Export,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Power => write!(f, "POWER"),
            DataSource::Engine => write!(f, "ENGINE"),
            DataSource::Export => write!(f, "EXPORT"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - bad input or a location/window with no data
    Expected,
    /// Unexpected failure - upstream outage or a contract change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, source: &DataSource, location: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, location_part, message)
    }

    fn log(&self, level: LogLevel, source: &DataSource, location: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, location, message);
        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output goes to stderr; stdout carries exported results
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => eprintln!("   {}", log_entry),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, location_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, location_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}{}: {}", source, location_part, message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, source: DataSource, location: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, location, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, location, message);
}

/// Log a warning message
pub fn warn(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, location, message);
}

/// Log an error message
pub fn error(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, location, message);
}

/// Log a debug message
pub fn debug(source: DataSource, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, location, message);
}

/// Formats a coordinate pair as a location tag, e.g. `40.7128,-74.0060`.
pub fn location_tag(latitude: f64, longitude: f64) -> String {
    format!("{:.4},{:.4}", latitude, longitude)
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an analysis failure by its error variant.
pub fn classify_analysis_failure(err: &AnalysisError) -> FailureType {
    match err {
        // Caller input or a location/window the archive does not cover
        AnalysisError::InvalidRequest(_) | AnalysisError::InsufficientData { .. } => {
            FailureType::Expected
        }
        // 4xx from POWER usually means a bad URL; 5xx is an outage
        AnalysisError::UpstreamUnavailable { status: Some(_), .. } => FailureType::Unexpected,
        // Transport failure: could be local network or the service
        AnalysisError::UpstreamUnavailable { status: None, .. } => FailureType::Unknown,
        AnalysisError::MalformedUpstreamPayload(_) => FailureType::Unexpected,
    }
}

/// Log an analysis failure with automatic classification
pub fn log_analysis_failure(location: &str, operation: &str, err: &AnalysisError) {
    let failure_type = classify_analysis_failure(err);
    let source = match err {
        AnalysisError::UpstreamUnavailable { .. } | AnalysisError::MalformedUpstreamPayload(_) => {
            DataSource::Power
        }
        _ => DataSource::Engine,
    };

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(location), &message),
        FailureType::Unexpected => error(source, Some(location), &message),
        FailureType::Unknown => warn(source, Some(location), &message),
    }
}

// ---------------------------------------------------------------------------
// Analysis Summary Logging
// ---------------------------------------------------------------------------

/// Log how many of the scanned years contributed a yearly extremum
pub fn log_analysis_summary(location: &str, years_scanned: usize, years_analyzed: usize) {
    let dropped = years_scanned.saturating_sub(years_analyzed);
    let message = format!(
        "Analysis complete: {}/{} years with data, {} dropped",
        years_analyzed, years_scanned, dropped
    );

    if dropped == 0 {
        info(DataSource::Engine, Some(location), &message);
    } else if years_analyzed == 0 {
        error(DataSource::Engine, Some(location), &message);
    } else {
        warn(DataSource::Engine, Some(location), &message);
    }
}
