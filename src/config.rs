/// Service configuration.
///
/// Settings are read from a TOML file (default `exceedance.toml`), then a
/// `.env` file and the process environment may override a few of them:
///
/// | Variable                 | Overrides              |
/// |--------------------------|------------------------|
/// | `EXCEEDANCE_POWER_URL`   | `source.base_url`      |
/// | `EXCEEDANCE_START_YEAR`  | `analysis.start_year`  |
/// | `EXCEEDANCE_END_YEAR`    | `analysis.end_year`    |
/// | `EXCEEDANCE_LOG_FILE`    | `logging.file`         |

use std::fmt;
use std::path::Path;

use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::analysis::summary::IntervalMethod;
use crate::logging::LogLevel;
use crate::model::{DEFAULT_END_YEAR, DEFAULT_START_YEAR, EARLIEST_ARCHIVE_YEAR};

pub const DEFAULT_CONFIG_PATH: &str = "exceedance.toml";

const DEFAULT_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream daily point-data endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// POWER community tag (`RE`, `AG`, `SB`).
    #[serde(default = "default_community")]
    pub community: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            community: default_community(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    #[serde(default)]
    pub interval_method: IntervalMethod,
}

impl AnalysisConfig {
    /// Checks that the year range is non-empty and lies within
    /// `EARLIEST_ARCHIVE_YEAR..=current_year`.
    pub fn check_year_range(&self, current_year: i32) -> Result<(), String> {
        if self.start_year < EARLIEST_ARCHIVE_YEAR {
            return Err(format!(
                "start_year {} is before the archive begins ({})",
                self.start_year, EARLIEST_ARCHIVE_YEAR
            ));
        }
        if self.end_year > current_year {
            return Err(format!(
                "end_year {} is after the current year ({})",
                self.end_year, current_year
            ));
        }
        if self.start_year > self.end_year {
            return Err(format!(
                "start_year ({}) is after end_year ({})",
                self.start_year, self.end_year
            ));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            interval_method: IntervalMethod::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            timestamps: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_POWER_URL.to_string()
}
fn default_community() -> String {
    "RE".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_start_year() -> i32 {
    DEFAULT_START_YEAR
}
fn default_end_year() -> i32 {
    DEFAULT_END_YEAR
}
fn default_log_level() -> LogLevel {
    LogLevel::Info
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(String),
    /// The file is not valid TOML or has unknown/ill-typed fields.
    Parse(String),
    /// The values parsed but are inconsistent.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads configuration from `path`, or from `exceedance.toml` in the
    /// working directory when `path` is `None`.
    ///
    /// A missing default file yields built-in defaults; a missing file at an
    /// explicit path is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EXCEEDANCE_POWER_URL") {
            self.source.base_url = url;
        }
        if let Some(year) = lookup("EXCEEDANCE_START_YEAR") {
            self.analysis.start_year = parse_year("EXCEEDANCE_START_YEAR", &year)?;
        }
        if let Some(year) = lookup("EXCEEDANCE_END_YEAR") {
            self.analysis.end_year = parse_year("EXCEEDANCE_END_YEAR", &year)?;
        }
        if let Some(file) = lookup("EXCEEDANCE_LOG_FILE") {
            self.logging.file = Some(file);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.base_url must not be empty".into()));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid("source.timeout_secs must be positive".into()));
        }
        self.analysis
            .check_year_range(Utc::now().year())
            .map_err(|msg| ConfigError::Invalid(format!("analysis.{}", msg)))
    }
}

fn parse_year(key: &str, value: &str) -> Result<i32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a year: '{}'", key, value)))
}
