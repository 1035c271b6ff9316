/// Weather variable registry for the exceedance analysis service.
///
/// Defines the fixed list of daily variables the service can analyse, along
/// with the NASA POWER parameter code, display unit, and description of each.
/// This is the single source of truth for variable codes; all other modules
/// should reference variables from here rather than hardcoding codes.
///
/// The registry is a `static` slice: it is built at compile time and has no
/// mutation path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier of a supported weather variable. Serialises to its POWER code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableId {
    #[serde(rename = "T2M_MAX")]
    MaxTemperature,
    #[serde(rename = "T2M_MIN")]
    MinTemperature,
    #[serde(rename = "PRECTOTCORR")]
    Precipitation,
    #[serde(rename = "WS2M")]
    WindSpeed,
    #[serde(rename = "RH2M")]
    RelativeHumidity,
    #[serde(rename = "CLOUD_AMT")]
    CloudCover,
}

impl VariableId {
    /// The NASA POWER parameter code for this variable.
    pub fn code(self) -> &'static str {
        by_id(self).power_param
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VariableId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_variable(s).map(|v| v.id).ok_or_else(|| {
            format!(
                "unknown variable '{}' (expected one of: {})",
                s,
                all_codes().join(", ")
            )
        })
    }
}

/// Broad grouping used to filter variables in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableCategory {
    Temperature,
    Precipitation,
    Wind,
    Atmosphere,
    Other,
}

impl fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableCategory::Temperature => write!(f, "temperature"),
            VariableCategory::Precipitation => write!(f, "precipitation"),
            VariableCategory::Wind => write!(f, "wind"),
            VariableCategory::Atmosphere => write!(f, "atmosphere"),
            VariableCategory::Other => write!(f, "other"),
        }
    }
}

impl FromStr for VariableCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "temperature" => Ok(VariableCategory::Temperature),
            "precipitation" => Ok(VariableCategory::Precipitation),
            "wind" => Ok(VariableCategory::Wind),
            "atmosphere" => Ok(VariableCategory::Atmosphere),
            "other" => Ok(VariableCategory::Other),
            other => Err(format!("unknown variable category '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Variable metadata
// ---------------------------------------------------------------------------

/// Metadata for a single daily weather variable.
#[derive(Debug)]
pub struct WeatherVariable {
    pub id: VariableId,
    /// Human-readable name, used in CSV headers and summaries.
    pub name: &'static str,
    /// Parameter code sent to the POWER daily point endpoint.
    pub power_param: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    pub category: VariableCategory,
}

/// All variables supported by the service.
///
/// Source: NASA POWER parameter dictionary (power.larc.nasa.gov).
pub static VARIABLE_REGISTRY: &[WeatherVariable] = &[
    WeatherVariable {
        id: VariableId::MaxTemperature,
        name: "Maximum Temperature",
        power_param: "T2M_MAX",
        unit: "°C",
        description: "Daily maximum temperature at 2 meters above ground",
        category: VariableCategory::Temperature,
    },
    WeatherVariable {
        id: VariableId::MinTemperature,
        name: "Minimum Temperature",
        power_param: "T2M_MIN",
        unit: "°C",
        description: "Daily minimum temperature at 2 meters above ground",
        category: VariableCategory::Temperature,
    },
    WeatherVariable {
        id: VariableId::Precipitation,
        name: "Precipitation",
        power_param: "PRECTOTCORR",
        unit: "mm/day",
        description: "Precipitation (bias-corrected)",
        category: VariableCategory::Precipitation,
    },
    WeatherVariable {
        id: VariableId::WindSpeed,
        name: "Wind Speed",
        power_param: "WS2M",
        unit: "m/s",
        description: "Wind speed at 2 meters above ground",
        category: VariableCategory::Wind,
    },
    WeatherVariable {
        id: VariableId::RelativeHumidity,
        name: "Relative Humidity",
        power_param: "RH2M",
        unit: "%",
        description: "Relative humidity at 2 meters above ground",
        category: VariableCategory::Atmosphere,
    },
    WeatherVariable {
        id: VariableId::CloudCover,
        name: "Cloud Cover",
        power_param: "CLOUD_AMT",
        unit: "%",
        description: "Total cloud amount",
        category: VariableCategory::Atmosphere,
    },
];

/// Returns the registry entry for `id`.
///
/// Indices follow the registry order; `test_by_id_matches_registry_order`
/// keeps them in step.
pub fn by_id(id: VariableId) -> &'static WeatherVariable {
    let index = match id {
        VariableId::MaxTemperature => 0,
        VariableId::MinTemperature => 1,
        VariableId::Precipitation => 2,
        VariableId::WindSpeed => 3,
        VariableId::RelativeHumidity => 4,
        VariableId::CloudCover => 5,
    };
    &VARIABLE_REGISTRY[index]
}

/// Looks up a variable by its POWER code, ignoring case. Returns `None` if
/// not found.
pub fn find_variable(code: &str) -> Option<&'static WeatherVariable> {
    VARIABLE_REGISTRY
        .iter()
        .find(|v| v.power_param.eq_ignore_ascii_case(code.trim()))
}

/// Returns all variables in `category`, in registry order.
pub fn by_category(category: VariableCategory) -> Vec<&'static WeatherVariable> {
    VARIABLE_REGISTRY
        .iter()
        .filter(|v| v.category == category)
        .collect()
}

/// Returns the POWER codes of all registered variables.
pub fn all_codes() -> Vec<&'static str> {
    VARIABLE_REGISTRY.iter().map(|v| v.power_param).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
