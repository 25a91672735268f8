// src/check/params.rs
//
// Rule parameters accepted by the check plugins

use serde::Deserialize;
use serde_json::Value;

use super::error::{CheckError, Result};
use super::levels::Levels;

/// Output unit for temperature checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "c")]
    Celsius,
    #[serde(rename = "f")]
    Fahrenheit,
    #[serde(rename = "k")]
    Kelvin,
}

impl TemperatureUnit {
    /// Convert a Celsius value into this unit
    pub fn convert_celsius(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 1.8 + 32.0,
            Self::Kelvin => celsius + 273.15,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }
}

/// Parameters of one check rule. Every field is optional; an empty
/// rule means "use the levels shipped with the sensor".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckParams {
    pub levels: Option<Levels>,
    pub levels_lower: Option<Levels>,
    pub upper: Option<Levels>,
    pub output_unit: Option<TemperatureUnit>,

    // Accepted only so they can be rejected explicitly
    pub trend_compute: Option<Value>,
    pub device_levels_handling: Option<Value>,
    pub input_unit: Option<Value>,
}

/// Keys a rule can use to carry levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelsKey {
    Levels,
    LevelsLower,
    Upper,
}

impl CheckParams {
    /// Decode the parameters of `plugin` from a JSON value
    pub fn from_value(plugin: &'static str, value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| CheckError::InvalidParameters { plugin, source })
    }

    pub fn get(&self, key: LevelsKey) -> Option<Levels> {
        match key {
            LevelsKey::Levels => self.levels,
            LevelsKey::LevelsLower => self.levels_lower,
            LevelsKey::Upper => self.upper,
        }
    }
}
