// src/sensors/types.rs
//
// Sensor vocabulary and the per-sensor configuration read from sensor tables

use serde::Deserialize;
use std::fmt;

/// Sensor category, inferred from the prefix of a sensor field key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Temp,
    In,
    Fan,
    Cpu,
    Power,
    Curr,
    Energy,
    Intrusion,
    Humidity,
    Hours,
    Unknown,
}

/// Prefix lookup table. Checked longest prefix first, so `intrusion`
/// is never mistaken for `in`.
const PREFIX_TABLE: &[(&str, SensorType)] = &[
    ("intrusion", SensorType::Intrusion),
    ("humidity", SensorType::Humidity),
    ("energy", SensorType::Energy),
    ("power", SensorType::Power),
    ("hours", SensorType::Hours),
    ("temp", SensorType::Temp),
    ("curr", SensorType::Curr),
    ("fan", SensorType::Fan),
    ("cpu", SensorType::Cpu),
    ("in", SensorType::In),
];

impl SensorType {
    /// Infer the category from a key such as `temp1_input`.
    pub fn from_key_prefix(key: &str) -> Self {
        PREFIX_TABLE
            .iter()
            .find(|(prefix, _)| key.starts_with(prefix))
            .map(|(_, sensor_type)| *sensor_type)
            .unwrap_or(SensorType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temp => "temp",
            Self::In => "in",
            Self::Fan => "fan",
            Self::Cpu => "cpu",
            Self::Power => "power",
            Self::Curr => "curr",
            Self::Energy => "energy",
            Self::Intrusion => "intrusion",
            Self::Humidity => "humidity",
            Self::Hours => "hours",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a sensor table.
///
/// Numeric columns are kept as the raw text from the table and parsed
/// on use, so an empty or malformed cell becomes "no value" for that
/// sensor instead of rejecting the whole table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorSpec {
    pub name: String,

    /// Free-form type tag, e.g. "temperature" or "input-voltage"
    #[serde(rename = "type")]
    pub type_tag: String,

    /// 1-based line number in the device response
    pub position: String,

    #[serde(rename = "multiply")]
    pub multiplier: String,

    #[serde(default)]
    pub warn: String,

    #[serde(default)]
    pub crit: String,

    #[serde(default)]
    pub min: String,
}

impl SensorSpec {
    /// Key used for this sensor inside the snapshot group
    pub fn key(&self) -> String {
        format!("{}, {}", self.name, self.type_tag)
    }

    /// Zero-based index into the response lines, if the position is usable
    pub fn line_index(&self) -> Option<usize> {
        match self.position.trim().parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(position) => Some(position - 1),
        }
    }
}

/// Lenient float parsing: empty or malformed input is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(position: &str) -> SensorSpec {
        SensorSpec {
            name: "temp1".to_string(),
            type_tag: "temperature".to_string(),
            position: position.to_string(),
            multiplier: "1".to_string(),
            warn: String::new(),
            crit: String::new(),
            min: String::new(),
        }
    }

    #[test]
    fn test_prefix_inference() {
        assert_eq!(SensorType::from_key_prefix("temp1_input"), SensorType::Temp);
        assert_eq!(SensorType::from_key_prefix("in0_input"), SensorType::In);
        assert_eq!(SensorType::from_key_prefix("fan2_input"), SensorType::Fan);
        assert_eq!(SensorType::from_key_prefix("hours_input"), SensorType::Hours);
        assert_eq!(SensorType::from_key_prefix("humidity_input"), SensorType::Humidity);
    }

    #[test]
    fn test_longest_prefix_wins() {
        assert_eq!(SensorType::from_key_prefix("intrusion0_input"), SensorType::Intrusion);
        assert_eq!(SensorType::from_key_prefix("inlet_input"), SensorType::In);
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(SensorType::from_key_prefix("x_input"), SensorType::Unknown);
        assert_eq!(SensorType::from_key_prefix(""), SensorType::Unknown);
    }

    #[test]
    fn test_line_index() {
        assert_eq!(spec("1").line_index(), Some(0));
        assert_eq!(spec(" 5 ").line_index(), Some(4));
        assert_eq!(spec("0").line_index(), None);
        assert_eq!(spec("-2").line_index(), None);
        assert_eq!(spec("two").line_index(), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("22.5"), Some(22.5));
        assert_eq!(parse_number(" 7 "), Some(7.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_key_format() {
        assert_eq!(spec("1").key(), "temp1, temperature");
    }
}
