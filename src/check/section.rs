// src/check/section.rs
//
// Parsing the collector's JSON snapshot back into typed sensor records

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;

use crate::collector::snapshot::ADAPTER_KEY;
use crate::sensors::{parse_number, SensorType};

/// One sensor as seen by the checks
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    /// Snapshot key, e.g. "temp1, temperature"
    pub name: String,
    pub sensor_type: SensorType,
    pub value: Option<f64>,
    pub warn: Option<f64>,
    pub crit: Option<f64>,
}

/// A group of sensors sharing one adapter label
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub name: String,
    pub adapter: String,
    pub sensors: Vec<Sensor>,
}

impl Chip {
    /// Service item for a sensor of this chip
    pub fn item_name(&self, sensor: &Sensor) -> String {
        format!("{} {}", self.adapter, sensor.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupEntry {
    Label(String),
    Fields(IndexMap<String, FieldValue>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_number(s),
            Self::Other(_) => None,
        }
    }
}

type RawSection = IndexMap<String, IndexMap<String, GroupEntry>>;

/// Parse the JSON snapshot text
pub fn parse_section(text: &str) -> Result<Vec<Chip>> {
    let raw: RawSection = serde_json::from_str(text).context("Agent section is not valid snapshot JSON")?;
    Ok(raw.into_iter().map(|(name, group)| parse_chip(name, group)).collect())
}

/// Parse the section as handed over by the monitoring host: one row of
/// whitespace-separated tokens per line.
pub fn parse_string_table(string_table: &[Vec<String>]) -> Result<Vec<Chip>> {
    let text = string_table
        .iter()
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    parse_section(&text)
}

fn parse_chip(name: String, group: IndexMap<String, GroupEntry>) -> Chip {
    let mut adapter = None;
    let mut sensors = Vec::new();

    for (key, entry) in group {
        match entry {
            GroupEntry::Label(label) if key == ADAPTER_KEY => adapter = Some(label),
            GroupEntry::Label(_) => warn!("Ignoring unexpected entry '{}' in group '{}'", key, name),
            GroupEntry::Fields(_) if key == ADAPTER_KEY => {
                warn!("Ignoring malformed adapter entry in group '{}'", name)
            }
            GroupEntry::Fields(fields) => sensors.push(parse_sensor(key, &fields)),
        }
    }

    Chip {
        adapter: adapter.unwrap_or_else(|| name.clone()),
        name,
        sensors,
    }
}

fn parse_sensor(name: String, fields: &IndexMap<String, FieldValue>) -> Sensor {
    let mut sensor = Sensor {
        name,
        sensor_type: SensorType::Unknown,
        value: None,
        warn: None,
        crit: None,
    };

    for (field, value) in fields {
        if field.ends_with("_input") {
            sensor.value = value.as_f64();
            sensor.sensor_type = SensorType::from_key_prefix(field);
            if sensor.sensor_type == SensorType::Unknown {
                warn!("Unknown sensor type for '{}' ({})", sensor.name, field);
            }
        } else if field.ends_with("crit") {
            sensor.crit = value.as_f64();
        } else if field.ends_with("max") {
            sensor.warn = value.as_f64();
        }
    }

    sensor
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = r#"{"webups": {
        "Adapter": "parameters",
        "temp1, temperature": {"temp1_input": 22.3, "temp1_max": 30.0, "temp1_crit": 40.0, "temp1_min": null},
        "fan1, fan": {"fan1_input": "1200", "fan1_max": null, "fan1_crit": null, "fan1_min": null},
        "x, misc": {"x_input": null, "x_max": "n/a", "x_crit": null, "x_min": null}
    }}"#;

    #[test]
    fn test_parse_section() {
        let chips = parse_section(SECTION).unwrap();
        assert_eq!(chips.len(), 1);

        let chip = &chips[0];
        assert_eq!(chip.name, "webups");
        assert_eq!(chip.adapter, "parameters");
        assert_eq!(chip.sensors.len(), 3);

        let temp = &chip.sensors[0];
        assert_eq!(temp.name, "temp1, temperature");
        assert_eq!(temp.sensor_type, SensorType::Temp);
        assert_eq!(temp.value, Some(22.3));
        assert_eq!(temp.warn, Some(30.0));
        assert_eq!(temp.crit, Some(40.0));
        assert_eq!(chip.item_name(temp), "parameters temp1, temperature");

        let fan = &chip.sensors[1];
        assert_eq!(fan.sensor_type, SensorType::Fan);
        assert_eq!(fan.value, Some(1200.0));
        assert_eq!(fan.warn, None);
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let chips = parse_section(SECTION).unwrap();
        let other = &chips[0].sensors[2];

        assert_eq!(other.sensor_type, SensorType::Unknown);
        assert_eq!(other.value, None);
        assert_eq!(other.warn, None);
    }

    #[test]
    fn test_missing_adapter_falls_back_to_group_name() {
        let chips = parse_section(r#"{"webups": {"in0, input-voltage": {"in0_input": 230}}}"#).unwrap();
        assert_eq!(chips[0].adapter, "webups");
        assert_eq!(chips[0].sensors[0].sensor_type, SensorType::In);
    }

    #[test]
    fn test_parse_string_table() {
        let table: Vec<Vec<String>> = vec![
            vec![r#"{"webups":"#.to_string(), r#"{"Adapter":"#.to_string(), r#""parameters","#.to_string()],
            vec![r#""hours,"#.to_string(), r#"hours":"#.to_string(), r#"{"hours_input":"#.to_string(), "1500.0}}}".to_string()],
        ];
        let chips = parse_string_table(&table).unwrap();

        let sensor = &chips[0].sensors[0];
        assert_eq!(sensor.name, "hours, hours");
        assert_eq!(sensor.sensor_type, SensorType::Hours);
        assert_eq!(sensor.value, Some(1500.0));
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_section("not json").is_err());
    }
}
