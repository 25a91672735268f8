// src/collector/snapshot.rs
//
// Turns the device response lines into scaled sensor readings and
// serializes them into the JSON snapshot consumed by the checks

use indexmap::IndexMap;
use log::{debug, warn};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::SECTION_NAME;
use crate::sensors::{parse_number, SensorSpec, SensorTable};

/// Key holding the adapter label inside the snapshot group
pub const ADAPTER_KEY: &str = "Adapter";

/// Scaled value and threshold metadata for one sensor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorReading {
    pub name: String,
    pub input: Option<f64>,
    /// Warning bound
    pub max: Option<f64>,
    pub crit: Option<f64>,
    pub min: Option<f64>,
}

impl Serialize for SensorReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(&format!("{}_input", self.name), &self.input)?;
        map.serialize_entry(&format!("{}_max", self.name), &self.max)?;
        map.serialize_entry(&format!("{}_crit", self.name), &self.crit)?;
        map.serialize_entry(&format!("{}_min", self.name), &self.min)?;
        map.end()
    }
}

/// Round to two decimals on the exact binary value, ties to even
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Compute the reading for one sensor.
///
/// Any missing piece (bad position, line out of range, non-numeric raw
/// value or multiplier) leaves `input` empty; it never fails the batch.
pub fn read_sensor(spec: &SensorSpec, lines: &[String]) -> SensorReading {
    let raw = match spec.line_index() {
        Some(index) => {
            let raw = lines.get(index);
            if raw.is_none() {
                warn!(
                    "Sensor '{}' points at line {} but the device returned {} lines",
                    spec.name,
                    index + 1,
                    lines.len()
                );
            }
            raw
        }
        None => {
            warn!("Sensor '{}' has an invalid position '{}'", spec.name, spec.position);
            None
        }
    };

    let value = raw.and_then(|raw| {
        let value = parse_number(raw);
        if value.is_none() {
            debug!("Sensor '{}' raw value '{}' is not numeric", spec.name, raw);
        }
        value
    });

    let input = value
        .zip(parse_number(&spec.multiplier))
        .map(|(value, multiplier)| round2(value * multiplier));

    SensorReading {
        name: spec.name.clone(),
        input,
        max: parse_number(&spec.warn),
        crit: parse_number(&spec.crit),
        min: parse_number(&spec.min),
    }
}

/// Merged readings of all sensor tables for one device
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    adapter: Option<String>,
    readings: IndexMap<String, SensorReading>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the group with the sensors of `table`. The group is keyed
    /// by the section name alone, so a later table overwrites everything
    /// an earlier one contributed, adapter label included.
    pub fn apply_table(&mut self, table: &SensorTable, lines: &[String]) {
        if let Some(previous) = &self.adapter {
            debug!(
                "Sensor table '{}' replaces '{}' ({} sensors dropped)",
                table.adapter,
                previous,
                self.readings.len()
            );
        }

        self.readings = table
            .sensors
            .iter()
            .map(|spec| (spec.key(), read_sensor(spec, lines)))
            .collect();
        self.adapter = Some(table.adapter.clone());
    }

    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&SensorReading> {
        self.readings.get(key)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of sensors whose input could not be read
    pub fn missing_inputs(&self) -> usize {
        self.readings.values().filter(|r| r.input.is_none()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

struct Group<'a>(&'a Snapshot);

impl Serialize for Group<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let snapshot = self.0;
        let mut map = serializer.serialize_map(None)?;
        if let Some(adapter) = &snapshot.adapter {
            map.serialize_entry(ADAPTER_KEY, adapter)?;
        }
        for (key, reading) in &snapshot.readings {
            map.serialize_entry(key, reading)?;
        }
        map.end()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(SECTION_NAME, &Group(self))?;
        map.end()
    }
}
