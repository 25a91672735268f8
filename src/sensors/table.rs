// src/sensors/table.rs
//
// Loading sensor tables (CSV with a header row) from disk

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

use super::types::SensorSpec;

/// All sensors configured in one table file
#[derive(Debug, Clone)]
pub struct SensorTable {
    /// Adapter label, taken from the file stem
    pub adapter: String,
    pub sensors: Vec<SensorSpec>,
}

impl SensorTable {
    /// Parse a table from any reader. Duplicate sensor names keep the
    /// position of the first row and the values of the last one.
    pub fn from_reader<R: Read>(adapter: impl Into<String>, reader: R) -> Result<Self> {
        let adapter = adapter.into();
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut sensors: Vec<SensorSpec> = Vec::new();
        for (row, record) in csv_reader.deserialize::<SensorSpec>().enumerate() {
            // Header is line 1, so data rows start at line 2
            let spec = record.with_context(|| format!("Invalid sensor row at line {}", row + 2))?;

            match sensors.iter_mut().find(|existing| existing.name == spec.name) {
                Some(existing) => {
                    warn!("Sensor '{}' defined twice in table '{}', keeping the last row", spec.name, adapter);
                    *existing = spec;
                }
                None => sensors.push(spec),
            }
        }

        debug!("Loaded {} sensors for adapter {}", sensors.len(), adapter);
        Ok(Self { adapter, sensors })
    }
}

/// Read a sensor table file. The adapter label is the file stem,
/// e.g. `parameters.csv` becomes `parameters`.
pub fn load_sensor_table(path: &Path) -> Result<SensorTable> {
    let adapter = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open sensor table {}", path.display()))?;

    SensorTable::from_reader(adapter, file)
        .with_context(|| format!("Failed to parse sensor table {}", path.display()))
}
