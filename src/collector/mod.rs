// src/collector/mod.rs
//
// Collector side: read the sensor tables, fetch the device once and
// build the merged snapshot

pub mod client;
pub mod snapshot;

pub use self::client::DeviceClient;
pub use self::snapshot::{read_sensor, SensorReading, Snapshot};

use log::{error, info, warn};
use std::path::PathBuf;

use crate::config::DeviceSettings;
use crate::outcome::RunOutcome;
use crate::sensors::{load_sensor_table, SensorTable};

/// Result of one collector run
#[derive(Debug)]
pub struct Collection {
    /// `None` when there was nothing to print
    pub snapshot: Option<Snapshot>,
    pub outcome: RunOutcome,
}

/// Load every table, logging and counting the ones that fail
pub fn load_tables(paths: &[PathBuf]) -> (Vec<SensorTable>, usize) {
    let mut tables = Vec::with_capacity(paths.len());
    let mut failed = 0;

    for path in paths {
        match load_sensor_table(path) {
            Ok(table) => tables.push(table),
            Err(err) => {
                error!("Skipping sensor table {}: {:#}", path.display(), err);
                failed += 1;
            }
        }
    }

    (tables, failed)
}

/// Apply tables in order; the last one replaces the earlier groups
pub fn build_snapshot(tables: &[SensorTable], lines: &[String]) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for table in tables {
        snapshot.apply_table(table, lines);
    }
    snapshot
}

/// Run the collector for one device
pub async fn collect(device: &str, table_paths: &[PathBuf], settings: &DeviceSettings) -> Collection {
    let (tables, failed_tables) = load_tables(table_paths);
    if tables.is_empty() {
        error!("No usable sensor table, nothing to collect");
        return Collection { snapshot: None, outcome: RunOutcome::Failure };
    }

    let client = match DeviceClient::new(device, settings) {
        Ok(client) => client,
        Err(err) => {
            error!("{:#}", err);
            return Collection { snapshot: None, outcome: RunOutcome::Failure };
        }
    };

    let lines = match client.fetch_lines().await {
        Ok(lines) => lines,
        Err(err) => {
            error!("Failed to fetch sensor data from {}: {:#}", client.url(), err);
            return Collection { snapshot: None, outcome: RunOutcome::Failure };
        }
    };

    let snapshot = build_snapshot(&tables, &lines);
    let missing = snapshot.missing_inputs();

    let mut outcome = RunOutcome::Success;
    if failed_tables > 0 {
        warn!("{} of {} sensor tables could not be loaded", failed_tables, table_paths.len());
        outcome = outcome.worst(RunOutcome::Partial);
    }
    if missing > 0 {
        warn!("{} of {} sensors delivered no value", missing, snapshot.len());
        outcome = outcome.worst(RunOutcome::Partial);
    }

    info!("Collected {} sensors ({})", snapshot.len(), outcome);
    Collection { snapshot: Some(snapshot), outcome }
}
