// src/check/mod.rs
//
// Evaluator side: parses the collector snapshot and turns it into
// monitoring results for the temperature, hours, fan and voltage checks

pub mod error;
pub mod levels;
pub mod params;
pub mod plugin;
pub mod section;

pub use self::error::CheckError;
pub use self::levels::{check_levels, CheckResult, Levels, Metric, State};
pub use self::params::{CheckParams, TemperatureUnit};
pub use self::plugin::{plugins_for_item, run_plugin, run_plugins, CheckPlugin, ItemReport, PluginReport, ServiceReport};
pub use self::section::{parse_section, parse_string_table, Chip, Sensor};
