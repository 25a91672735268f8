// src/config.rs
//
// Command line arguments and environment-driven settings for the collector

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Path of the realtime status page on the device
pub const DEFAULT_ENDPOINT_PATH: &str = "/cgi-bin/realInfo.cgi";

/// Name of the agent section and of the outer JSON group
pub const SECTION_NAME: &str = "webups";

/// Collector command line
#[derive(Debug, Parser)]
#[command(
    name = "webups-agent",
    version,
    about = "Read UPS/HVAC sensors over HTTP and print them as JSON"
)]
pub struct CollectorArgs {
    /// Address of the device, e.g. 192.168.1.20 or http://ups.local:8080
    pub device: String,

    /// Sensor table(s) in CSV format; later tables win on sensor name collisions
    #[arg(required = true)]
    pub tables: Vec<PathBuf>,

    /// Print the agent section header before the JSON line
    #[arg(long)]
    pub section_header: bool,

    /// Override the status page path on the device
    #[arg(long, env = "WEBUPS_ENDPOINT_PATH")]
    pub endpoint_path: Option<String>,

    /// HTTP request timeout in seconds (transport default when unset)
    #[arg(long, env = "WEBUPS_HTTP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Settings for talking to the device
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub endpoint_path: String,
    pub timeout: Option<Duration>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            timeout: None,
        }
    }
}

impl From<&CollectorArgs> for DeviceSettings {
    fn from(args: &CollectorArgs) -> Self {
        let defaults = Self::default();
        Self {
            endpoint_path: args
                .endpoint_path
                .clone()
                .filter(|path| !path.is_empty())
                .unwrap_or(defaults.endpoint_path),
            timeout: args.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Usage text printed when too few arguments are given
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {0} IP sensors1.csv [...]\n  \
         IP: The address of the device web interface\n  \
         sensors1.csv: The csv file with sensors to read\n  \
         ...: Additional csv files with sensors to read",
        program
    )
}
