//! `webups-agent` -- reads sensors of a UPS/HVAC web interface.
//!
//! Fetches the device status page once, applies the sensor tables given
//! on the command line and prints the snapshot as one JSON line.
//!
//! # Environment variables
//!
//! | Variable                   | Default                 | Description                      |
//! |----------------------------|-------------------------|----------------------------------|
//! | `WEBUPS_ENDPOINT_PATH`     | `/cgi-bin/realInfo.cgi` | Status page path on the device   |
//! | `WEBUPS_HTTP_TIMEOUT_SECS` | --                      | Request timeout in seconds       |
//! | `RUST_LOG`                 | `info`                  | Log filter (logs go to stderr)   |
//!
//! Exit status: 0 on success, 1 when the snapshot is incomplete, 2 when
//! nothing could be collected.

use clap::error::ErrorKind;
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use std::env;
use std::process::ExitCode;

use webups::collector;
use webups::config::{usage, CollectorArgs, DeviceSettings, SECTION_NAME};
use webups::outcome::RunOutcome;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = match CollectorArgs::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            ErrorKind::MissingRequiredArgument => {
                let program = env::args().next().unwrap_or_else(|| "webups-agent".to_string());
                println!("{}", usage(&program));
                return ExitCode::SUCCESS;
            }
            _ => {
                let _ = err.print();
                return RunOutcome::Failure.into();
            }
        },
    };

    let settings = DeviceSettings::from(&args);
    info!(
        "Collecting from {} with {} sensor table(s), endpoint {}",
        args.device,
        args.tables.len(),
        settings.endpoint_path
    );

    let collection = collector::collect(&args.device, &args.tables, &settings).await;

    if let Some(snapshot) = &collection.snapshot {
        match snapshot.to_json() {
            Ok(json) => {
                if args.section_header {
                    println!("<<<{}>>>", SECTION_NAME);
                }
                println!("{}", json);
            }
            Err(err) => {
                error!("Failed to serialize snapshot: {}", err);
                return RunOutcome::Failure.into();
            }
        }
    }

    collection.outcome.into()
}
