//! `webups-check` -- evaluates a webups agent section.
//!
//! Reads the collector output from stdin, discovers the items of each
//! selected check plugin and prints one result line per service:
//!
//! ```text
//! OK - webups_temp parameters temp1, temperature - Temperature: 22.30 °C | temperature=22.3;30;40
//! ```
//!
//! The exit status is the worst state seen (0 OK, 1 WARN, 2 CRIT, 3 UNKNOWN).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::debug;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use webups::check::{parse_section, plugins_for_item, run_plugins, CheckParams, CheckPlugin, ItemReport, State};

#[derive(Debug, Parser)]
#[command(name = "webups-check", version, about = "Evaluate webups sensor snapshots")]
struct CheckArgs {
    /// Plugin to run, by plugin or rule set name (repeatable, all when omitted)
    #[arg(long = "plugin", value_name = "NAME")]
    plugins: Vec<CheckPlugin>,

    /// JSON file with rule parameters keyed by plugin name
    #[arg(long, env = "WEBUPS_CHECK_PARAMS")]
    params: Option<PathBuf>,

    /// Check only this item instead of every discovered one
    #[arg(long)]
    item: Option<String>,
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = CheckArgs::parse();

    match run(&args) {
        Ok(state) => ExitCode::from(state.code()),
        Err(err) => {
            println!("UNKNOWN - {:#}", err);
            ExitCode::from(State::Unknown.code())
        }
    }
}

fn run(args: &CheckArgs) -> Result<State> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read agent section from stdin")?;

    // The collector may prefix its output with the section header
    let body: String = input
        .lines()
        .filter(|line| !line.trim_start().starts_with("<<<"))
        .collect::<Vec<_>>()
        .join("\n");
    let section = parse_section(&body)?;

    let params = match &args.params {
        Some(path) => load_params(path)?,
        None => Map::new(),
    };

    let explicit = !args.plugins.is_empty();
    let plugins = if explicit {
        args.plugins.clone()
    } else {
        CheckPlugin::ALL.to_vec()
    };

    let mut worst = State::Ok;

    if let Some(item) = &args.item {
        // Without an explicit plugin, only the plugins owning the item run
        let plugins = if explicit {
            plugins
        } else {
            plugins_for_item(&section, &plugins, item)
        };
        if plugins.is_empty() {
            println!("{} - {} - Item not found in agent output", State::Unknown, item);
            return Ok(State::Unknown);
        }

        for plugin in plugins {
            let plugin_params = params
                .get(plugin.name())
                .cloned()
                .map(|value| CheckParams::from_value(plugin.name(), value))
                .transpose();

            let state = match plugin_params.and_then(|p| plugin.check(item, &p.unwrap_or_default(), &section)) {
                Ok(report) => print_service(&plugin.service_name(item), &report),
                Err(err) => print_plugin_error(plugin, &err),
            };
            worst = worst.worst(state);
        }
        return Ok(worst);
    }

    for report in run_plugins(&section, &plugins, &params) {
        match &report.services {
            Ok(services) => {
                debug!("{} discovered {} items", report.plugin, services.len());
                for service in services {
                    worst = worst.worst(print_service(&service.service, &service.report));
                }
            }
            Err(err) => worst = worst.worst(print_plugin_error(report.plugin, err)),
        }
    }

    Ok(worst)
}

fn load_params(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
    match serde_json::from_str::<Value>(&text)
        .with_context(|| format!("Parameter file {} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("Parameter file {} must contain a JSON object", path.display())),
    }
}

fn print_service(service: &str, report: &ItemReport) -> State {
    let state = report.state();
    match &report.metric {
        Some(metric) => println!("{} - {} - {} | {}", state, service, report.summary(), metric),
        None => println!("{} - {} - {}", state, service, report.summary()),
    }
    state
}

fn print_plugin_error(plugin: CheckPlugin, err: &dyn std::error::Error) -> State {
    println!("{} - {} - {}", State::Unknown, plugin, err);
    State::Unknown
}
