// src/check/plugin.rs
//
// The four webups check plugins: discovery of items from the parsed
// section and evaluation of one item against its rule parameters

use log::{debug, error};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::sensors::SensorType;

use super::error::{CheckError, Result};
use super::levels::{check_levels, CheckResult, Levels, Metric, Rendering, State};
use super::params::{CheckParams, LevelsKey};
use super::section::{Chip, Sensor};

/// A registered check plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckPlugin {
    Temperature,
    Hours,
    Fan,
    Voltage,
}

impl CheckPlugin {
    pub const ALL: [CheckPlugin; 4] = [Self::Temperature, Self::Hours, Self::Fan, Self::Voltage];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "webups_temp",
            Self::Hours => "webups_hours",
            Self::Fan => "webups_fan",
            Self::Voltage => "webups_volt",
        }
    }

    /// Rule set the host uses to configure this plugin
    pub fn ruleset(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Hours => "hours",
            Self::Fan => "hw_fans",
            Self::Voltage => "voltage",
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Temperature => SensorType::Temp,
            Self::Hours => SensorType::Hours,
            Self::Fan => SensorType::Fan,
            Self::Voltage => SensorType::In,
        }
    }

    pub fn metric_name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Hours => "hours",
            Self::Fan => "fan_speed",
            Self::Voltage => "volt",
        }
    }

    /// Service description for an item
    pub fn service_name(&self, item: &str) -> String {
        format!("{} {}", self.name(), item)
    }

    fn upper_key(&self) -> LevelsKey {
        match self {
            Self::Fan => LevelsKey::Upper,
            _ => LevelsKey::Levels,
        }
    }

    fn lower_key(&self) -> LevelsKey {
        match self {
            Self::Fan => LevelsKey::Levels,
            _ => LevelsKey::LevelsLower,
        }
    }

    fn rendering(&self, params: &CheckParams) -> Rendering<'static> {
        match self {
            Self::Temperature => Rendering {
                label: "Temperature",
                unit: params.output_unit.unwrap_or_default().symbol(),
            },
            Self::Hours => Rendering { label: "Runtime", unit: "h" },
            Self::Fan => Rendering { label: "Speed", unit: "RPM" },
            Self::Voltage => Rendering { label: "Voltage", unit: "V" },
        }
    }

    /// Reject parameters this plugin cannot honour
    fn validate(&self, params: &CheckParams) -> Result<()> {
        if *self != Self::Temperature {
            return Ok(());
        }

        let unsupported = [
            ("trend_compute", params.trend_compute.is_some()),
            ("device_levels_handling", params.device_levels_handling.is_some()),
            ("input_unit", params.input_unit.is_some()),
        ];
        match unsupported.into_iter().find(|(_, present)| *present) {
            Some((parameter, _)) => Err(CheckError::UnsupportedParameter {
                plugin: self.name(),
                parameter,
            }),
            None => Ok(()),
        }
    }

    /// Enumerate the items this plugin monitors
    pub fn discover(&self, section: &[Chip]) -> Vec<String> {
        let sensor_type = self.sensor_type();
        section
            .iter()
            .flat_map(|chip| {
                chip.sensors
                    .iter()
                    .filter(move |sensor| sensor.sensor_type == sensor_type)
                    .map(move |sensor| chip.item_name(sensor))
            })
            .collect()
    }

    /// Evaluate one item.
    ///
    /// Levels come from the rule when it carries any of this plugin's
    /// level keys, otherwise from the sensor's own warn/crit bounds.
    /// A sensor without any levels is always OK.
    pub fn check(&self, item: &str, params: &CheckParams, section: &[Chip]) -> Result<ItemReport> {
        self.validate(params)?;

        let Some(sensor) = find_sensor(item, section) else {
            return Ok(ItemReport::single(State::Unknown, "Item not found in agent output"));
        };

        let Some(raw_value) = sensor.value else {
            return Ok(ItemReport::single(State::Warn, "No input delivered by device"));
        };

        let value = match self {
            Self::Temperature => params.output_unit.unwrap_or_default().convert_celsius(raw_value),
            _ => raw_value,
        };

        let rule_upper = params.get(self.upper_key());
        let rule_lower = params.get(self.lower_key());

        let (levels_upper, levels_lower) = if rule_upper.is_some() || rule_lower.is_some() {
            debug!("{}: using levels from rule", item);
            (rule_upper, rule_lower)
        } else {
            match sensor_levels(sensor) {
                Some(levels) => {
                    debug!("{}: using levels from sensor table", item);
                    (Some(levels), None)
                }
                None => {
                    return Ok(ItemReport {
                        results: vec![CheckResult::new(State::Ok, "Always OK (no levels configured)")],
                        metric: Some(Metric {
                            name: self.metric_name().to_string(),
                            value,
                            levels: None,
                        }),
                    });
                }
            }
        };

        let (result, metric) = check_levels(
            value,
            levels_upper,
            levels_lower,
            self.metric_name(),
            self.rendering(params),
        );

        Ok(ItemReport {
            results: vec![result],
            metric: Some(metric),
        })
    }
}

impl fmt::Display for CheckPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckPlugin {
    type Err = String;

    /// Accepts the plugin name or its rule set name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plugin| plugin.name() == s || plugin.ruleset() == s)
            .ok_or_else(|| format!("unknown check plugin: {s}"))
    }
}

fn find_sensor<'a>(item: &str, section: &'a [Chip]) -> Option<&'a Sensor> {
    section
        .iter()
        .find_map(|chip| chip.sensors.iter().find(|sensor| chip.item_name(sensor) == item))
}

/// Upper levels shipped with the sensor. A single bound is used for
/// both warn and crit.
fn sensor_levels(sensor: &Sensor) -> Option<Levels> {
    match (sensor.warn, sensor.crit) {
        (Some(warn), Some(crit)) => Some(Levels(warn, crit)),
        (Some(bound), None) | (None, Some(bound)) => Some(Levels(bound, bound)),
        (None, None) => None,
    }
}

/// Outcome of one item check
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub results: Vec<CheckResult>,
    pub metric: Option<Metric>,
}

impl ItemReport {
    fn single(state: State, summary: &str) -> Self {
        Self {
            results: vec![CheckResult::new(state, summary)],
            metric: None,
        }
    }

    pub fn state(&self) -> State {
        self.results
            .iter()
            .fold(State::Ok, |state, result| state.worst(result.state))
    }

    pub fn summary(&self) -> String {
        self.results
            .iter()
            .map(|result| result.summary.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One discovered service and its report
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReport {
    pub service: String,
    pub item: String,
    pub report: ItemReport,
}

/// Everything one plugin produced for a section
#[derive(Debug)]
pub struct PluginReport {
    pub plugin: CheckPlugin,
    pub services: Result<Vec<ServiceReport>>,
}

impl PluginReport {
    pub fn state(&self) -> State {
        match &self.services {
            Ok(services) => services
                .iter()
                .fold(State::Ok, |state, service| state.worst(service.report.state())),
            Err(_) => State::Unknown,
        }
    }
}

/// Discover and check every item of `plugin`
pub fn run_plugin(plugin: CheckPlugin, section: &[Chip], params: &CheckParams) -> Result<Vec<ServiceReport>> {
    plugin
        .discover(section)
        .into_iter()
        .map(|item| -> Result<ServiceReport> {
            let report = plugin.check(&item, params, section)?;
            Ok(ServiceReport {
                service: plugin.service_name(&item),
                item,
                report,
            })
        })
        .collect()
}

/// Plugins among `plugins` that discover `item` in the section
pub fn plugins_for_item(section: &[Chip], plugins: &[CheckPlugin], item: &str) -> Vec<CheckPlugin> {
    plugins
        .iter()
        .copied()
        .filter(|plugin| plugin.discover(section).iter().any(|found| found == item))
        .collect()
}

/// Run several plugins over one section.
///
/// `params` maps plugin names to their rule parameters. A failing
/// plugin is reported as such and does not stop the others.
pub fn run_plugins(section: &[Chip], plugins: &[CheckPlugin], params: &Map<String, Value>) -> Vec<PluginReport> {
    plugins
        .iter()
        .map(|&plugin| {
            let services = params
                .get(plugin.name())
                .cloned()
                .map(|value| CheckParams::from_value(plugin.name(), value))
                .transpose()
                .and_then(|plugin_params| run_plugin(plugin, section, &plugin_params.unwrap_or_default()));

            if let Err(err) = &services {
                error!("Check plugin {} failed: {}", plugin, err);
            }
            PluginReport { plugin, services }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::section::parse_section;
    use serde_json::json;

    const SECTION: &str = r#"{"webups": {
        "Adapter": "parameters",
        "temp1, temperature": {"temp1_input": 20.0, "temp1_max": 30.0, "temp1_crit": 40.0, "temp1_min": null},
        "temp2, temperature": {"temp2_input": 35.0, "temp2_max": 30.0, "temp2_crit": null, "temp2_min": null},
        "temp3, temperature": {"temp3_input": 90.0, "temp3_max": null, "temp3_crit": null, "temp3_min": null},
        "temp4, temperature": {"temp4_input": null, "temp4_max": 30.0, "temp4_crit": 40.0, "temp4_min": null},
        "fan1, fan": {"fan1_input": 1200.0, "fan1_max": null, "fan1_crit": null, "fan1_min": null},
        "in0, input-voltage": {"in0_input": 231.5, "in0_max": 240.0, "in0_crit": 250.0, "in0_min": null},
        "hours, hours": {"hours_input": 1500.0, "hours_max": null, "hours_crit": 2000.0, "hours_min": null},
        "x, misc": {"x_input": 40.0, "x_max": null, "x_crit": null, "x_min": null}
    }}"#;

    fn section() -> Vec<Chip> {
        parse_section(SECTION).unwrap()
    }

    fn params(value: Value) -> CheckParams {
        CheckParams::from_value("test", value).unwrap()
    }

    #[test]
    fn test_discovery() {
        let section = section();

        assert_eq!(
            CheckPlugin::Temperature.discover(&section),
            vec![
                "parameters temp1, temperature",
                "parameters temp2, temperature",
                "parameters temp3, temperature",
                "parameters temp4, temperature",
            ]
        );
        assert_eq!(CheckPlugin::Fan.discover(&section), vec!["parameters fan1, fan"]);
        assert_eq!(CheckPlugin::Voltage.discover(&section), vec!["parameters in0, input-voltage"]);
        assert_eq!(CheckPlugin::Hours.discover(&section), vec!["parameters hours, hours"]);
    }

    #[test]
    fn test_plugins_for_item() {
        let section = section();

        assert_eq!(
            plugins_for_item(&section, &CheckPlugin::ALL, "parameters temp1, temperature"),
            vec![CheckPlugin::Temperature]
        );
        assert_eq!(
            plugins_for_item(&section, &CheckPlugin::ALL, "parameters fan1, fan"),
            vec![CheckPlugin::Fan]
        );
        assert!(plugins_for_item(&section, &CheckPlugin::ALL, "parameters x, misc").is_empty());
        assert!(plugins_for_item(&section, &[CheckPlugin::Voltage], "parameters temp1, temperature").is_empty());
    }

    #[test]
    fn test_threshold_priority() {
        let section = section();
        let rule = params(json!({"levels": [10, 50]}));

        // Rule levels win over the sensor's own bounds
        let report = CheckPlugin::Temperature
            .check("parameters temp2, temperature", &rule, &section)
            .unwrap();
        assert_eq!(report.state(), State::Warn);
        assert_eq!(report.metric.unwrap().levels, Some(Levels(10.0, 50.0)));

        // Without a rule, the sensor bounds apply
        let report = CheckPlugin::Temperature
            .check("parameters temp1, temperature", &CheckParams::default(), &section)
            .unwrap();
        assert_eq!(report.state(), State::Ok);
        assert_eq!(report.metric.unwrap().levels, Some(Levels(30.0, 40.0)));

        // Without any levels the item is always OK, metric still emitted
        let report = CheckPlugin::Temperature
            .check("parameters temp3, temperature", &CheckParams::default(), &section)
            .unwrap();
        assert_eq!(report.state(), State::Ok);
        assert_eq!(report.summary(), "Always OK (no levels configured)");
        let metric = report.metric.unwrap();
        assert_eq!(metric.value, 90.0);
        assert_eq!(metric.levels, None);
    }

    #[test]
    fn test_single_bound_is_used_for_both_levels() {
        let section = section();
        let report = CheckPlugin::Temperature
            .check("parameters temp2, temperature", &CheckParams::default(), &section)
            .unwrap();

        assert_eq!(report.state(), State::Crit);
        assert_eq!(report.metric.unwrap().levels, Some(Levels(30.0, 30.0)));

        let report = CheckPlugin::Hours
            .check("parameters hours, hours", &CheckParams::default(), &section)
            .unwrap();
        assert_eq!(report.state(), State::Ok);
        assert_eq!(report.metric.unwrap().levels, Some(Levels(2000.0, 2000.0)));
    }

    #[test]
    fn test_missing_value_is_warn_without_metric() {
        let report = CheckPlugin::Temperature
            .check("parameters temp4, temperature", &CheckParams::default(), &section())
            .unwrap();

        assert_eq!(report.state(), State::Warn);
        assert_eq!(report.summary(), "No input delivered by device");
        assert!(report.metric.is_none());
    }

    #[test]
    fn test_unit_conversion_before_comparison() {
        // 20 °C is 68 °F, above the rule's 60 °F warning level
        let rule = params(json!({"levels": [60, 80], "output_unit": "f"}));
        let report = CheckPlugin::Temperature
            .check("parameters temp1, temperature", &rule, &section())
            .unwrap();

        assert_eq!(report.state(), State::Warn);
        assert!((report.metric.unwrap().value - 68.0).abs() < 1e-9);

        let rule = params(json!({"output_unit": "k"}));
        let report = CheckPlugin::Temperature
            .check("parameters temp3, temperature", &rule, &section())
            .unwrap();
        assert!((report.metric.unwrap().value - 363.15).abs() < 1e-9);
    }

    #[test]
    fn test_lower_levels_from_rule() {
        let section = section();

        let rule = params(json!({"levels_lower": [25, 15]}));
        let report = CheckPlugin::Temperature
            .check("parameters temp1, temperature", &rule, &section)
            .unwrap();
        assert_eq!(report.state(), State::Warn);

        // Fan rules put their lower levels under "levels"
        let rule = params(json!({"levels": [1500, 1000]}));
        let report = CheckPlugin::Fan.check("parameters fan1, fan", &rule, &section).unwrap();
        assert_eq!(report.state(), State::Warn);

        let rule = params(json!({"upper": [1000, 1100]}));
        let report = CheckPlugin::Fan.check("parameters fan1, fan", &rule, &section).unwrap();
        assert_eq!(report.state(), State::Crit);
    }

    #[test]
    fn test_unsupported_parameters() {
        let section = section();

        for rule in [
            json!({"trend_compute": {"period": 30}}),
            json!({"device_levels_handling": "worst"}),
            json!({"input_unit": "f"}),
        ] {
            let err = CheckPlugin::Temperature
                .check("parameters temp1, temperature", &params(rule), &section)
                .unwrap_err();
            assert!(matches!(err, CheckError::UnsupportedParameter { plugin: "webups_temp", .. }));
        }

        // Other plugins do not look at these keys
        let rule = params(json!({"trend_compute": {"period": 30}}));
        assert!(CheckPlugin::Voltage.check("parameters in0, input-voltage", &rule, &section).is_ok());
    }

    #[test]
    fn test_unknown_item() {
        let report = CheckPlugin::Fan
            .check("parameters fan9, fan", &CheckParams::default(), &section())
            .unwrap();
        assert_eq!(report.state(), State::Unknown);
    }

    #[test]
    fn test_item_of_unknown_type_can_still_be_checked() {
        let report = CheckPlugin::Voltage
            .check("parameters x, misc", &CheckParams::default(), &section())
            .unwrap();

        assert_eq!(report.state(), State::Ok);
        assert_eq!(report.metric.unwrap().value, 40.0);
    }

    #[test]
    fn test_error_aborts_only_its_plugin() {
        let section = section();
        let mut rules = Map::new();
        rules.insert("webups_temp".to_string(), json!({"trend_compute": {"period": 30}}));
        rules.insert("webups_volt".to_string(), json!({"levels": [235, 245]}));

        let reports = run_plugins(&section, &CheckPlugin::ALL, &rules);
        assert_eq!(reports.len(), 4);

        assert!(reports[0].services.is_err());
        assert_eq!(reports[0].state(), State::Unknown);

        let fan = reports[2].services.as_ref().unwrap();
        assert_eq!(fan.len(), 1);
        assert_eq!(fan[0].service, "webups_fan parameters fan1, fan");

        let volt = reports[3].services.as_ref().unwrap();
        assert_eq!(volt[0].report.state(), State::Ok);
        assert_eq!(volt[0].report.metric.as_ref().unwrap().levels, Some(Levels(235.0, 245.0)));
    }

    #[test]
    fn test_plugin_from_str() {
        assert_eq!("webups_temp".parse::<CheckPlugin>(), Ok(CheckPlugin::Temperature));
        assert_eq!("hw_fans".parse::<CheckPlugin>(), Ok(CheckPlugin::Fan));
        assert!("webups_power".parse::<CheckPlugin>().is_err());
    }
}
