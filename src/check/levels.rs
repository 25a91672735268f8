// src/check/levels.rs
//
// Comparing a value against upper and lower (warn, crit) level pairs

use serde::Deserialize;
use std::fmt;

/// Monitoring state of a check result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    /// Numeric state as used by plugin exit codes
    pub fn code(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Crit => 2,
            Self::Unknown => 3,
        }
    }

    /// Worse of two states. CRIT outranks UNKNOWN.
    pub fn worst(self, other: Self) -> Self {
        fn rank(state: State) -> u8 {
            match state {
                State::Ok => 0,
                State::Warn => 1,
                State::Unknown => 2,
                State::Crit => 3,
            }
        }
        if rank(other) > rank(self) {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warn => write!(f, "WARN"),
            Self::Crit => write!(f, "CRIT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A (warning, critical) threshold pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Levels(pub f64, pub f64);

impl Levels {
    pub fn warn(&self) -> f64 {
        self.0
    }

    pub fn crit(&self) -> f64 {
        self.1
    }
}

/// Textual outcome of a check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub state: State,
    pub summary: String,
}

impl CheckResult {
    pub fn new(state: State, summary: impl Into<String>) -> Self {
        Self { state, summary: summary.into() }
    }
}

/// Labelled numeric value for graphing
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub levels: Option<Levels>,
}

impl fmt::Display for Metric {
    /// Perfdata form: `name=value;warn;crit`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(levels) = &self.levels {
            write!(f, ";{};{}", levels.warn(), levels.crit())?;
        }
        Ok(())
    }
}

/// How the value is rendered in the summary
#[derive(Debug, Clone, Copy)]
pub struct Rendering<'a> {
    pub label: &'a str,
    pub unit: &'a str,
}

/// Compare `value` against optional upper and lower levels.
///
/// Upper: `value >= crit` is CRIT, `value >= warn` is WARN.
/// Lower: `value < crit` is CRIT, `value < warn` is WARN.
pub fn check_levels(
    value: f64,
    levels_upper: Option<Levels>,
    levels_lower: Option<Levels>,
    metric_name: &str,
    rendering: Rendering<'_>,
) -> (CheckResult, Metric) {
    let mut state = State::Ok;
    let mut detail = None;

    if let Some(upper) = levels_upper {
        let upper_state = if value >= upper.crit() {
            State::Crit
        } else if value >= upper.warn() {
            State::Warn
        } else {
            State::Ok
        };
        if upper_state != State::Ok {
            state = upper_state;
            detail = Some(format!(
                " (warn/crit at {}/{})",
                format_value(upper.warn(), rendering.unit),
                format_value(upper.crit(), rendering.unit)
            ));
        }
    }

    if let Some(lower) = levels_lower {
        let lower_state = if value < lower.crit() {
            State::Crit
        } else if value < lower.warn() {
            State::Warn
        } else {
            State::Ok
        };
        if lower_state.code() > state.code() {
            state = lower_state;
            detail = Some(format!(
                " (warn/crit below {}/{})",
                format_value(lower.warn(), rendering.unit),
                format_value(lower.crit(), rendering.unit)
            ));
        }
    }

    let summary = format!(
        "{}: {}{}",
        rendering.label,
        format_value(value, rendering.unit),
        detail.unwrap_or_default()
    );

    let metric = Metric {
        name: metric_name.to_string(),
        value,
        levels: levels_upper,
    };

    (CheckResult::new(state, summary), metric)
}

fn format_value(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format!("{:.2}", value)
    } else {
        format!("{:.2} {}", value, unit)
    }
}
