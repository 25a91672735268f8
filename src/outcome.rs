// src/outcome.rs
//
// Process-wide result of a collector run, surfaced as the exit status

use std::fmt;
use std::process::ExitCode;

/// How a collector run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunOutcome {
    /// Every table loaded and every sensor input was read
    Success,
    /// A snapshot was printed, but some tables or sensor inputs were missing
    Partial,
    /// Nothing could be printed
    Failure,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }

    /// Combine two outcomes, keeping the worse one
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }
}

impl From<RunOutcome> for ExitCode {
    fn from(outcome: RunOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failure => write!(f, "failure"),
        }
    }
}
