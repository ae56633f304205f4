//! Execution status domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a pipeline or workflow as reported by the server's `status_desc`
///
/// Hop reports statuses as display strings. The known ones are mapped to
/// variants; anything else is kept verbatim in `Other` and treated as
/// non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Waiting,
    Preparing,
    Initializing,
    Running,
    Paused,
    Halting,
    Finished,
    FinishedWithErrors,
    Stopped,
    StoppedWithErrors,
    Other(String),
}

impl ExecutionStatus {
    pub fn parse(desc: &str) -> Self {
        match desc.trim() {
            "Waiting" => Self::Waiting,
            "Preparing executing" => Self::Preparing,
            "Initializing" => Self::Initializing,
            "Running" => Self::Running,
            "Paused" => Self::Paused,
            "Halting" => Self::Halting,
            "Finished" => Self::Finished,
            "Finished (with errors)" => Self::FinishedWithErrors,
            "Stopped" => Self::Stopped,
            "Stopped (with errors)" => Self::StoppedWithErrors,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "Waiting",
            Self::Preparing => "Preparing executing",
            Self::Initializing => "Initializing",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Halting => "Halting",
            Self::Finished => "Finished",
            Self::FinishedWithErrors => "Finished (with errors)",
            Self::Stopped => "Stopped",
            Self::StoppedWithErrors => "Stopped (with errors)",
            Self::Other(desc) => desc,
        }
    }

    /// Polling stops once a terminal status is observed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::FinishedWithErrors | Self::Stopped | Self::StoppedWithErrors
        )
    }

    /// Every terminal status except a clean `Finished` fails the execution
    pub fn is_error(&self) -> bool {
        self.is_terminal() && *self != Self::Finished
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
