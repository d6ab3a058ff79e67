use serde::{Deserialize, Serialize};

use crate::data::SubsystemName;

/// Structured player command accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Scan,
    Repair { target: SubsystemName },
    Reroute { target: SubsystemName },
    Rest,
    Override,
    Tx,
    Status,
    Help,
    Restart {
        #[serde(default)]
        seed: Option<u32>,
    },
}

impl Command {
    /// Commands that only report and never advance the turn.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Status | Self::Help)
    }

    /// Subsystem named by the command, if any.
    #[must_use]
    pub const fn target(self) -> Option<SubsystemName> {
        match self {
            Self::Repair { target } | Self::Reroute { target } => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Repair { .. } => "repair",
            Self::Reroute { .. } => "reroute",
            Self::Rest => "rest",
            Self::Override => "override",
            Self::Tx => "tx",
            Self::Status => "status",
            Self::Help => "help",
            Self::Restart { .. } => "restart",
        }
    }
}
