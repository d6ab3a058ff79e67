use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{RESOURCE_MAX, RESOURCE_MIN};

/// Starting conditions for a relay game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCfg {
    #[serde(default = "RelayCfg::default_starting_power")]
    pub starting_power: i32,
    #[serde(default = "RelayCfg::default_starting_integrity")]
    pub starting_integrity: i32,
    #[serde(default = "RelayCfg::default_starting_focus")]
    pub starting_focus: i32,
    #[serde(default = "RelayCfg::default_turn_limit")]
    pub turn_limit: u32,
    #[serde(default = "RelayCfg::default_signal_window_turns")]
    pub signal_window_turns: u32,
    #[serde(default = "RelayCfg::default_min_extra_subsystems")]
    pub min_extra_subsystems: u8,
    #[serde(default = "RelayCfg::default_max_extra_subsystems")]
    pub max_extra_subsystems: u8,
}

impl RelayCfg {
    /// Number of optional subsystems in the catalog.
    pub const OPTIONAL_POOL: u8 = 3;

    const fn default_starting_power() -> i32 {
        55
    }

    const fn default_starting_integrity() -> i32 {
        70
    }

    const fn default_starting_focus() -> i32 {
        60
    }

    const fn default_turn_limit() -> u32 {
        10
    }

    const fn default_signal_window_turns() -> u32 {
        2
    }

    const fn default_min_extra_subsystems() -> u8 {
        1
    }

    const fn default_max_extra_subsystems() -> u8 {
        3
    }

    /// Parse a configuration document, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `RelayConfigError::Parse` for malformed JSON and any
    /// validation error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, RelayConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration values before they seed a game.
    ///
    /// # Errors
    ///
    /// Returns `RelayConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), RelayConfigError> {
        Self::validate_resource("starting_power", self.starting_power)?;
        Self::validate_resource("starting_integrity", self.starting_integrity)?;
        Self::validate_resource("starting_focus", self.starting_focus)?;
        if self.turn_limit == 0 {
            return Err(RelayConfigError::MinViolation {
                field: "turn_limit",
                min: 1,
                value: 0,
            });
        }
        if self.signal_window_turns == 0 {
            return Err(RelayConfigError::MinViolation {
                field: "signal_window_turns",
                min: 1,
                value: 0,
            });
        }
        self.validate_extras()
    }

    fn validate_resource(field: &'static str, value: i32) -> Result<(), RelayConfigError> {
        // Zero would end the game before the first command.
        let min = RESOURCE_MIN + 1;
        if !(min..=RESOURCE_MAX).contains(&value) {
            return Err(RelayConfigError::RangeViolation {
                field,
                min,
                max: RESOURCE_MAX,
                value,
            });
        }
        Ok(())
    }

    fn validate_extras(&self) -> Result<(), RelayConfigError> {
        let min = self.min_extra_subsystems;
        let max = self.max_extra_subsystems;
        if min == 0 || max > Self::OPTIONAL_POOL || min > max {
            return Err(RelayConfigError::ExtraSubsystemBounds { min, max });
        }
        Ok(())
    }
}

impl Default for RelayCfg {
    fn default() -> Self {
        Self {
            starting_power: Self::default_starting_power(),
            starting_integrity: Self::default_starting_integrity(),
            starting_focus: Self::default_starting_focus(),
            turn_limit: Self::default_turn_limit(),
            signal_window_turns: Self::default_signal_window_turns(),
            min_extra_subsystems: Self::default_min_extra_subsystems(),
            max_extra_subsystems: Self::default_max_extra_subsystems(),
        }
    }
}

/// Errors raised when relay configuration invariants are violated.
#[derive(Debug, Error)]
pub enum RelayConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("extra subsystem bounds {min}..={max} must lie within 1..=3")]
    ExtraSubsystemBounds { min: u8, max: u8 },
    #[error("failed to parse relay config: {0}")]
    Parse(#[from] serde_json::Error),
}
