//! End-condition evaluation and the post-step finalize pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ESCAPE_LOW_INTEGRITY_THRESHOLD, ESCAPE_LOW_POWER_THRESHOLD, ESCAPE_RISK_IMPERFECT,
};
use crate::data::SubsystemName;
use crate::state::GameState;

/// Terminal outcome of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    PowerDepleted,
    StationFailure,
    FocusLost,
    TimeExpired,
    SuccessImperfect,
    Success,
}

impl Ending {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::PowerDepleted => "LOSS: POWER DEPLETED \u{2014} Station goes dark.",
            Self::StationFailure => "LOSS: STATION FAILURE \u{2014} Structural collapse.",
            Self::FocusLost => "LOSS: FOCUS LOST \u{2014} You freeze, unable to act.",
            Self::TimeExpired => "LOSS: TIME EXPIRED \u{2014} Relay fails before transmission.",
            Self::SuccessImperfect => {
                "SUCCESS (IMPERFECT): Transmission sent, but escape is uncertain."
            }
            Self::Success => "SUCCESS: Transmission sent and escape sequence viable.",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::SuccessImperfect)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PowerDepleted => "power_depleted",
            Self::StationFailure => "station_failure",
            Self::FocusLost => "focus_lost",
            Self::TimeExpired => "time_expired",
            Self::SuccessImperfect => "success_imperfect",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Escape risk after a transmission; two or more points mean an imperfect escape.
#[must_use]
pub fn escape_risk(state: &GameState) -> u8 {
    u8::from(state.is_unstable(SubsystemName::DockingControl))
        + u8::from(state.power < ESCAPE_LOW_POWER_THRESHOLD)
        + u8::from(state.integrity < ESCAPE_LOW_INTEGRITY_THRESHOLD)
}

/// Detect the ending that applies to an active state; first match wins.
#[must_use]
pub fn evaluate(state: &GameState) -> Option<Ending> {
    if state.ended {
        return None;
    }
    if state.power <= 0 {
        Some(Ending::PowerDepleted)
    } else if state.integrity <= 0 {
        Some(Ending::StationFailure)
    } else if state.focus <= 0 {
        Some(Ending::FocusLost)
    } else if state.turns_left == 0 && !state.transmitted {
        Some(Ending::TimeExpired)
    } else if state.transmitted {
        if escape_risk(state) >= ESCAPE_RISK_IMPERFECT {
            Some(Ending::SuccessImperfect)
        } else {
            Some(Ending::Success)
        }
    } else {
        None
    }
}

/// Clamp resources, then freeze the game if an ending applies.
pub fn finalize(state: &mut GameState) {
    state.clamp();
    if let Some(ending) = evaluate(state) {
        log::info!(
            "game seed={} ended on turn {}: {}",
            state.seed,
            state.turn,
            ending.key()
        );
        state.ended = true;
        state.ending = Some(ending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::new_game;
    use crate::state::Severity;

    fn fresh() -> GameState {
        new_game(42).state
    }

    #[test]
    fn power_outranks_every_other_ending() {
        let mut state = fresh();
        state.power = 0;
        state.integrity = 0;
        state.focus = 0;
        state.turns_left = 0;
        assert_eq!(evaluate(&state), Some(Ending::PowerDepleted));
        state.power = 5;
        assert_eq!(evaluate(&state), Some(Ending::StationFailure));
        state.integrity = 5;
        assert_eq!(evaluate(&state), Some(Ending::FocusLost));
        state.focus = 5;
        assert_eq!(evaluate(&state), Some(Ending::TimeExpired));
    }

    #[test]
    fn transmission_on_last_turn_still_succeeds() {
        let mut state = fresh();
        state.turns_left = 0;
        state.transmitted = true;
        state.power = 50;
        state.integrity = 60;
        if let Some(dock) = state.subsystem_mut(SubsystemName::DockingControl) {
            dock.status = Severity::Nominal;
        }
        assert_eq!(evaluate(&state), Some(Ending::Success));
    }

    #[test]
    fn escape_risk_counts_three_factors() {
        let mut state = fresh();
        state.transmitted = true;
        state.power = 9;
        state.integrity = 39;
        // seed 42 starts with Docking Control degraded
        assert_eq!(escape_risk(&state), 3);
        assert_eq!(evaluate(&state), Some(Ending::SuccessImperfect));

        state.power = 40;
        state.integrity = 80;
        assert_eq!(escape_risk(&state), 1);
        assert_eq!(evaluate(&state), Some(Ending::Success));
    }

    #[test]
    fn finalize_clamps_and_freezes_once() {
        let mut state = fresh();
        state.power = -20;
        finalize(&mut state);
        assert_eq!(state.power, 0);
        assert!(state.ended);
        assert_eq!(state.ending, Some(Ending::PowerDepleted));
        assert!(state.ending_text().is_some_and(|t| t.starts_with("LOSS: POWER DEPLETED")));

        state.power = 50;
        state.integrity = -4;
        finalize(&mut state);
        assert_eq!(state.ending, Some(Ending::PowerDepleted));
        assert_eq!(state.integrity, 0);
    }

    #[test]
    fn loss_texts_keep_their_dash_separator() {
        assert_eq!(
            Ending::PowerDepleted.text(),
            "LOSS: POWER DEPLETED \u{2014} Station goes dark."
        );
        assert_eq!(
            Ending::TimeExpired.to_string(),
            "LOSS: TIME EXPIRED \u{2014} Relay fails before transmission."
        );
        for ending in [
            Ending::PowerDepleted,
            Ending::StationFailure,
            Ending::FocusLost,
            Ending::TimeExpired,
        ] {
            assert!(ending.text().starts_with("LOSS: "));
            assert_eq!(ending.text().matches('\u{2014}').count(), 1);
        }
    }

    #[test]
    fn active_state_has_no_ending() {
        let state = fresh();
        assert_eq!(evaluate(&state), None);
        assert!(Ending::Success.is_success());
        assert!(!Ending::TimeExpired.is_success());
    }
}
