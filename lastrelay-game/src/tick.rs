//! End-of-turn tick: drift, coupling, random events and the window countdown.

use crate::constants::{
    COUPLING_WORSEN_CHANCE, DRIFT_BASE_CHANCE, DRIFT_CAVITATION_BONUS, DRIFT_CHANCE_CAP,
    DRIFT_CHANCE_PER_SEVERITY, EVENT_BASE_CHANCE, EVENT_CHANCE_CAP, EVENT_CHANCE_PER_FAILING,
    EVENT_COOLANT_DAMAGE, EVENT_FALSE_DIAGNOSTIC_FOCUS, EVENT_GROAN_DAMAGE,
    EVENT_GROAN_LOOSE_MOUNTING_BONUS, EVENT_LOW_INTEGRITY_BONUS, EVENT_LOW_INTEGRITY_THRESHOLD,
    EVENT_LOW_POWER_BONUS, EVENT_LOW_POWER_THRESHOLD, EVENT_SURGE_LOSS,
};
use crate::data::{EventKind, Quirk, SubsystemName};
use crate::endgame::finalize;
use crate::numbers::usize_to_f64;
use crate::resolver::ai_line;
use crate::rng::{RelayRng, RngStream};
use crate::state::{GameState, Roster, Severity};

/// Advance an active game by one turn.
///
/// Draws come from the tick stream for the turn being closed; the turn
/// counter advances only after every draw is made.
pub fn end_of_turn(state: &mut GameState, window_turns: u32, lines: &mut Vec<String>) {
    let mut rng = RelayRng::scoped(state.seed, state.turn, RngStream::Tick);

    drift(state, &mut rng);
    feedback_coupling(state, &mut rng);
    if let Some(kind) = roll_event(state, &mut rng) {
        apply_event(state, kind, window_turns, &mut rng, lines);
    }
    count_down_window(state, lines);
    state.refresh_ai_mislead();

    state.turns_left = state.turns_left.saturating_sub(1);
    state.turn = state.turn.saturating_add(1);
    log::debug!(
        "tick closed turn {} with {} draws",
        state.turn - 1,
        rng.draws()
    );
    finalize(state);
}

/// Probability of worsening for a non-nominal subsystem this tick.
#[must_use]
pub fn drift_chance(status: Severity, quirk: Quirk) -> f64 {
    let mut chance = DRIFT_BASE_CHANCE + DRIFT_CHANCE_PER_SEVERITY * f64::from(status.index());
    if quirk == Quirk::PumpCavitation {
        chance += DRIFT_CAVITATION_BONUS;
    }
    chance.min(DRIFT_CHANCE_CAP)
}

fn drift(state: &mut GameState, rng: &mut RelayRng) {
    let roster: Roster = state.roster.clone();
    for name in roster {
        let Some(sub) = state.subsystem_mut(name) else {
            continue;
        };
        if sub.is_nominal() {
            continue;
        }
        if rng.chance(drift_chance(sub.status, sub.quirk)) {
            sub.worsen();
            log::debug!("drift: {name} worsened to {}", sub.status);
        }
    }
}

fn feedback_coupling(state: &mut GameState, rng: &mut RelayRng) {
    let coupled = state.has_quirk(SubsystemName::CoolingLoop, Quirk::FeedbackCoupling)
        && state.is_unstable(SubsystemName::AiCore);
    if coupled && rng.chance(COUPLING_WORSEN_CHANCE) {
        state.worsen(SubsystemName::CoolingLoop);
    }
}

/// Probability that a random event fires, given the post-drift state.
#[must_use]
pub fn event_chance(state: &GameState) -> f64 {
    let mut chance =
        EVENT_BASE_CHANCE + EVENT_CHANCE_PER_FAILING * usize_to_f64(state.failing_count());
    if state.integrity < EVENT_LOW_INTEGRITY_THRESHOLD {
        chance += EVENT_LOW_INTEGRITY_BONUS;
    }
    if state.power < EVENT_LOW_POWER_THRESHOLD {
        chance += EVENT_LOW_POWER_BONUS;
    }
    chance.min(EVENT_CHANCE_CAP)
}

fn roll_event(state: &GameState, rng: &mut RelayRng) -> Option<EventKind> {
    if rng.chance(event_chance(state)) {
        rng.pick(&EventKind::ALL).copied()
    } else {
        None
    }
}

fn apply_event(
    state: &mut GameState,
    kind: EventKind,
    window_turns: u32,
    rng: &mut RelayRng,
    lines: &mut Vec<String>,
) {
    log::debug!("event on turn {}: {}", state.turn, kind.label());
    match kind {
        EventKind::PowerSurge => {
            let (low, high) = EVENT_SURGE_LOSS;
            let loss = rng.int_range(low, high);
            state.power -= loss;
            lines.push(format!("EVENT: Power surge. Power -{loss}."));
        }
        EventKind::FalseDiagnostic => {
            let beacon_haunted = state
                .subsystem(SubsystemName::NavigationBeacon)
                .is_some_and(|b| b.has_quirk(Quirk::GhostPings) && b.status == Severity::Failing);
            if state.is_unstable(SubsystemName::AiCore) || beacon_haunted {
                state.focus -= EVENT_FALSE_DIAGNOSTIC_FOCUS;
                lines.push(format!(
                    "EVENT: False diagnostic flood. Focus -{EVENT_FALSE_DIAGNOSTIC_FOCUS}."
                ));
            } else {
                lines.push("EVENT: Diagnostic anomaly detected; resolved automatically.".into());
            }
        }
        EventKind::ExternalSignalWindow => {
            state.external_window = true;
            state.external_window_turns = window_turns;
            lines.push("EVENT: EXTERNAL SIGNAL WINDOW OPEN \u{2014} limited duration.".into());
        }
        EventKind::StructuralGroan => {
            let (low, high) = EVENT_GROAN_DAMAGE;
            let mut damage = rng.int_range(low, high);
            if state.has_quirk(SubsystemName::NavigationBeacon, Quirk::LooseMounting)
                && state.is_unstable(SubsystemName::NavigationBeacon)
            {
                damage += EVENT_GROAN_LOOSE_MOUNTING_BONUS;
            }
            state.integrity -= damage;
            lines.push(format!("EVENT: Structural strain. Integrity -{damage}."));
        }
        EventKind::CoolantHiccup => {
            if state.is_unstable(SubsystemName::CoolingLoop) {
                let (low, high) = EVENT_COOLANT_DAMAGE;
                let damage = rng.int_range(low, high);
                state.integrity -= damage;
                lines.push(format!(
                    "EVENT: Cooling instability cascades. Integrity -{damage}."
                ));
            } else {
                lines.push("EVENT: Cooling oscillation detected; contained.".into());
            }
        }
        EventKind::AiCommentary => {
            lines.push(format!("EVENT: AI says: {}", ai_line(state.seed, state.turn)));
        }
    }
}

fn count_down_window(state: &mut GameState, lines: &mut Vec<String>) {
    if !state.external_window {
        return;
    }
    state.external_window_turns = state.external_window_turns.saturating_sub(1);
    if state.external_window_turns == 0 {
        state.external_window = false;
        lines.push("The external signal window closes.".into());
    }
}
