//! Command resolution: costs, rolls and subsystem transitions for one command.
//!
//! All draws for a single command come from one [`RelayRng`] scoped to
//! `(seed, turn, Command)`. Unaffordable actions are ordinary outcomes: they
//! emit one line and leave the state untouched.

use thiserror::Error;

use crate::command::Command;
use crate::constants::{
    CHANCE_PERCENT_MAX, CHANCE_PERCENT_MIN, OVERRIDE_CHANCE, OVERRIDE_FOCUS_COST,
    OVERRIDE_INTEGRITY_GAIN, OVERRIDE_INTEGRITY_LOSS, OVERRIDE_INVERTED_CHANCE,
    OVERRIDE_INVERTED_INTEGRITY_GAIN, OVERRIDE_INVERTED_INTEGRITY_LOSS, OVERRIDE_POWER_COST,
    REPAIR_BASE_CHANCE, REPAIR_CALIBRATION_PENALTY, REPAIR_CHANCE_PER_SEVERITY,
    REPAIR_COOLING_INTEGRITY_BONUS, REPAIR_COST_PER_SEVERITY, REPAIR_FAIL_INTEGRITY_BASE,
    REPAIR_FAIL_INTEGRITY_PER_SEVERITY, REPAIR_FAIL_WORSEN_CHANCE, REPAIR_FOCUS_BASE,
    REPAIR_INTEGRITY_GAIN, REPAIR_MISLEAD_PENALTY, REPAIR_MISWIRED_PENALTY, REPAIR_POWER_BASE,
    REPAIR_SCANNED_BONUS, REPAIR_SENSOR_MISREAD_FOCUS, REROUTE_IMPROVE_CHANCE,
    REROUTE_PHASE_NOISE_DRAIN, REROUTE_POWER_COST, REROUTE_SIDE_INTEGRITY_LOSS,
    REROUTE_SIDE_WORSEN_CHANCE, REST_FOCUS_GAIN, REST_INTEGRITY_LOSS,
    REST_MEMORY_LEAK_FOCUS_GAIN, SCAN_FOCUS_COST, SCAN_MAX_REVEALS, SCAN_POWER_COST,
    TX_BASE_CHANCE, TX_CHANCE_PER_SEVERITY, TX_FAIL_FOCUS_LOSS, TX_FAIL_INTEGRITY_BASE,
    TX_FAIL_INTEGRITY_PER_SEVERITY, TX_FEED_CRACK_PENALTY, TX_POWER_COST, TX_SCANNED_BONUS,
    TX_SURGE_NOMINAL, TX_SURGE_UNSTABLE,
};
use crate::data::{AI_LINES, Quirk, SubsystemName};
use crate::numbers::usize_to_i32;
use crate::rng::{RelayRng, RngStream};
use crate::state::{GameState, Roster, Severity, Subsystem};

/// Precondition violations rejected before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{0} is not part of this station's roster")]
    SubsystemNotInRoster(SubsystemName),
}

/// AI flavor line for a turn, drawn from its own stream.
#[must_use]
pub fn ai_line(seed: u32, turn: u32) -> &'static str {
    let mut rng = RelayRng::scoped(seed, turn, RngStream::AiVoice);
    rng.pick(&AI_LINES).copied().unwrap_or(AI_LINES[0])
}

/// Map a raw probability through the 5%..95% percentage clamp.
#[must_use]
pub fn clamp_chance(probability: f64) -> f64 {
    (probability * 100.0).clamp(CHANCE_PERCENT_MIN, CHANCE_PERCENT_MAX) / 100.0
}

/// Resolve a turn-consuming command against `state`.
///
/// `status`, `help` and `restart` are handled by the session and are no-ops
/// here.
///
/// # Errors
///
/// Returns `EngineError::SubsystemNotInRoster` when the command names a
/// subsystem that is not active in this game; the state is untouched.
pub fn resolve(
    state: &mut GameState,
    command: Command,
    lines: &mut Vec<String>,
) -> Result<(), EngineError> {
    if let Some(target) = command.target() {
        require(state, target)?;
    }
    if command == Command::Tx {
        require(state, SubsystemName::AntennaArray)?;
    }

    let mut rng = RelayRng::scoped(state.seed, state.turn, RngStream::Command);
    match command {
        Command::Scan => scan(state, &mut rng, lines),
        Command::Repair { target } => repair(state, target, &mut rng, lines),
        Command::Reroute { target } => reroute(state, target, &mut rng, lines),
        Command::Rest => rest(state, lines),
        Command::Override => override_random(state, &mut rng, lines),
        Command::Tx => transmit(state, &mut rng, lines),
        Command::Status | Command::Help | Command::Restart { .. } => {}
    }
    log::debug!(
        "resolved {} on turn {} with {} command draws",
        command.verb(),
        state.turn,
        rng.draws()
    );
    Ok(())
}

fn require(state: &GameState, name: SubsystemName) -> Result<(), EngineError> {
    if state.in_roster(name) && state.subsystem(name).is_some() {
        Ok(())
    } else {
        Err(EngineError::SubsystemNotInRoster(name))
    }
}

fn scan(state: &mut GameState, rng: &mut RelayRng, lines: &mut Vec<String>) {
    if state.power < SCAN_POWER_COST {
        lines.push("Scan aborted: insufficient power.".to_string());
        return;
    }
    state.power -= SCAN_POWER_COST;
    state.focus -= SCAN_FOCUS_COST;

    let mut order: Roster = state.roster.clone();
    rng.shuffle(&mut order);
    let reveal_max = usize_to_i32(order.len().min(SCAN_MAX_REVEALS));
    let reveal = usize::try_from(rng.int_range(1, reveal_max)).unwrap_or(1);
    lines.push("You initiate a diagnostic sweep.".to_string());
    for name in order.iter().take(reveal) {
        if let Some(sub) = state.subsystem_mut(*name) {
            sub.scanned = true;
            lines.push(format!(
                "- {name}: quirk detected \u{2014} {}. ({})",
                sub.quirk.name(),
                sub.quirk.description()
            ));
        }
    }

    state.refresh_ai_mislead();
    if state.ai_misleading() {
        lines.push(
            "Hidden warning: AI Core instability may produce incorrect recommendations."
                .to_string(),
        );
    }
    lines.push(ai_line(state.seed, state.turn).to_string());
}

/// Power and focus a repair of `target` costs at its current status.
#[must_use]
pub fn repair_costs(target: &Subsystem) -> (i32, i32) {
    let sev = target.status.index();
    let power = REPAIR_POWER_BASE + REPAIR_COST_PER_SEVERITY * sev;
    let mut focus = REPAIR_FOCUS_BASE + REPAIR_COST_PER_SEVERITY * sev;
    if target.has_quirk(Quirk::SensorMisread) && !target.scanned {
        focus += REPAIR_SENSOR_MISREAD_FOCUS;
    }
    (power, focus)
}

/// Clamped success probability of repairing `target` in `state`.
#[must_use]
pub fn repair_chance(state: &GameState, target: &Subsystem) -> f64 {
    let mut success =
        REPAIR_BASE_CHANCE - REPAIR_CHANCE_PER_SEVERITY * f64::from(target.status.index());
    if target.scanned {
        success += REPAIR_SCANNED_BONUS;
    }
    if state.ai_misleading() && target.name != SubsystemName::AiCore {
        success -= REPAIR_MISLEAD_PENALTY;
    }
    if target.has_quirk(Quirk::CalibrationDrift) && target.repaired_once && !target.scanned {
        success -= REPAIR_CALIBRATION_PENALTY;
    }
    if target.has_quirk(Quirk::MiswiredRelay) && !target.scanned {
        success -= REPAIR_MISWIRED_PENALTY;
    }
    clamp_chance(success)
}

fn repair(
    state: &mut GameState,
    name: SubsystemName,
    rng: &mut RelayRng,
    lines: &mut Vec<String>,
) {
    let Some(target) = state.subsystem(name).cloned() else {
        return;
    };
    let sev = target.status.index();
    let (cost_power, cost_focus) = repair_costs(&target);

    if state.power < cost_power {
        lines.push("Repair aborted: insufficient power.".to_string());
        return;
    }
    if state.focus < cost_focus {
        lines.push("Repair aborted: insufficient focus.".to_string());
        return;
    }
    state.power -= cost_power;
    state.focus -= cost_focus;

    let success = repair_chance(state, &target);

    let roll = rng.next_f64();
    log::debug!("repair {name}: roll {roll:.4} against {success:.2}");
    if roll < success {
        let mut gain = REPAIR_INTEGRITY_GAIN;
        if name == SubsystemName::CoolingLoop {
            gain += REPAIR_COOLING_INTEGRITY_BONUS;
        }
        let mut status = target.status;
        if let Some(sub) = state.subsystem_mut(name) {
            sub.improve();
            sub.repaired_once = true;
            status = sub.status;
        }
        state.integrity += gain;
        lines.push(format!(
            "You repair {name}. Status {} -> {status}. Integrity +{gain}.",
            target.status
        ));
    } else {
        let loss = REPAIR_FAIL_INTEGRITY_BASE + REPAIR_FAIL_INTEGRITY_PER_SEVERITY * sev;
        state.integrity -= loss;
        if rng.chance(REPAIR_FAIL_WORSEN_CHANCE) {
            state.worsen(name);
        }
        let status = state.status_of(name).unwrap_or(target.status);
        lines.push(format!(
            "Repair attempt on {name} fails. Integrity -{loss}. {name} now {status}."
        ));
    }
}

fn reroute(
    state: &mut GameState,
    name: SubsystemName,
    rng: &mut RelayRng,
    lines: &mut Vec<String>,
) {
    let Some(target) = state.subsystem(name).cloned() else {
        return;
    };
    if state.power < REROUTE_POWER_COST {
        lines.push("Reroute aborted: insufficient power.".to_string());
        return;
    }
    state.power -= REROUTE_POWER_COST;

    // The improvement roll is only drawn for a subsystem that can improve.
    let improved = !target.is_nominal() && rng.chance(REROUTE_IMPROVE_CHANCE);
    if improved {
        if let Some(sub) = state.subsystem_mut(name) {
            sub.improve();
        }
    }

    if target.has_quirk(Quirk::IntermittentPhaseNoise) {
        state.power -= REROUTE_PHASE_NOISE_DRAIN;
        lines.push(format!(
            "(Extra power drain -{REROUTE_PHASE_NOISE_DRAIN} due to phase noise.)"
        ));
    }

    let others: Roster = state
        .roster
        .iter()
        .copied()
        .filter(|other| *other != name)
        .collect();
    if others.is_empty() {
        let outcome = if improved {
            "It stabilizes slightly."
        } else {
            "No measurable improvement."
        };
        lines.push(format!("You reroute power to {name}. {outcome}"));
        return;
    }
    let Some(side) = rng.pick(&others).copied() else {
        return;
    };

    let outcome = if improved {
        "It stabilizes slightly."
    } else {
        "It resists stabilization."
    };
    if rng.chance(REROUTE_SIDE_WORSEN_CHANCE) {
        state.worsen(side);
        lines.push(format!(
            "You reroute power to {name}. {outcome} Side effect: {side} worsens."
        ));
    } else {
        state.integrity -= REROUTE_SIDE_INTEGRITY_LOSS;
        lines.push(format!(
            "You reroute power to {name}. {outcome} Side effect: structural strain (Integrity -{REROUTE_SIDE_INTEGRITY_LOSS})."
        ));
    }
}

fn rest(state: &mut GameState, lines: &mut Vec<String>) {
    let leaking = state.has_quirk(SubsystemName::AiCore, Quirk::MemoryLeak)
        && state.is_unstable(SubsystemName::AiCore);
    let recover = if leaking {
        REST_MEMORY_LEAK_FOCUS_GAIN
    } else {
        REST_FOCUS_GAIN
    };
    state.focus += recover;
    state.integrity -= REST_INTEGRITY_LOSS;
    lines.push(format!(
        "You rest briefly. Focus +{recover}. Integrity -{REST_INTEGRITY_LOSS}."
    ));
}

fn override_random(state: &mut GameState, rng: &mut RelayRng, lines: &mut Vec<String>) {
    if state.power < OVERRIDE_POWER_COST || state.focus < OVERRIDE_FOCUS_COST {
        lines.push("Override aborted: insufficient resources.".to_string());
        return;
    }
    state.power -= OVERRIDE_POWER_COST;
    state.focus -= OVERRIDE_FOCUS_COST;

    let Some(name) = rng.pick(&state.roster).copied() else {
        return;
    };
    let prev = state.status_of(name).unwrap_or(Severity::Nominal);
    let inverted = state.has_quirk(SubsystemName::AiCore, Quirk::PriorityInversion);
    let chance = if inverted {
        OVERRIDE_INVERTED_CHANCE
    } else {
        OVERRIDE_CHANCE
    };

    if rng.chance(chance) {
        let next = prev.improved().improved();
        if let Some(sub) = state.subsystem_mut(name) {
            sub.status = next;
        }
        let gain = if inverted {
            OVERRIDE_INVERTED_INTEGRITY_GAIN
        } else {
            OVERRIDE_INTEGRITY_GAIN
        };
        state.integrity += gain;
        lines.push(format!(
            "Override succeeds. {name} {prev} -> {next}. Integrity +{gain}."
        ));
    } else {
        let next = prev.worsened().worsened();
        if let Some(sub) = state.subsystem_mut(name) {
            sub.status = next;
        }
        let loss = if inverted {
            OVERRIDE_INVERTED_INTEGRITY_LOSS
        } else {
            OVERRIDE_INTEGRITY_LOSS
        };
        state.integrity -= loss;
        lines.push(format!(
            "Override backfires. {name} {prev} -> {next}. Integrity -{loss}."
        ));
    }
}

fn transmit(state: &mut GameState, rng: &mut RelayRng, lines: &mut Vec<String>) {
    if !state.external_window {
        lines.push("Transmission attempt fails: no external signal window.".to_string());
        return;
    }
    if state.power < TX_POWER_COST {
        lines.push("Transmission aborted: insufficient power.".to_string());
        return;
    }
    let Some(antenna) = state.subsystem(SubsystemName::AntennaArray).cloned() else {
        return;
    };
    state.power -= TX_POWER_COST;

    let sev = antenna.status.index();
    let mut success = TX_BASE_CHANCE - TX_CHANCE_PER_SEVERITY * f64::from(sev);
    if antenna.scanned {
        success += TX_SCANNED_BONUS;
    }
    if antenna.has_quirk(Quirk::HairlineFeedCrack) && !antenna.is_nominal() {
        success -= TX_FEED_CRACK_PENALTY;
    }
    let success = clamp_chance(success);

    let roll = rng.next_f64();
    log::debug!("transmit: roll {roll:.4} against {success:.2}");
    if roll < success {
        state.transmitted = true;
        let (low, high) = if antenna.is_nominal() {
            TX_SURGE_NOMINAL
        } else {
            TX_SURGE_UNSTABLE
        };
        let surge = rng.int_range(low, high);
        state.power -= surge;
        let next = if antenna.is_nominal() {
            Severity::Degraded
        } else {
            Severity::Failing
        };
        if let Some(sub) = state.subsystem_mut(SubsystemName::AntennaArray) {
            sub.status = next;
        }
        lines.push("You force an emergency transmission.".to_string());
        lines.push(
            "For one second, silence\u{2014}then: \u{201c}Relay K-7, signal received.\u{201d}"
                .to_string(),
        );
        lines.push(format!("Power surge -{surge}. Antenna now {next}."));
    } else {
        let damage = TX_FAIL_INTEGRITY_BASE + TX_FAIL_INTEGRITY_PER_SEVERITY * sev;
        state.integrity -= damage;
        state.focus -= TX_FAIL_FOCUS_LOSS;
        let next = antenna.status.worsened();
        if let Some(sub) = state.subsystem_mut(SubsystemName::AntennaArray) {
            sub.status = next;
        }
        lines.push("You attempt an emergency transmission, but the carrier collapses.".to_string());
        lines.push(format!(
            "Integrity -{damage}, Focus -{TX_FAIL_FOCUS_LOSS}. Antenna now {next}."
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::new_game;

    fn state_for(seed: u32) -> GameState {
        new_game(seed).state
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// All-nominal, unscanned state whose roster holds `name`, with `name`
    /// forced to `status` and `quirk`.
    fn rigged(name: SubsystemName, status: Severity, quirk: Quirk) -> GameState {
        let mut state = (0..200)
            .map(state_for)
            .find(|s| s.in_roster(name))
            .expect("some seed installs the subsystem");
        for sub in state.subsystems.values_mut() {
            sub.status = Severity::Nominal;
            sub.scanned = false;
            sub.repaired_once = false;
        }
        if let Some(sub) = state.subsystem_mut(name) {
            sub.status = status;
            sub.quirk = quirk;
        }
        state.ai_mislead_counter = 0;
        state
    }

    #[test]
    fn scan_costs_power_and_focus_and_reveals() {
        let mut state = state_for(42);
        let mut lines = Vec::new();
        resolve(&mut state, Command::Scan, &mut lines).unwrap();
        assert_eq!(state.power, 50);
        assert_eq!(state.focus, 58);
        let scanned = state.subsystems.values().filter(|s| s.scanned).count();
        assert!((1..=2).contains(&scanned));
        assert_eq!(lines[0], "You initiate a diagnostic sweep.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some(ai_line(state.seed, state.turn))
        );
    }

    #[test]
    fn scan_aborts_without_power_even_with_focus() {
        let mut state = state_for(42);
        state.power = 4;
        let before = state.clone();
        let mut lines = Vec::new();
        resolve(&mut state, Command::Scan, &mut lines).unwrap();
        assert_eq!(state, before);
        assert_eq!(lines, vec!["Scan aborted: insufficient power.".to_string()]);
    }

    #[test]
    fn repair_aborts_on_power_before_focus() {
        let mut state = state_for(42);
        state.power = 7;
        state.focus = 0;
        let before = state.clone();
        let mut lines = Vec::new();
        resolve(
            &mut state,
            Command::Repair {
                target: SubsystemName::AntennaArray,
            },
            &mut lines,
        )
        .unwrap();
        assert_eq!(state, before);
        assert_eq!(lines, vec!["Repair aborted: insufficient power.".to_string()]);
    }

    #[test]
    fn repair_aborts_on_focus() {
        let mut state = state_for(42);
        state.focus = 5;
        let mut lines = Vec::new();
        resolve(
            &mut state,
            Command::Repair {
                target: SubsystemName::AntennaArray,
            },
            &mut lines,
        )
        .unwrap();
        assert_eq!(state.power, 55);
        assert_eq!(lines, vec!["Repair aborted: insufficient focus.".to_string()]);
    }

    #[test]
    fn missing_target_is_rejected_before_mutation() {
        // seed 0 has no Cooling Loop
        let mut state = state_for(0);
        let before = state.clone();
        let mut lines = Vec::new();
        let err = resolve(
            &mut state,
            Command::Reroute {
                target: SubsystemName::CoolingLoop,
            },
            &mut lines,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::SubsystemNotInRoster(SubsystemName::CoolingLoop));
        assert_eq!(state, before);
        assert!(lines.is_empty());
    }

    #[test]
    fn rest_is_cheaper_with_memory_leak() {
        let mut state = state_for(42);
        let mut lines = Vec::new();
        resolve(&mut state, Command::Rest, &mut lines).unwrap();
        assert_eq!(state.focus, 72);
        assert_eq!(state.integrity, 69);

        // seed 1 rolls AI Core with a memory leak
        let mut leaky = state_for(1);
        if let Some(ai) = leaky.subsystem_mut(SubsystemName::AiCore) {
            ai.status = Severity::Degraded;
        }
        resolve(&mut leaky, Command::Rest, &mut lines).unwrap();
        assert_eq!(leaky.focus, 67);
    }

    #[test]
    fn override_moves_target_two_steps() {
        for seed in 0..40 {
            let mut state = state_for(seed);
            let before = state.clone();
            let mut lines = Vec::new();
            resolve(&mut state, Command::Override, &mut lines).unwrap();
            assert_eq!(state.power, before.power - OVERRIDE_POWER_COST);
            assert_eq!(state.focus, before.focus - OVERRIDE_FOCUS_COST);
            let changed: Vec<_> = state
                .roster
                .iter()
                .filter(|name| state.status_of(**name) != before.status_of(**name))
                .collect();
            assert!(changed.len() <= 1, "seed {seed}");
            assert!(!state.subsystems.values().any(|s| s.repaired_once));
            assert_eq!(lines.len(), 1);
        }
    }

    #[test]
    fn override_aborts_on_either_resource() {
        let mut state = state_for(42);
        state.focus = 7;
        let mut lines = Vec::new();
        resolve(&mut state, Command::Override, &mut lines).unwrap();
        assert_eq!(lines, vec!["Override aborted: insufficient resources.".to_string()]);
        assert_eq!(state.power, 55);
    }

    #[test]
    fn tx_requires_window_and_power() {
        let mut state = state_for(42);
        let mut lines = Vec::new();
        resolve(&mut state, Command::Tx, &mut lines).unwrap();
        assert_eq!(
            lines,
            vec!["Transmission attempt fails: no external signal window.".to_string()]
        );
        state.external_window = true;
        state.external_window_turns = 2;
        state.power = 13;
        lines.clear();
        resolve(&mut state, Command::Tx, &mut lines).unwrap();
        assert_eq!(lines, vec!["Transmission aborted: insufficient power.".to_string()]);
        assert_eq!(state.power, 13);
    }

    #[test]
    fn tx_has_exactly_two_outcomes() {
        for seed in 0..60 {
            let mut state = state_for(seed);
            state.external_window = true;
            state.external_window_turns = 2;
            let before = state.clone();
            let mut lines = Vec::new();
            resolve(&mut state, Command::Tx, &mut lines).unwrap();
            let antenna_before = before.status_of(SubsystemName::AntennaArray);
            let antenna_after = state.status_of(SubsystemName::AntennaArray);
            if state.transmitted {
                assert!(state.power <= before.power - TX_POWER_COST - 2);
                assert_eq!(state.integrity, before.integrity);
                assert_eq!(antenna_after, Some(Severity::Failing));
            } else {
                assert_eq!(state.power, before.power - TX_POWER_COST);
                assert_eq!(state.focus, before.focus - TX_FAIL_FOCUS_LOSS);
                assert!(state.integrity < before.integrity);
                assert_eq!(antenna_after, antenna_before.map(Severity::worsened));
            }
        }
    }

    #[test]
    fn sensor_misread_surcharge_waived_after_scan() {
        let mut sub = Subsystem::new(
            SubsystemName::CoolingLoop,
            Severity::Degraded,
            Quirk::SensorMisread,
        );
        assert_eq!(repair_costs(&sub), (10, 8));
        sub.scanned = true;
        assert_eq!(repair_costs(&sub), (10, 6));
        let plain = Subsystem::new(
            SubsystemName::CoolingLoop,
            Severity::Failing,
            Quirk::PumpCavitation,
        );
        assert_eq!(repair_costs(&plain), (12, 8));

        let cooling = SubsystemName::CoolingLoop;
        let mut state = rigged(cooling, Severity::Degraded, Quirk::SensorMisread);
        state.focus = 7;
        let before = state.clone();
        let mut lines = Vec::new();
        resolve(&mut state, Command::Repair { target: cooling }, &mut lines).unwrap();
        assert_eq!(state, before);
        assert_eq!(lines, vec!["Repair aborted: insufficient focus.".to_string()]);

        if let Some(sub) = state.subsystem_mut(cooling) {
            sub.scanned = true;
        }
        lines.clear();
        resolve(&mut state, Command::Repair { target: cooling }, &mut lines).unwrap();
        assert_eq!(state.power, before.power - 10);
        assert_eq!(state.focus, 1);
    }

    #[test]
    fn repair_chance_applies_quirk_penalties() {
        let state = rigged(SubsystemName::AntennaArray, Severity::Nominal, Quirk::HairlineFeedCrack);

        let mut docking = Subsystem::new(
            SubsystemName::DockingControl,
            Severity::Degraded,
            Quirk::MiswiredRelay,
        );
        assert!(approx(repair_chance(&state, &docking), 0.50));
        docking.scanned = true;
        assert!(approx(repair_chance(&state, &docking), 0.75));

        let mut antenna = Subsystem::new(
            SubsystemName::AntennaArray,
            Severity::Degraded,
            Quirk::CalibrationDrift,
        );
        assert!(approx(repair_chance(&state, &antenna), 0.65));
        antenna.repaired_once = true;
        assert!(approx(repair_chance(&state, &antenna), 0.40));
        antenna.scanned = true;
        assert!(approx(repair_chance(&state, &antenna), 0.75));

        let failing = Subsystem::new(
            SubsystemName::NavigationBeacon,
            Severity::Failing,
            Quirk::TimingJitter,
        );
        assert!(approx(repair_chance(&state, &failing), 0.55));
    }

    #[test]
    fn misleading_ai_penalizes_repairs_except_on_itself() {
        let mut state = rigged(SubsystemName::AiCore, Severity::Degraded, Quirk::MemoryLeak);
        let antenna = Subsystem::new(
            SubsystemName::AntennaArray,
            Severity::Degraded,
            Quirk::HairlineFeedCrack,
        );
        let ai = Subsystem::new(SubsystemName::AiCore, Severity::Degraded, Quirk::MemoryLeak);

        state.ai_mislead_counter = 1;
        assert!(approx(repair_chance(&state, &antenna), 0.65));
        state.ai_mislead_counter = 2;
        assert!(approx(repair_chance(&state, &antenna), 0.50));
        assert!(approx(repair_chance(&state, &ai), 0.65));
    }

    #[test]
    fn successful_repair_gains_more_integrity_on_cooling_loop() {
        for (name, quirk, gain) in [
            (SubsystemName::CoolingLoop, Quirk::PumpCavitation, 5),
            (SubsystemName::AntennaArray, Quirk::HairlineFeedCrack, 3),
        ] {
            let mut base = rigged(name, Severity::Degraded, quirk);
            if let Some(sub) = base.subsystem_mut(name) {
                sub.scanned = true;
            }
            let mut successes = 0;
            for turn in 1..=30 {
                let mut state = base.clone();
                state.turn = turn;
                let mut lines = Vec::new();
                resolve(&mut state, Command::Repair { target: name }, &mut lines).unwrap();
                if state.subsystem(name).is_some_and(|sub| sub.repaired_once) {
                    successes += 1;
                    assert_eq!(state.integrity, base.integrity + gain, "{name} turn {turn}");
                    assert_eq!(state.status_of(name), Some(Severity::Nominal));
                    assert!(lines[0].ends_with(&format!("Integrity +{gain}.")));
                }
            }
            assert!(successes > 0, "{name} never repaired");
        }
    }

    #[test]
    fn phase_noise_drains_extra_power_on_reroute() {
        let antenna = SubsystemName::AntennaArray;
        let mut noisy = rigged(antenna, Severity::Degraded, Quirk::IntermittentPhaseNoise);
        let before = noisy.power;
        let mut lines = Vec::new();
        resolve(&mut noisy, Command::Reroute { target: antenna }, &mut lines).unwrap();
        assert_eq!(noisy.power, before - REROUTE_POWER_COST - REROUTE_PHASE_NOISE_DRAIN);
        assert!(lines.contains(&"(Extra power drain -4 due to phase noise.)".to_string()));

        let mut quiet = rigged(antenna, Severity::Degraded, Quirk::CalibrationDrift);
        lines.clear();
        resolve(&mut quiet, Command::Reroute { target: antenna }, &mut lines).unwrap();
        assert_eq!(quiet.power, before - REROUTE_POWER_COST);
        assert!(!lines.iter().any(|line| line.contains("phase noise")));
    }

    #[test]
    fn scan_warns_once_ai_is_misleading() {
        let warning = "Hidden warning: AI Core instability may produce incorrect recommendations.";
        let mut state = rigged(SubsystemName::AiCore, Severity::Degraded, Quirk::MemoryLeak);
        state.ai_mislead_counter = 1;
        let mut lines = Vec::new();
        resolve(&mut state, Command::Scan, &mut lines).unwrap();
        assert_eq!(state.ai_mislead_counter, 2);
        assert!(lines.iter().any(|line| line == warning));

        let mut calm = rigged(SubsystemName::AiCore, Severity::Nominal, Quirk::MemoryLeak);
        calm.ai_mislead_counter = 3;
        lines.clear();
        resolve(&mut calm, Command::Scan, &mut lines).unwrap();
        assert_eq!(calm.ai_mislead_counter, 0);
        assert!(!lines.iter().any(|line| line == warning));
    }

    #[test]
    fn chance_clamp_bounds() {
        assert!((clamp_chance(1.3) - 0.95).abs() < 1e-12);
        assert!((clamp_chance(-0.2) - 0.05).abs() < 1e-12);
        assert!((clamp_chance(0.4) - 0.4).abs() < 1e-12);
    }
}
