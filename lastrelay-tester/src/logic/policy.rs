use std::fmt;

use lastrelay_game::constants::{
    OVERRIDE_FOCUS_COST, OVERRIDE_POWER_COST, REROUTE_POWER_COST, SCAN_POWER_COST, TX_POWER_COST,
};
use lastrelay_game::{Command, Ending, GameState, Severity, SubsystemName, repair_costs, step};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    pub command: Command,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(command: Command, rationale: Option<String>) -> Self {
        Self { command, rationale }
    }

    fn because(command: Command, rationale: &str) -> Self {
        Self::new(command, Some(rationale.to_string()))
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose the next command for an active game.
    fn decide(&mut self, state: &GameState) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameplayStrategy {
    Cautious,
    Aggressive,
    Balanced,
    MonteCarlo,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [
        Self::Cautious,
        Self::Aggressive,
        Self::Balanced,
        Self::MonteCarlo,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Cautious => "Cautious",
            GameplayStrategy::Aggressive => "Aggressive",
            GameplayStrategy::Balanced => "Balanced",
            GameplayStrategy::MonteCarlo => "Monte Carlo",
        }
    }

    /// CLI/scenario key, e.g. `monte-carlo`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            GameplayStrategy::Cautious => "cautious",
            GameplayStrategy::Aggressive => "aggressive",
            GameplayStrategy::Balanced => "balanced",
            GameplayStrategy::MonteCarlo => "monte-carlo",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "cautious" | "safe" => Some(Self::Cautious),
            "aggressive" => Some(Self::Aggressive),
            "balanced" => Some(Self::Balanced),
            "monte-carlo" | "montecarlo" | "mc" => Some(Self::MonteCarlo),
            _ => None,
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Cautious => Box::new(CautiousPolicy),
            GameplayStrategy::Aggressive => Box::new(AggressivePolicy),
            GameplayStrategy::Balanced => Box::new(BalancedPolicy),
            GameplayStrategy::MonteCarlo => Box::new(MonteCarloPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CautiousPolicy;
struct AggressivePolicy;
struct BalancedPolicy;

struct MonteCarloPolicy {
    rng: ChaCha20Rng,
    simulations: u32,
    depth: u32,
}

impl MonteCarloPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            simulations: 8,
            depth: 3,
        }
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn decide(&mut self, state: &GameState) -> PolicyDecision {
        if tx_ready(state) && state.status_of(SubsystemName::AntennaArray) != Some(Severity::Failing)
        {
            return PolicyDecision::because(Command::Tx, "window open, antenna holding");
        }
        if state.focus < 20 {
            return PolicyDecision::because(Command::Rest, "focus low");
        }
        if !any_scanned(state) && state.power >= SCAN_POWER_COST + 15 {
            return PolicyDecision::because(Command::Scan, "nothing scanned yet");
        }
        if let Some((target, status)) = worst_subsystem(state)
            && status == Severity::Failing
            && repair_affordable(state, target)
        {
            return PolicyDecision::new(
                Command::Repair { target },
                Some(format!("{target} failing")),
            );
        }
        PolicyDecision::because(Command::Rest, "holding position")
    }
}

impl PlayerPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "Aggressive"
    }

    fn decide(&mut self, state: &GameState) -> PolicyDecision {
        if tx_ready(state) {
            return PolicyDecision::because(Command::Tx, "window open");
        }
        if state.power >= OVERRIDE_POWER_COST && state.focus >= OVERRIDE_FOCUS_COST {
            return PolicyDecision::because(Command::Override, "force the antenna");
        }
        if let Some((target, _)) = worst_subsystem(state)
            && state.power >= REROUTE_POWER_COST
        {
            return PolicyDecision::new(
                Command::Reroute { target },
                Some(format!("reroute to {target}")),
            );
        }
        PolicyDecision::because(Command::Rest, "out of options")
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn decide(&mut self, state: &GameState) -> PolicyDecision {
        let antenna = SubsystemName::AntennaArray;
        if tx_ready(state) {
            return PolicyDecision::because(Command::Tx, "window open");
        }
        if state.is_unstable(antenna) && repair_affordable(state, antenna) {
            return PolicyDecision::because(Command::Repair { target: antenna }, "antenna first");
        }
        if state.focus < 25 {
            return PolicyDecision::because(Command::Rest, "focus low");
        }
        if let Some((target, status)) = worst_subsystem(state)
            && status == Severity::Failing
            && repair_affordable(state, target)
        {
            return PolicyDecision::new(
                Command::Repair { target },
                Some(format!("{target} failing")),
            );
        }
        PolicyDecision::because(Command::Rest, "recover")
    }
}

impl PlayerPolicy for MonteCarloPolicy {
    fn name(&self) -> &'static str {
        "Monte Carlo"
    }

    fn decide(&mut self, state: &GameState) -> PolicyDecision {
        let candidates = candidate_commands(state);
        let mut best: Option<(Command, f64)> = None;

        for command in candidates {
            let Ok(first) = step(state, command) else {
                continue;
            };
            let mut total = 0.0_f64;
            for _ in 0..self.simulations.max(1) {
                let end = rollout(&first.state, &mut self.rng, self.depth);
                total += state_score(&end) + self.rng.gen_range(0.0..1.0);
            }
            let score = total / f64::from(self.simulations.max(1));
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((command, score));
            }
        }

        match best {
            Some((command, score)) => {
                PolicyDecision::new(command, Some(format!("score {score:.2}")))
            }
            None => PolicyDecision::because(Command::Rest, "no candidates"),
        }
    }
}

/// Every command worth considering from `state`.
#[must_use]
pub fn candidate_commands(state: &GameState) -> Vec<Command> {
    let mut commands = vec![Command::Scan, Command::Rest, Command::Override];
    if state.external_window {
        commands.push(Command::Tx);
    }
    for name in &state.roster {
        if state.is_unstable(*name) {
            commands.push(Command::Repair { target: *name });
            commands.push(Command::Reroute { target: *name });
        }
    }
    commands
}

fn rollout(state: &GameState, rng: &mut ChaCha20Rng, depth: u32) -> GameState {
    let mut current = state.clone();
    for _ in 0..depth {
        if current.ended {
            break;
        }
        let options = candidate_commands(&current);
        let command = options[rng.gen_range(0..options.len())];
        match step(&current, command) {
            Ok(output) => current = output.state,
            Err(_) => break,
        }
    }
    current
}

/// Heuristic value of a state; endings dominate everything else.
#[must_use]
pub fn state_score(state: &GameState) -> f64 {
    match state.ending {
        Some(Ending::Success) => return 1000.0,
        Some(Ending::SuccessImperfect) => return 700.0,
        Some(_) => return -1000.0,
        None => {}
    }
    let severity: i32 = state
        .roster
        .iter()
        .filter_map(|name| state.status_of(*name))
        .map(Severity::index)
        .sum();
    let mut score =
        f64::from(state.power) + f64::from(state.integrity) + f64::from(state.focus) / 2.0;
    score -= f64::from(severity) * 6.0;
    if state.external_window {
        score += 25.0;
    }
    score
}

fn tx_ready(state: &GameState) -> bool {
    state.external_window && state.power >= TX_POWER_COST
}

fn any_scanned(state: &GameState) -> bool {
    state.subsystems.values().any(|sub| sub.scanned)
}

/// Highest-severity non-nominal subsystem, earliest in roster order on ties.
fn worst_subsystem(state: &GameState) -> Option<(SubsystemName, Severity)> {
    state
        .roster
        .iter()
        .filter_map(|name| state.status_of(*name).map(|status| (*name, status)))
        .filter(|(_, status)| *status != Severity::Nominal)
        .fold(None, |worst, candidate| match worst {
            Some((_, status)) if status >= candidate.1 => worst,
            _ => Some(candidate),
        })
}

fn repair_affordable(state: &GameState, target: SubsystemName) -> bool {
    state.subsystem(target).is_some_and(|sub| {
        let (power, focus) = repair_costs(sub);
        state.power >= power && state.focus >= focus
    })
}
