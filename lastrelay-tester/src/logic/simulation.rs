use anyhow::{Context, Result};
use lastrelay_game::{Command, GameState, RelaySession};

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, PolicyDecision};

/// Turn cap for automated runs; the default game lasts ten turns.
pub const DEFAULT_MAX_TURNS: u32 = 12;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub seed: u32,
    pub strategy: GameplayStrategy,
    pub max_turns: u32,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, seed: u32) -> Self {
        Self {
            seed,
            strategy,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Snapshot of one policy decision.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub command: Command,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// Result of advancing the simulation by one command.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: u32,
    pub decision: DecisionRecord,
    pub violations: Vec<String>,
}

/// Drives a [`RelaySession`] with a policy and checks every transition.
pub struct SimulationSession {
    session: RelaySession,
    policy: Box<dyn PlayerPolicy + Send>,
    max_turns: u32,
    steps: u32,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            session: RelaySession::new(config.seed),
            policy: config.strategy.create_policy(u64::from(config.seed)),
            max_turns: config.max_turns,
            steps: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    #[must_use]
    pub fn transcript(&self) -> &[String] {
        self.session.transcript()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state().ended || self.steps >= self.max_turns
    }

    /// Ask the policy for a command and apply it.
    ///
    /// # Errors
    ///
    /// Fails when the engine rejects the policy's command.
    pub fn advance(&mut self) -> Result<TurnOutcome> {
        let before = self.session.state().clone();
        let PolicyDecision { command, rationale } = self.policy.decide(&before);
        self.session.apply(command).with_context(|| {
            format!(
                "{} chose {command:?} on turn {}",
                self.policy.name(),
                before.turn
            )
        })?;
        self.steps += 1;

        let after = self.session.state();
        let violations = check_transition(&before, after, command);
        for violation in &violations {
            log::warn!("seed {} turn {}: {violation}", before.seed, before.turn);
        }

        Ok(TurnOutcome {
            turn: before.turn,
            decision: DecisionRecord {
                command,
                policy_name: self.policy.name().to_string(),
                rationale,
            },
            violations,
        })
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.session.into_state()
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub config: SimulationConfig,
    pub turns: Vec<TurnOutcome>,
    pub final_state: GameState,
    pub transcript_lines: usize,
    pub fingerprint: u64,
}

impl SimulationSummary {
    #[must_use]
    pub fn game_ended(&self) -> bool {
        self.final_state.ended
    }

    #[must_use]
    pub fn ending_message(&self) -> &'static str {
        self.final_state.ending_text().unwrap_or("in progress")
    }

    pub fn violations(&self) -> impl Iterator<Item = &String> {
        self.turns.iter().flat_map(|turn| turn.violations.iter())
    }
}

/// Play a full game under `config`.
///
/// # Errors
///
/// Propagates engine rejections from [`SimulationSession::advance`].
pub fn run_simulation(config: SimulationConfig) -> Result<SimulationSummary> {
    let mut sim = SimulationSession::new(config);
    let mut turns = Vec::new();
    while !sim.is_finished() {
        turns.push(sim.advance()?);
    }
    let transcript_lines = sim.transcript().len();
    let final_state = sim.into_state();
    log::debug!(
        "seed {} {} finished after {} commands: {:?}",
        config.seed,
        config.strategy,
        turns.len(),
        final_state.ending
    );
    Ok(SimulationSummary {
        config,
        fingerprint: final_state.fingerprint(),
        turns,
        final_state,
        transcript_lines,
    })
}

/// Every property a single engine step must preserve.
#[must_use]
pub fn check_transition(before: &GameState, after: &GameState, command: Command) -> Vec<String> {
    let mut violations = Vec::new();

    if let Err(err) = after.validate() {
        violations.push(format!("state invalid after {command:?}: {err}"));
    }
    if after.turn < before.turn || after.turn > before.turn + 1 {
        violations.push(format!("turn jumped {} -> {}", before.turn, after.turn));
    }
    if after.turn + after.turns_left != before.turn + before.turns_left {
        violations.push("turn clock drifted".to_string());
    }
    if before.transmitted && !after.transmitted {
        violations.push("transmitted flag cleared".to_string());
    }
    if before.ended && after != before {
        violations.push(format!("ended game mutated by {command:?}"));
    }
    if command.is_read_only() && after != before {
        violations.push(format!("{command:?} mutated the state"));
    }
    for (name, prior) in &before.subsystems {
        let Some(next) = after.subsystem(*name) else {
            violations.push(format!("{name} left the roster"));
            continue;
        };
        if prior.scanned && !next.scanned {
            violations.push(format!("{name} lost its scanned flag"));
        }
        if prior.repaired_once && !next.repaired_once {
            violations.push(format!("{name} lost its repaired flag"));
        }
        if prior.quirk != next.quirk {
            violations.push(format!("{name} changed quirk"));
        }
    }
    violations
}
