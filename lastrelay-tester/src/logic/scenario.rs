use std::sync::Arc;

use anyhow::{Result, ensure};

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{
    DEFAULT_MAX_TURNS, SimulationConfig, SimulationSummary, run_simulation,
};

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// What to play and what must hold afterwards.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_turns: u32,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_turns: DEFAULT_MAX_TURNS,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn config(&self, seed: u32) -> SimulationConfig {
        SimulationConfig::new(self.strategy, seed).with_max_turns(self.max_turns)
    }

    /// First failing expectation, if any.
    #[must_use]
    pub fn evaluate(&self, summary: &SimulationSummary) -> Option<String> {
        self.expectations
            .iter()
            .find_map(|expectation| expectation.evaluate(summary).err())
            .map(|err| format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn no_violations(summary: &SimulationSummary) -> Result<()> {
    let violations: Vec<&String> = summary.violations().collect();
    ensure!(
        violations.is_empty(),
        "{} invariant violation(s): {}",
        violations.len(),
        violations
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    );
    Ok(())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.turns.len() == 1,
        "smoke run should take exactly one command, took {}",
        summary.turns.len()
    );
    ensure!(
        summary.final_state.turn == 2,
        "first command should close turn 1, state is on turn {}",
        summary.final_state.turn
    );
    summary.final_state.validate()?;
    no_violations(summary)
}

fn finishes_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.game_ended(),
        "game still running after {} commands",
        summary.turns.len()
    );
    no_violations(summary)
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let replay = run_simulation(summary.config)?;
    ensure!(
        replay.fingerprint == summary.fingerprint,
        "replay diverged: {:016x} != {:016x}",
        replay.fingerprint,
        summary.fingerprint
    );
    ensure!(
        replay.transcript_lines == summary.transcript_lines,
        "replay emitted {} lines instead of {}",
        replay.transcript_lines,
        summary.transcript_lines
    );
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Test",
        SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_turns(1)
            .with_expectation(smoke_expectation),
    )
}

fn determinism_scenario() -> TestScenario {
    TestScenario::simulation(
        "Deterministic Replay",
        SimulationPlan::new(GameplayStrategy::MonteCarlo).with_expectation(replay_expectation),
    )
}

fn invariants_scenario() -> TestScenario {
    TestScenario::simulation(
        "Invariant Sweep",
        SimulationPlan::new(GameplayStrategy::MonteCarlo).with_expectation(no_violations),
    )
}

fn strategy_scenario(strategy: GameplayStrategy) -> TestScenario {
    TestScenario::simulation(
        format!("{} Strategy", strategy.label()),
        SimulationPlan::new(strategy).with_expectation(finishes_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "determinism" | "deterministic" => Some(determinism_scenario()),
        "invariants" | "invariant" => Some(invariants_scenario()),
        other => other
            .strip_prefix("strategy-")
            .and_then(GameplayStrategy::from_key)
            .map(strategy_scenario),
    }
}

pub fn list_scenarios() -> Vec<(String, String)> {
    let mut scenarios = vec![
        ("smoke".to_string(), "Smoke Test".to_string()),
        ("determinism".to_string(), "Deterministic Replay".to_string()),
        ("invariants".to_string(), "Invariant Sweep".to_string()),
    ];
    scenarios.extend(GameplayStrategy::ALL.iter().map(|strategy| {
        (
            format!("strategy-{}", strategy.key()),
            format!("{} Strategy", strategy.label()),
        )
    }));
    scenarios.push((
        "script".to_string(),
        "Replay the --script commands and print the transcript".to_string(),
    ));
    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_listed_simulation() {
        for (key, description) in list_scenarios() {
            if key == "script" {
                assert!(get_scenario(&key).is_none());
                continue;
            }
            let scenario = get_scenario(&key).expect("listed scenario resolves");
            assert_eq!(scenario.name, description);
        }
        assert!(get_scenario("strategy-reckless").is_none());
        assert!(get_scenario("STRATEGY-MC").is_some());
    }

    #[test]
    fn smoke_plan_passes_on_a_known_seed() {
        let scenario = smoke_scenario();
        let summary = run_simulation(scenario.plan.config(42)).unwrap();
        assert_eq!(scenario.plan.evaluate(&summary), None);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let plan = SimulationPlan::new(GameplayStrategy::Cautious)
            .with_max_turns(1)
            .with_expectation(finishes_expectation);
        let summary = run_simulation(plan.config(3)).unwrap();
        let failure = plan.evaluate(&summary).expect("one command cannot finish a game");
        assert!(failure.contains("game still running"));
    }
}
