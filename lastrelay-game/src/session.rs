use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use smallvec::SmallVec;

use crate::command::Command;
use crate::config::{RelayCfg, RelayConfigError};
use crate::constants::RESTART_DOMAIN_TAG;
use crate::data::SubsystemName;
use crate::endgame::finalize;
use crate::render::{ENDED_NOTICE, push_ending, push_help, push_intro, status_lines};
use crate::resolver::{self, EngineError};
use crate::rng::{RelayRng, RngStream, stream_seed};
use crate::state::{GameState, Roster, Severity, Subsystem};
use crate::tick;

/// New state plus the lines emitted while producing it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub state: GameState,
    pub lines: Vec<String>,
}

/// Pure engine: `(state, command) -> (state, lines)` under one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayEngine {
    cfg: RelayCfg,
}

impl RelayEngine {
    /// Build an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `RelayConfigError` when the configuration is out of bounds.
    pub fn new(cfg: RelayCfg) -> Result<Self, RelayConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    #[must_use]
    pub const fn config(&self) -> &RelayCfg {
        &self.cfg
    }

    /// Create a game from `seed` and emit the intro banner and status block.
    #[must_use]
    pub fn new_game(&self, seed: u32) -> EngineOutput {
        let mut rng = RelayRng::new(seed);

        let mut extras: SmallVec<[SubsystemName; 4]> = SubsystemName::ALL
            .into_iter()
            .filter(|name| !name.is_mandatory())
            .collect();
        rng.shuffle(&mut extras);
        let extra_count = rng.int_range(
            i32::from(self.cfg.min_extra_subsystems),
            i32::from(self.cfg.max_extra_subsystems),
        );
        let mut roster: Roster = SubsystemName::MANDATORY.into_iter().collect();
        roster.extend(
            extras
                .into_iter()
                .take(usize::try_from(extra_count).unwrap_or(1)),
        );

        let subsystems = roster
            .iter()
            .map(|name| {
                let quirks = name.quirks();
                let quirk = rng.pick(&quirks).copied().unwrap_or(quirks[0]);
                let status = if *name == SubsystemName::AntennaArray {
                    Severity::Degraded
                } else {
                    rng.pick(&[Severity::Nominal, Severity::Degraded])
                        .copied()
                        .unwrap_or(Severity::Nominal)
                };
                (*name, Subsystem::new(*name, status, quirk))
            })
            .collect();

        let mut state = GameState {
            seed,
            turn: 1,
            turns_left: self.cfg.turn_limit,
            power: self.cfg.starting_power,
            integrity: self.cfg.starting_integrity,
            focus: self.cfg.starting_focus,
            subsystems,
            roster,
            external_window: false,
            external_window_turns: 0,
            transmitted: false,
            ai_mislead_counter: 0,
            ended: false,
            ending: None,
        };
        finalize(&mut state);
        log::debug!(
            "new game seed={seed} roster={:?}",
            state.roster.iter().map(|n| n.label()).collect::<Vec<_>>()
        );

        let mut lines = Vec::new();
        push_intro(&mut lines);
        lines.extend(status_lines(&state));
        EngineOutput { state, lines }
    }

    /// Apply one command to `state`, returning the successor state and output.
    ///
    /// The input state is never modified. Ended games only answer `restart`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SubsystemNotInRoster` when a command targets a
    /// subsystem absent from the game's roster.
    pub fn step(&self, state: &GameState, command: Command) -> Result<EngineOutput, EngineError> {
        if let Command::Restart { seed } = command {
            let seed = seed.unwrap_or_else(|| restart_seed(state.seed, state.turn));
            return Ok(self.new_game(seed));
        }

        if state.ended {
            return Ok(EngineOutput {
                state: state.clone(),
                lines: vec![ENDED_NOTICE.to_string()],
            });
        }

        let mut lines = Vec::new();
        match command {
            Command::Help => push_help(&mut lines),
            Command::Status => lines.extend(status_lines(state)),
            _ => {
                let mut next = state.clone();
                if let Err(err) = resolver::resolve(&mut next, command, &mut lines) {
                    log::warn!("rejected {} on turn {}: {err}", command.verb(), state.turn);
                    return Err(err);
                }
                finalize(&mut next);
                if next.is_active() {
                    tick::end_of_turn(&mut next, self.cfg.signal_window_turns, &mut lines);
                }
                push_ending(&mut lines, &next);
                lines.push(String::new());
                lines.extend(status_lines(&next));
                return Ok(EngineOutput { state: next, lines });
            }
        }
        Ok(EngineOutput {
            state: state.clone(),
            lines,
        })
    }
}

/// Start a game with the default configuration.
#[must_use]
pub fn new_game(seed: u32) -> EngineOutput {
    RelayEngine::default().new_game(seed)
}

/// Apply a command with the default configuration.
///
/// # Errors
///
/// Returns `EngineError` when the command violates a precondition.
pub fn step(state: &GameState, command: Command) -> Result<EngineOutput, EngineError> {
    RelayEngine::default().step(state, command)
}

/// Seed used by `restart` when none is given: HMAC-SHA256 of the previous
/// seed over a domain tag and the turn, truncated to 32 bits.
#[must_use]
pub fn restart_seed(seed: u32, turn: u32) -> u32 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()) else {
        return stream_seed(seed, turn, RngStream::Command);
    };
    mac.update(RESTART_DOMAIN_TAG);
    mac.update(&turn.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut bytes = [0_u8; 4];
    bytes.copy_from_slice(&digest[..4]);
    u32::from_le_bytes(bytes)
}

/// Session wrapper binding an engine to the current state and its transcript.
#[derive(Debug, Clone)]
pub struct RelaySession {
    engine: RelayEngine,
    state: GameState,
    transcript: Vec<String>,
}

impl RelaySession {
    /// Start a fresh session with the default configuration.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self::with_engine(RelayEngine::default(), seed)
    }

    #[must_use]
    pub fn with_engine(engine: RelayEngine, seed: u32) -> Self {
        let EngineOutput { state, lines } = engine.new_game(seed);
        Self {
            engine,
            state,
            transcript: lines,
        }
    }

    /// Resume from a previously captured state.
    #[must_use]
    pub const fn from_state(engine: RelayEngine, state: GameState) -> Self {
        Self {
            engine,
            state,
            transcript: Vec::new(),
        }
    }

    /// Apply a command, returning the lines it produced.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` when the command is rejected; the session is
    /// left unchanged.
    pub fn apply(&mut self, command: Command) -> Result<Vec<String>, EngineError> {
        let EngineOutput { state, lines } = self.engine.step(&self.state, command)?;
        self.state = state;
        self.transcript.extend(lines.iter().cloned());
        Ok(lines)
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn engine(&self) -> &RelayEngine {
        &self.engine
    }

    /// Every line emitted since the session started.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
