//! Free-text command parsing and scripted replays.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use lastrelay_game::numbers::wrap_i64_to_u32;
use lastrelay_game::{Command, GameState, RelaySession, SubsystemName};
use regex::Regex;
use thiserror::Error;

use crate::util::split_script;

/// Why a line of player input could not become a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("Empty command. Type 'help'.")]
    Empty,
    #[error("Unknown command '{0}'. Type 'help'.")]
    Unknown(String),
    #[error("Usage: {verb} <antenna|cooling|beacon|ai|docking>")]
    MissingTarget { verb: &'static str },
    #[error("{0} is not installed on this station.")]
    NotInRoster(SubsystemName),
}

fn seed_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^-?\d+$").ok())
        .as_ref()
}

/// Resolve a subsystem alias, case-insensitively.
#[must_use]
pub fn parse_subsystem(token: &str) -> Option<SubsystemName> {
    let token = token.to_lowercase();
    if let Some(name) = SubsystemName::ALL
        .into_iter()
        .find(|name| name.keyword() == token)
    {
        return Some(name);
    }
    match token.as_str() {
        "ant" => Some(SubsystemName::AntennaArray),
        "cool" => Some(SubsystemName::CoolingLoop),
        "nav" => Some(SubsystemName::NavigationBeacon),
        "core" => Some(SubsystemName::AiCore),
        "dock" => Some(SubsystemName::DockingControl),
        _ => None,
    }
}

/// Restart seeds accept any decimal integer; negatives and oversized values
/// wrap into the 32-bit seed space. Anything else means "no seed".
fn parse_restart_seed(token: Option<&str>) -> Option<u32> {
    let token = token?;
    let pattern = seed_pattern()?;
    if !pattern.is_match(token) {
        return None;
    }
    token.parse::<i64>().ok().map(wrap_i64_to_u32)
}

/// Parse one line of player input.
///
/// # Errors
///
/// Returns a [`ParseCommandError`] whose message is suitable for display.
pub fn parse_command(input: &str) -> Result<Command, ParseCommandError> {
    let mut parts = input.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(ParseCommandError::Empty);
    };
    let verb = head.to_lowercase();
    let arg = parts.next();

    let target = |verb: &'static str| {
        arg.and_then(parse_subsystem)
            .ok_or(ParseCommandError::MissingTarget { verb })
    };

    match verb.as_str() {
        "help" | "?" => Ok(Command::Help),
        "status" | "st" => Ok(Command::Status),
        "scan" => Ok(Command::Scan),
        "rest" => Ok(Command::Rest),
        "override" | "ovr" => Ok(Command::Override),
        "tx" | "transmit" => Ok(Command::Tx),
        "repair" => Ok(Command::Repair {
            target: target("repair")?,
        }),
        "reroute" | "route" => Ok(Command::Reroute {
            target: target("reroute")?,
        }),
        "restart" | "new" => Ok(Command::Restart {
            seed: parse_restart_seed(arg),
        }),
        _ => Err(ParseCommandError::Unknown(verb)),
    }
}

/// Parse input and reject targets the current game does not have.
///
/// # Errors
///
/// Returns [`ParseCommandError::NotInRoster`] in addition to the
/// [`parse_command`] errors.
pub fn parse_for_state(input: &str, state: &GameState) -> Result<Command, ParseCommandError> {
    let command = parse_command(input)?;
    if let Some(target) = command.target()
        && !state.in_roster(target)
    {
        return Err(ParseCommandError::NotInRoster(target));
    }
    Ok(command)
}

/// Outcome of replaying a script against a fresh game.
#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub seed: u32,
    pub accepted: usize,
    pub rejected: usize,
    pub transcript: Vec<String>,
    pub final_state: GameState,
}

/// Replay `script` (commands separated by `;` or newlines) from `seed`.
///
/// Unparseable entries are echoed as `ERR:` lines and skipped, the way an
/// interactive host would show them.
///
/// # Errors
///
/// Fails only if the engine rejects a command the parser accepted.
pub fn run_script(seed: u32, script: &str) -> Result<ScriptRun> {
    let mut session = RelaySession::new(seed);
    let mut transcript: Vec<String> = session.transcript().to_vec();
    let mut accepted = 0;
    let mut rejected = 0;

    for entry in split_script(script) {
        transcript.push(format!("{}{entry}", lastrelay_game::PROMPT));
        match parse_for_state(&entry, session.state()) {
            Ok(command) => {
                let lines = session
                    .apply(command)
                    .with_context(|| format!("engine rejected '{entry}'"))?;
                transcript.extend(lines);
                accepted += 1;
            }
            Err(err) => {
                log::debug!("script entry '{entry}' rejected: {err}");
                transcript.push(format!("ERR: {err}"));
                rejected += 1;
            }
        }
    }

    Ok(ScriptRun {
        seed,
        accepted,
        rejected,
        transcript,
        final_state: session.into_state(),
    })
}
