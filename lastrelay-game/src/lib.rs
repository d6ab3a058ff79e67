//! Signal Lost: The Last Relay - simulation engine
//!
//! Deterministic, seed-driven core for the Relay Station K-7 survival game.
//! The engine consumes structured [`Command`] values, produces ordered output
//! lines, and threads a serializable [`GameState`] snapshot between calls.
//! It performs no I/O and owns no global state.

pub mod command;
pub mod config;
pub mod constants;
pub mod data;
pub mod endgame;
pub mod numbers;
pub mod render;
pub mod resolver;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tick;

// Re-export commonly used types
pub use command::Command;
pub use config::{RelayCfg, RelayConfigError};
pub use data::{AI_LINES, EventKind, Quirk, SubsystemName};
pub use endgame::{Ending, escape_risk, evaluate};
pub use render::{PROMPT, status_lines};
pub use resolver::{EngineError, ai_line, repair_chance, repair_costs};
pub use rng::{RelayRng, RngStream, stream_seed};
pub use session::{EngineOutput, RelayEngine, RelaySession, new_game, restart_seed, step};
pub use snapshot::SnapshotError;
pub use state::{GameState, Roster, Severity, Subsystem};
