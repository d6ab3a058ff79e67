//! Deterministic Mulberry32 generator and per-purpose stream derivation.
//!
//! Every random decision in the engine is drawn from a short-lived
//! [`RelayRng`] keyed by `(seed, turn, purpose)`. No generator outlives the
//! operation that created it, so replaying a command sequence from the same
//! seed reproduces every draw bit for bit.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::numbers::{floor_f64_to_i32, floor_f64_to_usize, usize_to_f64};

const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const UNIT_SCALE: f64 = 4_294_967_296.0;

/// Purpose tag selecting the multiplier used to derive a scoped stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngStream {
    /// Draws consumed while resolving a player command.
    Command,
    /// Draws consumed by the end-of-turn tick.
    Tick,
    /// Single draw choosing the AI flavor line for a turn.
    AiVoice,
}

impl RngStream {
    pub const ALL: [Self; 3] = [Self::Command, Self::Tick, Self::AiVoice];

    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Command => 1_664_525,
            Self::Tick => 1_013_904_223,
            Self::AiVoice => 2_654_435_761,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Tick => "tick",
            Self::AiVoice => "ai_voice",
        }
    }
}

/// Derive the 32-bit seed for a `(seed, turn, purpose)` stream.
#[must_use]
pub const fn stream_seed(seed: u32, turn: u32, stream: RngStream) -> u32 {
    seed ^ turn.wrapping_mul(stream.multiplier())
}

/// Mulberry32 generator with draw instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRng {
    state: u32,
    draws: u64,
}

impl RelayRng {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: seed,
            draws: 0,
        }
    }

    /// Fresh generator for one purpose within one turn.
    #[must_use]
    pub fn scoped(seed: u32, turn: u32, stream: RngStream) -> Self {
        Self::from_seed(stream_seed(seed, turn, stream).to_le_bytes())
    }

    /// Number of draws performed against this generator.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn advance(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / UNIT_SCALE
    }

    /// `true` with probability `p`, consuming exactly one draw.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform integer in `[min, max_inclusive]`.
    pub fn int_range(&mut self, min: i32, max_inclusive: i32) -> i32 {
        let span = f64::from(max_inclusive - min + 1);
        floor_f64_to_i32(self.next_f64() * span) + min
    }

    /// Uniform index in `[0, len)`; consumes a draw even for empty input.
    pub fn index(&mut self, len: usize) -> usize {
        floor_f64_to_usize(self.next_f64() * usize_to_f64(len))
    }

    /// Uniformly choose an element; `None` only for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// Fisher-Yates shuffle, walking from the last index down to 1.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

impl RngCore for RelayRng {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.advance());
        let low = u64::from(self.advance());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for RelayRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
