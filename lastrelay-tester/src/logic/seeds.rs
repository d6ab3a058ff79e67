use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use lastrelay_game::numbers::wrap_i64_to_u32;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seed used when no token produces one.
pub const DEFAULT_SEED: u32 = 1337;

/// Fixed key for `sweep:N` so sweeps are repeatable across machines.
const SWEEP_KEY: u64 = 0x4B37_5245_4C41_5900;

const MAX_EXPANSION: u64 = 100_000;

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Supports literal integers (negatives wrap into `u32`), inclusive ranges
/// `a..b`, and `sweep:N` for `N` pseudo-random seeds.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u32>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        for seed in expand_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn expand_token(token: &str) -> Result<Vec<u32>> {
    if let Some(count) = token.strip_prefix("sweep:") {
        let count: u64 = count
            .parse()
            .with_context(|| format!("invalid sweep size in '{token}'"))?;
        if count == 0 || count > MAX_EXPANSION {
            bail!("sweep size must be between 1 and {MAX_EXPANSION}, got {count}");
        }
        let mut rng = ChaCha20Rng::seed_from_u64(SWEEP_KEY);
        return Ok((0..count).map(|_| rng.gen_range(0..=u32::MAX)).collect());
    }

    if let Some((start, end)) = token.split_once("..") {
        let start: u32 = start
            .parse()
            .with_context(|| format!("invalid range start in '{token}'"))?;
        let end: u32 = end
            .parse()
            .with_context(|| format!("invalid range end in '{token}'"))?;
        if start > end {
            bail!("seed range '{token}' is empty");
        }
        if u64::from(end - start) >= MAX_EXPANSION {
            bail!("seed range '{token}' expands past {MAX_EXPANSION} seeds");
        }
        return Ok((start..=end).collect());
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(vec![wrap_i64_to_u32(value)]);
    }

    bail!("Unrecognized seed token: {token}");
}
