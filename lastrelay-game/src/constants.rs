//! Centralized balance and tuning constants for the relay simulation.
//!
//! Starting conditions live in [`crate::config::RelayCfg`]; the formulas
//! below are fixed and only change through reviewed code.

// Resource bounds ----------------------------------------------------------
pub(crate) const RESOURCE_MIN: i32 = 0;
pub(crate) const RESOURCE_MAX: i32 = 100;

// Scan ---------------------------------------------------------------------
pub const SCAN_POWER_COST: i32 = 5;
pub(crate) const SCAN_FOCUS_COST: i32 = 2;
pub(crate) const SCAN_MAX_REVEALS: usize = 2;
pub(crate) const AI_MISLEAD_THRESHOLD: u32 = 2;

// Repair -------------------------------------------------------------------
pub(crate) const REPAIR_POWER_BASE: i32 = 8;
pub(crate) const REPAIR_FOCUS_BASE: i32 = 4;
pub(crate) const REPAIR_COST_PER_SEVERITY: i32 = 2;
pub(crate) const REPAIR_SENSOR_MISREAD_FOCUS: i32 = 2;
pub(crate) const REPAIR_BASE_CHANCE: f64 = 0.75;
pub(crate) const REPAIR_CHANCE_PER_SEVERITY: f64 = 0.10;
pub(crate) const REPAIR_SCANNED_BONUS: f64 = 0.10;
pub(crate) const REPAIR_MISLEAD_PENALTY: f64 = 0.15;
pub(crate) const REPAIR_CALIBRATION_PENALTY: f64 = 0.25;
pub(crate) const REPAIR_MISWIRED_PENALTY: f64 = 0.15;
pub(crate) const REPAIR_INTEGRITY_GAIN: i32 = 3;
pub(crate) const REPAIR_COOLING_INTEGRITY_BONUS: i32 = 2;
pub(crate) const REPAIR_FAIL_INTEGRITY_BASE: i32 = 6;
pub(crate) const REPAIR_FAIL_INTEGRITY_PER_SEVERITY: i32 = 2;
pub(crate) const REPAIR_FAIL_WORSEN_CHANCE: f64 = 0.5;

// Reroute ------------------------------------------------------------------
pub const REROUTE_POWER_COST: i32 = 6;
pub(crate) const REROUTE_IMPROVE_CHANCE: f64 = 0.75;
pub(crate) const REROUTE_PHASE_NOISE_DRAIN: i32 = 4;
pub(crate) const REROUTE_SIDE_WORSEN_CHANCE: f64 = 0.6;
pub(crate) const REROUTE_SIDE_INTEGRITY_LOSS: i32 = 4;

// Rest ---------------------------------------------------------------------
pub(crate) const REST_FOCUS_GAIN: i32 = 12;
pub(crate) const REST_MEMORY_LEAK_FOCUS_GAIN: i32 = 7;
pub(crate) const REST_INTEGRITY_LOSS: i32 = 1;

// Override -----------------------------------------------------------------
pub const OVERRIDE_POWER_COST: i32 = 10;
pub const OVERRIDE_FOCUS_COST: i32 = 8;
pub(crate) const OVERRIDE_CHANCE: f64 = 0.5;
pub(crate) const OVERRIDE_INVERTED_CHANCE: f64 = 0.6;
pub(crate) const OVERRIDE_INTEGRITY_GAIN: i32 = 4;
pub(crate) const OVERRIDE_INVERTED_INTEGRITY_GAIN: i32 = 6;
pub(crate) const OVERRIDE_INTEGRITY_LOSS: i32 = 10;
pub(crate) const OVERRIDE_INVERTED_INTEGRITY_LOSS: i32 = 12;

// Transmission -------------------------------------------------------------
pub const TX_POWER_COST: i32 = 14;
pub(crate) const TX_BASE_CHANCE: f64 = 0.8;
pub(crate) const TX_CHANCE_PER_SEVERITY: f64 = 0.2;
pub(crate) const TX_SCANNED_BONUS: f64 = 0.08;
pub(crate) const TX_FEED_CRACK_PENALTY: f64 = 0.1;
pub(crate) const TX_SURGE_UNSTABLE: (i32, i32) = (6, 16);
pub(crate) const TX_SURGE_NOMINAL: (i32, i32) = (2, 8);
pub(crate) const TX_FAIL_INTEGRITY_BASE: i32 = 10;
pub(crate) const TX_FAIL_INTEGRITY_PER_SEVERITY: i32 = 4;
pub(crate) const TX_FAIL_FOCUS_LOSS: i32 = 6;

// Success clamps -----------------------------------------------------------
pub(crate) const CHANCE_PERCENT_MIN: f64 = 5.0;
pub(crate) const CHANCE_PERCENT_MAX: f64 = 95.0;

// Tick: drift and coupling -------------------------------------------------
pub(crate) const DRIFT_BASE_CHANCE: f64 = 0.15;
pub(crate) const DRIFT_CHANCE_PER_SEVERITY: f64 = 0.10;
pub(crate) const DRIFT_CAVITATION_BONUS: f64 = 0.10;
pub(crate) const DRIFT_CHANCE_CAP: f64 = 0.85;
pub(crate) const COUPLING_WORSEN_CHANCE: f64 = 0.5;

// Tick: random events ------------------------------------------------------
pub(crate) const EVENT_BASE_CHANCE: f64 = 0.35;
pub(crate) const EVENT_CHANCE_PER_FAILING: f64 = 0.08;
pub(crate) const EVENT_LOW_INTEGRITY_THRESHOLD: i32 = 50;
pub(crate) const EVENT_LOW_INTEGRITY_BONUS: f64 = 0.10;
pub(crate) const EVENT_LOW_POWER_THRESHOLD: i32 = 20;
pub(crate) const EVENT_LOW_POWER_BONUS: f64 = 0.08;
pub(crate) const EVENT_CHANCE_CAP: f64 = 0.85;
pub(crate) const EVENT_SURGE_LOSS: (i32, i32) = (4, 12);
pub(crate) const EVENT_FALSE_DIAGNOSTIC_FOCUS: i32 = 6;
pub(crate) const EVENT_GROAN_DAMAGE: (i32, i32) = (3, 9);
pub(crate) const EVENT_GROAN_LOOSE_MOUNTING_BONUS: i32 = 3;
pub(crate) const EVENT_COOLANT_DAMAGE: (i32, i32) = (4, 10);

// Endgame risk -------------------------------------------------------------
pub(crate) const ESCAPE_LOW_POWER_THRESHOLD: i32 = 10;
pub(crate) const ESCAPE_LOW_INTEGRITY_THRESHOLD: i32 = 40;
pub(crate) const ESCAPE_RISK_IMPERFECT: u8 = 2;

// Restart ------------------------------------------------------------------
pub(crate) const RESTART_DOMAIN_TAG: &[u8] = b"restart";
