use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{AI_MISLEAD_THRESHOLD, RESOURCE_MAX, RESOURCE_MIN};
use crate::data::{Quirk, SubsystemName};
use crate::endgame::Ending;

/// Ordered list of active subsystems: the two mandatory members, then extras.
pub type Roster = SmallVec<[SubsystemName; 5]>;

/// Subsystem health, strictly ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Nominal,
    Degraded,
    Failing,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::Nominal, Self::Degraded, Self::Failing];

    /// Rank used by cost and probability formulas: 0, 1 or 2.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::Nominal => 0,
            Self::Degraded => 1,
            Self::Failing => 2,
        }
    }

    /// One step worse; `Failing` stays `Failing`.
    #[must_use]
    pub const fn worsened(self) -> Self {
        match self {
            Self::Nominal => Self::Degraded,
            Self::Degraded | Self::Failing => Self::Failing,
        }
    }

    /// One step better; `Nominal` stays `Nominal`.
    #[must_use]
    pub const fn improved(self) -> Self {
        match self {
            Self::Failing => Self::Degraded,
            Self::Degraded | Self::Nominal => Self::Nominal,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nominal => "Nominal",
            Self::Degraded => "Degraded",
            Self::Failing => "Failing",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsystem {
    pub name: SubsystemName,
    pub status: Severity,
    pub quirk: Quirk,
    #[serde(default)]
    pub scanned: bool,
    #[serde(default)]
    pub repaired_once: bool,
}

impl Subsystem {
    #[must_use]
    pub const fn new(name: SubsystemName, status: Severity, quirk: Quirk) -> Self {
        Self {
            name,
            status,
            quirk,
            scanned: false,
            repaired_once: false,
        }
    }

    #[must_use]
    pub fn is_nominal(&self) -> bool {
        self.status == Severity::Nominal
    }

    #[must_use]
    pub fn has_quirk(&self, quirk: Quirk) -> bool {
        self.quirk == quirk
    }

    pub fn worsen(&mut self) {
        self.status = self.status.worsened();
    }

    pub fn improve(&mut self) {
        self.status = self.status.improved();
    }
}

/// Snapshot of one game in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u32,
    pub turn: u32,
    pub turns_left: u32,
    pub power: i32,
    pub integrity: i32,
    pub focus: i32,
    pub subsystems: BTreeMap<SubsystemName, Subsystem>,
    pub roster: Roster,
    #[serde(default)]
    pub external_window: bool,
    #[serde(default)]
    pub external_window_turns: u32,
    #[serde(default)]
    pub transmitted: bool,
    #[serde(default)]
    pub ai_mislead_counter: u32,
    #[serde(default)]
    pub ended: bool,
    #[serde(default)]
    pub ending: Option<Ending>,
}

impl GameState {
    #[must_use]
    pub fn subsystem(&self, name: SubsystemName) -> Option<&Subsystem> {
        self.subsystems.get(&name)
    }

    pub fn subsystem_mut(&mut self, name: SubsystemName) -> Option<&mut Subsystem> {
        self.subsystems.get_mut(&name)
    }

    #[must_use]
    pub fn in_roster(&self, name: SubsystemName) -> bool {
        self.roster.contains(&name)
    }

    /// Present and not `Nominal`.
    #[must_use]
    pub fn is_unstable(&self, name: SubsystemName) -> bool {
        self.subsystem(name).is_some_and(|sub| !sub.is_nominal())
    }

    /// Present and carrying the given quirk.
    #[must_use]
    pub fn has_quirk(&self, name: SubsystemName, quirk: Quirk) -> bool {
        self.subsystem(name).is_some_and(|sub| sub.has_quirk(quirk))
    }

    #[must_use]
    pub fn status_of(&self, name: SubsystemName) -> Option<Severity> {
        self.subsystem(name).map(|sub| sub.status)
    }

    #[must_use]
    pub fn failing_count(&self) -> usize {
        self.roster
            .iter()
            .filter(|name| self.status_of(**name) == Some(Severity::Failing))
            .count()
    }

    /// Worsen a subsystem one step; absent subsystems are ignored.
    pub fn worsen(&mut self, name: SubsystemName) {
        if let Some(sub) = self.subsystem_mut(name) {
            sub.worsen();
        }
    }

    /// Recompute the AI misleading counter from AI Core's current status.
    pub fn refresh_ai_mislead(&mut self) {
        if self.is_unstable(SubsystemName::AiCore) {
            self.ai_mislead_counter = self.ai_mislead_counter.saturating_add(1);
        } else {
            self.ai_mislead_counter = 0;
        }
    }

    #[must_use]
    pub const fn ai_misleading(&self) -> bool {
        self.ai_mislead_counter >= AI_MISLEAD_THRESHOLD
    }

    /// Clamp resources into their legal range.
    pub fn clamp(&mut self) {
        self.power = self.power.clamp(RESOURCE_MIN, RESOURCE_MAX);
        self.integrity = self.integrity.clamp(RESOURCE_MIN, RESOURCE_MAX);
        self.focus = self.focus.clamp(RESOURCE_MIN, RESOURCE_MAX);
    }

    #[must_use]
    pub fn ending_text(&self) -> Option<&'static str> {
        self.ending.map(Ending::text)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.ended
    }
}
