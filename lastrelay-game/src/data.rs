//! Immutable domain tables: subsystem catalog, quirks, event kinds and AI lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a station subsystem. Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubsystemName {
    #[serde(rename = "Antenna Array")]
    AntennaArray,
    #[serde(rename = "Cooling Loop")]
    CoolingLoop,
    #[serde(rename = "Navigation Beacon")]
    NavigationBeacon,
    #[serde(rename = "AI Core")]
    AiCore,
    #[serde(rename = "Docking Control")]
    DockingControl,
}

impl SubsystemName {
    /// Catalog order, used when drawing optional subsystems.
    pub const ALL: [Self; 5] = [
        Self::AntennaArray,
        Self::CoolingLoop,
        Self::NavigationBeacon,
        Self::AiCore,
        Self::DockingControl,
    ];

    /// Subsystems present in every game, in roster order.
    pub const MANDATORY: [Self; 2] = [Self::AntennaArray, Self::AiCore];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AntennaArray => "Antenna Array",
            Self::CoolingLoop => "Cooling Loop",
            Self::NavigationBeacon => "Navigation Beacon",
            Self::AiCore => "AI Core",
            Self::DockingControl => "Docking Control",
        }
    }

    /// Short keyword accepted by command parsers.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::AntennaArray => "antenna",
            Self::CoolingLoop => "cooling",
            Self::NavigationBeacon => "beacon",
            Self::AiCore => "ai",
            Self::DockingControl => "docking",
        }
    }

    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::AntennaArray | Self::AiCore)
    }

    /// The three quirks a subsystem can be created with.
    #[must_use]
    pub const fn quirks(self) -> [Quirk; 3] {
        match self {
            Self::AntennaArray => [
                Quirk::CalibrationDrift,
                Quirk::HairlineFeedCrack,
                Quirk::IntermittentPhaseNoise,
            ],
            Self::CoolingLoop => [
                Quirk::SensorMisread,
                Quirk::PumpCavitation,
                Quirk::FeedbackCoupling,
            ],
            Self::NavigationBeacon => [
                Quirk::LooseMounting,
                Quirk::TimingJitter,
                Quirk::GhostPings,
            ],
            Self::AiCore => [
                Quirk::ThermalFeedbackLoop,
                Quirk::PriorityInversion,
                Quirk::MemoryLeak,
            ],
            Self::DockingControl => [
                Quirk::StuckActuator,
                Quirk::PowerBusNoise,
                Quirk::MiswiredRelay,
            ],
        }
    }
}

impl fmt::Display for SubsystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hidden per-subsystem modifier fixed at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quirk {
    #[serde(rename = "Calibration drift")]
    CalibrationDrift,
    #[serde(rename = "Hairline feed crack")]
    HairlineFeedCrack,
    #[serde(rename = "Intermittent phase noise")]
    IntermittentPhaseNoise,
    #[serde(rename = "Sensor misread")]
    SensorMisread,
    #[serde(rename = "Pump cavitation")]
    PumpCavitation,
    #[serde(rename = "Feedback coupling")]
    FeedbackCoupling,
    #[serde(rename = "Loose mounting")]
    LooseMounting,
    #[serde(rename = "Timing jitter")]
    TimingJitter,
    #[serde(rename = "Ghost pings")]
    GhostPings,
    #[serde(rename = "Thermal feedback loop")]
    ThermalFeedbackLoop,
    #[serde(rename = "Priority inversion")]
    PriorityInversion,
    #[serde(rename = "Memory leak")]
    MemoryLeak,
    #[serde(rename = "Stuck actuator")]
    StuckActuator,
    #[serde(rename = "Power bus noise")]
    PowerBusNoise,
    #[serde(rename = "Miswired relay")]
    MiswiredRelay,
}

impl Quirk {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CalibrationDrift => "Calibration drift",
            Self::HairlineFeedCrack => "Hairline feed crack",
            Self::IntermittentPhaseNoise => "Intermittent phase noise",
            Self::SensorMisread => "Sensor misread",
            Self::PumpCavitation => "Pump cavitation",
            Self::FeedbackCoupling => "Feedback coupling",
            Self::LooseMounting => "Loose mounting",
            Self::TimingJitter => "Timing jitter",
            Self::GhostPings => "Ghost pings",
            Self::ThermalFeedbackLoop => "Thermal feedback loop",
            Self::PriorityInversion => "Priority inversion",
            Self::MemoryLeak => "Memory leak",
            Self::StuckActuator => "Stuck actuator",
            Self::PowerBusNoise => "Power bus noise",
            Self::MiswiredRelay => "Miswired relay",
        }
    }

    /// Flavor text revealed by a scan.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CalibrationDrift => {
                "Repairs work once; repeat repairs are less effective unless scanned first."
            }
            Self::HairlineFeedCrack => {
                "Emergency transmission has higher surge risk unless repaired."
            }
            Self::IntermittentPhaseNoise => {
                "Reroute to antenna is stronger but drains extra power."
            }
            Self::SensorMisread => {
                "Repair restores more Integrity, but costs extra Focus unless scanned."
            }
            Self::PumpCavitation => "Events are harsher while Degraded/Failing.",
            Self::FeedbackCoupling => "If AI Core unstable, Cooling Loop may worsen each turn.",
            Self::LooseMounting => "Integrity loss events hit harder unless repaired.",
            Self::TimingJitter => "Scan is more valuable; reveals impending fault.",
            Self::GhostPings => "AI advice becomes unreliable if Beacon is Failing.",
            Self::ThermalFeedbackLoop => "AI becomes misleading if unstable for 2 turns.",
            Self::PriorityInversion => "Override is stronger but increases Integrity risk.",
            Self::MemoryLeak => "Rest recovers less Focus until repaired.",
            Self::StuckActuator => "Escape risk increases unless repaired.",
            Self::PowerBusNoise => "Reroutes cause bigger swings.",
            Self::MiswiredRelay => "Repairs can fail if not scanned first.",
        }
    }

    /// Subsystem whose catalog contains this quirk.
    #[must_use]
    pub const fn owner(self) -> SubsystemName {
        match self {
            Self::CalibrationDrift | Self::HairlineFeedCrack | Self::IntermittentPhaseNoise => {
                SubsystemName::AntennaArray
            }
            Self::SensorMisread | Self::PumpCavitation | Self::FeedbackCoupling => {
                SubsystemName::CoolingLoop
            }
            Self::LooseMounting | Self::TimingJitter | Self::GhostPings => {
                SubsystemName::NavigationBeacon
            }
            Self::ThermalFeedbackLoop | Self::PriorityInversion | Self::MemoryLeak => {
                SubsystemName::AiCore
            }
            Self::StuckActuator | Self::PowerBusNoise | Self::MiswiredRelay => {
                SubsystemName::DockingControl
            }
        }
    }
}

impl fmt::Display for Quirk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Random event kinds drawn by the end-of-turn tick, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PowerSurge,
    FalseDiagnostic,
    ExternalSignalWindow,
    StructuralGroan,
    CoolantHiccup,
    AiCommentary,
}

impl EventKind {
    pub const ALL: [Self; 6] = [
        Self::PowerSurge,
        Self::FalseDiagnostic,
        Self::ExternalSignalWindow,
        Self::StructuralGroan,
        Self::CoolantHiccup,
        Self::AiCommentary,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerSurge => "Power surge",
            Self::FalseDiagnostic => "False diagnostic",
            Self::ExternalSignalWindow => "External signal window",
            Self::StructuralGroan => "Structural groan",
            Self::CoolantHiccup => "Coolant hiccup",
            Self::AiCommentary => "AI commentary",
        }
    }
}

pub const AI_LINES: [&str; 5] = [
    "\u{201c}Engineer. Panic remains inefficient.\u{201d}",
    "\u{201c}I have updated my confidence interval: lower.\u{201d}",
    "\u{201c}Your choices exhibit\u{2026} creativity.\u{201d}",
    "\u{201c}I cannot feel fear. I can simulate it, if helpful.\u{201d}",
    "\u{201c}If this ends poorly, I will file a complaint.\u{201d}",
];
