//! Type definitions for `mission_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the mission engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(DebrisId);
string_id!(EventId);

impl DebrisId {
    /// Ordinal id for the object drawn at `index` (0-based): `DEB-0001`, `DEB-0002`, ...
    pub fn from_ordinal(index: usize) -> Self {
        Self(format!("DEB-{:04}", index + 1))
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    Aluminum,
    Titanium,
    Steel,
    Copper,
    #[serde(rename = "Carbon Fiber")]
    CarbonFiber,
}

impl Material {
    /// Every material, in catalog draw order.
    pub const ALL: [Material; 5] = [
        Material::Aluminum,
        Material::Titanium,
        Material::Steel,
        Material::Copper,
        Material::CarbonFiber,
    ];

    /// Resale price per kg of recovered material.
    pub const fn unit_price(self) -> f64 {
        match self {
            Material::Aluminum => 50_000.0,
            Material::Titanium => 150_000.0,
            Material::Steel => 30_000.0,
            Material::Copper => 80_000.0,
            Material::CarbonFiber => 200_000.0,
        }
    }

    /// Density in g/cm³.
    pub const fn density(self) -> f64 {
        match self {
            Material::Aluminum => 2.7,
            Material::Titanium => 4.5,
            Material::Steel => 7.8,
            Material::Copper => 8.9,
            Material::CarbonFiber => 1.6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Material::Aluminum => "Aluminum",
            Material::Titanium => "Titanium",
            Material::Steel => "Steel",
            Material::Copper => "Copper",
            Material::CarbonFiber => "Carbon Fiber",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Display unit for one period. Has no effect on any computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Days,
    Months,
    Years,
}

impl TimeUnit {
    pub const fn label(self) -> &'static str {
        match self {
            TimeUnit::Days => "Day",
            TimeUnit::Months => "Month",
            TimeUnit::Years => "Year",
        }
    }

    pub const fn label_plural(self) -> &'static str {
        match self {
            TimeUnit::Days => "Days",
            TimeUnit::Months => "Months",
            TimeUnit::Years => "Years",
        }
    }
}

/// Weights of the composite priority score.
///
/// `priority = threat_weight × threat + value_weight × (value / value_normalization)
///           + accessibility_weight × accessibility`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPolicy {
    pub threat_weight: f64,
    pub value_weight: f64,
    pub accessibility_weight: f64,
    pub value_normalization: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            threat_weight: 0.40,
            value_weight: 0.35,
            accessibility_weight: 0.25,
            value_normalization: 1e8,
        }
    }
}

impl ScoringPolicy {
    pub fn score(&self, threat_level: f64, value: f64, accessibility: f64) -> f64 {
        self.threat_weight * threat_level
            + self.value_weight * (value / self.value_normalization)
            + self.accessibility_weight * accessibility
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionParameters {
    pub num_debris: u32,
    /// Fraction of each object's mass actually reclaimed, in [0, 1].
    pub collection_efficiency: f64,
    /// Whole-mission cost, accrued linearly over the periods.
    pub cost_per_mission: f64,
    pub mission_duration: u32,
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl Default for MissionParameters {
    fn default() -> Self {
        Self {
            num_debris: 15,
            collection_efficiency: 0.75,
            cost_per_mission: 5_000_000.0,
            mission_duration: 30,
            time_unit: TimeUnit::Days,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl MissionParameters {
    /// Objects collected per period (real-valued).
    pub fn collection_rate(&self) -> f64 {
        if self.mission_duration == 0 {
            return 0.0;
        }
        f64::from(self.num_debris) / f64::from(self.mission_duration)
    }

    /// Cost accrued per elapsed period.
    pub fn cost_per_period(&self) -> f64 {
        if self.mission_duration == 0 {
            return 0.0;
        }
        self.cost_per_mission / f64::from(self.mission_duration)
    }
}

// ---------------------------------------------------------------------------
// Catalog and collection state
// ---------------------------------------------------------------------------

/// One collectible object. Immutable after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebrisObject {
    pub id: DebrisId,
    /// km
    pub altitude: f64,
    /// kg
    pub mass: f64,
    pub material: Material,
    pub distance: f64,
    pub threat_level: f64,
    pub accessibility: f64,
    /// `mass × unit_price × collection_efficiency`, fixed at generation time.
    pub value: f64,
    pub priority: f64,
}

/// A catalog entry considered gathered as of the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedDebris {
    #[serde(flatten)]
    pub debris: DebrisObject,
    pub collection_period: u32,
    pub recovered_mass: f64,
}

/// Per-object detail recorded in a period log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedDebris {
    pub id: DebrisId,
    pub mass: f64,
    pub recovered_mass: f64,
    pub material: Material,
    pub value: f64,
    pub altitude: f64,
    pub threat_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLogEntry {
    pub period: u32,
    /// Objects collected during this period only.
    pub debris_collected: Vec<LoggedDebris>,
    pub total_mass: f64,
    pub total_value: f64,
    pub cumulative_debris: u32,
    pub cumulative_mass: f64,
    pub cumulative_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionResults {
    pub total_collected: u32,
    pub total_mass: f64,
    pub total_value: f64,
    pub total_cost: f64,
    pub profit: f64,
    /// Percentage of total catalog threat neutralized.
    pub risk_reduced: f64,
    pub material_breakdown: BTreeMap<Material, f64>,
}

// ---------------------------------------------------------------------------
// Mission phase and stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionPhase {
    #[default]
    Ready,
    Running,
    Paused,
    Complete,
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissionPhase::Ready => "ready",
            MissionPhase::Running => "running",
            MissionPhase::Paused => "paused",
            MissionPhase::Complete => "complete",
        })
    }
}

/// Coarse progress stage. Only ever moves forward within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStage {
    #[default]
    Setup,
    Identification,
    Collection,
    Processing,
    EconomicAnalysis,
    Complete,
}

impl MissionStage {
    pub const fn title(self) -> &'static str {
        match self {
            MissionStage::Setup => "Mission Setup",
            MissionStage::Identification => "Debris Identification",
            MissionStage::Collection => "Collection in Progress",
            MissionStage::Processing => "Material Processing",
            MissionStage::EconomicAnalysis => "Economic Analysis",
            MissionStage::Complete => "Mission Complete",
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            MissionStage::Setup => 0,
            MissionStage::Identification => 1,
            MissionStage::Collection => 2,
            MissionStage::Processing => 3,
            MissionStage::EconomicAnalysis => 4,
            MissionStage::Complete => 5,
        }
    }

    /// Stage reached for a given progress fraction while the mission is running.
    pub fn for_progress(progress: f64) -> Self {
        if progress >= 0.75 {
            MissionStage::EconomicAnalysis
        } else if progress >= 0.5 {
            MissionStage::Processing
        } else if progress >= 0.25 {
            MissionStage::Collection
        } else {
            MissionStage::Identification
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub period: u32,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Configured {
        num_debris: u32,
        mission_duration: u32,
    },
    CatalogGenerated {
        count: u32,
    },
    MissionStarted,
    MissionPaused,
    MissionResumed,
    PeriodAdvanced {
        period: u32,
        collected_this_period: u32,
        total_collected: u32,
    },
    DebrisCollected {
        debris_id: DebrisId,
        material: Material,
        recovered_mass: f64,
        value: f64,
    },
    MissionCompleted {
        total_collected: u32,
        profit: f64,
    },
    MissionReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_timer_token: u64,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the engine after the last completed transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSnapshot {
    pub phase: MissionPhase,
    pub stage: MissionStage,
    pub current_period: u32,
    pub current_target: Option<DebrisObject>,
    pub params: MissionParameters,
    pub seed: u64,
    pub tick_interval_ms: u64,
    pub catalog: Vec<DebrisObject>,
    pub collected_projection: Vec<CollectedDebris>,
    pub period_log: Vec<PeriodLogEntry>,
    pub results: MissionResults,
}
