use anyhow::{anyhow, Result};
use mission_core::{MissionParameters, TimeUnit};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Mission shape suggested when the time unit changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePreset {
    pub mission_duration: u32,
    pub num_debris: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModePreset {
    #[serde(default)]
    pub description: String,
    pub time_unit: TimeUnit,
    pub mission_duration: u32,
    pub num_debris: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Presets {
    #[serde(default)]
    pub time_units: HashMap<TimeUnit, ShapePreset>,
    #[serde(default)]
    pub modes: BTreeMap<String, ModePreset>,
}

/// Switch the time unit, adopting that unit's default duration and catalog size
/// when a preset exists for it.
pub fn apply_time_unit(params: &mut MissionParameters, unit: TimeUnit, presets: &Presets) {
    params.time_unit = unit;
    if let Some(shape) = presets.time_units.get(&unit) {
        params.mission_duration = shape.mission_duration;
        params.num_debris = shape.num_debris;
    }
}

/// Apply a named mission mode (`short`, `long`, ...).
pub fn apply_mode(params: &mut MissionParameters, mode: &str, presets: &Presets) -> Result<()> {
    let preset = presets.modes.get(mode).ok_or_else(|| {
        let known: Vec<&str> = presets.modes.keys().map(String::as_str).collect();
        anyhow!("unknown mission mode '{mode}'. Known modes: {}", known.join(", "))
    })?;
    params.time_unit = preset.time_unit;
    params.mission_duration = preset.mission_duration;
    params.num_debris = preset.num_debris;
    Ok(())
}
