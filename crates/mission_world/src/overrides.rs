use anyhow::{anyhow, bail, Result};
use mission_core::{MissionParameters, TimeUnit};
use std::collections::HashMap;

pub const VALID_KEYS: &[&str] = &[
    "numDebris",
    "collectionEfficiency",
    "costPerMission",
    "missionDuration",
    "timeUnit",
    "threatWeight",
    "valueWeight",
    "accessibilityWeight",
    "valueNormalization",
];

pub fn apply_overrides(
    params: &mut MissionParameters,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "numDebris" => params.num_debris = as_u32(key, value)?,
            "collectionEfficiency" => params.collection_efficiency = as_f64(key, value)?,
            "costPerMission" => params.cost_per_mission = as_f64(key, value)?,
            "missionDuration" => params.mission_duration = as_u32(key, value)?,
            "timeUnit" => params.time_unit = as_time_unit(key, value)?,
            "threatWeight" => params.scoring.threat_weight = as_f64(key, value)?,
            "valueWeight" => params.scoring.value_weight = as_f64(key, value)?,
            "accessibilityWeight" => params.scoring.accessibility_weight = as_f64(key, value)?,
            "valueNormalization" => params.scoring.value_normalization = as_f64(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

/// Parse a `key=value` pair. The value is read as JSON when it parses as
/// JSON, otherwise as a bare string (so `timeUnit=years` works).
pub fn parse_override(pair: &str) -> Result<(String, serde_json::Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("override '{pair}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("override '{pair}': empty key");
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("override '{key}': expected a positive integer, got {value}"))
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = as_u64(key, value)?;
    u32::try_from(val).map_err(|_| anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_time_unit(key: &str, value: &serde_json::Value) -> Result<TimeUnit> {
    serde_json::from_value(value.clone()).map_err(|_| {
        anyhow!("override '{key}': expected one of days, months, years, got {value}")
    })
}
