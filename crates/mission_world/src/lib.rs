//! Mission content loading and engine setup shared between mission_cli and mission_daemon.

use anyhow::{bail, Context, Result};
use mission_core::{validate_params, MissionEngine, MissionParameters};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

mod overrides;
mod presets;

pub use overrides::{apply_overrides, parse_override, VALID_KEYS};
pub use presets::{apply_mode, apply_time_unit, ModePreset, Presets, ShapePreset};

/// Everything loaded from a content directory.
#[derive(Debug, Clone)]
pub struct MissionContent {
    pub content_version: String,
    pub tick_interval: Duration,
    pub parameters: MissionParameters,
    pub presets: Presets,
}

#[derive(Deserialize)]
struct MissionFile {
    content_version: String,
    #[serde(default = "default_tick_interval_ms")]
    tick_interval_ms: u64,
    parameters: MissionParameters,
}

fn default_tick_interval_ms() -> u64 {
    100
}

/// Checks loaded content for authoring errors.
///
/// Catches mistakes like: default parameters the engine would reject, a
/// zero tick interval, or a preset with a zero-length mission.
pub fn validate_content(content: &MissionContent) -> Result<()> {
    if content.content_version.is_empty() {
        bail!("content_version must not be empty");
    }
    if content.tick_interval.is_zero() {
        bail!("tick_interval_ms must be > 0");
    }
    validate_params(&content.parameters).context("default mission parameters")?;

    for (unit, shape) in &content.presets.time_units {
        if shape.mission_duration == 0 {
            bail!("time-unit preset '{}' has missionDuration 0", unit.label_plural());
        }
    }
    for (name, mode) in &content.presets.modes {
        if name.is_empty() {
            bail!("mission mode with empty name");
        }
        if mode.mission_duration == 0 {
            bail!("mission mode '{name}' has missionDuration 0");
        }
    }
    Ok(())
}

pub fn load_content(content_dir: &str) -> Result<MissionContent> {
    let dir = Path::new(content_dir);
    let mission_file: MissionFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("mission.json")).context("reading mission.json")?,
    )
    .context("parsing mission.json")?;
    let presets: Presets = serde_json::from_str(
        &std::fs::read_to_string(dir.join("presets.json")).context("reading presets.json")?,
    )
    .context("parsing presets.json")?;
    let content = MissionContent {
        content_version: mission_file.content_version,
        tick_interval: Duration::from_millis(mission_file.tick_interval_ms),
        parameters: mission_file.parameters,
        presets,
    };
    validate_content(&content)?;
    tracing::debug!(
        content_version = %content.content_version,
        modes = content.presets.modes.len(),
        "mission content loaded"
    );
    Ok(content)
}

/// Build a `Ready` engine from `params` with the content's default pacing.
pub fn build_engine(
    content: &MissionContent,
    params: MissionParameters,
    seed: u64,
) -> Result<MissionEngine> {
    let mut engine = MissionEngine::new(params, seed).context("building mission engine")?;
    engine
        .set_tick_interval(content.tick_interval)
        .context("applying tick interval")?;
    Ok(engine)
}
