use super::*;
use crate::test_fixtures::{base_params, even_params, make_engine, make_rng, started_paused};

mod advance;
mod transitions;

// --- Shared test helpers ------------------------------------------------

/// Step a paused engine until `period` has been applied.
fn step_to(engine: &mut MissionEngine, period: u32) {
    while engine.current_period() < period {
        engine.step().unwrap();
    }
}

fn collected_ids(engine: &MissionEngine) -> Vec<DebrisId> {
    engine
        .collected()
        .iter()
        .map(|c| c.debris.id.clone())
        .collect()
}
