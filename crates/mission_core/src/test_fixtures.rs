//! Shared test fixtures for mission_core and downstream crates.
//!
//! `base_params()` is the short mission (15 objects over 30 days) the engine
//! ships with; `even_params()` divides evenly (10 objects over 5 periods).

use crate::{MissionEngine, MissionParameters, TimeUnit};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const TEST_SEED: u64 = 42;

pub fn base_params() -> MissionParameters {
    MissionParameters::default()
}

/// Two objects per period.
pub fn even_params() -> MissionParameters {
    MissionParameters {
        num_debris: 10,
        collection_efficiency: 0.8,
        cost_per_mission: 1_000_000.0,
        mission_duration: 5,
        time_unit: TimeUnit::Months,
        ..MissionParameters::default()
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(TEST_SEED)
}

pub fn make_engine(params: MissionParameters) -> MissionEngine {
    MissionEngine::new(params, TEST_SEED).expect("fixture params are valid")
}

/// Start `engine` and pause it straight away so tests can `step()` by hand.
pub fn started_paused(params: MissionParameters) -> MissionEngine {
    let mut engine = make_engine(params);
    engine.start().expect("start from ready");
    engine.pause().expect("pause while running");
    engine
}
