//! `mission_core`: deterministic debris-collection mission engine.
//!
//! No network IO. All randomness comes from the engine's seeded RNG or a
//! passed-in one.

mod advance;
mod catalog;
mod engine;
mod error;
pub mod metrics;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;

pub use advance::{advance_to, collected_by, collection_period, recovered_mass, PeriodAdvance};
pub use catalog::generate;
pub use engine::{
    validate_params, MissionEngine, ScheduledTick, TickOutcome, TimerToken,
    DEFAULT_TICK_INTERVAL, MAX_DEBRIS,
};
pub use error::MissionError;
pub use metrics::{aggregate, append_metrics_row, write_metrics_header, MetricsFileWriter};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, period: u32, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, period, event }
}

#[cfg(test)]
mod tests;
