//! Error types for `mission_core`.
//!
//! Every mutating engine operation either applies fully or returns one of
//! these without touching mission state.

use crate::MissionPhase;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MissionError {
    /// Parameters rejected at `configure`; the previous configuration is kept.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The requested transition is not available in the current phase.
    #[error("cannot {action} while mission is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: MissionPhase,
    },

    #[error("period {period} is outside 1..={duration}")]
    OutOfRangeAdvance { period: u32, duration: u32 },
}

impl MissionError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
