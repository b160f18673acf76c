//! Error type shared by every simulation component
//!
//! Every fallible engine operation returns [`SimulationError`]. A failed
//! `tick` never mutates engine state, so callers can keep rendering the last
//! published snapshot and retry.

use thiserror::Error;

use crate::simulation::states::BodyId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// `dt` was zero, negative or not finite
    #[error("time step must be positive and finite, got {dt}")]
    InvalidTimestep { dt: f64 },

    /// Normalisation of a zero-length vector
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// Lookup of an id that is not in the active set
    #[error("no active body with id {0}")]
    UnknownBody(BodyId),

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid simulation config: {reason}")]
    InvalidConfig { reason: String },

    /// The external driver is not allowed to step a paused engine
    #[error("engine is paused")]
    Paused,

    /// The step produced NaN or infinite coordinates
    #[error("tick {tick} produced a non-finite body state")]
    NonFiniteState { tick: u64 },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
