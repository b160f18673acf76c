//! 2D vector primitives used across the engine
//!
//! Thin, pure helpers over [`NVec2`]. Everything is passed by value, so the
//! functions are safe to call from any thread.

use crate::simulation::error::{Result, SimulationError};
use crate::simulation::states::NVec2;

pub fn add(a: NVec2, b: NVec2) -> NVec2 {
    a + b
}

pub fn subtract(a: NVec2, b: NVec2) -> NVec2 {
    a - b
}

pub fn scale(v: NVec2, s: f64) -> NVec2 {
    v * s
}

pub fn dot(a: NVec2, b: NVec2) -> f64 {
    a.dot(&b)
}

pub fn magnitude_squared(v: NVec2) -> f64 {
    v.norm_squared()
}

pub fn magnitude(v: NVec2) -> f64 {
    v.norm()
}

/// Unit vector in the direction of `v`
///
/// Fails with [`SimulationError::DegenerateVector`] when `v` has no direction,
/// i.e. its length is zero (or not finite).
pub fn normalize(v: NVec2) -> Result<NVec2> {
    let len = magnitude(v);
    if len == 0.0 || !len.is_finite() {
        return Err(SimulationError::DegenerateVector);
    }
    Ok(v / len)
}

/// Distance between two points
pub fn distance(a: NVec2, b: NVec2) -> f64 {
    magnitude(subtract(b, a))
}
