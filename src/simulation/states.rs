//! Core state types for the N-body simulation.
//!
//! - `Body`   one point mass with its stable id
//! - `System` the live, ordered body set plus the simulation time `t`
//!
//! Only the engine holds a `System`; everybody else sees bodies through
//! snapshots.

use std::fmt;

use nalgebra::Vector2;

use crate::simulation::error::{Result, SimulationError};

pub type NVec2 = Vector2<f64>;

/// Stable body identity, assigned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: BodyId, // overwritten by the engine on add/reset
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub radius: f64, // collision radius
}

impl Body {
    /// New body with an unassigned id
    pub fn new(x: NVec2, v: NVec2, m: f64, radius: f64) -> Self {
        Self {
            id: BodyId::default(),
            x,
            v,
            m,
            radius,
        }
    }

    pub fn momentum(&self) -> NVec2 {
        self.v * self.m
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    pub fn is_finite(&self) -> bool {
        self.x.iter().all(|c| c.is_finite())
            && self.v.iter().all(|c| c.is_finite())
            && self.m.is_finite()
            && self.radius.is_finite()
    }

    /// Check the invariants a body must hold before it may join a system
    pub fn validate(&self) -> Result<()> {
        if !(self.m > 0.0 && self.m.is_finite()) {
            return Err(SimulationError::InvalidBody {
                reason: format!("mass must be positive and finite, got {}", self.m),
            });
        }
        if !(self.radius >= 0.0 && self.radius.is_finite()) {
            return Err(SimulationError::InvalidBody {
                reason: format!("radius must be non-negative and finite, got {}", self.radius),
            });
        }
        if !self.is_finite() {
            return Err(SimulationError::InvalidBody {
                reason: "position and velocity must be finite".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // active bodies, in insertion order
    pub t: f64, // simulated time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.iter().any(|b| b.id == id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }
}
