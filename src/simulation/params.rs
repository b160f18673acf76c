//! Runtime parameters for the simulation
//!
//! `SimulationConfig` holds everything the engine needs to run a tick:
//! - gravitational constant and softening length,
//! - collision handling (mode, restitution, optional walls),
//! - integrator and force model selection,
//! - velocity damping and the parallel force switch.

use crate::simulation::error::{Result, SimulationError};

/// Default Barnes–Hut opening angle
pub const DEFAULT_THETA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMode {
    /// Bodies may overlap freely
    #[default]
    None,
    /// Elastic (or damped, see `restitution`) impulse along the normal
    Bounce,
    /// Overlapping bodies fuse, conserving mass and momentum
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorKind {
    /// v += a dt, then x += v dt
    #[default]
    SemiImplicitEuler,
    /// Kick-drift-kick, two force evaluations per step
    VelocityVerlet,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ForceModelKind {
    /// Exact O(n^2) pairwise summation
    #[default]
    Direct,
    /// Quadtree approximation with opening angle `theta`
    BarnesHut { theta: f64 },
}

/// Axis-aligned box centred on the origin that bodies bounce off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub half_width: f64,
    pub half_height: f64,
    pub wall_damping: f64, // fraction of speed lost on a wall hit
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub gravitational_constant: f64,
    pub softening: f64,
    pub collision_mode: CollisionMode,
    pub integrator: IntegratorKind,
    pub force_model: ForceModelKind,
    pub restitution: f64, // 1.0 = perfectly elastic bounce
    pub damping: f64, // fraction of velocity removed per step
    pub bounds: Option<Bounds>,
    pub parallel: bool, // split direct force rows across rayon workers
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 1.0,
            softening: 0.01,
            collision_mode: CollisionMode::None,
            integrator: IntegratorKind::SemiImplicitEuler,
            force_model: ForceModelKind::Direct,
            restitution: 1.0,
            damping: 0.0,
            bounds: None,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_collision_mode(mut self, mode: CollisionMode) -> Self {
        self.collision_mode = mode;
        self
    }

    pub fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    /// Reject parameter combinations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let g = self.gravitational_constant;
        if !(g >= 0.0 && g.is_finite()) {
            return Err(invalid(format!("gravitational constant must be non-negative and finite, got {g}")));
        }
        if !(self.softening >= 0.0 && self.softening.is_finite()) {
            return Err(invalid(format!("softening must be non-negative and finite, got {}", self.softening)));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(invalid(format!("restitution must be within [0, 1], got {}", self.restitution)));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(invalid(format!("damping must be within [0, 1), got {}", self.damping)));
        }
        if let ForceModelKind::BarnesHut { theta } = self.force_model {
            if !(theta >= 0.0 && theta.is_finite()) {
                return Err(invalid(format!("theta must be non-negative and finite, got {theta}")));
            }
        }
        if let Some(b) = self.bounds {
            if !(b.half_width > 0.0 && b.half_height > 0.0 && b.half_width.is_finite() && b.half_height.is_finite()) {
                return Err(invalid("bounds must have positive, finite half extents".to_string()));
            }
            if !(0.0..1.0).contains(&b.wall_damping) {
                return Err(invalid(format!("wall damping must be within [0, 1), got {}", b.wall_damping)));
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> SimulationError {
    SimulationError::InvalidConfig { reason }
}
