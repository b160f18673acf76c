//! Immutable, point-in-time view of the simulation
//!
//! A `Snapshot` is published by the engine at the end of every successful
//! tick (and on reset). The body slice is shared behind an `Arc`, so cloning a
//! snapshot is cheap and later ticks never write into it.

use std::sync::Arc;

use crate::simulation::states::{Body, BodyId, NVec2};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64, // successful ticks since the last reset
    pub t: f64, // simulated time
    bodies: Arc<[Body]>,
}

impl Snapshot {
    pub fn new(tick: u64, t: f64, bodies: &[Body]) -> Self {
        Self {
            tick,
            t,
            bodies: Arc::from(bodies),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Σ m_i v_i
    pub fn total_momentum(&self) -> NVec2 {
        self.bodies
            .iter()
            .fold(NVec2::zeros(), |acc, b| acc + b.momentum())
    }

    /// Mass-weighted mean position, origin for an empty snapshot
    pub fn center_of_mass(&self) -> NVec2 {
        let mass = self.total_mass();
        if mass == 0.0 {
            return NVec2::zeros();
        }
        self.bodies
            .iter()
            .fold(NVec2::zeros(), |acc, b| acc + b.x * b.m)
            / mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Softened pairwise potential energy, consistent with the force law
    /// used by `NewtonianGravity`
    pub fn potential_energy(&self, g: f64, softening: f64) -> f64 {
        let soft2 = softening * softening;
        let mut energy = 0.0;
        for (i, bi) in self.bodies.iter().enumerate() {
            for bj in &self.bodies[i + 1..] {
                let r2 = (bj.x - bi.x).norm_squared();
                energy -= g * bi.m * bj.m / (r2 + soft2).sqrt();
            }
        }
        energy
    }

    pub fn total_energy(&self, g: f64, softening: f64) -> f64 {
        self.kinetic_energy() + self.potential_energy(g, softening)
    }
}
