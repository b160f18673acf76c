//! Force / acceleration contributors for the n-body engine
//!
//! Defines the acceleration trait, the `AccelSet` that sums contributors,
//! direct Newtonian gravity and a Barnes–Hut variant

use rayon::prelude::*;

use crate::simulation::barnes_hut::BarnesHutTree;
use crate::simulation::params::{ForceModelKind, SimulationConfig};
use crate::simulation::states::{Body, NVec2};

/// Collection of acceleration terms (gravity, drag, etc.)
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Gravity term selected by `config.force_model`
    pub fn from_config(config: &SimulationConfig) -> Self {
        let g = config.gravitational_constant;
        let softening = config.softening;
        match config.force_model {
            ForceModelKind::Direct => Self::new().with(NewtonianGravity {
                g,
                softening,
                parallel: config.parallel,
            }),
            ForceModelKind::BarnesHut { theta } => Self::new().with(NewtonianGravityBarnesHut {
                g,
                softening,
                theta,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations for all `bodies`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, bodies: &[Body], out: &mut [NVec2]) {
        debug_assert_eq!(bodies.len(), out.len());
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(bodies, out);
        }
    }

    /// Allocating variant of [`AccelSet::accumulate_accels`]
    pub fn accelerations(&self, bodies: &[Body]) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); bodies.len()];
        self.accumulate_accels(bodies, &mut out);
        out
    }
}

/// Acceleration source operating on a body slice
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]);
}

/// Newtonian gravity with Plummer softening
///
/// a_i = Σ_j G m_j (x_j - x_i) / (|x_j - x_i|^2 + softening^2)^(3/2)
///
/// Each row is summed in ascending `j`, so serial and parallel runs give the
/// same bits.
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
    pub softening: f64, // softening length
    pub parallel: bool,
}

impl NewtonianGravity {
    /// Net pull on body `i` from every other body
    pub fn pull_on(&self, i: usize, bodies: &[Body]) -> NVec2 {
        let xi = bodies[i].x;
        let soft2 = self.softening * self.softening;
        let mut acc = NVec2::zeros();

        for (j, bj) in bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            // displacement from i to j, i is pulled along +r
            let r = bj.x - xi;
            let d2 = r.norm_squared() + soft2;
            let inv_r = d2.sqrt().recip();
            let inv_r3 = inv_r * inv_r * inv_r;
            acc += (self.g * bj.m * inv_r3) * r;
        }
        acc
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]) {
        if bodies.len() < 2 {
            return;
        }
        if self.parallel {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, a)| *a += self.pull_on(i, bodies));
        } else {
            for (i, a) in out.iter_mut().enumerate() {
                *a += self.pull_on(i, bodies);
            }
        }
    }
}

/// Newtonian gravity evaluated via a Barnes–Hut quadtree
/// Wraps [`BarnesHutTree`] to get approximate O(N log N) accelerations
/// controlled by `theta` (opening angle) and `softening`
pub struct NewtonianGravityBarnesHut {
    pub g: f64,
    pub softening: f64,
    pub theta: f64,
}

impl Acceleration for NewtonianGravityBarnesHut {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec2]) {
        if bodies.len() < 2 {
            return;
        }
        let tree = BarnesHutTree::build(bodies);
        let soft2 = self.softening * self.softening;
        for (i, a) in out.iter_mut().enumerate() {
            *a += tree.force_on_body(i, bodies, self.g, soft2, self.theta);
        }
    }
}
