//! Build fully-initialized simulations from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario` holding
//! - the engine (config, forces and bodies at t = 0)
//! - the run settings the headless driver needs
//!
//! Explicit bodies come first, followed by any seeded cluster bodies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{
    BodyConfig, ClusterConfig, CollisionModeConfig, ForceModelConfig, IntegratorConfig,
    ParametersConfig, RunConfig, ScenarioConfig,
};
use crate::simulation::engine::Engine;
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::params::{
    Bounds, CollisionMode, ForceModelKind, IntegratorKind, SimulationConfig, DEFAULT_THETA,
};
use crate::simulation::states::{Body, NVec2};

/// Runtime bundle built from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub run: RunConfig,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let config = simulation_config(&cfg.simulation);

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let mut bodies: Vec<Body> = cfg.bodies.iter().map(body_from_config).collect();
        if let Some(cluster) = &cfg.cluster {
            bodies.extend(cluster_bodies(cluster)?);
        }

        let engine = Engine::with_bodies(bodies, config)?;
        log::info!(
            "scenario built: {} bodies, G = {}, softening = {}, collisions = {:?}",
            engine.body_count(),
            engine.config().gravitational_constant,
            engine.config().softening,
            engine.config().collision_mode,
        );

        Ok(Self {
            engine,
            run: cfg.run,
        })
    }
}

/// Map the YAML-facing parameters onto the engine's runtime config
pub fn simulation_config(p: &ParametersConfig) -> SimulationConfig {
    let collision_mode = match p.collision_mode {
        CollisionModeConfig::None => CollisionMode::None,
        CollisionModeConfig::Bounce => CollisionMode::Bounce,
        CollisionModeConfig::Merge => CollisionMode::Merge,
    };
    let integrator = match p.integrator {
        IntegratorConfig::SemiImplicitEuler => IntegratorKind::SemiImplicitEuler,
        IntegratorConfig::Verlet => IntegratorKind::VelocityVerlet,
    };
    let force_model = match p.force_model {
        ForceModelConfig::Direct => ForceModelKind::Direct,
        ForceModelConfig::BarnesHut => ForceModelKind::BarnesHut {
            theta: p.theta.unwrap_or(DEFAULT_THETA),
        },
    };

    SimulationConfig {
        gravitational_constant: p.gravitational_constant,
        softening: p.softening,
        collision_mode,
        integrator,
        force_model,
        restitution: p.restitution,
        damping: p.damping,
        bounds: p.bounds.map(|b| Bounds {
            half_width: b.half_width,
            half_height: b.half_height,
            wall_damping: b.wall_damping,
        }),
        parallel: p.parallel,
    }
}

pub fn body_from_config(bc: &BodyConfig) -> Body {
    Body::new(
        NVec2::new(bc.x[0], bc.x[1]),
        NVec2::new(bc.v[0], bc.v[1]),
        bc.m,
        bc.radius,
    )
}

/// Seeded random bodies; the same config always yields the same bodies
pub fn cluster_bodies(cfg: &ClusterConfig) -> Result<Vec<Body>> {
    let [r_min, r_max] = cfg.radius;
    if !(r_min > 0.0 && r_min <= r_max && r_max.is_finite()) {
        return Err(invalid_cluster(format!("radius range must satisfy 0 < min <= max, got [{r_min}, {r_max}]")));
    }
    if !(cfg.density > 0.0 && cfg.density.is_finite()) {
        return Err(invalid_cluster(format!("density must be positive, got {}", cfg.density)));
    }
    if !(cfg.extent >= 0.0 && cfg.extent.is_finite()) || !(cfg.speed >= 0.0 && cfg.speed.is_finite()) {
        return Err(invalid_cluster("extent and speed must be non-negative".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let e = cfg.extent;
    let s = cfg.speed;

    let bodies = (0..cfg.count)
        .map(|_| {
            let x = NVec2::new(rng.random_range(-e..=e), rng.random_range(-e..=e));
            let v = NVec2::new(rng.random_range(-s..=s), rng.random_range(-s..=s));
            let radius = rng.random_range(r_min..=r_max);
            Body::new(x, v, cfg.density * radius.powi(3), radius)
        })
        .collect();
    Ok(bodies)
}

fn invalid_cluster(reason: String) -> SimulationError {
    SimulationError::InvalidConfig {
        reason: format!("cluster: {reason}"),
    }
}
