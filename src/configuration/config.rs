//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ParametersConfig`] – physical constants and engine options
//! - [`RunConfig`]        – how the headless driver steps the engine
//! - [`BodyConfig`]       – initial state for each explicit body
//! - [`ClusterConfig`]    – optional seeded random bodies
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! Every section and most fields have defaults, so a scenario can be as short
//! as a list of bodies.
//!
//! # YAML format
//!
//! ```yaml
//! simulation:
//!   gravitational_constant: 1.0
//!   softening: 0.01
//!   collision_mode: merge        # none | bounce | merge
//!   integrator: semi_implicit_euler   # or verlet
//!   force_model: direct          # or barnes_hut
//!   theta: 0.5                   # only read for barnes_hut
//!   restitution: 1.0
//!   damping: 0.0
//!   parallel: false
//!   bounds: { half_width: 10.0, half_height: 6.0, wall_damping: 0.5 }
//!
//! run:
//!   dt: 0.001
//!   ticks: 10000
//!   log_every: 1000
//!
//! bodies:
//!   - x: [ -0.5, 0.0 ]
//!     v: [  0.0, -0.7071 ]
//!     m: 1.0
//!     radius: 0.02
//!   - x: [  0.5, 0.0 ]
//!     v: [  0.0, 0.7071 ]
//!     m: 1.0
//!     radius: 0.02
//!
//! cluster:
//!   count: 200
//!   seed: 42
//!   extent: 5.0
//!   radius: [ 0.02, 0.05 ]
//!   density: 10.0
//!   speed: 0.1
//! ```

use serde::Deserialize;

/// Collision handling, `collision_mode: "none" | "bounce" | "merge"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionModeConfig {
    #[default]
    #[serde(rename = "none")] // bodies pass through each other
    None,

    #[serde(rename = "bounce")] // impulse exchange along the line of centres
    Bounce,

    #[serde(rename = "merge")] // overlapping bodies fuse
    Merge,
}

/// Which integrator the engine uses
/// `integrator: "semi_implicit_euler"` or `integrator: "verlet"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[default]
    #[serde(rename = "semi_implicit_euler", alias = "euler")] // Symplectic Euler, one force evaluation per step
    SemiImplicitEuler,

    #[serde(rename = "verlet")] // Velocity Verlet, two force evaluations per step
    Verlet,
}

/// `force_model: "direct"` or `force_model: "barnes_hut"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceModelConfig {
    #[default]
    #[serde(rename = "direct")] // exact N^2 summation
    Direct,

    #[serde(rename = "barnes_hut")] // quadtree approximation, see `theta`
    BarnesHut,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundsConfig {
    pub half_width: f64,
    pub half_height: f64,
    #[serde(default)]
    pub wall_damping: f64,
}

/// Physical constants and engine options
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParametersConfig {
    #[serde(alias = "G")]
    pub gravitational_constant: f64,
    pub softening: f64, // prevents singular forces at very small separations
    pub collision_mode: CollisionModeConfig,
    pub integrator: IntegratorConfig,
    pub force_model: ForceModelConfig,
    pub theta: Option<f64>, // Barnes–Hut opening angle
    pub restitution: f64,
    pub damping: f64, // fraction of velocity lost per step
    pub parallel: bool,
    pub bounds: Option<BoundsConfig>,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 1.0,
            softening: 0.01,
            collision_mode: CollisionModeConfig::None,
            integrator: IntegratorConfig::SemiImplicitEuler,
            force_model: ForceModelConfig::Direct,
            theta: None,
            restitution: 1.0,
            damping: 0.0,
            parallel: false,
            bounds: None,
        }
    }
}

/// Settings for the headless driver
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub dt: f64, // time step per tick
    pub ticks: u64, // number of ticks to run
    pub log_every: u64, // diagnostics interval in ticks, 0 = never
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt: 0.001,
            ticks: 10_000,
            log_every: 1_000,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position
    #[serde(default)]
    pub v: [f64; 2], // initial velocity
    pub m: f64, // mass
    #[serde(default)]
    pub radius: f64, // collision radius
}

/// Seeded random bodies scattered over a square
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    pub count: usize,
    pub seed: u64, // same seed, same bodies
    pub extent: f64, // positions drawn from [-extent, extent]^2
    pub radius: [f64; 2], // [min, max]
    pub density: f64, // mass = density * radius^3
    pub speed: f64, // velocity components drawn from [-speed, speed]
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed: 42,
            extent: 5.0,
            radius: [0.02, 0.05],
            density: 10.0,
            speed: 0.0,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: ParametersConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub cluster: Option<ClusterConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
