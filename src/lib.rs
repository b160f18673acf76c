pub mod simulation;
pub mod configuration;
pub mod driver;
pub mod benchmark;

pub use simulation::error::{SimulationError, Result};
pub use simulation::states::{Body, BodyId, System, NVec2};
pub use simulation::snapshot::Snapshot;
pub use simulation::params::{SimulationConfig, CollisionMode, IntegratorKind, ForceModelKind, Bounds};
pub use simulation::forces::{Acceleration, AccelSet, NewtonianGravity, NewtonianGravityBarnesHut};
pub use simulation::integrator::{semi_implicit_euler, velocity_verlet};
pub use simulation::collision::{resolve_collisions, merge_bodies, confine_to_bounds, CollisionReport};
pub use simulation::engine::{Engine, EngineState};
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, ParametersConfig, RunConfig, BodyConfig, ClusterConfig};

pub use driver::runner::{Runner, RunSummary, FrameStats};

pub use benchmark::benchmark::{bench_gravity, bench_tick};
