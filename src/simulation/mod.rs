pub mod error;
pub mod vector;
pub mod states;
pub mod snapshot;
pub mod params;
pub mod forces;
pub mod barnes_hut;
pub mod integrator;
pub mod collision;
pub mod engine;
pub mod scenario;
