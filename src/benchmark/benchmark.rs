use std::time::Instant;

use crate::simulation::engine::Engine;
use crate::simulation::forces::{Acceleration, NewtonianGravity, NewtonianGravityBarnesHut};
use crate::simulation::params::{ForceModelKind, SimulationConfig};
use crate::simulation::states::{Body, NVec2};

const G: f64 = 0.1;
const SOFTENING: f64 = 0.01;
const THETA: f64 = 0.7;

/// Deterministic spread of `n` unit-mass bodies, no rand needed
pub fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
            Body::new(x, NVec2::zeros(), 1.0, 0.01)
        })
        .collect()
}

/// Time one force evaluation per model for growing N
/// Paste output directly into a spreadsheet to graph
pub fn bench_gravity() {
    println!("N,direct_ms,parallel_ms,bh_ms");

    for n in [200, 400, 800, 1600, 3200, 6400] {
        let bodies = make_bodies(n);
        let mut out = vec![NVec2::zeros(); n];

        let direct = NewtonianGravity { g: G, softening: SOFTENING, parallel: false };
        let parallel = NewtonianGravity { g: G, softening: SOFTENING, parallel: true };
        let bh = NewtonianGravityBarnesHut { g: G, softening: SOFTENING, theta: THETA };

        let models: [&dyn Acceleration; 3] = [&direct, &parallel, &bh];
        let mut timings = [0.0; 3];

        for (model, ms) in models.iter().zip(timings.iter_mut()) {
            // Warm up
            model.acceleration(&bodies, &mut out);

            let t0 = Instant::now();
            model.acceleration(&bodies, &mut out);
            *ms = t0.elapsed().as_secs_f64() * 1000.0;
        }

        println!("{},{:.4},{:.4},{:.4}", n, timings[0], timings[1], timings[2]);
    }
}

/// Time full engine ticks (forces + integration + collisions) for growing N
pub fn bench_tick() {
    println!("N,direct_tick_ms,bh_tick_ms");

    for n in (200..=3200).step_by(600) {
        let steps = if n <= 800 { 5 } else { 1 };
        let direct_cfg = SimulationConfig::default()
            .with_gravitational_constant(G)
            .with_softening(SOFTENING);
        let bh_cfg = SimulationConfig {
            force_model: ForceModelKind::BarnesHut { theta: THETA },
            ..direct_cfg.clone()
        };

        let mut per_step = [0.0; 2];
        for (cfg, ms) in [direct_cfg, bh_cfg].into_iter().zip(per_step.iter_mut()) {
            let mut engine = match Engine::with_bodies(make_bodies(n), cfg) {
                Ok(engine) => engine,
                Err(e) => {
                    log::error!("benchmark engine for N = {n} rejected: {e}");
                    return;
                }
            };

            let t0 = Instant::now();
            for _ in 0..steps {
                if let Err(e) = engine.tick(0.001) {
                    log::error!("benchmark tick for N = {n} failed: {e}");
                    return;
                }
            }
            *ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }

        println!("{},{:.4},{:.4}", n, per_step[0], per_step[1]);
    }
}
