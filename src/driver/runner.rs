//! Headless driver standing in for a GUI animation loop
//!
//! Calls `Engine::tick` with a fixed `dt` once per "frame", skips frames while
//! the engine is paused, times every step and reports progress through `log`.

use std::time::{Duration, Instant};

use crate::configuration::config::RunConfig;
use crate::simulation::engine::Engine;
use crate::simulation::error::Result;
use crate::simulation::scenario::Scenario;
use crate::simulation::snapshot::Snapshot;

/// Wall-clock cost of engine steps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub total: Duration,
    pub slowest: Duration,
}

impl FrameStats {
    pub fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.total += elapsed;
        self.slowest = self.slowest.max(elapsed);
    }

    pub fn mean_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1_000.0 / self.frames as f64
    }

    /// Frame rate the engine alone could sustain
    pub fn max_fps(&self) -> f64 {
        let mean = self.mean_ms();
        if mean == 0.0 { 0.0 } else { 1_000.0 / mean }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub skipped: u64, // frames dropped because the engine was paused
    pub first: Snapshot,
    pub last: Snapshot,
    pub stats: FrameStats,
}

pub struct Runner {
    engine: Engine,
    dt: f64,
    log_every: u64,
    stats: FrameStats,
}

impl Runner {
    pub fn new(engine: Engine, run: &RunConfig) -> Self {
        Self {
            engine,
            dt: run.dt,
            log_every: run.log_every,
            stats: FrameStats::default(),
        }
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        Self::new(scenario.engine, &scenario.run)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// One frame: `Ok(None)` when paused, otherwise the new snapshot
    pub fn step(&mut self) -> Result<Option<Snapshot>> {
        if self.engine.is_paused() {
            return Ok(None);
        }
        let before = Instant::now();
        let snapshot = self.engine.tick(self.dt)?;
        self.stats.record(before.elapsed());
        Ok(Some(snapshot))
    }

    /// Run `frames` frames, handing each published snapshot to `on_snapshot`
    pub fn run<F>(&mut self, frames: u64, mut on_snapshot: F) -> Result<RunSummary>
    where
        F: FnMut(&Snapshot),
    {
        let first = self.engine.snapshot();
        let mut ticks_run = 0;
        let mut skipped = 0;

        for frame in 0..frames {
            let snapshot = match self.step() {
                Ok(Some(s)) => s,
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    log::warn!("frame {frame}: tick failed: {e}");
                    return Err(e);
                }
            };
            ticks_run += 1;
            on_snapshot(&snapshot);

            if self.log_every > 0 && snapshot.tick % self.log_every == 0 {
                self.report(&snapshot);
            }
        }

        Ok(RunSummary {
            ticks_run,
            skipped,
            first,
            last: self.engine.snapshot(),
            stats: self.stats,
        })
    }

    fn report(&self, snapshot: &Snapshot) {
        let cfg = self.engine.config();
        let p = snapshot.total_momentum();
        log::info!(
            "tick {:>7} t = {:>9.4} bodies = {:>5} E = {:+.6e} p = ({:+.3e}, {:+.3e}) | {:.3}ms/frame {:.0}fps",
            snapshot.tick,
            snapshot.t,
            snapshot.len(),
            snapshot.total_energy(cfg.gravitational_constant, cfg.softening),
            p.x,
            p.y,
            self.stats.mean_ms(),
            self.stats.max_fps(),
        );
    }
}
