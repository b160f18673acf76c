//! Simulation engine: sole owner of the live body set
//!
//! One call to [`Engine::tick`] runs, in this order:
//! 1. queued `add_body` / `remove_body` operations,
//! 2. the force model,
//! 3. the integrator,
//! 4. wall confinement (when `bounds` is set),
//! 5. the collision policy,
//!
//! on a working copy of the bodies. Only when every phase succeeds and the
//! result is finite is the copy committed and a new [`Snapshot`] published,
//! so a failed tick leaves the engine exactly as it was.
//!
//! The engine has no clock. Whoever drives it decides when to call `tick`
//! and with which `dt`.

use crate::simulation::collision::{confine_to_bounds, resolve_collisions};
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::forces::AccelSet;
use crate::simulation::integrator::check_timestep;
use crate::simulation::params::SimulationConfig;
use crate::simulation::snapshot::Snapshot;
use crate::simulation::states::{Body, BodyId, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Freshly built or reset, not ticked yet
    Ready,
    /// At least one successful tick since the last reset
    Running,
}

/// Structural change queued for the next tick boundary
#[derive(Debug, Clone)]
enum PendingOp {
    Add(Body),
    Remove(BodyId),
}

pub struct Engine {
    config: SimulationConfig,
    forces: AccelSet,
    system: System,
    pending: Vec<PendingOp>,
    state: EngineState,
    paused: bool,
    next_id: u64,
    tick_count: u64,
    snapshot: Snapshot,
}

impl Engine {
    /// Empty engine
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_bodies(Vec::new(), config)
    }

    /// Engine holding `bodies`, with ids assigned from 0 in order
    pub fn with_bodies(bodies: Vec<Body>, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            forces: AccelSet::from_config(&config),
            config,
            system: System::default(),
            pending: Vec::new(),
            state: EngineState::Ready,
            paused: false,
            next_id: 0,
            tick_count: 0,
            snapshot: Snapshot::new(0, 0.0, &[]),
        };
        engine.install(bodies)?;
        Ok(engine)
    }

    /// Advance the simulation by `dt` and publish the resulting snapshot.
    ///
    /// A bad `dt` is reported before the pause flag is looked at.
    ///
    /// In `bounce` mode two bodies with exactly coincident centres have no
    /// collision normal, so every tick fails with `DegenerateVector` until
    /// one of them is removed or the engine is reset.
    pub fn tick(&mut self, dt: f64) -> Result<Snapshot> {
        check_timestep(dt)?;
        if self.paused {
            return Err(SimulationError::Paused);
        }

        let tick = self.tick_count + 1;
        let mut bodies = self.system.bodies.clone();
        self.apply_pending(&mut bodies);

        let accels = self.forces.accelerations(&bodies);
        self.config
            .integrator
            .step(&mut bodies, &accels, &self.forces, dt, self.config.damping)?;

        if let Some(bounds) = &self.config.bounds {
            let hits = confine_to_bounds(bounds, &mut bodies);
            if hits > 0 {
                log::trace!("tick {tick}: {hits} wall hits");
            }
        }

        let report = resolve_collisions(self.config.collision_mode, self.config.restitution, &mut bodies)?;
        if !report.is_empty() {
            log::debug!(
                "tick {tick}: {} merges, {} bounces, {} bodies left",
                report.merges, report.bounces, bodies.len()
            );
        }

        if !bodies.iter().all(Body::is_finite) {
            return Err(SimulationError::NonFiniteState { tick });
        }

        // commit
        self.system.bodies = bodies;
        self.system.t += dt;
        self.pending.clear();
        self.tick_count = tick;
        self.state = EngineState::Running;
        self.snapshot = Snapshot::new(tick, self.system.t, &self.system.bodies);
        log::trace!("tick {tick}: t = {:.6}, {} bodies", self.system.t, self.system.bodies.len());

        Ok(self.snapshot.clone())
    }

    /// Last published snapshot, without advancing
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Queue `body` for insertion at the next tick and return its new id
    pub fn add_body(&mut self, body: Body) -> Result<BodyId> {
        body.validate()?;
        let id = self.fresh_id();
        self.pending.push(PendingOp::Add(Body { id, ..body }));
        log::debug!("queued add of body {id}");
        Ok(id)
    }

    /// Queue removal of `id` at the next tick boundary.
    ///
    /// A body whose add is still queued is dropped from the queue right away.
    /// Returns false, changing nothing, when the id is neither active nor
    /// queued, or when its removal is already queued.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|op| matches!(op, PendingOp::Add(b) if b.id == id))
        {
            self.pending.remove(pos);
            log::debug!("cancelled queued add of body {id}");
            return true;
        }

        let already_queued = self
            .pending
            .iter()
            .any(|op| matches!(op, PendingOp::Remove(r) if *r == id));
        if already_queued || !self.system.contains(id) {
            return false;
        }

        self.pending.push(PendingOp::Remove(id));
        log::debug!("queued removal of body {id}");
        true
    }

    /// Replace the whole body set and configuration.
    ///
    /// Queued operations are dropped, ids restart at 0, tick count and time
    /// go back to zero and the engine returns to `Ready`. The pause flag is
    /// left alone. On error nothing changes.
    pub fn reset(&mut self, bodies: Vec<Body>, config: SimulationConfig) -> Result<Vec<BodyId>> {
        config.validate()?;
        for b in &bodies {
            b.validate()?;
        }

        self.forces = AccelSet::from_config(&config);
        self.config = config;
        self.pending.clear();
        self.next_id = 0;
        self.tick_count = 0;
        self.state = EngineState::Ready;
        self.system = System::default();

        let ids = self.install(bodies)?;
        log::info!("engine reset with {} bodies", ids.len());
        Ok(ids)
    }

    /// Swap parameters without touching the bodies; effective from the next tick
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        self.forces = AccelSet::from_config(&config);
        self.config = config;
        Ok(())
    }

    pub fn set_gravitational_constant(&mut self, g: f64) -> Result<()> {
        let config = self.config.clone().with_gravitational_constant(g);
        self.set_config(config)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of active bodies (queued adds not included)
    pub fn body_count(&self) -> usize {
        self.system.bodies.len()
    }

    /// Number of queued add/remove operations
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Copy of an active body, `UnknownBody` if there is none with `id`
    pub fn body(&self, id: BodyId) -> Result<Body> {
        self.system
            .get(id)
            .copied()
            .ok_or(SimulationError::UnknownBody(id))
    }

    // helpers ==============================================================================

    fn fresh_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Validate and store `bodies` as the active set, publishing a tick-0 snapshot
    fn install(&mut self, bodies: Vec<Body>) -> Result<Vec<BodyId>> {
        for b in &bodies {
            b.validate()?;
        }
        let bodies: Vec<Body> = bodies
            .into_iter()
            .map(|b| Body { id: self.fresh_id(), ..b })
            .collect();
        let ids = bodies.iter().map(|b| b.id).collect();

        self.system = System::new(bodies);
        self.snapshot = Snapshot::new(self.tick_count, self.system.t, &self.system.bodies);
        Ok(ids)
    }

    fn apply_pending(&self, bodies: &mut Vec<Body>) {
        for op in &self.pending {
            match op {
                PendingOp::Add(b) => bodies.push(*b),
                PendingOp::Remove(id) => bodies.retain(|b| b.id != *id),
            }
        }
    }
}
