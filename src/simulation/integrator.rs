//! Time integrators for the N-body system
//!
//! Both schemes are stateless: everything they need lives in the bodies, the
//! accelerations handed in and the caller-chosen `dt`, so a driver may vary
//! `dt` from one frame to the next.

use super::error::{Result, SimulationError};
use super::forces::AccelSet;
use super::params::IntegratorKind;
use super::states::{Body, NVec2};

/// Reject `dt <= 0` and non-finite steps
pub fn check_timestep(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidTimestep { dt })
    }
}

impl IntegratorKind {
    /// Advance `bodies` by `dt`.
    ///
    /// `accels` must hold the accelerations at the current positions. The
    /// Verlet scheme re-evaluates `forces` at the new positions; the Euler
    /// scheme never touches them.
    pub fn step(self, bodies: &mut [Body], accels: &[NVec2], forces: &AccelSet, dt: f64, damping: f64) -> Result<()> {
        match self {
            IntegratorKind::SemiImplicitEuler => semi_implicit_euler(bodies, accels, dt, damping),
            IntegratorKind::VelocityVerlet => velocity_verlet(bodies, accels, forces, dt, damping),
        }
    }
}

/// Symplectic Euler step
///
/// v_n+1 = (v_n + dt a_n) (1 - damping)
/// x_n+1 = x_n + dt v_n+1
pub fn semi_implicit_euler(bodies: &mut [Body], accels: &[NVec2], dt: f64, damping: f64) -> Result<()> {
    check_timestep(dt)?;
    debug_assert_eq!(bodies.len(), accels.len());

    let keep = 1.0 - damping;
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        b.v += dt * *a;
        if damping > 0.0 {
            b.v *= keep;
        }
        b.x += dt * b.v;
    }
    Ok(())
}

/// Velocity–Verlet step (kick, drift, kick)
///
/// Uses `accels` for the first half kick and one extra force evaluation at
/// the drifted positions for the second. Damping is applied once, after the
/// second kick.
pub fn velocity_verlet(bodies: &mut [Body], accels: &[NVec2], forces: &AccelSet, dt: f64, damping: f64) -> Result<()> {
    check_timestep(dt)?;
    debug_assert_eq!(bodies.len(), accels.len());
    if bodies.is_empty() {
        return Ok(());
    }

    let half_dt = 0.5 * dt;

    // Kick: v_n+1/2 = v_n + (dt/2) a_n
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt v_n+1/2
    for b in bodies.iter_mut() {
        b.x += dt * b.v;
    }

    // a_n+1 from x_n+1
    let a_new = forces.accelerations(bodies);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
    let keep = 1.0 - damping;
    for (b, a) in bodies.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
        if damping > 0.0 {
            b.v *= keep;
        }
    }
    Ok(())
}
