//! Collision handling after integration
//!
//! Pairs are visited in a fixed order (`i` ascending, then `j > i`
//! ascending), so a given body set always resolves the same way.
//!
//! - `merge`: overlapping bodies fuse into one, conserving mass and momentum
//! - `bounce`: overlapping bodies are pushed apart and exchange an impulse
//!   along the line of centres
//! - `none`: nothing happens
//!
//! Walls (`Bounds`) are handled separately by [`confine_to_bounds`].

use crate::simulation::error::Result;
use crate::simulation::params::{Bounds, CollisionMode};
use crate::simulation::states::{Body, NVec2};
use crate::simulation::vector;

/// What one resolution pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub merges: usize,
    pub bounces: usize,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.merges == 0 && self.bounces == 0
    }
}

/// Centres closer than the sum of radii
pub fn overlapping(a: &Body, b: &Body) -> bool {
    let reach = a.radius + b.radius;
    (b.x - a.x).norm_squared() < reach * reach
}

/// Resolve every overlap in `bodies` according to `mode`
///
/// Merged-away bodies are removed from the vector before returning.
pub fn resolve_collisions(mode: CollisionMode, restitution: f64, bodies: &mut Vec<Body>) -> Result<CollisionReport> {
    match mode {
        CollisionMode::None => Ok(CollisionReport::default()),
        CollisionMode::Merge => Ok(merge_overlapping(bodies)),
        CollisionMode::Bounce => bounce_overlapping(restitution, bodies),
    }
}

/// Fuse two bodies.
///
/// - mass: m_a + m_b
/// - velocity: (m_a v_a + m_b v_b) / (m_a + m_b)
/// - position: centre of mass
/// - radius: (r_a^3 + r_b^3)^(1/3), i.e. constant density
///
/// The result keeps the id of the heavier body (`a` on a tie).
pub fn merge_bodies(a: &Body, b: &Body) -> Body {
    let total_mass = a.m + b.m;
    let id = if b.m > a.m { b.id } else { a.id };

    Body {
        id,
        x: (a.x * a.m + b.x * b.m) / total_mass,
        v: (a.momentum() + b.momentum()) / total_mass,
        m: total_mass,
        radius: (a.radius.powi(3) + b.radius.powi(3)).cbrt(),
    }
}

fn merge_overlapping(bodies: &mut Vec<Body>) -> CollisionReport {
    let n = bodies.len();
    let mut consumed = vec![false; n];
    let mut report = CollisionReport::default();

    // a grown survivor can reach bodies it was already checked against, so
    // sweep again until a full pass merges nothing
    loop {
        let merges_before = report.merges;
        for i in 0..n {
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..n {
                if consumed[j] || !overlapping(&bodies[i], &bodies[j]) {
                    continue;
                }
                // the survivor stays in slot i and keeps checking with its new
                // mass and radius
                let merged = merge_bodies(&bodies[i], &bodies[j]);
                log::debug!(
                    "merge {} + {} -> {} (m = {:.4})",
                    bodies[i].id, bodies[j].id, merged.id, merged.m
                );
                bodies[i] = merged;
                consumed[j] = true;
                report.merges += 1;
            }
        }
        if report.merges == merges_before {
            break;
        }
    }

    if report.merges > 0 {
        let mut idx = 0;
        bodies.retain(|_| {
            let keep = !consumed[idx];
            idx += 1;
            keep
        });
    }
    report
}

fn bounce_overlapping(restitution: f64, bodies: &mut [Body]) -> Result<CollisionReport> {
    let n = bodies.len();
    let mut report = CollisionReport::default();

    for i in 0..n {
        for j in (i + 1)..n {
            if !overlapping(&bodies[i], &bodies[j]) {
                continue;
            }
            let (head, tail) = bodies.split_at_mut(j);
            bounce_pair(&mut head[i], &mut tail[0], restitution)?;
            report.bounces += 1;
        }
    }
    Ok(report)
}

/// Separate an overlapping pair and exchange momentum along the normal.
///
/// The overlap is split in inverse proportion to mass, so the pair's centre
/// of mass does not move. The impulse
///
/// J = (1 + e) (v_a - v_b)·n / (1/m_a + 1/m_b)
///
/// is only applied while the bodies approach each other. Coincident centres
/// have no normal and fail with `DegenerateVector`.
pub fn bounce_pair(a: &mut Body, b: &mut Body, restitution: f64) -> Result<()> {
    let delta = b.x - a.x;
    let n = vector::normalize(delta)?;
    let dist = vector::magnitude(delta);

    let total_mass = a.m + b.m;
    let overlap = a.radius + b.radius - dist;
    if overlap > 0.0 {
        a.x -= n * (overlap * b.m / total_mass);
        b.x += n * (overlap * a.m / total_mass);
    }

    let approach = vector::dot(a.v - b.v, n);
    if approach > 0.0 {
        let impulse = (1.0 + restitution) * approach / (1.0 / a.m + 1.0 / b.m);
        a.v -= n * (impulse / a.m);
        b.v += n * (impulse / b.m);
    }
    Ok(())
}

/// Keep bodies inside an origin-centred box.
///
/// A body past a wall is put back at `wall ∓ radius`, the offending velocity
/// component is turned inward and the whole velocity is scaled by
/// `1 - wall_damping`. Returns the number of bodies that hit a wall.
pub fn confine_to_bounds(bounds: &Bounds, bodies: &mut [Body]) -> usize {
    let mut hits = 0;
    for b in bodies.iter_mut() {
        let (x, vx, hit_x) = reflect_axis(b.x.x, b.v.x, bounds.half_width, b.radius);
        let (y, vy, hit_y) = reflect_axis(b.x.y, b.v.y, bounds.half_height, b.radius);
        if hit_x || hit_y {
            b.x = NVec2::new(x, y);
            b.v = NVec2::new(vx, vy) * (1.0 - bounds.wall_damping);
            hits += 1;
        }
    }
    hits
}

fn reflect_axis(p: f64, v: f64, half: f64, radius: f64) -> (f64, f64, bool) {
    // a body wider than the box sits in the middle
    let limit = (half - radius).max(0.0);
    if p < -limit {
        (-limit, v.abs(), true)
    } else if p > limit {
        (limit, -v.abs(), true)
    } else {
        (p, v, false)
    }
}
