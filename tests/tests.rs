use gravitypie::benchmark::benchmark::make_bodies;
use gravitypie::simulation::collision::{bounce_pair, overlapping};
use gravitypie::simulation::vector;
use gravitypie::{
    confine_to_bounds, merge_bodies, resolve_collisions, semi_implicit_euler, velocity_verlet,
    AccelSet, Acceleration, Body, BodyId, Bounds, CollisionMode, Engine, NVec2,
    NewtonianGravity, NewtonianGravityBarnesHut, SimulationConfig, SimulationError,
};

/// Body at (x, y) moving with (vx, vy)
pub fn body(x: f64, y: f64, vx: f64, vy: f64, m: f64, radius: f64) -> Body {
    Body::new(NVec2::new(x, y), NVec2::new(vx, vy), m, radius)
}

/// Build a simple 2-body set separated along the x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> Vec<Body> {
    vec![
        body(-dist / 2.0, 0.0, 0.0, 0.0, m1, 0.0),
        body(dist / 2.0, 0.0, 0.0, 0.0, m2, 0.0),
    ]
}

/// Build a gravity term + AccelSet
pub fn gravity_set(g: f64, softening: f64) -> AccelSet {
    AccelSet::new().with(NewtonianGravity {
        g,
        softening,
        parallel: false,
    })
}

fn momentum(bodies: &[Body]) -> NVec2 {
    bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.momentum())
}

fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

// ==================================================================================
// Vector tests
// ==================================================================================

#[test]
fn vector_basic_operations() {
    let a = NVec2::new(3.0, 4.0);
    let b = NVec2::new(1.0, -2.0);

    assert_eq!(vector::add(a, b), NVec2::new(4.0, 2.0));
    assert_eq!(vector::subtract(a, b), NVec2::new(2.0, 6.0));
    assert_eq!(vector::scale(a, 2.0), NVec2::new(6.0, 8.0));
    assert_eq!(vector::magnitude_squared(a), 25.0);
    assert_eq!(vector::magnitude(a), 5.0);
    assert_eq!(vector::distance(NVec2::zeros(), a), 5.0);
    assert_eq!(vector::dot(a, b), -5.0);
}

#[test]
fn vector_normalize_unit_length() {
    let n = vector::normalize(NVec2::new(3.0, 4.0)).unwrap();
    assert!((n.norm() - 1.0).abs() < 1e-15);
    assert!((n.x - 0.6).abs() < 1e-15 && (n.y - 0.8).abs() < 1e-15);
}

#[test]
fn vector_normalize_zero_is_degenerate() {
    assert_eq!(
        vector::normalize(NVec2::zeros()),
        Err(SimulationError::DegenerateVector)
    );
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let bodies = two_body_system(1.0, 2.0, 3.0);
    let forces = gravity_set(0.1, 0.0);

    let acc = forces.accelerations(&bodies);
    let net = acc[0] * bodies[0].m + acc[1] * bodies[1].m;

    assert!(net.norm() < 1e-12, "Net force not zero: {:?}", net);
}

#[test]
fn gravity_points_toward_other_body() {
    let bodies = two_body_system(2.0, 1.0, 1.0);
    let forces = gravity_set(0.1, 0.0);

    let acc = forces.accelerations(&bodies);
    let dx = bodies[1].x - bodies[0].x;

    assert!(acc[0].dot(&dx) > 0.0, "Acceleration is not toward second body");
    assert!(acc[1].dot(&dx) < 0.0, "Acceleration is not toward first body");
}

#[test]
fn gravity_inverse_square_law() {
    let forces = gravity_set(0.1, 0.0);

    let acc_r = forces.accelerations(&two_body_system(1.0, 1.0, 1.0));
    let acc_2r = forces.accelerations(&two_body_system(2.0, 1.0, 1.0));

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "Expected 4x, got {}", ratio);
}

#[test]
fn gravity_matches_softened_formula() {
    let (g, s, d, m2) = (0.7, 0.3, 2.0, 5.0);
    let bodies = two_body_system(d, 1.0, m2);
    let acc = gravity_set(g, s).accelerations(&bodies);

    let expected = g * m2 * d / (d * d + s * s).powf(1.5);
    assert!((acc[0].x - expected).abs() < 1e-12, "got {}, expected {}", acc[0].x, expected);
    assert_eq!(acc[0].y, 0.0);
}

#[test]
fn gravity_softening_prevents_blowup() {
    let bodies = two_body_system(1e-9, 1.0, 1.0);
    let acc = gravity_set(0.1, 0.3).accelerations(&bodies);

    assert!(acc[0].norm() < 1e9, "Softening failed; acceleration too large");
    assert!(acc[0].x.is_finite());
}

#[test]
fn gravity_single_body_feels_nothing() {
    let bodies = vec![body(1.0, 1.0, 0.0, 0.0, 10.0, 0.0)];
    let acc = gravity_set(1.0, 0.0).accelerations(&bodies);
    assert_eq!(acc, vec![NVec2::zeros()]);
}

#[test]
fn gravity_is_deterministic() {
    let bodies = make_bodies(200);
    let forces = gravity_set(0.1, 0.01);

    let a = forces.accelerations(&bodies);
    let b = forces.accelerations(&bodies);
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.x.to_bits(), y.x.to_bits());
        assert_eq!(x.y.to_bits(), y.y.to_bits());
    }
}

#[test]
fn gravity_parallel_matches_serial_bitwise() {
    let bodies = make_bodies(500);
    let serial = gravity_set(0.1, 0.01).accelerations(&bodies);
    let parallel = AccelSet::new()
        .with(NewtonianGravity { g: 0.1, softening: 0.01, parallel: true })
        .accelerations(&bodies);

    for (i, (s, p)) in serial.iter().zip(parallel.iter()).enumerate() {
        assert_eq!(s.x.to_bits(), p.x.to_bits(), "row {i} differs in x");
        assert_eq!(s.y.to_bits(), p.y.to_bits(), "row {i} differs in y");
    }
}

#[test]
fn accel_set_sums_terms() {
    let bodies = two_body_system(1.0, 1.0, 1.0);
    let single = gravity_set(0.5, 0.0).accelerations(&bodies);
    let doubled = AccelSet::new()
        .with(NewtonianGravity { g: 0.5, softening: 0.0, parallel: false })
        .with(NewtonianGravity { g: 0.5, softening: 0.0, parallel: false })
        .accelerations(&bodies);

    assert!((doubled[0] - single[0] * 2.0).norm() < 1e-15);
    assert!(AccelSet::new().is_empty());
    assert_eq!(gravity_set(0.5, 0.0).len(), 1);
}

// ==================================================================================
// Barnes-Hut tests
// ==================================================================================

#[test]
fn barnes_hut_theta_zero_matches_direct() {
    let bodies = make_bodies(300);
    let direct = gravity_set(0.1, 0.01).accelerations(&bodies);

    let mut bh = vec![NVec2::zeros(); bodies.len()];
    NewtonianGravityBarnesHut { g: 0.1, softening: 0.01, theta: 0.0 }.acceleration(&bodies, &mut bh);

    for (d, b) in direct.iter().zip(bh.iter()) {
        assert!((d - b).norm() <= 1e-9 * d.norm().max(1.0), "direct {:?} vs tree {:?}", d, b);
    }
}

#[test]
fn barnes_hut_approximates_direct() {
    let bodies = make_bodies(1000);
    let direct = gravity_set(0.1, 0.01).accelerations(&bodies);

    let mut bh = vec![NVec2::zeros(); bodies.len()];
    NewtonianGravityBarnesHut { g: 0.1, softening: 0.01, theta: 0.5 }.acceleration(&bodies, &mut bh);

    let err: f64 = direct.iter().zip(bh.iter()).map(|(d, b)| (d - b).norm()).sum();
    let scale: f64 = direct.iter().map(|d| d.norm()).sum();
    assert!(err / scale < 0.05, "aggregate relative error {}", err / scale);
}

#[test]
fn barnes_hut_wide_opening_angle_never_pulls_on_itself() {
    // with a huge theta the root would pass the opening test for either body,
    // but it holds that body's own mass
    let bodies = two_body_system(2.0, 1.0, 3.0);
    let direct = gravity_set(1.0, 0.01).accelerations(&bodies);

    let mut bh = vec![NVec2::zeros(); bodies.len()];
    NewtonianGravityBarnesHut { g: 1.0, softening: 0.01, theta: 10.0 }.acceleration(&bodies, &mut bh);

    for (d, b) in direct.iter().zip(bh.iter()) {
        assert!((d - b).norm() < 1e-12, "direct {:?} vs tree {:?}", d, b);
    }
}

#[test]
fn barnes_hut_handles_coincident_bodies() {
    let bodies = vec![
        body(1.0, 1.0, 0.0, 0.0, 1.0, 0.0),
        body(1.0, 1.0, 0.0, 0.0, 1.0, 0.0),
        body(-2.0, 0.5, 0.0, 0.0, 3.0, 0.0),
    ];
    let mut bh = vec![NVec2::zeros(); bodies.len()];
    NewtonianGravityBarnesHut { g: 1.0, softening: 0.1, theta: 0.5 }.acceleration(&bodies, &mut bh);

    let direct = gravity_set(1.0, 0.1).accelerations(&bodies);
    for (d, b) in direct.iter().zip(bh.iter()) {
        assert!(b.x.is_finite() && b.y.is_finite());
        assert!((d - b).norm() < 1e-9);
    }
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn integrator_rejects_non_positive_dt() {
    let mut bodies = two_body_system(1.0, 1.0, 1.0);
    let accels = vec![NVec2::zeros(); 2];
    let forces = gravity_set(1.0, 0.0);

    for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            semi_implicit_euler(&mut bodies, &accels, dt, 0.0),
            Err(SimulationError::InvalidTimestep { .. })
        ));
        assert!(matches!(
            velocity_verlet(&mut bodies, &accels, &forces, dt, 0.0),
            Err(SimulationError::InvalidTimestep { .. })
        ));
    }
    assert_eq!(bodies, two_body_system(1.0, 1.0, 1.0), "failed step moved bodies");
}

#[test]
fn semi_implicit_euler_updates_velocity_first() {
    let mut bodies = vec![body(0.0, 0.0, 0.0, 0.0, 1.0, 0.0)];
    let accels = vec![NVec2::new(1.0, 0.0)];

    semi_implicit_euler(&mut bodies, &accels, 1.0, 0.0).unwrap();

    // explicit Euler would leave x at 0
    assert_eq!(bodies[0].v, NVec2::new(1.0, 0.0));
    assert_eq!(bodies[0].x, NVec2::new(1.0, 0.0));
}

#[test]
fn semi_implicit_euler_applies_damping() {
    let mut bodies = vec![body(0.0, 0.0, 1.0, 0.0, 1.0, 0.0)];
    let accels = vec![NVec2::zeros()];

    semi_implicit_euler(&mut bodies, &accels, 1.0, 0.25).unwrap();

    assert_eq!(bodies[0].v, NVec2::new(0.75, 0.0));
    assert_eq!(bodies[0].x, NVec2::new(0.75, 0.0));
}

#[test]
fn velocity_verlet_free_particle_drifts() {
    let mut bodies = vec![body(1.0, 2.0, 0.5, -0.25, 1.0, 0.0)];
    let accels = vec![NVec2::zeros()];

    velocity_verlet(&mut bodies, &accels, &AccelSet::new(), 2.0, 0.0).unwrap();

    assert_eq!(bodies[0].x, NVec2::new(2.0, 1.5));
    assert_eq!(bodies[0].v, NVec2::new(0.5, -0.25));
}

#[test]
fn tick_conserves_momentum_without_collisions() {
    let bodies = vec![
        body(-1.0, 0.0, 0.1, 0.3, 2.0, 0.0),
        body(1.0, 0.5, -0.2, 0.0, 1.0, 0.0),
        body(0.3, -1.2, 0.0, -0.4, 3.5, 0.0),
        body(2.0, 2.0, 0.05, 0.05, 0.5, 0.0),
    ];
    let p0 = momentum(&bodies);

    let config = SimulationConfig::default().with_softening(0.05);
    let mut engine = Engine::with_bodies(bodies, config).unwrap();
    let mut snap = engine.snapshot();
    for _ in 0..500 {
        snap = engine.tick(0.001).unwrap();
    }

    let p1 = snap.total_momentum();
    assert!((p1 - p0).norm() < 1e-10, "momentum drifted from {:?} to {:?}", p0, p1);
}

/// Circular two-body orbit, G = 1, m = 1 + 1, separation 1
fn circular_orbit(config: SimulationConfig) -> Engine {
    let s = std::f64::consts::FRAC_1_SQRT_2; // half of the relative speed sqrt(2)
    let bodies = vec![
        body(-0.5, 0.0, 0.0, -s, 1.0, 0.0),
        body(0.5, 0.0, 0.0, s, 1.0, 0.0),
    ];
    Engine::with_bodies(bodies, config).unwrap()
}

#[test]
fn two_body_orbit_period_matches_kepler() {
    let config = SimulationConfig::default().with_softening(0.0);
    let mut engine = circular_orbit(config);
    let dt = 1e-3;
    let expected = 2.0 * std::f64::consts::PI / 2f64.sqrt();
    let e0 = engine.snapshot().total_energy(1.0, 0.0);

    let separation = |bodies: &[Body]| bodies[1].x - bodies[0].x;
    let mut prev = separation(engine.snapshot().bodies());
    let mut swept = 0.0;
    let mut period = None;

    for _ in 0..6000 {
        let snap = engine.tick(dt).unwrap();
        let cur = separation(snap.bodies());
        let r = cur.norm();
        assert!((0.98..1.02).contains(&r), "separation left the circle: {}", r);

        let step = (prev.x * cur.y - prev.y * cur.x).atan2(prev.dot(&cur));
        let target = 2.0 * std::f64::consts::PI;
        if swept + step >= target {
            // interpolate the crossing inside this step
            let frac = (target - swept) / step;
            period = Some(snap.t - dt + frac * dt);
            let e1 = snap.total_energy(1.0, 0.0);
            assert!(((e1 - e0) / e0).abs() < 1e-2, "energy drifted {} -> {}", e0, e1);
            break;
        }
        swept += step;
        prev = cur;
    }

    let period = period.expect("orbit never completed");
    assert!(
        ((period - expected) / expected).abs() < 1e-2,
        "period {} vs kepler {}", period, expected
    );
}

#[test]
fn verlet_orbit_keeps_energy_bounded() {
    let config = SimulationConfig {
        integrator: gravitypie::IntegratorKind::VelocityVerlet,
        ..SimulationConfig::default().with_softening(0.0)
    };
    let mut engine = circular_orbit(config);
    let e0 = engine.snapshot().total_energy(1.0, 0.0);

    for _ in 0..10_000 {
        engine.tick(1e-3).unwrap();
    }
    let e1 = engine.snapshot().total_energy(1.0, 0.0);
    assert!(((e1 - e0) / e0).abs() < 1e-4, "energy drifted {} -> {}", e0, e1);
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn merge_head_on_conserves_mass_and_momentum() {
    let mut bodies = vec![
        body(-0.5, 0.0, 1.0, 0.0, 2.0, 0.6),
        body(0.5, 0.0, -1.0, 0.0, 2.0, 0.6),
    ];

    let report = resolve_collisions(CollisionMode::Merge, 1.0, &mut bodies).unwrap();

    assert_eq!(report.merges, 1);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].m, 4.0);
    assert_eq!(bodies[0].v, NVec2::zeros());
    assert_eq!(bodies[0].x, NVec2::zeros());
    assert!(bodies[0].radius > 0.6, "merged radius must grow");
    assert!((bodies[0].radius - (2.0 * 0.6f64.powi(3)).cbrt()).abs() < 1e-12);
}

#[test]
fn merge_keeps_heavier_id() {
    let mut light = body(0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
    light.id = BodyId(3);
    let mut heavy = body(0.5, 0.0, 0.0, 0.0, 9.0, 1.0);
    heavy.id = BodyId(8);

    assert_eq!(merge_bodies(&light, &heavy).id, BodyId(8));
    assert_eq!(merge_bodies(&heavy, &light).id, BodyId(8));

    // tie goes to the first body
    let mut twin = heavy;
    twin.id = BodyId(1);
    assert_eq!(merge_bodies(&heavy, &twin).id, BodyId(8));
}

#[test]
fn merged_away_body_takes_no_further_part() {
    // A overlaps B, B overlaps C, the merged AB does not reach C
    let mut bodies = vec![
        body(0.0, 0.0, 0.0, 0.0, 1.0, 1.0),
        body(1.5, 0.0, 0.0, 0.0, 1.0, 1.0),
        body(3.2, 0.0, 0.0, 0.0, 1.0, 1.0),
    ];
    let c = bodies[2];

    let report = resolve_collisions(CollisionMode::Merge, 1.0, &mut bodies).unwrap();

    assert_eq!(report.merges, 1);
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0].m, 2.0);
    assert_eq!(bodies[1], c);
}

#[test]
fn merge_rechecks_grown_body() {
    // A fuses with C first; only the grown AC body reaches B
    let mut bodies = vec![
        body(0.0, 0.0, 0.0, 0.0, 1.0, 1.0),
        body(1.6, 0.0, 0.0, 0.0, 1.0, 0.5),
        body(1.0, 0.0, 0.0, 0.0, 100.0, 1.0),
    ];
    for (i, b) in bodies.iter_mut().enumerate() {
        b.id = BodyId(i as u64);
    }

    let report = resolve_collisions(CollisionMode::Merge, 1.0, &mut bodies).unwrap();

    assert_eq!(report.merges, 2);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].m, 102.0);
    assert_eq!(bodies[0].id, BodyId(2));
    assert!((bodies[0].x.x - 101.6 / 102.0).abs() < 1e-12);
}

#[test]
fn merge_cascade_conserves_totals() {
    let mut bodies: Vec<Body> = (0..40)
        .map(|i| {
            let f = i as f64;
            body((f * 0.37).sin(), (f * 0.13).cos(), (f * 0.7).cos(), (f * 0.3).sin(), 1.0 + f * 0.1, 0.2)
        })
        .collect();
    let m0: f64 = bodies.iter().map(|b| b.m).sum();
    let p0 = momentum(&bodies);

    let report = resolve_collisions(CollisionMode::Merge, 1.0, &mut bodies).unwrap();
    assert!(report.merges > 0);

    let m1: f64 = bodies.iter().map(|b| b.m).sum();
    assert!((m1 - m0).abs() < 1e-9);
    assert!((momentum(&bodies) - p0).norm() < 1e-9);

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            assert!(!overlapping(&bodies[i], &bodies[j]), "{} and {} still overlap", bodies[i].id, bodies[j].id);
        }
    }
}

#[test]
fn bounce_equal_masses_swap_velocities() {
    let mut bodies = vec![
        body(-0.5, 0.0, 1.0, 0.0, 1.0, 0.6),
        body(0.5, 0.0, -1.0, 0.0, 1.0, 0.6),
    ];

    let report = resolve_collisions(CollisionMode::Bounce, 1.0, &mut bodies).unwrap();

    assert_eq!(report.bounces, 1);
    assert_eq!(bodies[0].v, NVec2::new(-1.0, 0.0));
    assert_eq!(bodies[1].v, NVec2::new(1.0, 0.0));
    assert!((bodies[1].x.x - bodies[0].x.x - 1.2).abs() < 1e-12, "pair was not separated");
}

#[test]
fn bounce_unequal_masses_is_elastic() {
    let mut a = body(0.0, 0.0, 2.0, 0.5, 1.0, 0.5);
    let mut b = body(0.6, 0.3, -1.0, 0.0, 3.0, 0.5);
    let before = [a, b];

    bounce_pair(&mut a, &mut b, 1.0).unwrap();

    let after = [a, b];
    assert!((momentum(&after) - momentum(&before)).norm() < 1e-12);
    assert!((kinetic_energy(&after) - kinetic_energy(&before)).abs() < 1e-12);
    // centre of mass does not move while separating
    let com = |bs: &[Body; 2]| (bs[0].x * bs[0].m + bs[1].x * bs[1].m) / (bs[0].m + bs[1].m);
    assert!((com(&after) - com(&before)).norm() < 1e-12);
}

#[test]
fn bounce_inelastic_loses_energy() {
    let mut a = body(0.0, 0.0, 1.0, 0.0, 1.0, 0.5);
    let mut b = body(0.8, 0.0, -1.0, 0.0, 1.0, 0.5);
    let before = kinetic_energy(&[a, b]);

    bounce_pair(&mut a, &mut b, 0.5).unwrap();

    assert!(kinetic_energy(&[a, b]) < before);
    assert!((momentum(&[a, b])).norm() < 1e-12);
}

#[test]
fn bounce_leaves_separating_velocities_alone() {
    let mut a = body(0.0, 0.0, -1.0, 0.0, 1.0, 0.5);
    let mut b = body(0.8, 0.0, 1.0, 0.0, 1.0, 0.5);

    bounce_pair(&mut a, &mut b, 1.0).unwrap();

    assert_eq!(a.v, NVec2::new(-1.0, 0.0));
    assert_eq!(b.v, NVec2::new(1.0, 0.0));
    assert!((b.x.x - a.x.x - 1.0).abs() < 1e-12, "pair was not separated");
}

#[test]
fn bounce_coincident_bodies_is_degenerate() {
    let mut bodies = vec![
        body(1.0, 1.0, 0.0, 0.0, 1.0, 0.5),
        body(1.0, 1.0, 0.0, 0.0, 1.0, 0.5),
    ];
    assert_eq!(
        resolve_collisions(CollisionMode::Bounce, 1.0, &mut bodies),
        Err(SimulationError::DegenerateVector)
    );
}

#[test]
fn none_mode_allows_overlap() {
    let mut bodies = vec![
        body(0.0, 0.0, 1.0, 0.0, 1.0, 1.0),
        body(0.1, 0.0, -1.0, 0.0, 1.0, 1.0),
    ];
    let before = bodies.clone();

    let report = resolve_collisions(CollisionMode::None, 1.0, &mut bodies).unwrap();

    assert!(report.is_empty());
    assert_eq!(bodies, before);
}

#[test]
fn bounds_reflect_bodies_back_inside() {
    let bounds = Bounds { half_width: 10.0, half_height: 5.0, wall_damping: 0.5 };
    let mut bodies = vec![
        body(10.5, 0.0, 2.0, 1.0, 1.0, 1.0),
        body(0.0, -7.0, 0.0, -4.0, 1.0, 0.0),
        body(1.0, 1.0, 3.0, 3.0, 1.0, 0.5),
    ];

    let hits = confine_to_bounds(&bounds, &mut bodies);

    assert_eq!(hits, 2);
    assert_eq!(bodies[0].x, NVec2::new(9.0, 0.0));
    assert_eq!(bodies[0].v, NVec2::new(-1.0, 0.5));
    assert_eq!(bodies[1].x, NVec2::new(0.0, -5.0));
    assert_eq!(bodies[1].v, NVec2::new(0.0, 2.0));
    assert_eq!(bodies[2].v, NVec2::new(3.0, 3.0));
}
