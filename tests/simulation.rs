use std::f64::consts::{FRAC_PI_2, PI};

use pendulum_sim::{
    DoubleSpawn, PendulumCollection, PendulumModel, PhysicsParams, SimConfig, Simulation,
    SingleSpawn, Vec2,
};

const EARTH: f64 = 9.807;

/// Unit single pendulum, undamped.
fn single_sim(theta: f64, fixed_sub_step: f64) -> Simulation {
    let config = SimConfig {
        damping: 0.0,
        fixed_sub_step,
        ..SimConfig::default()
    };
    let mut sim = Simulation::from_config(&config).unwrap();
    sim.pendulums
        .spawn_single(&SingleSpawn {
            theta,
            mass: 1.0,
            length: 1.0,
            ..SingleSpawn::default()
        })
        .unwrap();
    sim
}

fn single_state(sim: &Simulation, index: usize) -> (f64, f64) {
    match sim.pendulums.get(index).unwrap().model {
        PendulumModel::Single(s) => (s.theta, s.omega),
        PendulumModel::Double(_) => panic!("pendulum #{index} is not single"),
    }
}

#[test]
fn one_sub_step_from_horizontal() {
    let mut c = PendulumCollection::new();
    c.spawn_single(&SingleSpawn {
        theta: FRAC_PI_2,
        mass: 1.0,
        length: 1.0,
        ..SingleSpawn::default()
    })
    .unwrap();
    c.step(&PhysicsParams::new(EARTH, 0.0).unwrap(), 0.001);

    match c.get(0).unwrap().model {
        PendulumModel::Single(s) => {
            assert!((s.omega + 0.009807).abs() < 1e-12);
            assert!((s.theta - (FRAC_PI_2 - 0.009807 * 0.001)).abs() < 1e-12);
        }
        PendulumModel::Double(_) => unreachable!(),
    }
}

#[test]
fn resting_single_never_drifts() {
    let mut sim = single_sim(0.0, 0.001);
    sim.update_params(None, Some(1000.0), None).unwrap();
    for _ in 0..120 {
        sim.advance(1.0 / 60.0);
    }
    assert_eq!(single_state(&sim, 0), (0.0, 0.0));
}

#[test]
fn resting_double_never_drifts() {
    let mut sim = Simulation::from_config(&SimConfig::default()).unwrap();
    sim.pendulums
        .spawn_double(&DoubleSpawn {
            theta1: 0.0,
            theta2: 0.0,
            mass1: 1.0,
            mass2: 1.0,
            length1: 1.0,
            length2: 1.0,
            ..DoubleSpawn::default()
        })
        .unwrap();
    for _ in 0..60 {
        sim.advance(1.0 / 60.0);
    }
    match sim.pendulums.get(0).unwrap().model {
        PendulumModel::Double(d) => {
            assert_eq!((d.theta1, d.theta2, d.omega1, d.omega2), (0.0, 0.0, 0.0, 0.0));
        }
        PendulumModel::Single(_) => unreachable!(),
    }
}

#[test]
fn small_oscillation_period_matches_theory() {
    let mut sim = single_sim(0.05, 0.0001);
    let expected = 2.0 * PI * (1.0 / EARTH).sqrt();

    // Time between two successive upward zero crossings of θ.
    let dt = 0.0005;
    let mut t = 0.0;
    let mut prev = single_state(&sim, 0).0;
    let mut crossings = Vec::new();
    while crossings.len() < 2 && t < 10.0 {
        sim.advance(dt);
        t += dt;
        let theta = single_state(&sim, 0).0;
        if prev < 0.0 && theta >= 0.0 {
            crossings.push(t);
        }
        prev = theta;
    }
    assert_eq!(crossings.len(), 2);
    let period = crossings[1] - crossings[0];
    assert!(
        (period - expected).abs() / expected < 0.01,
        "period {period}, expected {expected}"
    );
}

#[test]
fn damping_bleeds_off_amplitude() {
    let mut sim = single_sim(1.0, 0.001);
    sim.update_params(None, None, Some(0.5)).unwrap();
    for _ in 0..(9 * 60) {
        sim.advance(1.0 / 60.0);
    }
    let mut peak: f64 = 0.0;
    for _ in 0..60 {
        sim.advance(1.0 / 60.0);
        peak = peak.max(single_state(&sim, 0).0.abs());
    }
    assert!(peak < 0.2, "amplitude still {peak} after 10 s");
}

#[test]
fn angles_stay_wrapped_while_spinning() {
    let mut sim = single_sim(0.0, 0.001);
    sim.pendulums
        .get_mut(0)
        .unwrap()
        .apply(&pendulum_sim::PendulumPatch {
            omega: Some(40.0),
            ..Default::default()
        })
        .unwrap();
    for _ in 0..300 {
        sim.advance(1.0 / 60.0);
        let (theta, _) = single_state(&sim, 0);
        assert!(theta > -PI && theta <= PI, "θ = {theta}");
    }
}

#[test]
fn trail_bound_holds_over_long_runs() {
    let mut sim = Simulation::from_config(&SimConfig::default()).unwrap();
    sim.pendulums
        .spawn_double(&DoubleSpawn {
            max_trail_length: 5,
            ..DoubleSpawn::default()
        })
        .unwrap();
    for _ in 0..120 {
        sim.advance(1.0 / 60.0);
        assert!(sim.pendulums.get(0).unwrap().trail().len() <= 5);
    }
    let p = sim.pendulums.get(0).unwrap();
    assert_eq!(p.trail().len(), 5);

    // The newest sample is at most one sample interval behind the outer bob.
    let tip = *p.bobs().last().unwrap();
    let newest = p.trail().latest().unwrap();
    let gap = ((newest.x - tip.x).powi(2) + (newest.y - tip.y).powi(2)).sqrt();
    assert!(gap < 0.5);
}

#[test]
fn frozen_pendulum_ignores_frames() {
    let mut sim = Simulation::from_config(&SimConfig::default()).unwrap();
    sim.spawn_double_default().unwrap();
    sim.spawn_single_default().unwrap();
    sim.advance(0.1);

    sim.pendulums.set_frozen(0, true).unwrap();
    let frozen = sim.pendulums.get(0).unwrap().clone();
    let moving_before = sim.pendulums.get(1).unwrap().model;
    for _ in 0..30 {
        sim.advance(1.0 / 60.0);
    }
    assert_eq!(sim.pendulums.get(0).unwrap(), &frozen);
    assert_ne!(sim.pendulums.get(1).unwrap().model, moving_before);

    // Unfreezing resumes motion.
    sim.pendulums.set_frozen(0, false).unwrap();
    sim.advance(0.05);
    assert_ne!(sim.pendulums.get(0).unwrap().model, frozen.model);
}

#[test]
fn deleting_front_shifts_indices() {
    let mut sim = Simulation::from_config(&SimConfig::default()).unwrap();
    for theta in [0.1, 0.2, 0.3] {
        sim.pendulums
            .spawn_single(&SingleSpawn {
                theta,
                ..SingleSpawn::default()
            })
            .unwrap();
    }
    sim.pendulums.delete_at(0).unwrap();
    assert!((single_state(&sim, 0).0 - 0.2).abs() < 1e-12);
    assert!((single_state(&sim, 1).0 - 0.3).abs() < 1e-12);
    assert!(sim.pendulums.get(2).is_err());
}

#[test]
fn reset_after_motion_restores_rest_and_keeps_setup() {
    let mut sim = Simulation::from_config(&SimConfig::default()).unwrap();
    sim.pendulums
        .spawn_single(&SingleSpawn {
            mass: 2.5,
            length: 0.8,
            pivot: Vec2::new(-0.5, 0.3),
            ..SingleSpawn::default()
        })
        .unwrap();
    for _ in 0..60 {
        sim.advance(1.0 / 60.0);
    }
    sim.pendulums.set_frozen(0, true).unwrap();
    sim.pendulums.reset_at(0).unwrap();

    let p = sim.pendulums.get(0).unwrap();
    match p.model {
        PendulumModel::Single(s) => {
            assert_eq!((s.theta, s.omega), (0.0, 0.0));
            assert_eq!((s.mass, s.length), (2.5, 0.8));
            assert_eq!(s.pivot, Vec2::new(-0.5, 0.3));
        }
        PendulumModel::Double(_) => unreachable!(),
    }
    assert!(p.frozen);
    assert!(p.trail().is_empty());
}
