// src/math.rs
// Equations of motion for the single and double pendulum, plus the small geometric helpers they share.
// Angles are measured from the downward vertical, counter-clockwise positive; y points up, so a bob hangs at pivot + L·(sin θ, −cos θ).
// The double-pendulum accelerations are the closed-form Lagrangian solution (no linear solve needed for n = 2).
// Everything here is a pure function of its arguments; state ownership lives in pendulum.rs.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A point or offset in world coordinates (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Wraps an angle into (−π, π].
///
/// `%` on `f64` keeps the sign of the dividend, so the remainder lies in (−2π, 2π) and a single ±2π
/// shift lands it in range. Values already in range pass through untouched, which makes the
/// function idempotent. NaN and ±∞ come back as NaN.
pub fn wrap_angle(theta: f64) -> f64 {
    let r = theta % TAU; // Same sign as theta.
    if r > PI {
        r - TAU // (π, 2π) -> (−π, 0).
    } else if r <= -PI {
        r + TAU // (−2π, −π] -> (0, π].
    } else {
        r
    }
}

/// Position of a bob hanging from `pivot` on a rod of `length` at angle `theta`.
pub fn bob_position(pivot: Vec2, length: f64, theta: f64) -> Vec2 {
    let (s, c) = theta.sin_cos();
    Vec2 {
        x: pivot.x + length * s,  // Horizontal offset grows with sin θ.
        y: pivot.y - length * c,  // θ = 0 hangs straight down.
    }
}

/// Angular acceleration of a simple pendulum with linear velocity damping:
/// α = −(g / L)·sin θ − c·ω.
pub fn single_acceleration(theta: f64, omega: f64, length: f64, gravity: f64, damping: f64) -> f64 {
    -(gravity / length) * theta.sin() - damping * omega
}

/// Angular accelerations (α1, α2) of a double pendulum, evaluated once at the given state.
///
/// ```text
/// δ    = θ2 − θ1
/// den1 = (m1 + m2)·L1 − m2·L1·cos²δ
/// den2 = (L2 / L1)·den1
/// ```
/// Linear damping `c·ω` is subtracted from each acceleration afterwards. The denominators are not
/// guarded: `L1 = 0` or `den1 = 0` yields non-finite output.
#[allow(clippy::too_many_arguments)]
pub fn double_accelerations(
    theta1: f64,
    theta2: f64,
    omega1: f64,
    omega2: f64,
    m1: f64,
    m2: f64,
    l1: f64,
    l2: f64,
    gravity: f64,
    damping: f64,
) -> (f64, f64) {
    let g = gravity;
    let m = m1 + m2; // Total mass carried by the upper rod.
    let (sd, cd) = (theta2 - theta1).sin_cos(); // sin δ, cos δ.
    let den1 = m * l1 - m2 * l1 * cd * cd;
    let den2 = (l2 / l1) * den1;
    let w1sq = omega1 * omega1;
    let w2sq = omega2 * omega2;

    let a1 = (m2 * l1 * w1sq * sd * cd
        + m2 * g * theta2.sin() * cd
        + m2 * l2 * w2sq * sd
        - m * g * theta1.sin())
        / den1;

    let a2 = (-m2 * l2 * w2sq * sd * cd
        + m * (g * theta1.sin() * cd - l1 * w1sq * sd - g * theta2.sin()))
        / den2;

    (a1 - damping * omega1, a2 - damping * omega2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 14] = [
        0.0, 0.5, -0.5, 3.0, -3.0, PI, -PI, 4.0, -4.0, 7.5, -7.5, 100.0, -1234.5678, 1.0e6,
    ];

    #[test]
    fn wrap_lands_in_half_open_interval() {
        for &x in SAMPLES.iter() {
            let w = wrap_angle(x);
            assert!(w > -PI && w <= PI, "wrap({x}) = {w} out of (−π, π]");
        }
    }

    #[test]
    fn wrap_is_idempotent() {
        for &x in SAMPLES.iter() {
            let once = wrap_angle(x);
            assert_eq!(wrap_angle(once).to_bits(), once.to_bits(), "x = {x}");
        }
    }

    #[test]
    fn wrap_maps_boundaries() {
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-PI), PI);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_is_congruent_modulo_two_pi() {
        for &x in [0.25, -1.0, 2.5, -2.9].iter() {
            for k in -5..=5 {
                let shifted = wrap_angle(x + TAU * k as f64);
                assert!((shifted - wrap_angle(x)).abs() < 1e-9, "x = {x}, k = {k}");
            }
        }
    }

    #[test]
    fn wrap_of_non_finite_returns_nan() {
        assert!(wrap_angle(f64::NAN).is_nan());
        assert!(wrap_angle(f64::INFINITY).is_nan());
        assert!(wrap_angle(f64::NEG_INFINITY).is_nan());
    }

    #[test]
    fn bob_hangs_below_pivot_at_rest() {
        let p = bob_position(Vec2::new(0.5, 0.25), 2.0, 0.0);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y + 1.75).abs() < 1e-12);

        let side = bob_position(Vec2::ZERO, 1.0, PI / 2.0);
        assert!((side.x - 1.0).abs() < 1e-12);
        assert!(side.y.abs() < 1e-12);
    }

    #[test]
    fn single_acceleration_at_horizontal_is_minus_g_over_l() {
        let a = single_acceleration(PI / 2.0, 0.0, 2.0, 9.807, 0.0);
        assert!((a + 9.807 / 2.0).abs() < 1e-12);
        // Damping opposes velocity.
        let damped = single_acceleration(0.0, 2.0, 1.0, 9.807, 0.5);
        assert!((damped + 1.0).abs() < 1e-12);
    }

    #[test]
    fn double_accelerations_vanish_at_equilibrium() {
        let (a1, a2) = double_accelerations(0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 9.807, 0.0);
        assert_eq!(a1, 0.0);
        assert_eq!(a2, 0.0);
    }

    #[test]
    fn double_accelerations_reduce_to_single_when_lower_mass_vanishes() {
        // With m2 → 0 the upper arm behaves as a simple pendulum.
        let (a1, _) = double_accelerations(0.7, 0.7, 0.0, 0.0, 1.0, 1e-12, 1.5, 1.0, 9.807, 0.0);
        let single = single_acceleration(0.7, 0.0, 1.5, 9.807, 0.0);
        assert!((a1 - single).abs() < 1e-9);
    }

    #[test]
    fn double_accelerations_blow_up_on_zero_upper_length() {
        let (a1, a2) = double_accelerations(0.3, 0.1, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 9.807, 0.0);
        assert!(!a1.is_finite());
        assert!(!a2.is_finite());
    }
}
