// src/pendulum.rs
// Pendulum models and the per-instance wrapper the collection owns.
// SinglePendulum and DoublePendulum are plain Copy state records whose integrate returns the next state; PendulumModel is the closed sum over the two.
// Both advance with semi-implicit Euler: accelerations once at the current state, then velocities, then angles from the updated velocities, then wrap into (−π, π].

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_positive, Result, SimError};
use crate::math::{bob_position, double_accelerations, single_acceleration, wrap_angle, Vec2};
use crate::trail::{TrailBuffer, DEFAULT_TRAIL_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendulumKind {
    Single,
    Double,
}

/// One bob on one rod.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SinglePendulum {
    pub theta: f64,  // Angle from the downward vertical (rad)
    pub omega: f64,  // Angular velocity (rad/s)
    pub mass: f64,   // Does not enter the single-pendulum equation; kept for display and edits
    pub length: f64, // Rod length (m)
    pub pivot: Vec2, // Fixed suspension point
}

impl SinglePendulum {
    /// (ω, α) at the current state.
    pub fn derivative(&self, gravity: f64, damping: f64) -> (f64, f64) {
        let alpha = single_acceleration(self.theta, self.omega, self.length, gravity, damping);
        (self.omega, alpha)
    }

    pub fn integrate(&self, gravity: f64, damping: f64, dt: f64) -> Self {
        let (_, alpha) = self.derivative(gravity, damping);
        let omega = self.omega + alpha * dt;
        let theta = wrap_angle(self.theta + omega * dt);
        Self { theta, omega, ..*self }
    }

    pub fn bob(&self) -> Vec2 {
        bob_position(self.pivot, self.length, self.theta)
    }

    pub fn reset(&mut self) {
        self.theta = 0.0;
        self.omega = 0.0;
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("mass", self.mass)?;
        require_positive("length", self.length)?;
        require_finite("theta", self.theta)?;
        require_finite("omega", self.omega)?;
        require_finite("pivot.x", self.pivot.x)?;
        require_finite("pivot.y", self.pivot.y)
    }

    pub fn is_finite(&self) -> bool {
        self.theta.is_finite() && self.omega.is_finite()
    }
}

/// Two bobs chained on two rods; bob 2 hangs from bob 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoublePendulum {
    pub theta1: f64,  // Inner rod angle (rad)
    pub theta2: f64,  // Outer rod angle, also from the vertical (rad)
    pub omega1: f64,
    pub omega2: f64,
    pub mass1: f64,   // Inner bob (kg)
    pub mass2: f64,   // Outer bob (kg)
    pub length1: f64, // Pivot to bob 1 (m)
    pub length2: f64, // Bob 1 to bob 2 (m)
    pub pivot: Vec2,
}

impl DoublePendulum {
    /// (α1, α2) at the current state, damping included.
    pub fn accelerations(&self, gravity: f64, damping: f64) -> (f64, f64) {
        double_accelerations(
            self.theta1,
            self.theta2,
            self.omega1,
            self.omega2,
            self.mass1,
            self.mass2,
            self.length1,
            self.length2,
            gravity,
            damping,
        )
    }

    pub fn integrate(&self, gravity: f64, damping: f64, dt: f64) -> Self {
        let (a1, a2) = self.accelerations(gravity, damping);
        let omega1 = self.omega1 + a1 * dt;
        let omega2 = self.omega2 + a2 * dt;
        Self {
            theta1: wrap_angle(self.theta1 + omega1 * dt),
            theta2: wrap_angle(self.theta2 + omega2 * dt),
            omega1,
            omega2,
            ..*self
        }
    }

    pub fn bob1(&self) -> Vec2 {
        bob_position(self.pivot, self.length1, self.theta1)
    }

    pub fn bob2(&self) -> Vec2 {
        bob_position(self.bob1(), self.length2, self.theta2)
    }

    pub fn reset(&mut self) {
        self.theta1 = 0.0;
        self.theta2 = 0.0;
        self.omega1 = 0.0;
        self.omega2 = 0.0;
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("mass1", self.mass1)?;
        require_positive("mass2", self.mass2)?;
        require_positive("length1", self.length1)?;
        require_positive("length2", self.length2)?;
        require_finite("theta1", self.theta1)?;
        require_finite("theta2", self.theta2)?;
        require_finite("omega1", self.omega1)?;
        require_finite("omega2", self.omega2)?;
        require_finite("pivot.x", self.pivot.x)?;
        require_finite("pivot.y", self.pivot.y)
    }

    pub fn is_finite(&self) -> bool {
        self.theta1.is_finite()
            && self.theta2.is_finite()
            && self.omega1.is_finite()
            && self.omega2.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PendulumModel {
    Single(SinglePendulum),
    Double(DoublePendulum),
}

impl PendulumModel {
    pub fn kind(&self) -> PendulumKind {
        match self {
            PendulumModel::Single(_) => PendulumKind::Single,
            PendulumModel::Double(_) => PendulumKind::Double,
        }
    }

    pub fn integrate(&self, gravity: f64, damping: f64, dt: f64) -> Self {
        match self {
            PendulumModel::Single(s) => PendulumModel::Single(s.integrate(gravity, damping, dt)),
            PendulumModel::Double(d) => PendulumModel::Double(d.integrate(gravity, damping, dt)),
        }
    }

    pub fn reset(&mut self) {
        match self {
            PendulumModel::Single(s) => s.reset(),
            PendulumModel::Double(d) => d.reset(),
        }
    }

    pub fn pivot(&self) -> Vec2 {
        match self {
            PendulumModel::Single(s) => s.pivot,
            PendulumModel::Double(d) => d.pivot,
        }
    }

    pub fn set_pivot(&mut self, pivot: Vec2) {
        match self {
            PendulumModel::Single(s) => s.pivot = pivot,
            PendulumModel::Double(d) => d.pivot = pivot,
        }
    }

    /// Bob positions from the pivot outwards.
    pub fn bobs(&self) -> Vec<Vec2> {
        match self {
            PendulumModel::Single(s) => vec![s.bob()],
            PendulumModel::Double(d) => {
                let b1 = d.bob1();
                vec![b1, bob_position(b1, d.length2, d.theta2)]
            }
        }
    }

    /// The point a trail follows: the outermost bob.
    pub fn tip(&self) -> Vec2 {
        match self {
            PendulumModel::Single(s) => s.bob(),
            PendulumModel::Double(d) => d.bob2(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            PendulumModel::Single(s) => s.validate(),
            PendulumModel::Double(d) => d.validate(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            PendulumModel::Single(s) => s.is_finite(),
            PendulumModel::Double(d) => d.is_finite(),
        }
    }
}

/// Initial conditions for a new single pendulum. Angular velocity always starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SingleSpawn {
    pub theta: f64,
    pub mass: f64,
    pub length: f64,
    pub pivot: Vec2,
    pub max_trail_length: usize,
}

impl Default for SingleSpawn {
    fn default() -> Self {
        Self {
            theta: 1.0,
            mass: 1.0,
            length: 0.5,
            pivot: Vec2::ZERO,
            max_trail_length: DEFAULT_TRAIL_CAPACITY,
        }
    }
}

/// Initial conditions for a new double pendulum. Angular velocities always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoubleSpawn {
    pub theta1: f64,
    pub theta2: f64,
    pub mass1: f64,
    pub mass2: f64,
    pub length1: f64,
    pub length2: f64,
    pub pivot: Vec2,
    pub max_trail_length: usize,
}

impl Default for DoubleSpawn {
    fn default() -> Self {
        Self {
            theta1: 1.0,
            theta2: 1.0,
            mass1: 1.0,
            mass2: 1.0,
            length1: 0.6,
            length2: 0.4,
            pivot: Vec2::ZERO,
            max_trail_length: DEFAULT_TRAIL_CAPACITY,
        }
    }
}

/// Partial edit of an instance's fields. Fields belonging to the other variant are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumPatch {
    pub theta: Option<f64>,
    pub omega: Option<f64>,
    pub mass: Option<f64>,
    pub length: Option<f64>,
    pub theta1: Option<f64>,
    pub theta2: Option<f64>,
    pub omega1: Option<f64>,
    pub omega2: Option<f64>,
    pub mass1: Option<f64>,
    pub mass2: Option<f64>,
    pub length1: Option<f64>,
    pub length2: Option<f64>,
    pub pivot: Option<Vec2>,
    pub frozen: Option<bool>,
    pub max_trail_length: Option<usize>,
}

fn not_for(kind: &str, fields: &[(&str, Option<f64>)]) -> Result<()> {
    match fields.iter().find(|(_, v)| v.is_some()) {
        Some((name, _)) => Err(SimError::InvalidParameter(format!(
            "{name} does not apply to a {kind} pendulum"
        ))),
        None => Ok(()),
    }
}

/// A live simulation instance: one model plus its freeze flag and trail.
#[derive(Debug, Clone, PartialEq)]
pub struct Pendulum {
    pub model: PendulumModel,
    pub frozen: bool,    // Suspends integration and trail growth; fields stay editable
    trail: TrailBuffer,  // Recent tip positions
}

impl Pendulum {
    pub fn new(model: PendulumModel, max_trail_length: usize) -> Self {
        Self {
            model,
            frozen: false,
            trail: TrailBuffer::new(max_trail_length),
        }
    }

    pub fn from_single(spawn: &SingleSpawn) -> Result<Self> {
        let model = PendulumModel::Single(SinglePendulum {
            theta: wrap_angle(spawn.theta),
            omega: 0.0,
            mass: spawn.mass,
            length: spawn.length,
            pivot: spawn.pivot,
        });
        model.validate()?;
        Ok(Self::new(model, spawn.max_trail_length))
    }

    pub fn from_double(spawn: &DoubleSpawn) -> Result<Self> {
        let model = PendulumModel::Double(DoublePendulum {
            theta1: wrap_angle(spawn.theta1),
            theta2: wrap_angle(spawn.theta2),
            omega1: 0.0,
            omega2: 0.0,
            mass1: spawn.mass1,
            mass2: spawn.mass2,
            length1: spawn.length1,
            length2: spawn.length2,
            pivot: spawn.pivot,
        });
        model.validate()?;
        Ok(Self::new(model, spawn.max_trail_length))
    }

    pub fn kind(&self) -> PendulumKind {
        self.model.kind()
    }

    /// Advances one sub-step. A frozen instance is left bit-for-bit as it was.
    pub fn update(&mut self, gravity: f64, damping: f64, dt: f64) {
        if self.frozen {
            return;
        }
        self.model = self.model.integrate(gravity, damping, dt);
    }

    /// Records the current tip position; does nothing while frozen.
    pub fn add_trail_point(&mut self) {
        if self.frozen {
            return;
        }
        let tip = self.model.tip();
        self.trail.append(tip);
    }

    /// Zeroes every angle and angular velocity and clears the trail.
    /// Masses, lengths, pivot, freeze flag and trail capacity are kept.
    pub fn reset(&mut self) {
        self.model.reset();
        self.trail.clear();
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn max_trail_length(&self) -> usize {
        self.trail.capacity()
    }

    pub fn set_max_trail_length(&mut self, max_trail_length: usize) {
        self.trail.set_capacity(max_trail_length);
    }

    pub fn pivot(&self) -> Vec2 {
        self.model.pivot()
    }

    pub fn bobs(&self) -> Vec<Vec2> {
        self.model.bobs()
    }

    /// Applies `patch` to a copy, validates it, then commits. On error nothing changes.
    pub fn apply(&mut self, patch: &PendulumPatch) -> Result<()> {
        let mut next = self.model;
        match &mut next {
            PendulumModel::Single(s) => {
                not_for(
                    "single",
                    &[
                        ("theta1", patch.theta1),
                        ("theta2", patch.theta2),
                        ("omega1", patch.omega1),
                        ("omega2", patch.omega2),
                        ("mass1", patch.mass1),
                        ("mass2", patch.mass2),
                        ("length1", patch.length1),
                        ("length2", patch.length2),
                    ],
                )?;
                s.theta = patch.theta.map_or(s.theta, wrap_angle);
                s.omega = patch.omega.unwrap_or(s.omega);
                s.mass = patch.mass.unwrap_or(s.mass);
                s.length = patch.length.unwrap_or(s.length);
            }
            PendulumModel::Double(d) => {
                not_for(
                    "double",
                    &[
                        ("theta", patch.theta),
                        ("omega", patch.omega),
                        ("mass", patch.mass),
                        ("length", patch.length),
                    ],
                )?;
                d.theta1 = patch.theta1.map_or(d.theta1, wrap_angle);
                d.theta2 = patch.theta2.map_or(d.theta2, wrap_angle);
                d.omega1 = patch.omega1.unwrap_or(d.omega1);
                d.omega2 = patch.omega2.unwrap_or(d.omega2);
                d.mass1 = patch.mass1.unwrap_or(d.mass1);
                d.mass2 = patch.mass2.unwrap_or(d.mass2);
                d.length1 = patch.length1.unwrap_or(d.length1);
                d.length2 = patch.length2.unwrap_or(d.length2);
            }
        }
        if let Some(pivot) = patch.pivot {
            next.set_pivot(pivot);
        }
        next.validate()?;

        self.model = next;
        if let Some(frozen) = patch.frozen {
            self.frozen = frozen;
        }
        if let Some(n) = patch.max_trail_length {
            self.set_max_trail_length(n);
        }
        Ok(())
    }
}
