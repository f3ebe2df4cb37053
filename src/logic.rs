// src/logic.rs
// Frame-level driver: turns a variable wall-clock delta into fixed physics sub-steps and decides when trails are sampled.
// Physics wants a tiny step for stability; trails want sparse, frame-rate independent sampling. The clock keeps the two apart.
// Simulation bundles the collection, the physical parameters and the clock so the UI layer has a single owner to talk to.

use log::{debug, info};
use serde::Serialize;

use crate::collection::PendulumCollection;
use crate::config::{
    GravityPreset, SimConfig, DAMPING_RANGE, FIXED_SUB_STEP_RANGE, GRAVITY_RANGE,
    MAX_SUBSTEPS_PER_FRAME,
};
use crate::error::{require_in_range, require_positive, Result, SimError};
use crate::math::Vec2;
use crate::pendulum::{DoubleSpawn, PendulumModel, SingleSpawn};

/// Parameters shared by every pendulum, read by each sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicsParams {
    pub gravity: f64, // m/s², within GRAVITY_RANGE.
    pub damping: f64, // Linear velocity damping, within DAMPING_RANGE.
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GravityPreset::Earth.gravity(),
            damping: 0.05,
        }
    }
}

impl PhysicsParams {
    pub fn new(gravity: f64, damping: f64) -> Result<Self> {
        let mut params = Self::default();
        params.set_gravity(gravity)?;
        params.set_damping(damping)?;
        Ok(params)
    }

    pub fn set_gravity(&mut self, gravity: f64) -> Result<()> {
        require_in_range("gravity", gravity, *GRAVITY_RANGE.start(), *GRAVITY_RANGE.end())?;
        self.gravity = gravity;
        Ok(())
    }

    pub fn set_damping(&mut self, damping: f64) -> Result<()> {
        require_in_range("damping", damping, *DAMPING_RANGE.start(), *DAMPING_RANGE.end())?;
        self.damping = damping;
        Ok(())
    }
}

/// Fixed-step accumulator over variable frame time.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    fixed_sub_step: f64,        // Upper bound on any single integration step (s).
    trail_sample_interval: f64, // Real-time spacing of trail samples (s); 0 samples every sub-step.
    max_frame_seconds: f64,     // Longer frame deltas are clamped to this.
    trail_accumulator: f64,     // Time since the last trail sample.
}

impl SimulationClock {
    pub fn new(fixed_sub_step: f64, trail_sample_interval: f64, max_frame_seconds: f64) -> Result<Self> {
        require_in_range(
            "fixed_sub_step",
            fixed_sub_step,
            *FIXED_SUB_STEP_RANGE.start(),
            *FIXED_SUB_STEP_RANGE.end(),
        )?;
        require_in_range("trail_sample_interval", trail_sample_interval, 0.0, f64::MAX)?;
        require_positive("max_frame_seconds", max_frame_seconds)?;
        // A clamped frame must fit in a bounded number of sub-steps.
        let worst_case = (max_frame_seconds / fixed_sub_step).ceil();
        if worst_case > MAX_SUBSTEPS_PER_FRAME as f64 {
            return Err(SimError::InvalidParameter(format!(
                "max_frame_seconds / fixed_sub_step allows {worst_case} sub-steps per frame, limit is {MAX_SUBSTEPS_PER_FRAME}"
            )));
        }
        Ok(Self {
            fixed_sub_step,
            trail_sample_interval,
            max_frame_seconds,
            trail_accumulator: 0.0,
        })
    }

    pub fn fixed_sub_step(&self) -> f64 {
        self.fixed_sub_step
    }

    pub fn trail_sample_interval(&self) -> f64 {
        self.trail_sample_interval
    }

    /// Consumes `frame_seconds` in slices no longer than the fixed sub-step, integrating the
    /// collection once per slice and sampling trails whenever the sample interval has elapsed.
    /// Returns the number of sub-steps taken; non-positive or non-finite deltas take none.
    pub fn advance(
        &mut self,
        collection: &mut PendulumCollection,
        params: &PhysicsParams,
        frame_seconds: f64,
    ) -> usize {
        if !frame_seconds.is_finite() || frame_seconds <= 0.0 {
            return 0;
        }
        let mut remaining = if frame_seconds > self.max_frame_seconds {
            debug!(
                "frame delta {frame_seconds:.4}s clamped to {:.4}s",
                self.max_frame_seconds
            );
            self.max_frame_seconds
        } else {
            frame_seconds
        };

        let mut substeps = 0;
        while remaining > 0.0 {
            let dt = self.fixed_sub_step.min(remaining); // > 0 while remaining > 0.
            collection.integrate_all(params, dt);

            if self.trail_sample_interval <= 0.0 {
                collection.sample_trails_all();
            } else {
                self.trail_accumulator += dt;
                if self.trail_accumulator >= self.trail_sample_interval {
                    self.trail_accumulator %= self.trail_sample_interval;
                    collection.sample_trails_all();
                }
            }

            remaining -= dt;
            substeps += 1;
        }
        substeps
    }
}

/// Read-only view of one instance, as handed to the render and UI layers.
#[derive(Debug, Clone, Serialize)]
pub struct PendulumSnapshot {
    pub index: usize,
    #[serde(flatten)]
    pub model: PendulumModel,
    pub frozen: bool,
    pub bobs: Vec<Vec2>,
    pub max_trail_length: usize,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimSnapshot {
    pub params: PhysicsParams,
    pub elapsed_seconds: f64,
    pub frames: u64,
    pub pendulums: Vec<PendulumSnapshot>,
}

/// Owner of everything the frame loop mutates.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub params: PhysicsParams,
    pub pendulums: PendulumCollection,
    pub single_defaults: SingleSpawn,
    pub double_defaults: DoubleSpawn,
    clock: SimulationClock,
    elapsed_seconds: f64,
    frames: u64,
}

impl Simulation {
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: PhysicsParams::new(config.gravity, config.damping)?,
            pendulums: PendulumCollection::new(),
            single_defaults: config.single,
            double_defaults: config.double,
            clock: SimulationClock::new(
                config.fixed_sub_step,
                config.trail_sample_interval,
                config.max_frame_seconds,
            )?,
            elapsed_seconds: 0.0,
            frames: 0,
        })
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one rendered frame's worth of physics.
    pub fn advance(&mut self, frame_seconds: f64) -> usize {
        let substeps = self
            .clock
            .advance(&mut self.pendulums, &self.params, frame_seconds);
        if substeps > 0 {
            self.elapsed_seconds += frame_seconds.min(self.clock.max_frame_seconds);
            self.frames += 1;
        }
        substeps
    }

    pub fn spawn_single_default(&mut self) -> Result<usize> {
        let spawn = self.single_defaults;
        self.pendulums.spawn_single(&spawn)
    }

    pub fn spawn_double_default(&mut self) -> Result<usize> {
        let spawn = self.double_defaults;
        self.pendulums.spawn_double(&spawn)
    }

    /// Applies a preset, then explicit gravity, then damping. Everything is validated on a copy,
    /// so a bad field leaves the live parameters alone.
    pub fn update_params(
        &mut self,
        preset: Option<GravityPreset>,
        gravity: Option<f64>,
        damping: Option<f64>,
    ) -> Result<PhysicsParams> {
        let mut next = self.params;
        if let Some(preset) = preset {
            next.gravity = preset.gravity();
        }
        if let Some(g) = gravity {
            next.set_gravity(g)?;
        }
        if let Some(d) = damping {
            next.set_damping(d)?;
        }
        self.params = next;
        info!("parameters now gravity={} damping={}", next.gravity, next.damping);
        Ok(next)
    }

    pub fn snapshot(&self) -> SimSnapshot {
        let pendulums = self
            .pendulums
            .iter()
            .enumerate()
            .map(|(index, p)| PendulumSnapshot {
                index,
                model: p.model,
                frozen: p.frozen,
                bobs: p.bobs(),
                max_trail_length: p.max_trail_length(),
                trail: p.trail().snapshot(),
            })
            .collect();
        SimSnapshot {
            params: self.params,
            elapsed_seconds: self.elapsed_seconds,
            frames: self.frames,
            pendulums,
        }
    }
}
