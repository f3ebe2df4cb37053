// src/config.rs
// Simulation configuration loaded from JSON. Every field has a default, so an empty object (or no file at all) gives the stock setup:
//
//   {
//     "gravity": 9.807,
//     "damping": 0.05,
//     "fixed_sub_step": 0.001,
//     "trail_sample_interval": 0.01,
//     "max_frame_seconds": 1.0,
//     "single": { "theta": 1.0, "mass": 1.0, "length": 0.5, "max_trail_length": 300 },
//     "double": { "theta1": 1.0, "theta2": 1.0, "length1": 0.6, "length2": 0.4 }
//   }

use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{require_in_range, Result};
use crate::logic::SimulationClock;
use crate::pendulum::{DoubleSpawn, Pendulum, SingleSpawn};

pub const GRAVITY_RANGE: RangeInclusive<f64> = 0.0..=1000.0;
pub const DAMPING_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const FIXED_SUB_STEP_RANGE: RangeInclusive<f64> = 1e-6..=0.1;
/// Upper bound on sub-steps a single clamped frame may take.
pub const MAX_SUBSTEPS_PER_FRAME: usize = 1_000_000;

/// Surface gravities offered as one-click presets (m/s²).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityPreset {
    Earth,
    Moon,
    Mars,
    Mercury,
    Jupiter,
    Pluto,
    Sun,
}

impl GravityPreset {
    pub const ALL: [GravityPreset; 7] = [
        GravityPreset::Earth,
        GravityPreset::Moon,
        GravityPreset::Mars,
        GravityPreset::Mercury,
        GravityPreset::Jupiter,
        GravityPreset::Pluto,
        GravityPreset::Sun,
    ];

    pub fn gravity(self) -> f64 {
        match self {
            GravityPreset::Earth => 9.807,
            GravityPreset::Moon => 1.62,
            GravityPreset::Mars => 3.721,
            GravityPreset::Mercury => 3.7,
            GravityPreset::Jupiter => 24.79,
            GravityPreset::Pluto => 0.62,
            GravityPreset::Sun => 274.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub gravity: f64,               // m/s², within GRAVITY_RANGE
    pub damping: f64,               // Linear damping, within DAMPING_RANGE
    pub fixed_sub_step: f64,        // Longest physics step (s), within FIXED_SUB_STEP_RANGE
    pub trail_sample_interval: f64, // Real-time spacing of trail samples (s); 0 samples every sub-step
    pub max_frame_seconds: f64,     // Longer frame deltas are clamped to this
    pub single: SingleSpawn,        // Used when a single spawn request carries no body
    pub double: DoubleSpawn,        // Used when a double spawn request carries no body
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GravityPreset::Earth.gravity(),
            damping: 0.05,
            fixed_sub_step: 0.001,
            trail_sample_interval: 0.01,
            max_frame_seconds: 1.0,
            single: SingleSpawn::default(),
            double: DoubleSpawn::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: SimConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require_in_range("gravity", self.gravity, *GRAVITY_RANGE.start(), *GRAVITY_RANGE.end())?;
        require_in_range("damping", self.damping, *DAMPING_RANGE.start(), *DAMPING_RANGE.end())?;
        SimulationClock::new(
            self.fixed_sub_step,
            self.trail_sample_interval,
            self.max_frame_seconds,
        )?;
        // Spawn defaults go through the same checks a spawn would.
        Pendulum::from_single(&self.single)?;
        Pendulum::from_double(&self.double)?;
        Ok(())
    }
}
