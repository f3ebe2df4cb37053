// src/lib.rs
// Real-time single and double pendulum simulation.
// The physics core (math, trail, pendulum, collection, logic) is synchronous and single-owner; render and ui adapt it to a PNG surface and HTTP.

pub mod collection;
pub mod config;
pub mod error;
pub mod logic;
pub mod math;
pub mod pendulum;
pub mod render;
pub mod trail;
pub mod ui;

pub use collection::PendulumCollection;
pub use config::{GravityPreset, SimConfig};
pub use error::{Result, SimError};
pub use logic::{PhysicsParams, SimSnapshot, Simulation, SimulationClock};
pub use math::{wrap_angle, Vec2};
pub use pendulum::{
    DoublePendulum, DoubleSpawn, Pendulum, PendulumKind, PendulumModel, PendulumPatch,
    SinglePendulum, SingleSpawn,
};
pub use trail::TrailBuffer;
