// src/collection.rs
// The ordered set of live pendulums. Insertion order is display order and addressing order.
// Deleting index i shifts every later instance down by one, so indices must not be held across a deletion.

use log::{info, warn};

use crate::error::{Result, SimError};
use crate::logic::PhysicsParams;
use crate::pendulum::{DoubleSpawn, Pendulum, SingleSpawn};

#[derive(Debug, Clone, Default)]
pub struct PendulumCollection {
    pendulums: Vec<Pendulum>, // Index = position in the UI list
}

impl PendulumCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pendulums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pendulums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pendulum> + '_ {
        self.pendulums.iter()
    }

    pub fn get(&self, index: usize) -> Result<&Pendulum> {
        let len = self.pendulums.len();
        self.pendulums
            .get(index)
            .ok_or(SimError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Pendulum> {
        let len = self.pendulums.len();
        self.pendulums
            .get_mut(index)
            .ok_or(SimError::IndexOutOfRange { index, len })
    }

    /// Appends an already-built instance and returns its index.
    pub fn push(&mut self, pendulum: Pendulum) -> usize {
        self.pendulums.push(pendulum);
        self.pendulums.len() - 1
    }

    pub fn spawn_single(&mut self, spawn: &SingleSpawn) -> Result<usize> {
        let index = self.push(Pendulum::from_single(spawn)?);
        info!("spawned single pendulum #{index}");
        Ok(index)
    }

    pub fn spawn_double(&mut self, spawn: &DoubleSpawn) -> Result<usize> {
        let index = self.push(Pendulum::from_double(spawn)?);
        info!("spawned double pendulum #{index}");
        Ok(index)
    }

    /// Removes the instance at `index` and hands it back with an empty trail.
    pub fn delete_at(&mut self, index: usize) -> Result<Pendulum> {
        self.get(index)?;
        let mut removed = self.pendulums.remove(index);
        removed.clear_trail();
        info!("deleted pendulum #{index}, {} left", self.pendulums.len());
        Ok(removed)
    }

    pub fn delete_all(&mut self) {
        let n = self.pendulums.len();
        self.pendulums.clear();
        info!("deleted all {n} pendulums");
    }

    pub fn reset_at(&mut self, index: usize) -> Result<()> {
        self.get_mut(index)?.reset();
        info!("reset pendulum #{index}");
        Ok(())
    }

    pub fn set_frozen(&mut self, index: usize, frozen: bool) -> Result<()> {
        self.get_mut(index)?.frozen = frozen;
        Ok(())
    }

    /// Integrates every non-frozen instance by `dt` without touching trails.
    ///
    /// An instance whose state turns non-finite is rolled back to its last finite state (when it
    /// had one) and frozen; the rest of the collection carries on.
    pub fn integrate_all(&mut self, params: &PhysicsParams, dt: f64) {
        for (index, pendulum) in self.pendulums.iter_mut().enumerate() {
            if pendulum.frozen {
                continue;
            }
            let before = pendulum.model;
            pendulum.update(params.gravity, params.damping, dt);
            if !pendulum.model.is_finite() {
                if before.is_finite() {
                    pendulum.model = before;
                }
                pendulum.frozen = true;
                warn!("pendulum #{index} diverged to a non-finite state; frozen");
            }
        }
    }

    /// Appends the current tip position to the trail of every non-frozen instance.
    pub fn sample_trails_all(&mut self) {
        for pendulum in self.pendulums.iter_mut() {
            pendulum.add_trail_point();
        }
    }

    /// One sub-step with a trail sample after it.
    pub fn step(&mut self, params: &PhysicsParams, dt: f64) {
        self.integrate_all(params, dt);
        self.sample_trails_all();
    }
}
