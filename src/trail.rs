// src/trail.rs
// Bounded history of recent bob positions: a FIFO with a hard upper bound.
// Appending past the bound evicts the oldest points and shrinking the bound evicts immediately, so len() <= capacity() always holds.

use std::collections::VecDeque;

use crate::math::Vec2;

/// Default number of points retained per pendulum.
pub const DEFAULT_TRAIL_CAPACITY: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Vec2>, // Oldest at the front
    capacity: usize,        // 0 disables the trail
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY)
    }
}

impl TrailBuffer {
    /// Creates an empty trail. A capacity of zero disables the trail entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Pushes `point` and drops however many of the oldest points exceed the capacity.
    pub fn append(&mut self, point: Vec2) {
        self.points.push_back(point);
        self.evict_excess();
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Changes the bound. Shrinking truncates from the front right away.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_excess();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    /// Ordered copy of the points for readers outside the simulation step.
    pub fn snapshot(&self) -> Vec<Vec2> {
        self.points.iter().copied().collect()
    }

    fn evict_excess(&mut self) {
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> Vec2 {
        Vec2::new(i as f64, -(i as f64))
    }

    #[test]
    fn keeps_most_recent_points_in_order() {
        let mut trail = TrailBuffer::new(3);
        for i in 0..10 {
            trail.append(p(i));
            assert!(trail.len() <= trail.capacity());
        }
        assert_eq!(trail.snapshot(), vec![p(7), p(8), p(9)]);
        assert_eq!(trail.latest(), Some(p(9)));
    }

    #[test]
    fn below_capacity_nothing_is_evicted() {
        let mut trail = TrailBuffer::new(5);
        trail.append(p(1));
        trail.append(p(2));
        assert_eq!(trail.snapshot(), vec![p(1), p(2)]);
    }

    #[test]
    fn shrinking_capacity_truncates_oldest_immediately() {
        let mut trail = TrailBuffer::new(6);
        for i in 0..6 {
            trail.append(p(i));
        }
        trail.set_capacity(2);
        assert_eq!(trail.snapshot(), vec![p(4), p(5)]);

        trail.append(p(6));
        assert_eq!(trail.snapshot(), vec![p(5), p(6)]);
    }

    #[test]
    fn growing_capacity_keeps_contents() {
        let mut trail = TrailBuffer::new(2);
        trail.append(p(0));
        trail.append(p(1));
        trail.set_capacity(4);
        trail.append(p(2));
        assert_eq!(trail.snapshot(), vec![p(0), p(1), p(2)]);
    }

    #[test]
    fn zero_capacity_never_holds_points() {
        let mut trail = TrailBuffer::new(0);
        trail.append(p(0));
        trail.append(p(1));
        assert!(trail.is_empty());
        assert_eq!(trail.latest(), None);
    }

    #[test]
    fn clear_empties_but_keeps_capacity() {
        let mut trail = TrailBuffer::new(4);
        trail.append(p(0));
        trail.append(p(1));
        trail.clear();
        assert!(trail.is_empty());
        assert_eq!(trail.capacity(), 4);
    }
}
