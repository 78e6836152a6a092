//! Bounded history of evaluated poses, kept for diagnostics.

use std::collections::VecDeque;

use nalgebra::{Point3, Vector3};

use super::Pose;

/// Number of samples retained.
pub const TRACE_LENGTH: usize = 100;

/// One evaluated pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    pub position: Point3<f32>,
    pub forward: Vector3<f32>,
    pub fitness: f32,
}

/// Ring buffer of the most recent evaluations.
#[derive(Debug, Clone)]
pub struct Trace {
    samples: VecDeque<TraceSample>,
    capacity: usize,
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(TRACE_LENGTH)
    }
}

impl Trace {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest when full.
    pub fn record(&mut self, pose: &Pose, fitness: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(TraceSample {
            position: pose.position,
            forward: pose.forward(),
            fitness,
        });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TraceSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&TraceSample> {
        self.samples.back()
    }

    /// Highest-fitness sample still retained.
    pub fn best(&self) -> Option<&TraceSample> {
        self.samples
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}
