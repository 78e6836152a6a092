//! Swarm search that falls back to the potential field when it stalls.

use log::debug;

use crate::schema::{ParticleSwarmConfig, PotentialFieldConfig};

use super::{
    Candidate, ParticleSwarm, Pose, PoseRng, PotentialField, SearchContext, SearchStrategy,
};

/// Hybrid of [`ParticleSwarm`] and [`PotentialField`].
///
/// Runs the swarm while the best fitness keeps rising from one frame to the
/// next, and spends a frame on the potential field whenever it does not.
#[derive(Debug, Clone)]
pub struct Greedy {
    swarm: ParticleSwarm,
    field: PotentialField,
    previous_best: f32,
    stagnating: bool,
}

impl Default for Greedy {
    fn default() -> Self {
        Self::new(ParticleSwarmConfig::default())
    }
}

impl Greedy {
    pub fn new(config: ParticleSwarmConfig) -> Self {
        Self {
            swarm: ParticleSwarm::new(config),
            field: PotentialField::new(PotentialFieldConfig::default()),
            previous_best: 0.0,
            stagnating: false,
        }
    }

    /// Whether the current frame is handled by the potential field.
    pub fn is_stagnating(&self) -> bool {
        self.stagnating
    }
}

impl SearchStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn reset(&mut self, ctx: &mut SearchContext<'_>, seed: &Pose, rng: &mut PoseRng) {
        self.swarm.reset(ctx, seed, rng);
        self.field.reset(ctx, seed, rng);
        self.previous_best = 0.0;
        self.stagnating = false;
    }

    fn begin_frame(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        frame: u64,
        rng: &mut PoseRng,
    ) {
        // the swarm tracks frames even while idle so refreshes stay in step
        self.swarm.begin_frame(ctx, best, frame, rng);
        if self.stagnating {
            self.field.begin_frame(ctx, best, frame, rng);
        }
    }

    fn propose(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        rng: &mut PoseRng,
    ) -> Pose {
        if self.stagnating {
            self.field.propose(ctx, best, rng)
        } else {
            self.swarm.propose(ctx, best, rng)
        }
    }

    fn observe(&mut self, pose: &Pose, fitness: f32, best: &Candidate, rng: &mut PoseRng) {
        if self.stagnating {
            self.field.observe(pose, fitness, best, rng);
        } else {
            self.swarm.observe(pose, fitness, best, rng);
        }
    }

    fn end_frame(&mut self, best: &Candidate) {
        let stagnating = best.fitness <= self.previous_best;
        if stagnating != self.stagnating {
            debug!(
                "Greedy search switching to {}",
                if stagnating { "potential field" } else { "swarm" }
            );
        }
        self.stagnating = stagnating;
        self.previous_best = best.fitness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_switches_on_stagnation() {
        let mut greedy = Greedy::default();
        let pose = Pose::new(Point3::origin(), Point3::new(0.0, 0.0, 1.0));
        assert!(!greedy.is_stagnating());

        greedy.end_frame(&Candidate::new(pose, 0.4));
        assert!(!greedy.is_stagnating());

        greedy.end_frame(&Candidate::new(pose, 0.4));
        assert!(greedy.is_stagnating());

        greedy.end_frame(&Candidate::new(pose, 0.6));
        assert!(!greedy.is_stagnating());
    }
}
