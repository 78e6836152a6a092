//! Stochastic hill climbing around the incumbent.

use super::{Candidate, Pose, PoseRng, SearchContext, SearchStrategy};

/// Samples a shell around the best pose whose radius shrinks with fitness.
#[derive(Debug, Clone, Default)]
pub struct HillClimber;

impl HillClimber {
    pub fn new() -> Self {
        Self
    }
}

impl SearchStrategy for HillClimber {
    fn name(&self) -> &'static str {
        "hill-climber"
    }

    fn reset(&mut self, _ctx: &mut SearchContext<'_>, _seed: &Pose, _rng: &mut PoseRng) {}

    fn propose(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        rng: &mut PoseRng,
    ) -> Pose {
        let step = (1.0 - best.fitness.clamp(0.0, 1.0)) * ctx.radius();
        let position = best.pose.position + rng.on_unit_sphere() * step;
        let look_at = ctx.center() + rng.in_unit_ball() * step;
        Pose::new(position, look_at)
    }
}
