//! Generational genetic algorithm over camera poses.

use log::trace;

use crate::schema::GeneticConfig;

use super::{Candidate, Pose, PoseRng, SearchContext, SearchStrategy};

/// Weight of the first parent in a crossover child.
const CROSSOVER_BIAS: f32 = 0.8;

/// Population evaluated one individual per proposal.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
    population: Vec<Candidate>,
    cursor: usize,
    current: Option<usize>,
    generation: u64,
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self::new(GeneticConfig::default())
    }
}

impl GeneticAlgorithm {
    pub fn new(config: GeneticConfig) -> Self {
        Self {
            config,
            population: Vec::new(),
            cursor: 0,
            current: None,
            generation: 0,
        }
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the evaluated population with its offspring.
    fn breed(&mut self, ctx: &SearchContext<'_>, rng: &mut PoseRng) {
        let center = ctx.center();
        let radius = ctx.radius();
        let len = self.population.len();

        self.population
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let elites = self.config.elitism.min(len);
        let selected = ((self.config.selection * len as f32) as usize).clamp(elites, len);

        let mut i = elites;
        while i + 1 < selected {
            let a = self.population[i].pose;
            let b = self.population[i + 1].pose;
            self.population[i] = Candidate::new(self.offspring(&a, &b, radius, rng), 0.0);
            self.population[i + 1] = Candidate::new(self.offspring(&b, &a, radius, rng), 0.0);
            i += 2;
        }
        for individual in &mut self.population[i..] {
            *individual = Candidate::new(rng.scatter(&center, radius), 0.0);
        }

        self.generation += 1;
        trace!(
            "Generation {}: {} elites, {} bred, {} reseeded",
            self.generation,
            elites,
            i - elites,
            len - i
        );
    }

    fn offspring(&self, a: &Pose, b: &Pose, radius: f32, rng: &mut PoseRng) -> Pose {
        let mut child = *a;
        if rng.chance(self.config.crossover_rate) {
            child.position = a.position.lerp(&b.position, 1.0 - CROSSOVER_BIAS);
            child.look_at = a.look_at.lerp(&b.look_at, 1.0 - CROSSOVER_BIAS);
        }
        if rng.chance(self.config.mutation_rate) {
            let strength = self.config.mutation_strength * radius;
            child.position += rng.in_unit_ball() * strength;
            child.look_at += rng.in_unit_ball() * strength;
        }
        child
    }
}

impl SearchStrategy for GeneticAlgorithm {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn reset(&mut self, ctx: &mut SearchContext<'_>, seed: &Pose, rng: &mut PoseRng) {
        let center = ctx.center();
        let radius = ctx.radius();
        let size = self.config.population_size.max(1);
        self.population = std::iter::once(*seed)
            .chain((1..size).map(|_| rng.scatter(&center, radius)))
            .map(|pose| Candidate::new(pose, 0.0))
            .collect();
        self.cursor = 0;
        self.current = None;
        self.generation = 0;
    }

    fn propose(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        rng: &mut PoseRng,
    ) -> Pose {
        if self.population.is_empty() {
            self.reset(ctx, &best.pose, rng);
        }
        if self.cursor >= self.population.len() {
            self.breed(ctx, rng);
            self.cursor = 0;
        }
        let index = self.cursor;
        self.cursor += 1;
        self.current = Some(index);
        self.population[index].pose
    }

    fn observe(&mut self, pose: &Pose, fitness: f32, _best: &Candidate, _rng: &mut PoseRng) {
        if let Some(individual) = self.current.take().and_then(|i| self.population.get_mut(i)) {
            *individual = Candidate::new(*pose, fitness);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::camera::Camera;
    use crate::compute::proxy::{ProxyVolume, TrackedPose};
    use crate::compute::scene::StaticScene;
    use crate::compute::shot::Shot;
    use crate::compute::subject::SubjectEvaluator;
    use crate::schema::{AxisLocks, ProxyShape, SubjectConfig};
    use nalgebra::{Point3, Vector3};

    fn run_generation(
        ga: &mut GeneticAlgorithm,
        ctx: &mut SearchContext<'_>,
        rng: &mut PoseRng,
        score: impl Fn(usize) -> f32,
    ) {
        let best = Candidate::new(Pose::new(Point3::origin(), Point3::origin()), 0.0);
        for i in 0..ga.population().len() {
            let pose = ga.propose(ctx, &best, rng);
            ga.observe(&pose, score(i), &best, rng);
        }
    }

    #[test]
    fn test_generation_keeps_elites() {
        let scene = StaticScene::new();
        let mut camera = Camera::default();
        let mut subjects = vec![Some(SubjectEvaluator::new(
            TrackedPose::new(Point3::origin()),
            ProxyVolume::new(ProxyShape::Cube, Vector3::zeros(), Vector3::repeat(1.0)),
        ))];
        let mut shot =
            Shot::new(vec![SubjectConfig::default()], vec![], AxisLocks::default()).unwrap();
        let mut ctx = SearchContext {
            camera: &mut camera,
            subjects: &mut subjects,
            shot: &mut shot,
            scene: &scene,
        };
        let mut rng = PoseRng::new(11);
        let mut ga = GeneticAlgorithm::new(GeneticConfig {
            population_size: 10,
            ..GeneticConfig::default()
        });
        let seed = Pose::new(Point3::new(0.0, 0.0, -5.0), Point3::origin());
        ga.reset(&mut ctx, &seed, &mut rng);
        assert_eq!(ga.population().len(), 10);

        run_generation(&mut ga, &mut ctx, &mut rng, |i| i as f32 / 10.0);
        let fittest = ga.population()[9];
        let runner_up = ga.population()[8];

        // the next proposal triggers breeding
        let best = Candidate::new(seed, 0.0);
        ga.propose(&mut ctx, &best, &mut rng);
        assert_eq!(ga.generation(), 1);
        assert_eq!(ga.population().len(), 10);
        assert_eq!(ga.population()[0], fittest);
        assert_eq!(ga.population()[1], runner_up);
        // bred and reseeded individuals start unscored
        assert!(ga.population()[2..].iter().all(|c| c.fitness == 0.0));
        let radius = ctx.radius();
        for individual in &ga.population()[6..] {
            assert!(individual.pose.position.coords.norm() <= radius + 1e-4);
        }
    }

    #[test]
    fn test_offspring_blend() {
        let ga = GeneticAlgorithm::new(GeneticConfig {
            crossover_rate: 1.0,
            mutation_rate: 0.0,
            ..GeneticConfig::default()
        });
        let a = Pose::new(Point3::new(10.0, 0.0, 0.0), Point3::new(0.0, 10.0, 0.0));
        let b = Pose::new(Point3::origin(), Point3::origin());
        let child = ga.offspring(&a, &b, 1.0, &mut PoseRng::new(0));
        assert!((child.position - Point3::new(8.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((child.look_at - Point3::new(0.0, 8.0, 0.0)).norm() < 1e-5);
    }
}
