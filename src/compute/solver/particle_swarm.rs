//! Particle swarm optimisation over camera poses.

use nalgebra::Vector3;

use crate::schema::ParticleSwarmConfig;

use super::{Candidate, Pose, PoseRng, SearchContext, SearchStrategy};

/// One swarm member. Position and look-at move independently.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pose: Pose,
    pub position_velocity: Vector3<f32>,
    pub look_velocity: Vector3<f32>,
    pub personal_best: Candidate,
    frame: u64,
}

impl Particle {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            position_velocity: Vector3::zeros(),
            look_velocity: Vector3::zeros(),
            personal_best: Candidate::new(pose, 0.0),
            frame: 0,
        }
    }

    fn advance(&mut self) {
        self.pose.position += self.position_velocity;
        self.pose.look_at += self.look_velocity;
    }

    fn accelerate(
        &mut self,
        config: &ParticleSwarmConfig,
        global: &Pose,
        rng: &mut PoseRng,
    ) {
        let personal = self.personal_best.pose;
        self.look_velocity += (personal.look_at - self.pose.look_at)
            * (config.inertia * config.cognitive * rng.unit())
            + (global.look_at - self.pose.look_at) * (config.inertia * config.social * rng.unit())
            - self.look_velocity * (1.0 - config.inertia);
        self.position_velocity += (personal.position - self.pose.position)
            * (config.inertia * config.cognitive * rng.unit())
            + (global.position - self.pose.position)
                * (config.inertia * config.social * rng.unit())
            - self.position_velocity * (1.0 - config.inertia);
    }
}

/// Round-robin particle swarm.
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    config: ParticleSwarmConfig,
    particles: Vec<Particle>,
    cursor: usize,
    current: Option<usize>,
    frame: u64,
}

impl Default for ParticleSwarm {
    fn default() -> Self {
        Self::new(ParticleSwarmConfig::default())
    }
}

impl ParticleSwarm {
    pub fn new(config: ParticleSwarmConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            cursor: 0,
            current: None,
            frame: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// First visit of a particle in a new frame: rescore its personal best
    /// and occasionally scatter it.
    fn refresh(&mut self, index: usize, ctx: &mut SearchContext<'_>, rng: &mut PoseRng) {
        let frame = self.frame;
        let particle = &mut self.particles[index];
        if particle.frame == frame {
            return;
        }
        particle.frame = frame;

        let personal = particle.personal_best.pose;
        particle.personal_best.fitness = ctx.evaluate(&personal, rng);

        if rng.chance(self.config.reseed_probability) {
            let pose = rng.scatter(&ctx.center(), ctx.radius());
            particle.pose = pose;
            particle.position_velocity = Vector3::zeros();
            particle.look_velocity = Vector3::zeros();
        }
    }
}

impl SearchStrategy for ParticleSwarm {
    fn name(&self) -> &'static str {
        "particle-swarm"
    }

    fn reset(&mut self, ctx: &mut SearchContext<'_>, seed: &Pose, rng: &mut PoseRng) {
        let center = ctx.center();
        let radius = ctx.radius();
        let size = self.config.population_size.max(1);
        self.particles = std::iter::once(*seed)
            .chain((1..size).map(|_| rng.scatter(&center, radius)))
            .map(Particle::new)
            .collect();
        self.cursor = 0;
        self.current = None;
        self.frame = 0;
    }

    fn begin_frame(
        &mut self,
        _ctx: &mut SearchContext<'_>,
        _best: &Candidate,
        frame: u64,
        _rng: &mut PoseRng,
    ) {
        self.frame = frame;
    }

    fn propose(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        rng: &mut PoseRng,
    ) -> Pose {
        if self.particles.is_empty() {
            self.reset(ctx, &best.pose, rng);
        }
        let index = self.cursor % self.particles.len();
        self.cursor = (index + 1) % self.particles.len();
        self.current = Some(index);

        self.refresh(index, ctx, rng);
        let particle = &mut self.particles[index];
        particle.advance();
        particle.pose
    }

    fn observe(&mut self, pose: &Pose, fitness: f32, best: &Candidate, rng: &mut PoseRng) {
        let Some(index) = self.current.take() else {
            return;
        };
        let config = self.config;
        let particle = &mut self.particles[index];
        particle.pose = *pose;
        if fitness >= particle.personal_best.fitness {
            particle.personal_best = Candidate::new(*pose, fitness);
        }
        particle.accelerate(&config, &best.pose, rng);
    }
}
