//! Anytime camera pose search.
//!
//! The [`Solver`] owns the search loop shared by every strategy: re-baseline
//! the incumbent at the camera's current pose, then propose, constrain and
//! evaluate candidates until the wall-clock budget runs out, and finally snap
//! the camera to the best pose found. Strategies only decide where to look
//! next.

mod genetic;
mod greedy;
mod hill_climber;
mod particle_swarm;
mod potential_field;
mod rng;
mod trace;

pub use genetic::*;
pub use greedy::*;
pub use hill_climber::*;
pub use particle_swarm::*;
pub use potential_field::*;
pub use rng::*;
pub use trace::*;

use std::time::{Duration, Instant};

use log::{debug, info};
use nalgebra::{Point3, Unit, Vector3};

use crate::schema::{AxisLocks, PropertyKind, Relation, SolverConfig, StrategyConfig};

use super::camera::Camera;
use super::error::ConfigurationError;
use super::scene::{ColliderId, QueryFilter, SceneQuery};
use super::shot::{Shot, reevaluate_all};
use super::subject::SubjectEvaluator;

/// Initial camera distance from a vantage-angle subject, in subject radii.
pub const INITIAL_DISTANCE_FACTOR: f32 = 2.0;

/// Gap left between the camera and an obstacle found during placement.
pub const OBSTACLE_CLEARANCE: f32 = 0.05;

/// A camera pose as searched: a position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

impl Pose {
    pub fn new(position: Point3<f32>, look_at: Point3<f32>) -> Self {
        Self { position, look_at }
    }

    /// Pose of a camera, looking one unit ahead.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            look_at: camera.position + camera.forward(),
        }
    }

    /// Unit viewing direction, +Z when degenerate.
    pub fn forward(&self) -> Vector3<f32> {
        (self.look_at - self.position)
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::z)
    }

    /// Move a camera to this pose.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.look_at(&self.look_at);
    }

    /// Shift both position and target.
    pub fn translate(&mut self, delta: &Vector3<f32>) {
        self.position += delta;
        self.look_at += delta;
    }

    /// Replace locked or non-finite coordinates with the reference's.
    pub fn constrain(&mut self, reference: &Pose, locks: &AxisLocks) {
        for axis in 0..3 {
            if locks.is_locked(axis) || !self.position[axis].is_finite() {
                self.position[axis] = reference.position[axis];
            }
            if !self.look_at[axis].is_finite() {
                self.look_at[axis] = reference.look_at[axis];
            }
        }
    }
}

/// An evaluated pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub pose: Pose,
    pub fitness: f32,
}

impl Candidate {
    pub fn new(pose: Pose, fitness: f32) -> Self {
        Self { pose, fitness }
    }
}

/// Everything a strategy may read or evaluate during a frame.
pub struct SearchContext<'a> {
    /// Trial camera, left at the last evaluated pose.
    pub camera: &'a mut Camera,
    pub subjects: &'a mut [Option<SubjectEvaluator>],
    pub shot: &'a mut Shot,
    pub scene: &'a dyn SceneQuery,
}

impl SearchContext<'_> {
    /// Move the trial camera to `pose` and score it.
    pub fn evaluate(&mut self, pose: &Pose, rng: &mut PoseRng) -> f32 {
        pose.apply(self.camera);
        self.shot
            .quality_at(self.subjects, self.camera, self.scene, rng)
    }

    /// Centroid of the resolved subjects.
    pub fn center(&self) -> Point3<f32> {
        subjects_center(self.subjects)
    }

    /// Bounding radius of the resolved subjects.
    pub fn radius(&self) -> f32 {
        subjects_radius(self.subjects)
    }
}

/// Centroid of the resolved subjects, the origin when there are none.
pub fn subjects_center(subjects: &[Option<SubjectEvaluator>]) -> Point3<f32> {
    let (sum, count) = subjects
        .iter()
        .flatten()
        .fold((Vector3::zeros(), 0usize), |(sum, n), s| {
            (sum + s.position().coords, n + 1)
        });
    if count == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / count as f32)
    }
}

/// Largest `|position - centroid| + |scale|` over the resolved subjects.
pub fn subjects_radius(subjects: &[Option<SubjectEvaluator>]) -> f32 {
    let center = subjects_center(subjects);
    subjects
        .iter()
        .flatten()
        .map(|s| (s.position() - center).norm() + s.scale().norm())
        .fold(0.0, f32::max)
}

/// Where a strategy proposes candidates.
///
/// The solver calls `reset` once on start, then per frame `begin_frame`,
/// alternating `propose` / `observe` until the budget is spent, and
/// `end_frame`. Candidates returned by `propose` are constrained by the shot's
/// axis locks before evaluation; `observe` receives the constrained pose.
pub trait SearchStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Reinitialise around the placed starting pose.
    fn reset(&mut self, ctx: &mut SearchContext<'_>, seed: &Pose, rng: &mut PoseRng);

    /// Prepare a frame. `best` is the incumbent re-evaluated at the camera pose.
    fn begin_frame(
        &mut self,
        _ctx: &mut SearchContext<'_>,
        _best: &Candidate,
        _frame: u64,
        _rng: &mut PoseRng,
    ) {
    }

    /// Next candidate pose to evaluate.
    fn propose(&mut self, ctx: &mut SearchContext<'_>, best: &Candidate, rng: &mut PoseRng)
    -> Pose;

    /// Result of evaluating the last proposal.
    fn observe(&mut self, _pose: &Pose, _fitness: f32, _best: &Candidate, _rng: &mut PoseRng) {}

    /// Called with the frame's final incumbent.
    fn end_frame(&mut self, _best: &Candidate) {}
}

/// Solver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Stopped,
    Running,
}

/// Anytime pose search driving a swappable strategy.
pub struct Solver {
    strategy: Box<dyn SearchStrategy>,
    rng: PoseRng,
    state: SolverState,
    best: Option<Candidate>,
    satisfaction: f32,
    frame: u64,
    iterations: u64,
    trace: Trace,
}

impl Default for Solver {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl Solver {
    /// Create a new solver around a strategy.
    pub fn new(strategy: Box<dyn SearchStrategy>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            strategy,
            rng: PoseRng::new(seed),
            state: SolverState::Stopped,
            best: None,
            satisfaction: 0.0,
            frame: 0,
            iterations: 0,
            trace: Trace::default(),
        }
    }

    /// Build the configured strategy.
    pub fn from_config(config: &SolverConfig) -> Self {
        let strategy: Box<dyn SearchStrategy> = match config.strategy {
            StrategyConfig::PotentialField(field) => Box::new(PotentialField::new(field)),
            StrategyConfig::HillClimber => Box::new(HillClimber::new()),
            StrategyConfig::ParticleSwarm(swarm) => Box::new(ParticleSwarm::new(swarm)),
            StrategyConfig::Genetic(genetic) => Box::new(GeneticAlgorithm::new(genetic)),
            StrategyConfig::Greedy(swarm) => Box::new(Greedy::new(swarm)),
        };
        Self::new(strategy, config.random_seed)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    #[inline]
    pub fn state(&self) -> SolverState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == SolverState::Running
    }

    /// Fitness returned by the last update.
    #[inline]
    pub fn satisfaction(&self) -> f32 {
        self.satisfaction
    }

    /// Best candidate of the last update.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Total candidates evaluated since start.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Place the camera heuristically and begin searching.
    pub fn start(
        &mut self,
        camera: Option<&mut Camera>,
        subjects: &mut [Option<SubjectEvaluator>],
        shot: &mut Shot,
        scene: &dyn SceneQuery,
    ) -> Result<(), ConfigurationError> {
        let camera = camera.ok_or(ConfigurationError::UnboundCamera)?;
        let seed = place_camera(camera, subjects, shot, scene);
        let placed = *camera;

        let mut ctx = SearchContext {
            camera: &mut *camera,
            subjects,
            shot,
            scene,
        };
        self.strategy.reset(&mut ctx, &seed, &mut self.rng);
        *camera = placed;

        self.trace.clear();
        self.best = None;
        self.satisfaction = 0.0;
        self.frame = 0;
        self.iterations = 0;
        self.state = SolverState::Running;
        info!(
            "Solver started ({}) at {:?} looking at {:?}",
            self.strategy.name(),
            seed.position,
            seed.look_at
        );
        Ok(())
    }

    /// Search for up to `budget` and move `camera` to the best pose found.
    ///
    /// Returns the best fitness, or 0 without touching the camera when
    /// stopped.
    pub fn update(
        &mut self,
        camera: &mut Camera,
        subjects: &mut [Option<SubjectEvaluator>],
        shot: &mut Shot,
        scene: &dyn SceneQuery,
        budget: Duration,
    ) -> f32 {
        if self.state == SolverState::Stopped {
            return 0.0;
        }
        let started = Instant::now();
        self.frame += 1;

        let origin = *camera;
        let mut ctx = SearchContext {
            camera,
            subjects,
            shot,
            scene,
        };
        let fitness = ctx
            .shot
            .quality_at(ctx.subjects, ctx.camera, ctx.scene, &mut self.rng);
        let mut best = Candidate::new(Pose::from_camera(&origin), fitness);
        let mut improved = false;

        self.strategy
            .begin_frame(&mut ctx, &best, self.frame, &mut self.rng);

        let mut iterations = 0u64;
        while started.elapsed() < budget {
            let mut pose = self.strategy.propose(&mut ctx, &best, &mut self.rng);
            pose.constrain(&best.pose, ctx.shot.locks());
            let fitness = ctx.evaluate(&pose, &mut self.rng);
            self.trace.record(&pose, fitness);
            self.strategy.observe(&pose, fitness, &best, &mut self.rng);
            if fitness > best.fitness {
                best = Candidate::new(pose, fitness);
                improved = true;
            }
            iterations += 1;
        }
        self.strategy.end_frame(&best);

        if improved {
            best.pose.apply(ctx.camera);
        } else {
            *ctx.camera = origin;
        }
        reevaluate_all(ctx.subjects, ctx.camera, ctx.scene, &mut self.rng);

        debug!(
            "Frame {}: {} candidates in {:?}, fitness {:.4}",
            self.frame,
            iterations,
            started.elapsed(),
            best.fitness
        );

        self.iterations += iterations;
        self.best = Some(best);
        self.satisfaction = best.fitness;
        best.fitness
    }

    /// Freeze the solver; later updates return 0.
    pub fn stop(&mut self) {
        if self.state == SolverState::Running {
            info!("Solver stopped after {} frames", self.frame);
        }
        self.state = SolverState::Stopped;
        self.satisfaction = 0.0;
    }
}

/// Choose and apply the starting pose.
fn place_camera(
    camera: &mut Camera,
    subjects: &[Option<SubjectEvaluator>],
    shot: &Shot,
    scene: &dyn SceneQuery,
) -> Pose {
    let center = subjects_center(subjects);
    let radius = subjects_radius(subjects);
    let (mut offset, look_at) = initial_offset(subjects, shot, &center, radius);
    if offset.norm() < 1e-6 {
        offset = Vector3::repeat(1.0);
    }

    let mut position = look_at + offset;
    let locks = shot.locks();
    for axis in 0..3 {
        if locks.is_locked(axis) {
            position[axis] = camera.position[axis];
        }
    }

    let to_camera = position - look_at;
    if let Some(direction) = Unit::try_new(to_camera, 1e-6) {
        let own: Vec<ColliderId> = subjects
            .iter()
            .flatten()
            .filter_map(SubjectEvaluator::collider)
            .collect();
        let distance = to_camera.norm();
        if let Some(hit) =
            scene.raycast(&look_at, &direction, distance, &QueryFilter::occlusion(&own))
        {
            debug!(
                "Obstacle {:?} at {:.2} on the placement line, pulling camera in",
                hit.collider, hit.distance
            );
            position = look_at + direction.into_inner() * (hit.distance - OBSTACLE_CLEARANCE).max(0.0);
        }
    }

    let pose = Pose::new(position, look_at);
    pose.apply(camera);
    pose
}

/// Offset from the look-at point, and the look-at point, for the first
/// placement rule that applies.
fn initial_offset(
    subjects: &[Option<SubjectEvaluator>],
    shot: &Shot,
    center: &Point3<f32>,
    radius: f32,
) -> (Vector3<f32>, Point3<f32>) {
    let resolved = |i: usize| subjects.get(i).and_then(Option::as_ref);

    let vantage = shot.properties().iter().find_map(|p| match *p.kind() {
        PropertyKind::VantageAngle {
            subject,
            horizontal,
            vertical,
        } => Some((subject, horizontal, vertical)),
        _ => None,
    });
    if let Some((subject, horizontal, vertical)) = vantage {
        if let Some(s) = resolved(subject) {
            let direction = s.vantage_direction(horizontal, vertical);
            return (direction * radius * INITIAL_DISTANCE_FACTOR, s.position());
        }
    }

    let in_front = shot.properties().iter().find_map(|p| match *p.kind() {
        PropertyKind::RelativePosition {
            subject,
            relation: Relation::InFrontOf,
            other,
        } => Some((subject, other)),
        _ => None,
    });
    if let Some((a, b)) = in_front {
        if let (Some(a), Some(b)) = (resolved(a), resolved(b)) {
            let mut d = (a.position() - b.position()) + a.right() * a.scale().x;
            let length = d.norm();
            if length > 1e-6 {
                d *= 1.1 + a.scale().norm() / length;
            }
            return (d, b.position());
        }
    }

    (Vector3::repeat(radius), *center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::property::Property;
    use crate::compute::proxy::{ProxyVolume, TrackedPose};
    use crate::compute::scene::{DEFAULT_LAYER, StaticScene};
    use crate::schema::{
        ColliderShape, GeneticConfig, Lens, ParticleSwarmConfig, PotentialFieldConfig,
        ProxyShape, SubjectConfig,
    };

    fn subject(position: Point3<f32>) -> Option<SubjectEvaluator> {
        Some(SubjectEvaluator::new(
            TrackedPose::new(position),
            ProxyVolume::new(ProxyShape::Cube, Vector3::zeros(), Vector3::repeat(1.0)),
        ))
    }

    fn framing_shot() -> Shot {
        Shot::new(
            vec![SubjectConfig::default()],
            vec![
                Property::projection_size(0, 0.6, 1.0),
                Property::position_on_screen(0, 0.5, 0.5, 1.0),
            ],
            AxisLocks::default(),
        )
        .unwrap()
    }

    fn strategies() -> Vec<StrategyConfig> {
        vec![
            StrategyConfig::PotentialField(PotentialFieldConfig::default()),
            StrategyConfig::HillClimber,
            StrategyConfig::ParticleSwarm(ParticleSwarmConfig::default()),
            StrategyConfig::Genetic(GeneticConfig::default()),
            StrategyConfig::Greedy(ParticleSwarmConfig::default()),
        ]
    }

    fn solver(strategy: StrategyConfig) -> Solver {
        Solver::from_config(&SolverConfig {
            strategy,
            random_seed: Some(42),
        })
    }

    #[test]
    fn test_start_without_camera_fails() {
        let mut solver = Solver::default();
        let mut subjects = vec![subject(Point3::origin())];
        let mut shot = framing_shot();
        let result = solver.start(None, &mut subjects, &mut shot, &StaticScene::new());
        assert_eq!(result, Err(ConfigurationError::UnboundCamera));
        assert!(!solver.is_running());
    }

    #[test]
    fn test_stopped_update_is_noop() {
        let mut solver = Solver::default();
        let mut subjects = vec![subject(Point3::origin())];
        let mut shot = framing_shot();
        let mut camera = Camera::looking_at(
            Point3::new(3.0, 1.0, -4.0),
            &Point3::origin(),
            Lens::default(),
        );
        let before = camera;

        let fitness = solver.update(
            &mut camera,
            &mut subjects,
            &mut shot,
            &StaticScene::new(),
            Duration::from_millis(5),
        );
        assert_eq!(fitness, 0.0);
        assert_eq!(camera, before);

        let scene = StaticScene::new();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &scene)
            .unwrap();
        solver.stop();
        let placed = camera;
        let fitness = solver.update(
            &mut camera,
            &mut subjects,
            &mut shot,
            &scene,
            Duration::from_millis(5),
        );
        assert_eq!(fitness, 0.0);
        assert_eq!(camera, placed);
    }

    #[test]
    fn test_default_placement_diagonal() {
        let mut solver = Solver::default();
        let mut subjects = vec![subject(Point3::new(1.0, 0.0, 0.0))];
        let mut shot = framing_shot();
        let mut camera = Camera::default();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &StaticScene::new())
            .unwrap();

        let radius = 3.0f32.sqrt();
        let expected = Point3::new(1.0 + radius, radius, radius);
        assert!((camera.position - expected).norm() < 1e-4);
        let to_subject = (Point3::new(1.0, 0.0, 0.0) - camera.position).normalize();
        assert!((camera.forward() - to_subject).norm() < 1e-4);
        assert!(solver.is_running());
    }

    #[test]
    fn test_vantage_placement() {
        let mut solver = Solver::default();
        let mut subjects = vec![subject(Point3::origin())];
        let mut shot = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::vantage_angle(0, 90.0, 0.0, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let mut camera = Camera::default();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &StaticScene::new())
            .unwrap();

        // h = 90 places the camera on the subject's -X side
        let distance = 3.0f32.sqrt() * INITIAL_DISTANCE_FACTOR;
        assert!((camera.position - Point3::new(-distance, 0.0, 0.0)).norm() < 1e-3);
    }

    #[test]
    fn test_in_front_of_placement() {
        let mut solver = Solver::default();
        let mut subjects = vec![
            subject(Point3::new(0.0, 0.0, -2.0)),
            subject(Point3::new(0.0, 0.0, 2.0)),
        ];
        let mut shot = Shot::new(
            vec![SubjectConfig::default(); 2],
            vec![Property::relative_position(0, Relation::InFrontOf, 1, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let mut camera = Camera::default();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &StaticScene::new())
            .unwrap();
        // camera ends up beyond subject 0 as seen from subject 1
        assert!(camera.position.z < -2.0);
        assert!(camera.forward().z > 0.0);
    }

    #[test]
    fn test_placement_pulls_in_front_of_obstacle() {
        let mut scene = StaticScene::new();
        scene.add(
            ColliderShape::Cuboid {
                min: Point3::new(0.5, 0.5, 0.5),
                max: Point3::new(1.5, 1.5, 1.5),
            },
            DEFAULT_LAYER,
        );
        let mut solver = Solver::default();
        let mut subjects = vec![subject(Point3::new(-1.0, -1.0, -1.0))];
        let mut shot = framing_shot();
        let mut camera = Camera::default();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &scene)
            .unwrap();
        // the diagonal placement ray hits the box corner at (0.5, 0.5, 0.5)
        let corner = Point3::new(0.5f32, 0.5, 0.5);
        let expected_distance =
            (corner - Point3::new(-1.0f32, -1.0, -1.0)).norm() - OBSTACLE_CLEARANCE;
        let distance = (camera.position - Point3::new(-1.0, -1.0, -1.0)).norm();
        assert!((distance - expected_distance).abs() < 1e-3);
    }

    #[test]
    fn test_locked_axes_hold() {
        let scene = StaticScene::new();
        for strategy in strategies() {
            let mut solver = solver(strategy);
            let mut subjects = vec![subject(Point3::origin())];
            let mut shot = framing_shot();
            shot.set_locks(AxisLocks {
                x: false,
                y: true,
                z: false,
            });
            let mut camera = Camera::looking_at(
                Point3::new(0.0, 2.5, -6.0),
                &Point3::origin(),
                Lens::default(),
            );
            solver
                .start(Some(&mut camera), &mut subjects, &mut shot, &scene)
                .unwrap();
            for _ in 0..3 {
                solver.update(
                    &mut camera,
                    &mut subjects,
                    &mut shot,
                    &scene,
                    Duration::from_millis(5),
                );
                assert_eq!(camera.position.y, 2.5, "{}", solver.strategy_name());
            }
        }
    }

    #[test]
    fn test_satisfaction_monotone_in_static_scene() {
        let scene = StaticScene::new();
        for strategy in strategies() {
            let mut solver = solver(strategy);
            let mut subjects = vec![subject(Point3::origin())];
            let mut shot = framing_shot();
            let mut camera = Camera::default();
            solver
                .start(Some(&mut camera), &mut subjects, &mut shot, &scene)
                .unwrap();

            let mut previous = 0.0;
            for frame in 0..6 {
                let fitness = solver.update(
                    &mut camera,
                    &mut subjects,
                    &mut shot,
                    &scene,
                    Duration::from_millis(3 + frame),
                );
                assert!((0.0..=1.0).contains(&fitness));
                assert!(
                    fitness >= previous,
                    "{}: {fitness} < {previous}",
                    solver.strategy_name()
                );
                assert_eq!(solver.satisfaction(), fitness);
                previous = fitness;
            }
            assert!(previous > 0.0, "{}", solver.strategy_name());
            assert!(!solver.trace().is_empty());
            assert!(solver.trace().len() <= TRACE_LENGTH);
        }
    }

    #[test]
    fn test_update_improves_on_poor_start() {
        let scene = StaticScene::new();
        let mut solver = solver(StrategyConfig::PotentialField(PotentialFieldConfig::default()));
        let mut subjects = vec![subject(Point3::origin())];
        let mut shot = framing_shot();
        let mut camera = Camera::default();
        solver
            .start(Some(&mut camera), &mut subjects, &mut shot, &scene)
            .unwrap();
        // point the camera away from the subject
        camera.look_at(&Point3::new(10.0, 10.0, 10.0));
        let before = shot.quality_at(&mut subjects, &camera, &scene, &mut PoseRng::new(0));
        let after = solver.update(
            &mut camera,
            &mut subjects,
            &mut shot,
            &scene,
            Duration::from_millis(30),
        );
        assert!(after >= before);
        assert!(after > 0.0);
    }

    #[test]
    fn test_pose_constrain() {
        let reference = Pose::new(Point3::new(1.0, 2.0, 3.0), Point3::new(0.0, 0.0, 0.0));
        let mut pose = Pose::new(
            Point3::new(f32::NAN, 5.0, f32::INFINITY),
            Point3::new(1.0, f32::NAN, 1.0),
        );
        pose.constrain(
            &reference,
            &AxisLocks {
                x: false,
                y: true,
                z: false,
            },
        );
        assert_eq!(pose.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.look_at, Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_subjects_center_and_radius() {
        let subjects = vec![
            subject(Point3::new(-2.0, 0.0, 0.0)),
            None,
            subject(Point3::new(2.0, 0.0, 0.0)),
        ];
        assert_eq!(subjects_center(&subjects), Point3::origin());
        assert!((subjects_radius(&subjects) - (2.0 + 3.0f32.sqrt())).abs() < 1e-5);
        assert_eq!(subjects_radius(&[]), 0.0);
    }
}
