//! Frame-by-frame orchestration: owns the shot, the subject evaluators and the
//! solver, adapts the search budget to the frame rate and smooths the rendered
//! camera toward the solver's pick.

use std::time::Duration;

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};

use crate::schema::{MAX_BUDGET, OperatorConfig};

use super::camera::{Camera, smooth_damp};
use super::error::ConfigurationError;
use super::proxy::{ProxyVolume, TrackedPose};
use super::scene::{ColliderId, SceneQuery};
use super::shot::Shot;
use super::solver::{Solver, subjects_center};
use super::subject::SubjectEvaluator;

/// How the rendered camera reaches a newly selected shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Jump straight to the new framing.
    #[default]
    Cut,
    /// Blend with the usual smoothing.
    Smooth,
}

/// What the host knows about one subject slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectBinding {
    pub pose: Option<TrackedPose>,
    /// Own collider, excluded from the subject's occlusion rays.
    pub collider: Option<ColliderId>,
    pub ignored: bool,
    /// Place the proxy and vantage frame without the pose's rotation.
    pub ignore_rotation: bool,
    /// Added to the shot's proxy offset.
    pub area_offset: Vector3<f32>,
    /// Multiplies the shot's proxy scale.
    pub area_scale: Vector3<f32>,
}

impl Default for SubjectBinding {
    fn default() -> Self {
        Self {
            pose: None,
            collider: None,
            ignored: false,
            ignore_rotation: false,
            area_offset: Vector3::zeros(),
            area_scale: Vector3::repeat(1.0),
        }
    }
}

impl SubjectBinding {
    pub fn new(pose: TrackedPose) -> Self {
        Self {
            pose: Some(pose),
            ..Self::default()
        }
    }

    pub fn with_collider(mut self, collider: ColliderId) -> Self {
        self.collider = Some(collider);
        self
    }
}

/// Drives a [`Solver`] once per rendered frame.
pub struct CameraOperator {
    config: OperatorConfig,
    camera: Camera,
    evaluation_camera: Camera,
    solver: Solver,
    shot: Option<Shot>,
    bindings: Vec<SubjectBinding>,
    subjects: Vec<Option<SubjectEvaluator>>,
    velocity: Vector3<f32>,
    time_limit: Duration,
    last_center: Option<Point3<f32>>,
    satisfaction: f32,
    dirty: bool,
}

impl CameraOperator {
    pub fn new(config: OperatorConfig, camera: Camera, solver: Solver) -> Self {
        Self {
            config,
            camera,
            evaluation_camera: camera,
            solver,
            shot: None,
            bindings: Vec::new(),
            subjects: Vec::new(),
            velocity: Vector3::zeros(),
            time_limit: budget(config.initial_budget),
            last_center: None,
            satisfaction: 0.0,
            dirty: false,
        }
    }

    /// The smoothed camera a host should render from.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The camera the solver searches with.
    pub fn evaluation_camera(&self) -> &Camera {
        &self.evaluation_camera
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn shot(&self) -> Option<&Shot> {
        self.shot.as_ref()
    }

    pub fn subjects(&self) -> &[Option<SubjectEvaluator>] {
        &self.subjects
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Satisfaction of the last tick.
    pub fn satisfaction(&self) -> f32 {
        self.satisfaction
    }

    /// Current search budget.
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// A shot is selected and every slot resolves to an evaluator.
    pub fn is_ready(&self) -> bool {
        self.shot
            .as_ref()
            .is_some_and(|shot| self.subjects.len() == shot.subject_count())
            && self.subjects.iter().all(Option::is_some)
    }

    /// Switch to a new shot and restart the search.
    pub fn select_shot(
        &mut self,
        shot: Shot,
        transition: Transition,
        bindings: Vec<SubjectBinding>,
        scene: &dyn SceneQuery,
    ) -> Result<(), ConfigurationError> {
        self.bindings = bindings;
        self.bindings
            .resize(shot.subject_count(), SubjectBinding::default());
        self.shot = Some(shot);
        self.reset(scene)?;
        if transition == Transition::Cut {
            self.camera = self.evaluation_camera;
            self.velocity = Vector3::zeros();
        }
        Ok(())
    }

    /// Drop the shot and stop searching.
    pub fn clear_shot(&mut self) {
        self.shot = None;
        self.subjects.clear();
        self.solver.stop();
        self.last_center = None;
        self.satisfaction = 0.0;
    }

    /// Replace a slot's binding and restart.
    pub fn bind_subject(
        &mut self,
        slot: usize,
        binding: SubjectBinding,
        scene: &dyn SceneQuery,
    ) -> Result<(), ConfigurationError> {
        if slot >= self.bindings.len() {
            self.bindings.resize(slot + 1, SubjectBinding::default());
        }
        self.bindings[slot] = binding;
        self.reset(scene)
    }

    /// Report a subject's latest pose. Resolving a previously unbound slot
    /// restarts the search on the next tick.
    pub fn set_subject_pose(&mut self, slot: usize, pose: TrackedPose) {
        if slot >= self.bindings.len() {
            self.bindings.resize(slot + 1, SubjectBinding::default());
        }
        self.bindings[slot].pose = Some(pose);
        match self.subjects.get_mut(slot) {
            Some(Some(subject)) => subject.set_pose(pose),
            _ => self.dirty = true,
        }
    }

    /// Resize or shift the region of a subject that should be framed.
    pub fn set_area_of_interest(
        &mut self,
        slot: usize,
        offset: Vector3<f32>,
        scale: Vector3<f32>,
        scene: &dyn SceneQuery,
    ) -> Result<(), ConfigurationError> {
        if slot >= self.bindings.len() {
            self.bindings.resize(slot + 1, SubjectBinding::default());
        }
        self.bindings[slot].area_offset = offset;
        self.bindings[slot].area_scale = scale;
        self.reset(scene)
    }

    /// Rebuild every evaluator from the bindings and restart the solver when
    /// the problem is fully bound.
    pub fn reset(&mut self, scene: &dyn SceneQuery) -> Result<(), ConfigurationError> {
        self.dirty = false;
        self.solver.stop();
        self.last_center = None;
        self.satisfaction = 0.0;

        let Some(shot) = self.shot.as_mut() else {
            self.subjects.clear();
            return Ok(());
        };

        self.subjects = shot
            .subjects()
            .iter()
            .enumerate()
            .map(|(slot, config)| {
                let binding = self.bindings.get(slot).copied().unwrap_or_default();
                let proxy = ProxyVolume::from_config(config)
                    .with_area_of_interest(&binding.area_offset, &binding.area_scale);
                match SubjectEvaluator::bind(slot, binding.pose, proxy) {
                    Ok(subject) => {
                        let mut subject = subject
                            .with_collider(binding.collider)
                            .with_ignore_rotation(binding.ignore_rotation);
                        subject.set_ignored(binding.ignored);
                        Some(subject)
                    }
                    Err(err) => {
                        debug!("{err}, waiting for a pose");
                        None
                    }
                }
            })
            .collect();

        if !self.subjects.iter().all(Option::is_some) {
            info!("Shot selected with unbound subjects, solver idle");
            return Ok(());
        }

        self.solver.start(
            Some(&mut self.evaluation_camera),
            &mut self.subjects,
            shot,
            scene,
        )?;
        self.last_center = Some(subjects_center(&self.subjects));
        Ok(())
    }

    /// Advance one rendered frame of `dt` seconds and return the solver's
    /// satisfaction.
    pub fn tick(&mut self, dt: f32, scene: &dyn SceneQuery) -> f32 {
        if self.dirty {
            if let Err(err) = self.reset(scene) {
                warn!("Failed to restart solver: {err}");
            }
        }

        let target = 1.0 / self.config.target_frame_rate;
        let seconds = self.time_limit.as_secs_f32();
        let seconds = if dt < target {
            seconds * 1.1
        } else {
            seconds * 0.9
        };
        self.time_limit = budget(seconds.max(self.config.min_budget));

        self.satisfaction = if self.is_ready() {
            let center = subjects_center(&self.subjects);
            if let Some(last) = self.last_center {
                self.evaluation_camera.position += center - last;
            }
            self.last_center = Some(center);

            match self.shot.as_mut() {
                Some(shot) => self.solver.update(
                    &mut self.evaluation_camera,
                    &mut self.subjects,
                    shot,
                    scene,
                    self.time_limit,
                ),
                None => 0.0,
            }
        } else {
            0.0
        };

        self.follow(dt);
        self.satisfaction
    }

    /// Move the rendered camera toward the evaluation camera, faster the
    /// better the current framing.
    fn follow(&mut self, dt: f32) {
        let damp = self.satisfaction.powi(4);
        let smooth_time = 1.05 - self.config.movement_responsiveness * damp;
        self.camera.position = smooth_damp(
            &self.camera.position,
            &self.evaluation_camera.position,
            &mut self.velocity,
            smooth_time,
            dt,
        );

        let t = (dt * (0.1 + self.config.rotation_responsiveness * damp * 0.9) * 2.0)
            .clamp(0.0, 1.0);
        let target = self.evaluation_camera.rotation;
        self.camera.rotation = self
            .camera
            .rotation
            .try_slerp(&target, t, 1e-6)
            .unwrap_or(target);
        self.camera.lens = self.evaluation_camera.lens;
    }
}

/// Search budget for `seconds`, capped at [`MAX_BUDGET`].
fn budget(seconds: f32) -> Duration {
    if seconds > 0.0 {
        Duration::try_from_secs_f32(seconds.min(MAX_BUDGET)).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}
