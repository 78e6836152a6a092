//! Scene description types: camera lens, colliders, operator tuning and
//! the runnable scenario consumed by the CLI.

use std::fs;
use std::io;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{ShotConfig, ShotConfigError, SolverConfig, SolverConfigError};

/// Pinhole lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_y: f32,
    /// Viewport width divided by height.
    #[serde(default = "default_aspect")]
    pub aspect: f32,
}

fn default_fov() -> f32 {
    60.0
}

fn default_aspect() -> f32 {
    16.0 / 9.0
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: default_fov(),
            aspect: default_aspect(),
        }
    }
}

/// World-space collider geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColliderShape {
    Sphere { center: Point3<f32>, radius: f32 },
    /// Axis-aligned box.
    Cuboid { min: Point3<f32>, max: Point3<f32> },
}

impl ColliderShape {
    /// Translate the shape in place.
    pub fn translate(&mut self, delta: &Vector3<f32>) {
        match self {
            ColliderShape::Sphere { center, .. } => *center += delta,
            ColliderShape::Cuboid { min, max } => {
                *min += delta;
                *max += delta;
            }
        }
    }
}

/// Static obstacle placed in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub shape: ColliderShape,
    /// Layer bit the obstacle lives on.
    #[serde(default = "default_layer")]
    pub layer: u32,
}

fn default_layer() -> u32 {
    1
}

/// Tuning of the camera operator's smoothing and time budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Position responsiveness in [0, 1].
    #[serde(default = "default_responsiveness")]
    pub movement_responsiveness: f32,
    /// Rotation responsiveness in [0, 1].
    #[serde(default = "default_responsiveness")]
    pub rotation_responsiveness: f32,
    /// Search budget of the first frame, in seconds.
    #[serde(default = "default_initial_budget")]
    pub initial_budget: f32,
    /// Lower bound of the search budget, in seconds.
    #[serde(default = "default_min_budget")]
    pub min_budget: f32,
    /// Frame rate above which the budget is allowed to grow.
    #[serde(default = "default_target_frame_rate")]
    pub target_frame_rate: f32,
}

fn default_responsiveness() -> f32 {
    0.95
}

fn default_initial_budget() -> f32 {
    0.1
}

fn default_min_budget() -> f32 {
    0.016
}

fn default_target_frame_rate() -> f32 {
    60.0
}

/// Longest search budget the operator will spend on one frame, in seconds.
pub const MAX_BUDGET: f32 = 1.0;

impl OperatorConfig {
    /// Check responsiveness ranges, budgets and the target frame rate.
    pub fn validate(&self) -> Result<(), OperatorConfigError> {
        for (name, value) in [
            ("movement_responsiveness", self.movement_responsiveness),
            ("rotation_responsiveness", self.rotation_responsiveness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OperatorConfigError::InvalidResponsiveness { name, value });
            }
        }
        for (name, value) in [
            ("initial_budget", self.initial_budget),
            ("min_budget", self.min_budget),
        ] {
            if !(value > 0.0 && value <= MAX_BUDGET) {
                return Err(OperatorConfigError::InvalidBudget { name, value });
            }
        }
        if !(self.target_frame_rate.is_finite() && self.target_frame_rate > 0.0) {
            return Err(OperatorConfigError::InvalidFrameRate(self.target_frame_rate));
        }
        Ok(())
    }
}

/// Operator configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperatorConfigError {
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidResponsiveness { name: &'static str, value: f32 },
    #[error("{name} must be in (0, {MAX_BUDGET}] seconds, got {value}")]
    InvalidBudget { name: &'static str, value: f32 },
    #[error("Target frame rate must be positive, got {0}")]
    InvalidFrameRate(f32),
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            movement_responsiveness: default_responsiveness(),
            rotation_responsiveness: default_responsiveness(),
            initial_budget: default_initial_budget(),
            min_budget: default_min_budget(),
            target_frame_rate: default_target_frame_rate(),
        }
    }
}

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    #[serde(default)]
    pub lens: Lens,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 1.0, -10.0),
            look_at: Point3::origin(),
            lens: Lens::default(),
        }
    }
}

/// A tracked subject in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectPlacement {
    pub position: Point3<f32>,
    /// Rotation about the world Y axis, in degrees.
    #[serde(default)]
    pub heading: f32,
    /// Constant velocity applied every tick.
    #[serde(default = "default_velocity")]
    pub velocity: Vector3<f32>,
    /// Radius of a sphere collider following the subject, if any.
    #[serde(default)]
    pub collider_radius: Option<f32>,
    /// Frame the subject as if it never turned.
    #[serde(default)]
    pub ignore_rotation: bool,
}

fn default_velocity() -> Vector3<f32> {
    Vector3::zeros()
}

/// A runnable scenario: scene, shot, solver and operator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub camera: CameraConfig,
    pub subjects: Vec<SubjectPlacement>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    pub shot: ShotConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    /// Number of simulated frames.
    #[serde(default = "default_ticks")]
    pub ticks: usize,
    /// Simulated frame duration in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,
}

fn default_ticks() -> usize {
    120
}

fn default_dt() -> f32 {
    1.0 / 30.0
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            subjects: vec![SubjectPlacement {
                position: Point3::new(0.0, 0.5, 0.0),
                heading: 0.0,
                velocity: Vector3::new(0.5, 0.0, 0.0),
                collider_radius: Some(0.5),
                ignore_rotation: false,
            }],
            obstacles: vec![ObstacleConfig {
                shape: ColliderShape::Cuboid {
                    min: Point3::new(-0.5, 0.0, -3.0),
                    max: Point3::new(0.5, 2.0, -2.5),
                },
                layer: default_layer(),
            }],
            shot: ShotConfig::default(),
            solver: SolverConfig::default(),
            operator: OperatorConfig::default(),
            ticks: default_ticks(),
            dt: default_dt(),
        }
    }
}

impl Scenario {
    /// Validate the embedded shot and solver, and the subject count.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.shot.validate()?;
        self.solver.validate()?;
        self.operator.validate()?;
        if self.subjects.len() != self.shot.subject_count() {
            return Err(ScenarioError::SubjectCountMismatch {
                expected: self.shot.subject_count(),
                found: self.subjects.len(),
            });
        }
        if !(self.dt > 0.0) {
            return Err(ScenarioError::InvalidTimeStep(self.dt));
        }
        Ok(())
    }

    /// Load and validate a scenario from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&content)?;
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Scenario errors.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Scenario has {found} subjects but the shot expects {expected}")]
    SubjectCountMismatch { expected: usize, found: usize },
    #[error("Time step must be positive, got {0}")]
    InvalidTimeStep(f32),
    #[error(transparent)]
    Shot(#[from] ShotConfigError),
    #[error(transparent)]
    Solver(#[from] SolverConfigError),
    #[error(transparent)]
    Operator(#[from] OperatorConfigError),
    #[error("Failed to read scenario: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),
}
