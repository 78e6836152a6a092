//! CamOn - autonomous virtual camera framing.
//!
//! Given a set of tracked subjects and a shot described as weighted visual
//! properties (projection size, position on screen, vantage angle, relative
//! position), this crate searches for the camera pose that best satisfies the
//! shot, within a per-frame time budget, and keeps searching as subjects move.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Serializable shot, solver and scenario configuration
//! - `compute`: Camera model, subject visibility, shot scoring, pose search
//!   and the per-frame camera operator
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use camon::{
//!     compute::{Camera, ProxyVolume, Shot, Solver, StaticScene, SubjectEvaluator, TrackedPose},
//!     schema::{Lens, ShotConfig, SolverConfig},
//! };
//! use nalgebra::Point3;
//!
//! let config = ShotConfig::default();
//! let mut shot = Shot::from_config(&config).unwrap();
//! let mut subjects = vec![Some(SubjectEvaluator::new(
//!     TrackedPose::new(Point3::origin()),
//!     ProxyVolume::from_config(&config.subjects[0]),
//! ))];
//! let scene = StaticScene::new();
//!
//! let mut camera = Camera::looking_at(Point3::new(0.0, 1.0, -10.0), &Point3::origin(), Lens::default());
//! let mut solver = Solver::from_config(&SolverConfig::default());
//! solver.start(Some(&mut camera), &mut subjects, &mut shot, &scene).unwrap();
//!
//! for _ in 0..10 {
//!     let fitness = solver.update(&mut camera, &mut subjects, &mut shot, &scene, Duration::from_millis(16));
//!     println!("fitness {fitness:.3} at {:?}", camera.position);
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{CameraOperator, Shot, Solver, SubjectEvaluator};
pub use schema::{Scenario, ShotConfig, SolverConfig};
