//! Artificial potential field search.
//!
//! Every property whose target is not met pushes the camera with a small
//! force; the sum is applied to the incumbent position and perturbed by noise
//! that shrinks as fitness grows.

use std::f32::consts::PI;

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::compute::camera::Camera;
use crate::compute::property::unit;
use crate::compute::shot::Shot;
use crate::compute::subject::{SamplePoint, SubjectEvaluator};
use crate::schema::{PotentialFieldConfig, PropertyKind, PropertyType};

use super::{Candidate, Pose, PoseRng, SearchContext, SearchStrategy};

/// Property types that decide where the camera should look.
const LOOK_AT_TYPES: [PropertyType; 1] = [PropertyType::PositionOnScreen];

/// Force magnitude of the nudge terms, relative to subject size.
const NUDGE_SCALE: f32 = 0.2;

/// Potential field strategy.
#[derive(Debug, Clone)]
pub struct PotentialField {
    config: PotentialFieldConfig,
    look_fitness: f32,
}

impl Default for PotentialField {
    fn default() -> Self {
        Self::new(PotentialFieldConfig::default())
    }
}

impl PotentialField {
    pub fn new(config: PotentialFieldConfig) -> Self {
        Self {
            config,
            look_fitness: 0.0,
        }
    }

    /// How well the current framing satisfies the look-at related terms.
    pub fn look_fitness(&self) -> f32 {
        self.look_fitness
    }

    /// Sum of property forces at the trial camera, clamped to unit length.
    pub fn force(&self, ctx: &SearchContext<'_>, rng: &mut PoseRng) -> Vector3<f32> {
        let camera = ctx.camera.position;
        let mut total = Vector3::zeros();
        for property in ctx.shot.properties() {
            let subject = ctx
                .subjects
                .get(property.kind().main_subject())
                .and_then(Option::as_ref);
            let Some(subject) = subject else {
                continue;
            };
            let force = match *property.kind() {
                PropertyKind::ProjectionSize { size, .. } => self.projection_force(
                    subject,
                    &camera,
                    size,
                    property.satisfaction(),
                ),
                PropertyKind::VantageAngle {
                    horizontal,
                    vertical,
                    ..
                } => self.vantage_force(subject, &camera, horizontal, vertical),
                PropertyKind::PositionOnScreen { .. } | PropertyKind::RelativePosition { .. } => {
                    Vector3::zeros()
                }
            };
            total += force;
        }

        for subject in ctx.subjects.iter().flatten() {
            total += occlusion_force(subject, ctx.camera, rng);
            total += frustum_force(subject, &camera);
        }

        let magnitude = total.norm();
        if magnitude > 1.0 {
            total / magnitude
        } else if magnitude.is_finite() {
            total
        } else {
            Vector3::zeros()
        }
    }

    /// Move toward or away from the subject until its projection matches.
    fn projection_force(
        &self,
        subject: &SubjectEvaluator,
        camera: &Point3<f32>,
        desired: f32,
        satisfaction: f32,
    ) -> Vector3<f32> {
        if subject.visibility() <= 0.0 {
            return Vector3::zeros();
        }
        let Some(away) = (camera - subject.position()).try_normalize(1e-6) else {
            return Vector3::zeros();
        };
        let damping = 1.0 - subject.occlusion().powi(self.config.occlusion_damping_exponent);
        let magnitude = (1.0 - satisfaction) * damping;
        if desired < subject.projection_size() {
            away * magnitude
        } else {
            -away * magnitude
        }
    }

    /// Rotate the camera about the subject toward the requested vantage, at
    /// most `vantage_step` radians per proposal.
    fn vantage_force(
        &self,
        subject: &SubjectEvaluator,
        camera: &Point3<f32>,
        horizontal: f32,
        vertical: f32,
    ) -> Vector3<f32> {
        let relative = camera - subject.position();
        let target = subject.vantage_direction(horizontal, vertical);
        let Some(from) = relative.try_normalize(1e-6) else {
            return Vector3::zeros();
        };

        let rotation = UnitQuaternion::rotation_between(&from, &target)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&half_turn_axis(&from), PI));
        let angle = rotation.angle();
        let step = if angle > self.config.vantage_step {
            rotation.powf(self.config.vantage_step / angle)
        } else {
            rotation
        };
        step * relative - relative
    }
}

/// Axis for a half turn away from `from`: world up projected off `from`, or
/// world X when `from` is vertical.
fn half_turn_axis(from: &Vector3<f32>) -> Unit<Vector3<f32>> {
    [Vector3::y(), Vector3::x()]
        .into_iter()
        .find_map(|axis| Unit::try_new(axis - from * from.dot(&axis), 1e-3))
        .unwrap_or_else(Vector3::z_axis)
}

/// Sidestep, in the camera's image plane, away from occluded sample points.
fn occlusion_force(
    subject: &SubjectEvaluator,
    camera: &Camera,
    rng: &mut PoseRng,
) -> Vector3<f32> {
    let occlusion = subject.occlusion();
    if occlusion <= 0.0 {
        return Vector3::zeros();
    }
    let (horizontal, vertical) = if occlusion >= 1.0 {
        (rng.signed(), rng.signed())
    } else {
        let mut h = 0.0;
        let mut v = 0.0;
        if subject.is_occluded(SamplePoint::Left) {
            h += 1.0;
        }
        if subject.is_occluded(SamplePoint::Right) {
            h -= 1.0;
        }
        if subject.is_occluded(SamplePoint::Bottom) {
            v += 1.0;
        }
        if subject.is_occluded(SamplePoint::Top) {
            v -= 1.0;
        }
        (h, v)
    };
    let direction = camera.up() * vertical + camera.right() * horizontal;
    direction
        .try_normalize(1e-6)
        .map_or_else(Vector3::zeros, |d| d * subject.scale().norm() * NUDGE_SCALE)
}

/// Back away while the subject is partly out of frame.
fn frustum_force(subject: &SubjectEvaluator, camera: &Point3<f32>) -> Vector3<f32> {
    let outside = 1.0 - subject.in_frustum();
    if outside <= 0.0 {
        return Vector3::zeros();
    }
    (camera - subject.position())
        .try_normalize(1e-6)
        .map_or_else(Vector3::zeros, |d| {
            d * outside * subject.scale().norm() * NUDGE_SCALE
        })
}

impl SearchStrategy for PotentialField {
    fn name(&self) -> &'static str {
        "potential-field"
    }

    fn reset(&mut self, _ctx: &mut SearchContext<'_>, _seed: &Pose, _rng: &mut PoseRng) {
        self.look_fitness = 0.0;
    }

    fn begin_frame(
        &mut self,
        ctx: &mut SearchContext<'_>,
        _best: &Candidate,
        _frame: u64,
        _rng: &mut PoseRng,
    ) {
        let in_frustum = Shot::in_frustum(ctx.subjects);
        let on_screen = ctx.shot.subset_quality(&LOOK_AT_TYPES, ctx.subjects);
        self.look_fitness = unit(0.5 * in_frustum + 0.5 * on_screen);
    }

    fn propose(
        &mut self,
        ctx: &mut SearchContext<'_>,
        best: &Candidate,
        rng: &mut PoseRng,
    ) -> Pose {
        let radius = ctx.radius();
        let center = ctx.center();
        let force = self.force(ctx, rng);

        let fitness = unit(best.fitness);
        let position_noise = (1.0 - fitness * fitness) * radius;
        let look_noise = (1.0 - self.look_fitness.powi(4)) * radius;

        let position = best.pose.position + force + rng.in_unit_ball() * position_noise;
        let look_at = center + rng.in_unit_ball() * look_noise;
        Pose::new(position, look_at)
    }
}
