//! Per-subject visibility and projection sampling.
//!
//! A [`SubjectEvaluator`] projects its proxy volume through a camera, picks
//! five sample points on the visible part, tests each for line of sight and
//! summarises the result as in-frustum coverage, occlusion, screen bounds and
//! projected size. Scoring rules read only these results.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use rand::Rng;

use super::camera::Camera;
use super::error::ConfigurationError;
use super::proxy::{ProxyVolume, TrackedPose};
use super::scene::{ColliderId, QueryFilter, SceneQuery};

/// Number of line-of-sight samples per subject.
pub const SAMPLE_COUNT: usize = 5;

/// Margin applied to the projected size.
pub const PROJECTION_MARGIN: f32 = 1.1;

/// Largest Center offset along Right - Left, as a fraction.
const CENTER_JITTER: f32 = 0.2;

/// Named sample points on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplePoint {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl SamplePoint {
    pub const ALL: [SamplePoint; SAMPLE_COUNT] = [
        SamplePoint::Top,
        SamplePoint::Bottom,
        SamplePoint::Left,
        SamplePoint::Right,
        SamplePoint::Center,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Screen-space extent of a subject: x and y in viewport units, z is depth.
///
/// When the subject is entirely out of frame both corners hold the same
/// sentinel: `+inf` / `-inf` for off the high / low side of an axis, NaN when
/// the centre projects inside the frame on that axis but nothing was kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl ScreenBounds {
    fn sentinel(projected: &Vector3<f32>) -> Self {
        let corner = Vector3::new(off_screen(projected.x), off_screen(projected.y), 0.0);
        Self {
            min: corner,
            max: corner,
        }
    }

    /// Centre of the bounds in x and y.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

fn off_screen(coordinate: f32) -> f32 {
    if coordinate > 0.0 {
        if coordinate > 1.0 {
            f32::INFINITY
        } else {
            f32::NAN
        }
    } else {
        f32::NEG_INFINITY
    }
}

/// Visibility sampler bound to one tracked subject.
#[derive(Debug, Clone)]
pub struct SubjectEvaluator {
    pose: TrackedPose,
    proxy: ProxyVolume,
    collider: Option<ColliderId>,
    ignored: bool,
    ignore_rotation: bool,
    samples: [Point3<f32>; SAMPLE_COUNT],
    visible: [bool; SAMPLE_COUNT],
    in_frustum: f32,
    bounds: ScreenBounds,
    projection_size: f32,
    camera_position: Point3<f32>,
}

impl SubjectEvaluator {
    /// Create a new evaluator. Nothing is visible until the first
    /// [`reevaluate`](Self::reevaluate).
    pub fn new(pose: TrackedPose, proxy: ProxyVolume) -> Self {
        let center = proxy.center(&pose);
        Self {
            pose,
            proxy,
            collider: None,
            ignored: false,
            ignore_rotation: false,
            samples: [Point3::origin(); SAMPLE_COUNT],
            visible: [false; SAMPLE_COUNT],
            in_frustum: 0.0,
            bounds: ScreenBounds {
                min: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, 0.0),
                max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, 0.0),
            },
            projection_size: f32::NEG_INFINITY,
            camera_position: center,
        }
    }

    /// Bind an evaluator to a subject slot, failing if the slot has no pose.
    pub fn bind(
        slot: usize,
        pose: Option<TrackedPose>,
        proxy: ProxyVolume,
    ) -> Result<Self, ConfigurationError> {
        pose.map(|pose| Self::new(pose, proxy))
            .ok_or(ConfigurationError::UnboundSubject { slot })
    }

    /// Exclude the subject's own collider from its occlusion rays.
    pub fn with_collider(mut self, collider: Option<ColliderId>) -> Self {
        self.collider = collider;
        self
    }

    /// Treat the subject as unrotated: the proxy, the vantage frame and the
    /// local axes follow the tracked position only.
    pub fn with_ignore_rotation(mut self, ignore_rotation: bool) -> Self {
        self.ignore_rotation = ignore_rotation;
        self
    }

    pub fn ignores_rotation(&self) -> bool {
        self.ignore_rotation
    }

    pub fn pose(&self) -> &TrackedPose {
        &self.pose
    }

    /// Pose the proxy and vantage frame are placed with.
    fn frame(&self) -> TrackedPose {
        if self.ignore_rotation {
            TrackedPose::new(self.pose.position)
        } else {
            self.pose
        }
    }

    /// Update the tracked world pose. Results are stale until the next
    /// reevaluation.
    pub fn set_pose(&mut self, pose: TrackedPose) {
        self.pose = pose;
    }

    pub fn proxy(&self) -> &ProxyVolume {
        &self.proxy
    }

    pub fn collider(&self) -> Option<ColliderId> {
        self.collider
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Freeze the current results; reevaluation becomes a no-op.
    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Recompute all results against `camera`.
    pub fn reevaluate<R: Rng + ?Sized>(
        &mut self,
        camera: &Camera,
        scene: &dyn SceneQuery,
        rng: &mut R,
    ) {
        if self.ignored {
            return;
        }
        self.camera_position = camera.position;

        let total = self.proxy.vertices().len();
        let mut kept = 0usize;
        let mut min = Vector3::new(1.0, 1.0, f32::INFINITY);
        let mut max = Vector3::new(0.0, 0.0, 0.0);
        let mut samples = [Point3::origin(); SAMPLE_COUNT];

        let frame = self.frame();
        for world in self.proxy.world_vertices(&frame) {
            let s = camera.world_to_viewport(&world);
            if !(s.z > 0.0 && s.x > 0.0 && s.x < 1.0 && s.y > 0.0 && s.y < 1.0) {
                continue;
            }
            kept += 1;
            if s.y > max.y {
                max.y = s.y;
                samples[SamplePoint::Top.index()] = world;
            }
            if s.y < min.y {
                min.y = s.y;
                samples[SamplePoint::Bottom.index()] = world;
            }
            if s.x < min.x {
                min.x = s.x;
                samples[SamplePoint::Left.index()] = world;
            }
            if s.x > max.x {
                max.x = s.x;
                samples[SamplePoint::Right.index()] = world;
            }
            min.z = min.z.min(s.z);
            max.z = max.z.max(s.z);
        }

        self.in_frustum = if total == 0 {
            0.0
        } else {
            kept as f32 / total as f32
        };

        if kept == 0 {
            let center = self.proxy.center(&frame);
            self.samples = [Point3::origin(); SAMPLE_COUNT];
            self.visible = [false; SAMPLE_COUNT];
            self.projection_size = f32::NEG_INFINITY;
            self.bounds = ScreenBounds::sentinel(&camera.world_to_viewport(&center));
            return;
        }

        let left = samples[SamplePoint::Left.index()];
        let right = samples[SamplePoint::Right.index()];
        let mean = (samples[0].coords + samples[1].coords + left.coords + right.coords) * 0.25;
        let jitter = (right - left) * rng.r#gen::<f32>() * CENTER_JITTER;
        samples[SamplePoint::Center.index()] = Point3::from(mean + jitter);

        let exclude = self.collider.as_slice();
        let filter = QueryFilter::occlusion(exclude);
        for (flag, sample) in self.visible.iter_mut().zip(samples.iter()) {
            let to_camera = camera.position - sample;
            let distance = to_camera.norm();
            *flag = match Unit::try_new(to_camera, 1e-6) {
                Some(direction) => scene
                    .raycast(sample, &direction, distance, &filter)
                    .is_none(),
                None => true,
            };
        }

        self.samples = samples;
        self.bounds = ScreenBounds { min, max };
        self.projection_size = PROJECTION_MARGIN * (max.x - min.x).max(max.y - min.y);
    }

    /// Fraction of proxy vertices inside the frame.
    #[inline]
    pub fn in_frustum(&self) -> f32 {
        self.in_frustum
    }

    /// Fraction of sample points with blocked line of sight.
    pub fn occlusion(&self) -> f32 {
        self.visible.iter().filter(|v| !**v).count() as f32 / SAMPLE_COUNT as f32
    }

    /// `in_frustum * (1 - occlusion)`.
    pub fn visibility(&self) -> f32 {
        self.in_frustum * (1.0 - self.occlusion())
    }

    pub fn is_occluded(&self, sample: SamplePoint) -> bool {
        !self.visible[sample.index()]
    }

    pub fn sample_point(&self, sample: SamplePoint) -> Point3<f32> {
        self.samples[sample.index()]
    }

    /// Projected size with margin, `-inf` when nothing is in frame.
    #[inline]
    pub fn projection_size(&self) -> f32 {
        self.projection_size
    }

    pub fn screen_bounds(&self) -> &ScreenBounds {
        &self.bounds
    }

    /// Centre of the screen bounds.
    pub fn position_on_screen(&self) -> (f32, f32) {
        self.bounds.center()
    }

    /// World-space centre of the proxy volume.
    pub fn position(&self) -> Point3<f32> {
        self.proxy.center(&self.frame())
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.frame().rotation * Vector3::z()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.frame().rotation * Vector3::x()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.frame().rotation * Vector3::y()
    }

    /// Effective proxy scale.
    pub fn scale(&self) -> Vector3<f32> {
        *self.proxy.scale()
    }

    fn vantage_frame(&self, horizontal: f32, vertical: f32) -> UnitQuaternion<f32> {
        self.frame().rotation
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), (-horizontal).to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), (-vertical).to_radians())
    }

    /// World direction from the subject toward a camera placed at the given
    /// vantage angles.
    pub fn vantage_direction(&self, horizontal: f32, vertical: f32) -> Vector3<f32> {
        self.vantage_frame(horizontal, vertical) * Vector3::z()
    }

    /// Horizontal and vertical angle, in degrees, between the last evaluated
    /// camera position and the requested vantage direction.
    pub fn relative_camera_angle(&self, horizontal: f32, vertical: f32) -> (f32, f32) {
        let frame = self.vantage_frame(horizontal, vertical);
        let local = frame.inverse_transform_vector(&(self.camera_position - self.position()));
        let Some(d) = local.try_normalize(1e-6) else {
            return (0.0, 0.0);
        };
        let v = d.y.clamp(-1.0, 1.0).asin().to_degrees();
        let h = -d.x.atan2(d.z).to_degrees();
        (h, v)
    }
}
