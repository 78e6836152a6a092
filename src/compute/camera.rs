//! Pinhole camera model and viewport projection.
//!
//! The camera looks down its local +Z axis with +Y up and +X to the right.
//! Viewport coordinates place (0, 0) at the bottom-left of the frame and
//! (1, 1) at the top-right; the third component is the depth along the
//! viewing axis.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::schema::Lens;

const DIRECTION_EPSILON: f32 = 1e-6;

/// A virtual camera pose plus lens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub lens: Lens,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::origin(), Lens::default())
    }
}

impl Camera {
    /// Create a new camera looking down +Z.
    pub fn new(position: Point3<f32>, lens: Lens) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
            lens,
        }
    }

    /// Create a camera at `position` facing `target`.
    pub fn looking_at(position: Point3<f32>, target: &Point3<f32>, lens: Lens) -> Self {
        let mut camera = Self::new(position, lens);
        camera.look_at(target);
        camera
    }

    /// Unit viewing direction.
    #[inline]
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    #[inline]
    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    #[inline]
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    /// Rotate to face `target`. No-op if the target coincides with the camera.
    pub fn look_at(&mut self, target: &Point3<f32>) {
        if let Some(rotation) = look_rotation(&(target - self.position)) {
            self.rotation = rotation;
        }
    }

    /// Project a world point into viewport coordinates.
    ///
    /// Points behind the camera yield a negative depth; their x/y values are
    /// mirrored through the optical centre and carry no on-screen meaning.
    pub fn world_to_viewport(&self, point: &Point3<f32>) -> Vector3<f32> {
        let local = self
            .rotation
            .inverse_transform_vector(&(point - self.position));
        let depth = local.z;
        let half_height = (self.lens.fov_y.to_radians() * 0.5).tan() * depth;
        let half_width = half_height * self.lens.aspect;
        Vector3::new(
            0.5 + 0.5 * local.x / half_width,
            0.5 + 0.5 * local.y / half_height,
            depth,
        )
    }
}

/// Rotation mapping +Z onto `forward` while keeping world up as close to +Y
/// as possible.
pub fn look_rotation(forward: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    let forward = Unit::try_new(*forward, DIRECTION_EPSILON)?.into_inner();
    let up = if forward.y.abs() > 0.999 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    Some(UnitQuaternion::face_towards(&forward, &up))
}

/// Critically damped spring toward `target`, frame-rate independent.
///
/// `velocity` carries state between calls. The result never overshoots the
/// target.
pub fn smooth_damp(
    current: &Point3<f32>,
    target: &Point3<f32>,
    velocity: &mut Vector3<f32>,
    smooth_time: f32,
    dt: f32,
) -> Point3<f32> {
    if dt <= 0.0 {
        return *current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * decay;
    let output = target + (change + temp) * decay;

    if (target - current).dot(&(output - target)) > 0.0 {
        *velocity = Vector3::zeros();
        return *target;
    }
    output
}
