//! Proxy volumes: simplified meshes sampled in place of a subject's geometry.

use std::f32::consts::TAU;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::schema::{ProxyShape, SubjectConfig};

const SPHERE_RINGS: usize = 6;
const ROUND_SEGMENTS: usize = 12;

/// World pose of a tracked subject, supplied by the host every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl TrackedPose {
    /// Create a pose with identity rotation.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Set the rotation from a heading about world Y, in degrees.
    pub fn with_heading(mut self, degrees: f32) -> Self {
        self.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), degrees.to_radians());
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Transform a point from the subject's local frame to world space.
    #[inline]
    pub fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        self.position + self.rotation * local.coords
    }
}

/// Shape, offset and scale of the volume standing in for a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyVolume {
    shape: ProxyShape,
    offset: Vector3<f32>,
    scale: Vector3<f32>,
    vertices: Vec<Point3<f32>>,
}

impl ProxyVolume {
    /// Create a new proxy volume.
    pub fn new(shape: ProxyShape, offset: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            shape,
            offset,
            scale,
            vertices: unit_mesh(shape),
        }
    }

    pub fn from_config(config: &SubjectConfig) -> Self {
        Self::new(config.shape, config.offset, config.scale)
    }

    /// Narrow the volume to an area of interest: offsets add, scales
    /// multiply component-wise.
    pub fn with_area_of_interest(&self, offset: &Vector3<f32>, scale: &Vector3<f32>) -> Self {
        Self::new(
            self.shape,
            self.offset + offset,
            self.scale.component_mul(scale),
        )
    }

    #[inline]
    pub fn shape(&self) -> ProxyShape {
        self.shape
    }

    #[inline]
    pub fn offset(&self) -> &Vector3<f32> {
        &self.offset
    }

    #[inline]
    pub fn scale(&self) -> &Vector3<f32> {
        &self.scale
    }

    /// Unit-mesh vertices, before offset and scale.
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Centre of the volume in world space.
    pub fn center(&self, pose: &TrackedPose) -> Point3<f32> {
        pose.transform_point(&Point3::from(self.offset))
    }

    /// World-space positions of all mesh vertices.
    pub fn world_vertices<'a>(
        &'a self,
        pose: &'a TrackedPose,
    ) -> impl Iterator<Item = Point3<f32>> + 'a {
        self.vertices.iter().map(move |v| {
            let local = Point3::from(v.coords.component_mul(&self.scale) + self.offset);
            pose.transform_point(&local)
        })
    }
}

/// Vertices of the unit mesh for a shape, centred on the origin.
pub fn unit_mesh(shape: ProxyShape) -> Vec<Point3<f32>> {
    match shape {
        ProxyShape::Cube => {
            let mut vertices = Vec::with_capacity(8);
            for &x in &[-0.5, 0.5] {
                for &y in &[-0.5, 0.5] {
                    for &z in &[-0.5, 0.5] {
                        vertices.push(Point3::new(x, y, z));
                    }
                }
            }
            vertices
        }
        ProxyShape::Sphere => sphere_mesh(0.0, 0.0),
        ProxyShape::Capsule => sphere_mesh(0.5, 0.5),
        ProxyShape::Cylinder => {
            let mut vertices = vec![Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, -1.0, 0.0)];
            for &y in &[-1.0, 1.0] {
                vertices.extend(ring(0.5, y));
            }
            vertices
        }
        ProxyShape::Quad => vec![
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(0.5, -0.5, 0.0),
            Point3::new(-0.5, 0.5, 0.0),
            Point3::new(0.5, 0.5, 0.0),
        ],
    }
}

/// Radius-0.5 sphere split at the equator, hemispheres lifted by `top` and
/// lowered by `bottom`.
fn sphere_mesh(top: f32, bottom: f32) -> Vec<Point3<f32>> {
    let mut vertices = vec![
        Point3::new(0.0, 0.5 + top, 0.0),
        Point3::new(0.0, -0.5 - bottom, 0.0),
    ];
    for i in 1..SPHERE_RINGS {
        let polar = std::f32::consts::PI * i as f32 / SPHERE_RINGS as f32;
        let y = 0.5 * polar.cos();
        let radius = 0.5 * polar.sin();
        if y.abs() < 1e-6 {
            // the equator appears once per hemisphere on capsules
            vertices.extend(ring(radius, top));
            if top > 0.0 || bottom > 0.0 {
                vertices.extend(ring(radius, -bottom));
            }
        } else if y > 0.0 {
            vertices.extend(ring(radius, y + top));
        } else {
            vertices.extend(ring(radius, y - bottom));
        }
    }
    vertices
}

fn ring(radius: f32, y: f32) -> impl Iterator<Item = Point3<f32>> {
    (0..ROUND_SEGMENTS).map(move |j| {
        let azimuth = TAU * j as f32 / ROUND_SEGMENTS as f32;
        Point3::new(radius * azimuth.cos(), y, radius * azimuth.sin())
    })
}
