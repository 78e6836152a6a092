//! Scene line-of-sight queries.
//!
//! Occlusion tests only need the nearest hit along a segment, filtered by
//! layer and by collider identity. [`SceneQuery`] is that seam; the host
//! engine can implement it over its own physics world, and [`StaticScene`]
//! provides a self-contained implementation over spheres and boxes.

use nalgebra::{Point3, Unit, Vector3};

use crate::schema::{ColliderShape, ObstacleConfig};

/// Default layer for ordinary geometry.
pub const DEFAULT_LAYER: u32 = 1 << 0;
/// Layer for transparent effects; ignored by occlusion rays.
pub const TRANSPARENT_FX_LAYER: u32 = 1 << 1;
/// Layer whose colliders never block rays.
pub const IGNORE_RAYCAST_LAYER: u32 = 1 << 2;
/// Mask used for occlusion and camera clearance rays.
pub const OCCLUSION_MASK: u32 = !(TRANSPARENT_FX_LAYER | IGNORE_RAYCAST_LAYER);

/// Identity of a collider within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u32);

/// Which colliders a ray may hit.
#[derive(Debug, Clone, Copy)]
pub struct QueryFilter<'a> {
    /// Colliders whose layer shares no bit with the mask are skipped.
    pub layer_mask: u32,
    /// Colliders skipped regardless of layer.
    pub exclude: &'a [ColliderId],
}

impl<'a> QueryFilter<'a> {
    /// Filter for occlusion rays, skipping `exclude`.
    pub fn occlusion(exclude: &'a [ColliderId]) -> Self {
        Self {
            layer_mask: OCCLUSION_MASK,
            exclude,
        }
    }

    /// True if a collider on `layer` with identity `id` may be hit.
    #[inline]
    pub fn accepts(&self, id: ColliderId, layer: u32) -> bool {
        layer & self.layer_mask != 0 && !self.exclude.contains(&id)
    }
}

/// Nearest intersection found by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub collider: ColliderId,
}

/// Line-of-sight capability used during evaluation and placement.
pub trait SceneQuery {
    /// Nearest hit along `direction` from `origin` within `max_distance`.
    ///
    /// Colliders that contain `origin` are not reported.
    fn raycast(
        &self,
        origin: &Point3<f32>,
        direction: &Unit<Vector3<f32>>,
        max_distance: f32,
        filter: &QueryFilter<'_>,
    ) -> Option<RayHit>;
}

/// A collider registered in a [`StaticScene`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: ColliderId,
    pub shape: ColliderShape,
    pub layer: u32,
}

impl Collider {
    /// Entry distance of the ray into this collider, if any.
    pub fn intersect(&self, origin: &Point3<f32>, direction: &Unit<Vector3<f32>>) -> Option<f32> {
        match &self.shape {
            ColliderShape::Sphere { center, radius } => {
                ray_sphere(origin, direction, center, *radius)
            }
            ColliderShape::Cuboid { min, max } => ray_aabb(origin, direction, min, max),
        }
    }
}

fn ray_sphere(
    origin: &Point3<f32>,
    direction: &Unit<Vector3<f32>>,
    center: &Point3<f32>,
    radius: f32,
) -> Option<f32> {
    let oc = origin - center;
    let c = oc.norm_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = oc.dot(&direction.into_inner());
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

fn ray_aabb(
    origin: &Point3<f32>,
    direction: &Unit<Vector3<f32>>,
    min: &Point3<f32>,
    max: &Point3<f32>,
) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let direction = direction.into_inner();
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let mut t0 = (min[axis] - o) / d;
        let mut t1 = (max[axis] - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    // origin inside the box
    if t_near < 0.0 {
        return None;
    }
    Some(t_near)
}

/// Self-contained scene of static or script-moved colliders.
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    colliders: Vec<Collider>,
    next_id: u32,
}

impl StaticScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from obstacle descriptions.
    pub fn from_obstacles(obstacles: &[ObstacleConfig]) -> Self {
        let mut scene = Self::new();
        for obstacle in obstacles {
            scene.add(obstacle.shape, obstacle.layer);
        }
        scene
    }

    /// Register a collider and return its identity.
    pub fn add(&mut self, shape: ColliderShape, layer: u32) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(Collider { id, shape, layer });
        id
    }

    /// Remove a collider. Returns false if it was not present.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.id != id);
        self.colliders.len() != before
    }

    /// Move a collider by `delta`.
    pub fn translate(&mut self, id: ColliderId, delta: &Vector3<f32>) {
        if let Some(collider) = self.colliders.iter_mut().find(|c| c.id == id) {
            collider.shape.translate(delta);
        }
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }
}

impl SceneQuery for StaticScene {
    fn raycast(
        &self,
        origin: &Point3<f32>,
        direction: &Unit<Vector3<f32>>,
        max_distance: f32,
        filter: &QueryFilter<'_>,
    ) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter(|c| filter.accepts(c.id, c.layer))
            .filter_map(|c| {
                c.intersect(origin, direction)
                    .filter(|&t| t <= max_distance)
                    .map(|distance| RayHit {
                        distance,
                        collider: c.id,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
