//! Shot quality: aggregation of property satisfactions and subject visibility
//! into a single fitness value.

use rand::Rng;

use crate::schema::{
    AxisLocks, PropertyConfig, PropertyType, SHOT_SCHEMA_VERSION, ShotConfig, ShotConfigError,
    SubjectConfig,
};

use super::camera::Camera;
use super::property::{Property, unit};
use super::scene::SceneQuery;
use super::subject::SubjectEvaluator;

/// Steepness of the per-subject visibility term.
pub const VISIBILITY_STEEPNESS: i32 = 4;

/// A weighted set of properties plus per-subject framing and axis locks.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    subjects: Vec<SubjectConfig>,
    properties: Vec<Property>,
    locks: AxisLocks,
}

impl Shot {
    /// Create a new shot, rejecting properties that reference missing subjects.
    pub fn new(
        subjects: Vec<SubjectConfig>,
        properties: Vec<Property>,
        locks: AxisLocks,
    ) -> Result<Self, ShotConfigError> {
        let mut shot = Self {
            subjects,
            properties: Vec::with_capacity(properties.len()),
            locks,
        };
        for property in properties {
            shot.push_property(property)?;
        }
        Ok(shot)
    }

    /// Build a shot from its validated configuration.
    pub fn from_config(config: &ShotConfig) -> Result<Self, ShotConfigError> {
        config.validate()?;
        Self::new(
            config.subjects.clone(),
            config.properties.iter().copied().map(Property::from).collect(),
            config.locks,
        )
    }

    pub fn to_config(&self) -> ShotConfig {
        ShotConfig {
            version: SHOT_SCHEMA_VERSION,
            subjects: self.subjects.clone(),
            locks: self.locks,
            properties: self.properties.iter().map(PropertyConfig::from).collect(),
        }
    }

    /// Append a property.
    pub fn push_property(&mut self, property: Property) -> Result<(), ShotConfigError> {
        let subject = property.kind().max_subject();
        if subject >= self.subjects.len() {
            return Err(ShotConfigError::SubjectIndexOutOfRange {
                property: self.properties.len(),
                subject,
                count: self.subjects.len(),
            });
        }
        self.properties.push(property);
        Ok(())
    }

    #[inline]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Per-subject proxy shape and area of interest.
    pub fn subjects(&self) -> &[SubjectConfig] {
        &self.subjects
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Change a property's weight.
    pub fn set_weight(&mut self, index: usize, weight: f32) {
        if let Some(property) = self.properties.get_mut(index) {
            property.set_weight(weight);
        }
    }

    #[inline]
    pub fn locks(&self) -> &AxisLocks {
        &self.locks
    }

    pub fn set_locks(&mut self, locks: AxisLocks) {
        self.locks = locks;
    }

    /// Number of properties reading subject `index`.
    pub fn properties_referencing(&self, index: usize) -> usize {
        self.properties
            .iter()
            .filter(|p| p.references(index))
            .count()
    }

    fn resolved<'a>(
        &self,
        subjects: &'a [Option<SubjectEvaluator>],
    ) -> Option<&'a [Option<SubjectEvaluator>]> {
        let slots = subjects.get(..self.subjects.len())?;
        slots.iter().all(Option::is_some).then_some(slots)
    }

    /// Quality of the current subject results, in [0, 1].
    ///
    /// Returns 0 when any subject slot is unresolved, and when there is
    /// nothing to score.
    pub fn quality(&mut self, subjects: &[Option<SubjectEvaluator>]) -> f32 {
        let Some(subjects) = self.resolved(subjects) else {
            return 0.0;
        };

        let mut value = 0.0;
        let mut weight = 0.0;
        for property in &mut self.properties {
            value += property.evaluate(subjects) * property.weight();
            weight += property.weight();
        }

        for (i, subject) in subjects.iter().flatten().enumerate() {
            let softened = 1.0 - (1.0 - subject.visibility()).powi(VISIBILITY_STEEPNESS);
            let references = self.properties_referencing(i) as f32;
            let term_weight = references + (1.0 - references) * softened;
            value += softened * term_weight;
            weight += term_weight;
        }

        if weight > 0.0 { unit(value / weight) } else { 0.0 }
    }

    /// Reevaluate every subject against `camera`, then score.
    pub fn quality_at<R: Rng + ?Sized>(
        &mut self,
        subjects: &mut [Option<SubjectEvaluator>],
        camera: &Camera,
        scene: &dyn SceneQuery,
        rng: &mut R,
    ) -> f32 {
        reevaluate_all(subjects, camera, scene, rng);
        self.quality(subjects)
    }

    /// Quality restricted to properties of the listed types.
    ///
    /// Returns 1 when the subset carries no weight, so diagnostic sub-scores
    /// never drag a search down. Unresolved subjects still score 0.
    pub fn subset_quality(
        &mut self,
        types: &[PropertyType],
        subjects: &[Option<SubjectEvaluator>],
    ) -> f32 {
        let Some(subjects) = self.resolved(subjects) else {
            return 0.0;
        };

        let mut value = 0.0;
        let mut weight = 0.0;
        for property in self
            .properties
            .iter_mut()
            .filter(|p| types.contains(&p.property_type()))
        {
            value += property.evaluate(subjects) * property.weight();
            weight += property.weight();
        }

        let quality = value / weight;
        if weight > 0.0 && quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn subset_quality_at<R: Rng + ?Sized>(
        &mut self,
        types: &[PropertyType],
        subjects: &mut [Option<SubjectEvaluator>],
        camera: &Camera,
        scene: &dyn SceneQuery,
        rng: &mut R,
    ) -> f32 {
        reevaluate_all(subjects, camera, scene, rng);
        self.subset_quality(types, subjects)
    }

    /// Mean in-frustum fraction over resolved subjects.
    pub fn in_frustum(subjects: &[Option<SubjectEvaluator>]) -> f32 {
        mean(subjects.iter().flatten().map(SubjectEvaluator::in_frustum))
    }

    /// Mean visibility over resolved subjects.
    pub fn visibility(subjects: &[Option<SubjectEvaluator>]) -> f32 {
        mean(subjects.iter().flatten().map(SubjectEvaluator::visibility))
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f32 }
}

/// Reevaluate every resolved subject against `camera`.
pub fn reevaluate_all<R: Rng + ?Sized>(
    subjects: &mut [Option<SubjectEvaluator>],
    camera: &Camera,
    scene: &dyn SceneQuery,
    rng: &mut R,
) {
    for subject in subjects.iter_mut().flatten() {
        subject.reevaluate(camera, scene, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::proxy::{ProxyVolume, TrackedPose};
    use crate::compute::scene::{DEFAULT_LAYER, StaticScene};
    use crate::schema::{ColliderShape, Lens, PropertyKind, Relation};
    use nalgebra::{Point3, Vector3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cube(position: Point3<f32>) -> Option<SubjectEvaluator> {
        Some(SubjectEvaluator::new(
            TrackedPose::new(position),
            ProxyVolume::new(
                crate::schema::ProxyShape::Cube,
                Vector3::zeros(),
                Vector3::repeat(1.0),
            ),
        ))
    }

    fn front_camera() -> Camera {
        Camera::looking_at(
            Point3::new(0.0, 0.0, -5.0),
            &Point3::origin(),
            Lens::default(),
        )
    }

    #[test]
    fn test_no_properties_no_subjects_is_zero() {
        let mut shot = Shot::new(Vec::new(), Vec::new(), AxisLocks::default()).unwrap();
        assert_eq!(shot.quality(&[]), 0.0);
    }

    #[test]
    fn test_unresolved_subject_is_zero() {
        let mut shot = Shot::new(
            vec![SubjectConfig::default(), SubjectConfig::default()],
            vec![Property::projection_size(0, 1.0, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let subjects = vec![cube(Point3::origin()), None];
        assert_eq!(shot.quality(&subjects), 0.0);
        // missing slots count as unresolved
        assert_eq!(shot.quality(&subjects[..1]), 0.0);
    }

    #[test]
    fn test_visibility_term_only() {
        let mut shot = Shot::new(vec![SubjectConfig::default()], Vec::new(), AxisLocks::default())
            .unwrap();
        let mut subjects = vec![cube(Point3::origin())];
        let mut rng = StdRng::seed_from_u64(1);
        let quality = shot.quality_at(&mut subjects, &front_camera(), &StaticScene::new(), &mut rng);
        assert!((quality - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_mean_with_visibility() {
        // one fully occluded subject: visibility 0, so its term is weight 1 value 0
        let mut scene = StaticScene::new();
        scene.add(
            ColliderShape::Sphere {
                center: Point3::new(0.0, 0.0, -2.5),
                radius: 1.5,
            },
            DEFAULT_LAYER,
        );
        let mut rng = StdRng::seed_from_u64(2);
        let mut subjects = vec![cube(Point3::origin())];
        let camera = front_camera();
        reevaluate_all(&mut subjects, &camera, &scene, &mut rng);
        let projected = subjects[0].as_ref().unwrap().projection_size();

        let mut shot = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::projection_size(0, projected, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let quality = shot.quality(&subjects);
        // (1 * 1 + 0 * 1) / (1 + 1)
        assert!((quality - 0.5).abs() < 1e-5);
        assert!((shot.properties()[0].satisfaction() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_two_property_average() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut subjects = vec![cube(Point3::origin())];
        let camera = front_camera();
        reevaluate_all(&mut subjects, &camera, &StaticScene::new(), &mut rng);
        let projected = subjects[0].as_ref().unwrap().projection_size();

        let mut shot = Shot::new(
            vec![SubjectConfig::default()],
            vec![
                Property::projection_size(0, projected + 0.5, 1.0),
                Property::position_on_screen(0, 0.5, 0.5, 1.0),
            ],
            AxisLocks::default(),
        )
        .unwrap();
        // properties: 0.5 and 1.0; visible subject term: value 1, weight 1
        let quality = shot.quality(&subjects);
        assert!((quality - 2.5 / 3.0).abs() < 1e-3);
        let subset = shot.subset_quality(
            &[PropertyType::ProjectionSize, PropertyType::PositionOnScreen],
            &subjects,
        );
        assert!((subset - 0.75).abs() < 1e-3);
    }

    #[test]
    fn test_projection_size_blend() {
        // 90 degree square lens: the front face at depth 1.1 spans 0.5 / 1.1
        // of the frame, so the projected size with margin is exactly 0.5
        let camera = Camera::looking_at(
            Point3::new(0.0, 0.0, -1.6),
            &Point3::origin(),
            Lens {
                fov_y: 90.0,
                aspect: 1.0,
            },
        );
        let mut rng = StdRng::seed_from_u64(6);
        let mut subjects = vec![cube(Point3::origin())];
        let mut shot = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::projection_size(0, 1.0, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let quality = shot.quality_at(&mut subjects, &camera, &StaticScene::new(), &mut rng);
        let subject = subjects[0].as_ref().unwrap();
        assert!((subject.projection_size() - 0.5).abs() < 1e-4);
        assert_eq!(subject.visibility(), 1.0);
        // (0.5 * 1 + 1 * 1) / (1 + 1)
        assert!((quality - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_empty_subset_is_one() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut shot = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::projection_size(0, 1.0, 1.0)],
            AxisLocks::default(),
        )
        .unwrap();
        let mut subjects = vec![cube(Point3::origin())];
        let quality = shot.subset_quality_at(
            &[PropertyType::VantageAngle],
            &mut subjects,
            &front_camera(),
            &StaticScene::new(),
            &mut rng,
        );
        assert_eq!(quality, 1.0);

        let mut zero_weight = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::projection_size(0, 1.0, 0.0)],
            AxisLocks::default(),
        )
        .unwrap();
        assert_eq!(
            zero_weight.subset_quality(&[PropertyType::ProjectionSize], &subjects),
            1.0
        );
    }

    #[test]
    fn test_properties_referencing() {
        let shot = Shot::new(
            vec![SubjectConfig::default(); 3],
            vec![
                Property::projection_size(0, 1.0, 1.0),
                Property::relative_position(0, Relation::Above, 2, 1.0),
                Property::vantage_angle(2, 0.0, 0.0, 1.0),
            ],
            AxisLocks::default(),
        )
        .unwrap();
        assert_eq!(shot.properties_referencing(0), 2);
        assert_eq!(shot.properties_referencing(1), 0);
        assert_eq!(shot.properties_referencing(2), 2);
    }

    #[test]
    fn test_bad_subject_index_rejected() {
        let result = Shot::new(
            vec![SubjectConfig::default()],
            vec![Property::relative_position(0, Relation::Above, 1, 1.0)],
            AxisLocks::default(),
        );
        assert!(matches!(
            result,
            Err(ShotConfigError::SubjectIndexOutOfRange { subject: 1, .. })
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ShotConfig::default();
        let shot = Shot::from_config(&config).unwrap();
        assert_eq!(shot.to_config(), config);
        assert_eq!(
            *shot.properties()[0].kind(),
            PropertyKind::ProjectionSize {
                subject: 0,
                size: 0.6
            }
        );
    }

    #[test]
    fn test_mean_in_frustum_and_visibility() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut subjects = vec![cube(Point3::origin()), None, cube(Point3::new(0.0, 0.0, -20.0))];
        reevaluate_all(&mut subjects, &front_camera(), &StaticScene::new(), &mut rng);
        assert!((Shot::in_frustum(&subjects) - 0.5).abs() < 1e-6);
        assert!((Shot::visibility(&subjects) - 0.5).abs() < 1e-6);
        assert_eq!(Shot::in_frustum(&[]), 0.0);
    }
}
