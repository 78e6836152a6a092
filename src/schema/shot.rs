//! Shot configuration: the persisted description of a desired framing.
//!
//! A shot is stored as a single canonical, versioned JSON document. Every
//! property carries a `type` tag that decodes directly into its concrete
//! variant, so a loaded shot is ready for evaluation without any fix-up pass.

use std::fs;
use std::io;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Current shot schema version.
pub const SHOT_SCHEMA_VERSION: u32 = 1;

/// Valid range of a desired projection size.
pub const PROJECTION_SIZE_RANGE: (f32, f32) = (0.1, 3.0);

/// Simplified bounding shape used to sample a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProxyShape {
    /// Unit cube centred on the origin.
    #[default]
    Cube,
    /// Sphere of diameter 1.
    Sphere,
    /// Capsule of height 2 and diameter 1, aligned with the local Y axis.
    Capsule,
    /// Cylinder of height 2 and diameter 1, aligned with the local Y axis.
    Cylinder,
    /// 1x1 quad in the local XY plane.
    Quad,
}

/// Relative placement between two subjects on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Above,
    Below,
    LeftOf,
    RightOf,
    InFrontOf,
    Behind,
}

/// Discriminant of a property, used to select subsets of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    ProjectionSize,
    PositionOnScreen,
    VantageAngle,
    RelativePosition,
}

/// Concrete scoring rule of a property together with its targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKind {
    /// Size of the subject on screen (largest of width/height, with margin).
    ProjectionSize {
        subject: usize,
        /// Desired size in [0.1, 3].
        size: f32,
    },
    /// Position of the subject's screen-space centre.
    PositionOnScreen {
        subject: usize,
        /// Desired horizontal coordinate in [0, 1], from the left.
        x: f32,
        /// Desired vertical coordinate in [0, 1], from the bottom.
        y: f32,
    },
    /// Direction the camera should frame the subject from.
    VantageAngle {
        subject: usize,
        /// Desired horizontal angle in degrees, [-180, 180].
        horizontal: f32,
        /// Desired vertical angle in degrees, [-90, 90].
        vertical: f32,
    },
    /// Placement of `subject` relative to `other` on screen.
    RelativePosition {
        subject: usize,
        relation: Relation,
        other: usize,
    },
}

impl PropertyKind {
    /// Property discriminant.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyKind::ProjectionSize { .. } => PropertyType::ProjectionSize,
            PropertyKind::PositionOnScreen { .. } => PropertyType::PositionOnScreen,
            PropertyKind::VantageAngle { .. } => PropertyType::VantageAngle,
            PropertyKind::RelativePosition { .. } => PropertyType::RelativePosition,
        }
    }

    /// Index of the subject this property is primarily about.
    pub fn main_subject(&self) -> usize {
        match *self {
            PropertyKind::ProjectionSize { subject, .. }
            | PropertyKind::PositionOnScreen { subject, .. }
            | PropertyKind::VantageAngle { subject, .. }
            | PropertyKind::RelativePosition { subject, .. } => subject,
        }
    }

    /// Index of the secondary subject, if the property relates two subjects.
    pub fn secondary_subject(&self) -> Option<usize> {
        match *self {
            PropertyKind::RelativePosition { other, .. } => Some(other),
            _ => None,
        }
    }

    /// True if the property reads the given subject.
    pub fn references(&self, subject: usize) -> bool {
        self.main_subject() == subject || self.secondary_subject() == Some(subject)
    }

    /// Largest subject index referenced.
    pub fn max_subject(&self) -> usize {
        self.secondary_subject()
            .map_or(self.main_subject(), |other| other.max(self.main_subject()))
    }

    /// Same property with every target clamped into its documented range.
    pub fn clamped(self) -> Self {
        match self {
            PropertyKind::ProjectionSize { subject, size } => PropertyKind::ProjectionSize {
                subject,
                size: clamp_or(size, PROJECTION_SIZE_RANGE, 1.0),
            },
            PropertyKind::PositionOnScreen { subject, x, y } => PropertyKind::PositionOnScreen {
                subject,
                x: clamp_or(x, (0.0, 1.0), 0.5),
                y: clamp_or(y, (0.0, 1.0), 0.5),
            },
            PropertyKind::VantageAngle {
                subject,
                horizontal,
                vertical,
            } => PropertyKind::VantageAngle {
                subject,
                horizontal: clamp_or(horizontal, (-180.0, 180.0), 0.0),
                vertical: clamp_or(vertical, (-90.0, 90.0), 0.0),
            },
            relative @ PropertyKind::RelativePosition { .. } => relative,
        }
    }
}

/// Clamp a value into `bounds`, replacing NaN with `fallback`.
fn clamp_or(value: f32, bounds: (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(bounds.0, bounds.1)
    }
}

/// A serialized property: its tagged kind plus an importance weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    #[serde(flatten)]
    pub kind: PropertyKind,
    /// Importance in [0, 1].
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// Per-subject area of interest within a shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfig {
    /// Proxy volume shape.
    #[serde(default)]
    pub shape: ProxyShape,
    /// Offset of the proxy centre in the subject's local frame.
    #[serde(default = "default_offset")]
    pub offset: Vector3<f32>,
    /// Scale of the proxy in the subject's local frame.
    #[serde(default = "default_scale")]
    pub scale: Vector3<f32>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            shape: ProxyShape::default(),
            offset: default_offset(),
            scale: default_scale(),
        }
    }
}

fn default_offset() -> Vector3<f32> {
    Vector3::zeros()
}

fn default_scale() -> Vector3<f32> {
    Vector3::repeat(1.0)
}

/// Per-axis camera position locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisLocks {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl AxisLocks {
    /// Lock state of an axis by index (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn is_locked(&self, axis: usize) -> bool {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => false,
        }
    }
}

/// Top-level persisted shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotConfig {
    /// Schema version, must equal [`SHOT_SCHEMA_VERSION`].
    pub version: u32,
    /// One entry per subject slot.
    #[serde(default)]
    pub subjects: Vec<SubjectConfig>,
    /// Camera axis locks.
    #[serde(default)]
    pub locks: AxisLocks,
    /// Ordered property list.
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            version: SHOT_SCHEMA_VERSION,
            subjects: vec![SubjectConfig::default()],
            locks: AxisLocks::default(),
            properties: vec![
                PropertyConfig {
                    kind: PropertyKind::ProjectionSize {
                        subject: 0,
                        size: 0.6,
                    },
                    weight: 1.0,
                },
                PropertyConfig {
                    kind: PropertyKind::VantageAngle {
                        subject: 0,
                        horizontal: 20.0,
                        vertical: 15.0,
                    },
                    weight: 0.8,
                },
                PropertyConfig {
                    kind: PropertyKind::PositionOnScreen {
                        subject: 0,
                        x: 0.5,
                        y: 0.5,
                    },
                    weight: 0.5,
                },
            ],
        }
    }
}

impl ShotConfig {
    /// Number of subject slots.
    #[inline]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Validate version and subject references.
    pub fn validate(&self) -> Result<(), ShotConfigError> {
        if self.version != SHOT_SCHEMA_VERSION {
            return Err(ShotConfigError::UnsupportedVersion {
                found: self.version,
                expected: SHOT_SCHEMA_VERSION,
            });
        }
        for (i, property) in self.properties.iter().enumerate() {
            let subject = property.kind.max_subject();
            if subject >= self.subjects.len() {
                return Err(ShotConfigError::SubjectIndexOutOfRange {
                    property: i,
                    subject,
                    count: self.subjects.len(),
                });
            }
        }
        Ok(())
    }

    /// Load and validate a shot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ShotConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ShotConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the shot as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ShotConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Shot configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ShotConfigError {
    #[error("Unsupported shot schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Property {property} references subject {subject} but the shot has {count} subjects")]
    SubjectIndexOutOfRange {
        property: usize,
        subject: usize,
        count: usize,
    },
    #[error("Failed to access shot file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse shot: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shot_valid() {
        let config = ShotConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_property_decodes_from_tag() {
        let json = r#"{
            "version": 1,
            "subjects": [{ "shape": "Capsule" }, {}],
            "properties": [
                { "type": "ProjectionSize", "subject": 0, "size": 0.8, "weight": 0.5 },
                { "type": "RelativePosition", "subject": 0, "relation": "LeftOf", "other": 1 }
            ]
        }"#;
        let config: ShotConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.subjects[0].shape, ProxyShape::Capsule);
        assert_eq!(config.subjects[1].scale, Vector3::repeat(1.0));
        assert_eq!(
            config.properties[0].kind,
            PropertyKind::ProjectionSize {
                subject: 0,
                size: 0.8
            }
        );
        assert_eq!(config.properties[1].weight, 1.0);
        assert_eq!(
            config.properties[1].kind.property_type(),
            PropertyType::RelativePosition
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let json = r#"{ "version": 1, "subjects": [{}],
            "properties": [{ "type": "Visibility", "subject": 0 }] }"#;
        assert!(serde_json::from_str::<ShotConfig>(json).is_err());
    }

    #[test]
    fn test_version_checked() {
        let config = ShotConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ShotConfigError::UnsupportedVersion { found: 0, .. })
        ));
    }

    #[test]
    fn test_subject_index_checked() {
        let mut config = ShotConfig::default();
        config.properties.push(PropertyConfig {
            kind: PropertyKind::RelativePosition {
                subject: 0,
                relation: Relation::Above,
                other: 3,
            },
            weight: 1.0,
        });
        assert!(matches!(
            config.validate(),
            Err(ShotConfigError::SubjectIndexOutOfRange {
                property: 3,
                subject: 3,
                count: 1
            })
        ));
    }

    #[test]
    fn test_targets_clamped() {
        let kind = PropertyKind::VantageAngle {
            subject: 0,
            horizontal: 400.0,
            vertical: -120.0,
        }
        .clamped();
        assert_eq!(
            kind,
            PropertyKind::VantageAngle {
                subject: 0,
                horizontal: 180.0,
                vertical: -90.0
            }
        );

        let kind = PropertyKind::ProjectionSize {
            subject: 0,
            size: 0.0,
        }
        .clamped();
        assert_eq!(
            kind,
            PropertyKind::ProjectionSize {
                subject: 0,
                size: 0.1
            }
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.json");

        let config = ShotConfig::default();
        config.save(&path).unwrap();
        let loaded = ShotConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ShotConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ShotConfigError::Io(_))));
    }
}
