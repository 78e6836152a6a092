//! Property scoring: each property maps subject evaluation results to a
//! satisfaction in [0, 1].

use crate::schema::{PropertyConfig, PropertyKind, PropertyType, Relation};

use super::subject::SubjectEvaluator;

/// A weighted scoring rule with its cached last satisfaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    kind: PropertyKind,
    weight: f32,
    satisfaction: f32,
}

impl Property {
    /// Create a new property. Targets and weight are clamped into range.
    pub fn new(kind: PropertyKind, weight: f32) -> Self {
        Self {
            kind: kind.clamped(),
            weight: unit(weight),
            satisfaction: 0.0,
        }
    }

    pub fn projection_size(subject: usize, size: f32, weight: f32) -> Self {
        Self::new(PropertyKind::ProjectionSize { subject, size }, weight)
    }

    pub fn position_on_screen(subject: usize, x: f32, y: f32, weight: f32) -> Self {
        Self::new(PropertyKind::PositionOnScreen { subject, x, y }, weight)
    }

    pub fn vantage_angle(subject: usize, horizontal: f32, vertical: f32, weight: f32) -> Self {
        Self::new(
            PropertyKind::VantageAngle {
                subject,
                horizontal,
                vertical,
            },
            weight,
        )
    }

    pub fn relative_position(subject: usize, relation: Relation, other: usize, weight: f32) -> Self {
        Self::new(
            PropertyKind::RelativePosition {
                subject,
                relation,
                other,
            },
            weight,
        )
    }

    #[inline]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Replace the rule and its targets, clamping targets into range.
    pub fn set_kind(&mut self, kind: PropertyKind) {
        self.kind = kind.clamped();
    }

    #[inline]
    pub fn property_type(&self) -> PropertyType {
        self.kind.property_type()
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = unit(weight);
    }

    /// Satisfaction computed by the last [`evaluate`](Self::evaluate).
    #[inline]
    pub fn satisfaction(&self) -> f32 {
        self.satisfaction
    }

    #[inline]
    pub fn references(&self, subject: usize) -> bool {
        self.kind.references(subject)
    }

    /// Score against current subject results and cache the satisfaction.
    ///
    /// Unresolved subjects score 0.
    ///
    /// # Panics
    ///
    /// Panics if a referenced subject index is outside `subjects`.
    pub fn evaluate(&mut self, subjects: &[Option<SubjectEvaluator>]) -> f32 {
        self.satisfaction = unit(self.score(subjects));
        self.satisfaction
    }

    fn score(&self, subjects: &[Option<SubjectEvaluator>]) -> f32 {
        match self.kind {
            PropertyKind::ProjectionSize { subject, size } => {
                let Some(s) = subjects[subject].as_ref() else {
                    return 0.0;
                };
                let projected = s.projection_size();
                if !projected.is_finite() {
                    return 0.0;
                }
                s.in_frustum() * (1.0 - (projected - size).abs())
            }
            PropertyKind::PositionOnScreen { subject, x, y } => {
                let Some(s) = subjects[subject].as_ref() else {
                    return 0.0;
                };
                let (sx, sy) = s.position_on_screen();
                if !sx.is_finite() || !sy.is_finite() {
                    return 0.0;
                }
                let horizontal = 1.0 - (sx - x).abs() / x.max(1.0 - x);
                let vertical = 1.0 - (sy - y).abs() / y.max(1.0 - y);
                s.in_frustum() * (horizontal + vertical) * 0.5
            }
            PropertyKind::VantageAngle {
                subject,
                horizontal,
                vertical,
            } => {
                let Some(s) = subjects[subject].as_ref() else {
                    return 0.0;
                };
                let (dh, dv) = s.relative_camera_angle(horizontal, vertical);
                let mut dh = dh.abs();
                if dh > 180.0 {
                    dh = 360.0 - dh;
                }
                s.in_frustum().ceil() * (1.0 - dh / 180.0) * (1.0 - dv.abs() / 180.0)
            }
            PropertyKind::RelativePosition {
                subject,
                relation,
                other,
            } => {
                let (Some(a), Some(b)) = (subjects[subject].as_ref(), subjects[other].as_ref())
                else {
                    return 0.0;
                };
                let gate = a.in_frustum().ceil() * b.in_frustum().ceil();
                if gate == 0.0 {
                    return 0.0;
                }
                let (first, second) = match relation {
                    Relation::Above | Relation::RightOf | Relation::Behind => (a, b),
                    Relation::Below | Relation::LeftOf | Relation::InFrontOf => (b, a),
                };
                let axis = relation_axis(relation);
                let (fb, sb) = (first.screen_bounds(), second.screen_bounds());
                gate * is_beyond(fb.min[axis], fb.max[axis], sb.min[axis], sb.max[axis])
            }
        }
    }
}

/// Screen-bounds component compared by a relation: x, y or depth.
fn relation_axis(relation: Relation) -> usize {
    match relation {
        Relation::LeftOf | Relation::RightOf => 0,
        Relation::Above | Relation::Below => 1,
        Relation::InFrontOf | Relation::Behind => 2,
    }
}

/// How far interval A lies beyond interval B along an axis.
///
/// 1 when A is entirely past B, 0 when entirely short of it. Overlapping
/// intervals score by how far the smaller one protrudes past the matching edge
/// of the larger one, 0.5 when neither protrudes.
pub fn is_beyond(min_a: f32, max_a: f32, min_b: f32, max_b: f32) -> f32 {
    if min_a > max_b {
        return 1.0;
    }
    if max_a < min_b {
        return 0.0;
    }
    let span_a = max_a - min_a;
    let span_b = max_b - min_b;
    let a_larger = span_a > span_b;
    if !a_larger && min_a < min_b {
        0.5 - 0.5 * (min_b - min_a) / span_a
    } else if !a_larger && max_a > max_b {
        0.5 + 0.5 * (max_a - max_b) / span_a
    } else if a_larger && min_b < min_a {
        0.5 + 0.5 * (min_a - min_b) / span_b
    } else if a_larger && max_b > max_a {
        0.5 - 0.5 * (max_b - max_a) / span_b
    } else {
        0.5
    }
}

/// Clamp into [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl From<PropertyConfig> for Property {
    fn from(config: PropertyConfig) -> Self {
        Property::new(config.kind, config.weight)
    }
}

impl From<&Property> for PropertyConfig {
    fn from(property: &Property) -> Self {
        PropertyConfig {
            kind: property.kind,
            weight: property.weight,
        }
    }
}
