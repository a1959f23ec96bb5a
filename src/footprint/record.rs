use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AttributeError, GeometryError, Result};
use crate::math::polygon_2d::point_in_ring;
use crate::math::Point2;

use super::ring::Ring;

/// Raw key-value tags attached to a footprint (OSM-style).
pub type Tags = BTreeMap<String, Value>;

/// The tag that must be present for a footprint to be modelled.
pub const LEVELS_TAG: &str = "building:levels";

/// A footprint as delivered by the vector source.
///
/// Rings may be closed (first point repeated) or open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintRecord {
    /// Stable identifier, used as the city object key.
    pub id: String,
    /// Exterior ring coordinates.
    pub exterior: Vec<[f64; 2]>,
    /// Interior ring coordinates (courtyards).
    #[serde(default)]
    pub interiors: Vec<Vec<[f64; 2]>>,
    /// Raw tags; values may be strings, numbers or null.
    #[serde(default)]
    pub tags: Tags,
}

/// A polygon with one exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

impl Polygon {
    /// Builds a polygon, reporting the first degenerate ring: fewer than 3
    /// distinct points, or no enclosed area.
    ///
    /// Ring index 0 is the exterior, interiors follow from 1.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedRing`] naming `owner` and the ring.
    pub fn from_coords(owner: &str, exterior: &[[f64; 2]], interiors: &[Vec<[f64; 2]>]) -> Result<Self> {
        let malformed = |ring: usize, coords: &[[f64; 2]]| GeometryError::MalformedRing {
            footprint: owner.to_owned(),
            ring,
            points: Ring::distinct_count(coords),
        };
        let outer = Ring::from_coords(exterior).ok_or_else(|| malformed(0, exterior))?;
        let mut holes = Vec::with_capacity(interiors.len());
        for (i, coords) in interiors.iter().enumerate() {
            holes.push(Ring::from_coords(coords).ok_or_else(|| malformed(i + 1, coords))?);
        }
        Ok(Self {
            exterior: outer,
            interiors: holes,
        })
    }

    /// Iterates over all rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    /// Returns `true` if `point` lies inside the exterior and outside every hole.
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        point_in_ring(point, self.exterior.points())
            && !self
                .interiors
                .iter()
                .any(|hole| point_in_ring(point, hole.points()))
    }
}

/// Building categories with their own height rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingCategory {
    /// Any building type without a dedicated rule.
    Default,
    /// `building=cabin`: no roof allowance.
    Cabin,
    /// `building=bridge`: raised soffit, no wall below it.
    Bridge,
    /// `building=roof`: canopy band above the ground.
    Roof,
}

impl BuildingCategory {
    /// Maps the `building` tag value to a category.
    #[must_use]
    pub fn from_tag(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("cabin") => Self::Cabin,
            Some("bridge") => Self::Bridge,
            Some("roof") => Self::Roof,
            _ => Self::Default,
        }
    }
}

/// An ingested, validated footprint. Immutable once stored.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub id: String,
    pub polygon: Polygon,
    pub category: BuildingCategory,
    pub tags: Tags,
}

impl Footprint {
    /// Validates a record.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Missing`] when `building:levels` is absent,
    /// null or empty, and [`GeometryError::MalformedRing`] for a degenerate ring.
    pub fn try_from_record(record: FootprintRecord) -> Result<Self> {
        if !has_value(record.tags.get(LEVELS_TAG)) {
            return Err(AttributeError::Missing {
                footprint: record.id,
                attribute: LEVELS_TAG,
            }
            .into());
        }
        let polygon = Polygon::from_coords(&record.id, &record.exterior, &record.interiors)?;
        let category = BuildingCategory::from_tag(record.tags.get("building"));
        Ok(Self {
            id: record.id,
            polygon,
            category,
            tags: record.tags,
        })
    }

    /// Returns the tag value if present and not null.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.get(key).filter(|v| has_value(Some(v)))
    }
}

/// `true` unless the value is missing, null, an empty string or the string `"null"`.
pub(crate) fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !(s.is_empty() || s == "null"),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}
