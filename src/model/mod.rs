mod attributes;
mod metadata;
mod pool;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

pub use attributes::harvest_attributes;
pub use metadata::{
    Lineage, LineageSource, Metadata, MetadataExtended, PointOfContact, ProcessStep, Processor,
};
pub use pool::VertexPool;

/// Key of the single terrain object.
pub const TERRAIN_OBJECT_ID: &str = "terrain01";

/// Level of detail written on every geometry.
pub const LOD: &str = "1";

/// One boundary surface: an outer loop of vertex indices, then its holes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Surface(pub Vec<Vec<usize>>);

impl Surface {
    /// A surface with no holes.
    #[must_use]
    pub fn single(outer: Vec<usize>) -> Self {
        Self(vec![outer])
    }

    /// The outer loop.
    #[must_use]
    pub fn outer(&self) -> &[usize] {
        self.0.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Hole loops, possibly none.
    #[must_use]
    pub fn holes(&self) -> &[Vec<usize>] {
        self.0.get(1..).unwrap_or_default()
    }

    /// Every loop, outer first.
    #[must_use]
    pub fn loops(&self) -> &[Vec<usize>] {
        &self.0
    }
}

/// Geometry of a city object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Closed volume: one outer shell, no inner shells.
    Solid {
        lod: String,
        boundaries: Vec<Vec<Surface>>,
    },
    /// Open surface set, used for the terrain.
    CompositeSurface { lod: String, boundaries: Vec<Surface> },
}

impl Geometry {
    /// A solid with a single outer shell.
    #[must_use]
    pub fn solid(shell: Vec<Surface>) -> Self {
        Self::Solid {
            lod: LOD.to_owned(),
            boundaries: vec![shell],
        }
    }

    /// A composite surface.
    #[must_use]
    pub fn composite(surfaces: Vec<Surface>) -> Self {
        Self::CompositeSurface {
            lod: LOD.to_owned(),
            boundaries: surfaces,
        }
    }

    /// Every surface of the geometry.
    #[must_use]
    pub fn surfaces(&self) -> Vec<&Surface> {
        match self {
            Self::Solid { boundaries, .. } => boundaries.iter().flatten().collect(),
            Self::CompositeSurface { boundaries, .. } => boundaries.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CityObjectType {
    Building,
    #[serde(rename = "TINRelief")]
    TinRelief,
}

/// A keyed entry of `CityObjects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityObject {
    #[serde(rename = "type")]
    pub kind: CityObjectType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    pub geometry: Vec<Geometry>,
}

impl CityObject {
    /// A building with one solid.
    #[must_use]
    pub fn building(shell: Vec<Surface>, attributes: Map<String, Value>) -> Self {
        Self {
            kind: CityObjectType::Building,
            attributes,
            geometry: vec![Geometry::solid(shell)],
        }
    }

    /// The terrain relief.
    #[must_use]
    pub fn terrain(triangles: Vec<Surface>) -> Self {
        Self {
            kind: CityObjectType::TinRelief,
            attributes: Map::new(),
            geometry: vec![Geometry::composite(triangles)],
        }
    }
}

/// The whole output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub metadata: Metadata,
    #[serde(rename = "CityObjects")]
    pub city_objects: BTreeMap<String, CityObject>,
    pub vertices: Vec<[f64; 3]>,
}

impl CityModel {
    /// An empty CityJSON 1.1 document.
    #[must_use]
    pub fn new(metadata: Metadata) -> Self {
        Self {
            kind: "CityJSON".to_owned(),
            version: "1.1".to_owned(),
            metadata,
            city_objects: BTreeMap::new(),
            vertices: Vec::new(),
        }
    }

    /// Looks up a city object by key.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<&CityObject> {
        self.city_objects.get(key)
    }

    /// Keys of all building objects.
    pub fn buildings(&self) -> impl Iterator<Item = (&String, &CityObject)> {
        self.city_objects
            .iter()
            .filter(|(_, o)| o.kind == CityObjectType::Building)
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self).map_err(ConfigError::from)?)
    }

    /// Writes the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on a write failure, or [`ConfigError::Json`]
    /// if serialization fails.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), objects = self.city_objects.len(), "city model written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn model() -> CityModel {
        let mut m = CityModel::new(Metadata::default());
        m.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        m.city_objects.insert(
            TERRAIN_OBJECT_ID.into(),
            CityObject::terrain(vec![Surface::single(vec![0, 1, 2])]),
        );
        m
    }

    #[test]
    fn top_level_shape() {
        let v: Value = serde_json::from_str(&model().to_json_string().unwrap()).unwrap();
        assert_eq!(v["type"], "CityJSON");
        assert_eq!(v["version"], "1.1");
        assert!(v["CityObjects"]["terrain01"].is_object());
        assert_eq!(v["vertices"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn terrain_is_composite_surface() {
        let v = serde_json::to_value(model()).unwrap();
        let terrain = &v["CityObjects"]["terrain01"];
        assert_eq!(terrain["type"], "TINRelief");
        assert_eq!(terrain["geometry"][0]["type"], "CompositeSurface");
        assert_eq!(terrain["geometry"][0]["lod"], "1");
        assert_eq!(terrain["geometry"][0]["boundaries"][0], serde_json::json!([[0, 1, 2]]));
        assert!(terrain.get("attributes").is_none());
    }

    #[test]
    fn building_solid_nests_one_shell() {
        let b = CityObject::building(vec![Surface::single(vec![0, 1, 2])], Map::new());
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["geometry"][0]["type"], "Solid");
        assert_eq!(v["geometry"][0]["boundaries"], serde_json::json!([[[[0, 1, 2]]]]));
    }

    #[test]
    fn document_round_trips() {
        let m = model();
        let back: CityModel = serde_json::from_str(&m.to_json_string().unwrap()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn surface_accessors() {
        let s = Surface(vec![vec![0, 1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(s.outer(), &[0, 1, 2, 3]);
        assert_eq!(s.holes().len(), 1);
        assert!(Surface::single(vec![0, 1, 2]).holes().is_empty());
    }
}
