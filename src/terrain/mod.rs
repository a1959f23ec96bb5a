mod delaunay;

pub use delaunay::{ConstrainedDelaunay, Triangulator};

use crate::error::{AssemblyError, Result};
use crate::footprint::FootprintStore;
use crate::math::{PlanarKey, Point2, Point3};
use crate::operations::extraction::Extraction;
use crate::raster::RasterGrid;

/// A triangulated terrain: points plus triangles indexing into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainTin {
    pub points: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
}

impl TerrainTin {
    /// Creates a terrain from precomputed parts.
    #[must_use]
    pub fn new(points: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Self {
        Self { points, triangles }
    }

    /// Checks that every triangle index refers to a point.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TerrainIndexOutOfRange`] for the first bad index.
    pub fn validate(&self) -> Result<()> {
        let points = self.points.len();
        for (triangle, tri) in self.triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= points) {
                return Err(AssemblyError::TerrainIndexOutOfRange {
                    triangle,
                    index,
                    points,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Drops points no triangle references and renumbers the triangles.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TerrainIndexOutOfRange`] if a triangle
    /// refers to a missing point.
    pub fn compact(self) -> Result<Self> {
        self.validate()?;
        let mut remap: Vec<Option<usize>> = vec![None; self.points.len()];
        let mut points = Vec::new();
        let mut triangles = Vec::with_capacity(self.triangles.len());
        for tri in &self.triangles {
            let mut out = [0usize; 3];
            for (slot, &i) in out.iter_mut().zip(tri) {
                *slot = *remap[i].get_or_insert_with(|| {
                    points.push(self.points[i]);
                    points.len() - 1
                });
            }
            triangles.push(out);
        }
        Ok(Self { points, triangles })
    }
}

/// Builds the terrain TIN from raster samples and the extracted tables.
///
/// The point list is the footprint vertex table, then the boundary vertex
/// table, then every sample not covered by a footprint (and inside the area
/// of interest, when one is given). Every edge of the edge table becomes a
/// constraint segment, so footprint outlines appear as triangle edges.
/// Triangles covered by a footprint or falling outside the area of interest
/// are dropped.
pub struct BuildTerrain<'a> {
    store: &'a FootprintStore,
    extraction: &'a Extraction,
    samples: Vec<Point3>,
}

impl<'a> BuildTerrain<'a> {
    /// Creates a new `BuildTerrain` operation with no raster samples.
    #[must_use]
    pub fn new(store: &'a FootprintStore, extraction: &'a Extraction) -> Self {
        Self {
            store,
            extraction,
            samples: Vec::new(),
        }
    }

    /// Adds free terrain sample points.
    #[must_use]
    pub fn with_samples(mut self, samples: impl IntoIterator<Item = Point3>) -> Self {
        self.samples.extend(samples);
        self
    }

    /// Adds the centre of every valid cell of `grid` as a sample point.
    #[must_use]
    pub fn with_grid(self, grid: &RasterGrid) -> Self {
        self.with_samples(
            grid.cell_centres()
                .into_iter()
                .map(|(x, y, z)| Point3::new(x, y, z)),
        )
    }

    /// Executes the construction.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::VertexNotFound`] if an edge endpoint is in
    /// neither vertex table, or the triangulator's error. Fewer than three
    /// points give an empty terrain, not an error.
    pub fn execute(&self, triangulator: &dyn Triangulator) -> Result<TerrainTin> {
        // Point list: footprint vertices, boundary vertices, open samples
        let footprint_vertices = self.extraction.vertices.vertices();
        let boundary_vertices = self.extraction.boundary_vertices.vertices();
        let offset = footprint_vertices.len();

        let mut points: Vec<Point3> = Vec::with_capacity(offset + boundary_vertices.len() + self.samples.len());
        points.extend_from_slice(footprint_vertices);
        points.extend_from_slice(boundary_vertices);
        let free = self
            .samples
            .iter()
            .filter(|p| self.is_open_ground(&Point2::new(p.x, p.y)));
        points.extend(free);

        // Every recorded edge becomes a constraint, its endpoints looked up
        // in the footprint table first
        let lookup = |key: PlanarKey| -> Result<usize> {
            self.extraction
                .vertices
                .index_of(key)
                .or_else(|| self.extraction.boundary_vertices.index_of(key).map(|i| i + offset))
                .ok_or_else(|| {
                    let p = key.point();
                    AssemblyError::VertexNotFound { x: p.x, y: p.y }.into()
                })
        };
        let mut segments = Vec::with_capacity(self.extraction.edges.len());
        for key in self.extraction.edges.keys() {
            segments.push([lookup(key.start())?, lookup(key.end())?]);
        }

        if points.len() < 3 {
            tracing::debug!(points = points.len(), "too few points for a terrain");
            return Ok(TerrainTin::default());
        }
        let triangles = triangulator.triangulate(&points, &segments)?;
        let mut tin = TerrainTin::new(points, triangles);
        tin.validate()?;

        // Carve out footprints and everything outside the area of interest,
        // judging each triangle by its centroid
        let points = &tin.points;
        tin.triangles
            .retain(|t| self.is_open_ground(&centroid(points, *t)));
        let tin = tin.compact()?;
        tracing::debug!(
            points = tin.points.len(),
            triangles = tin.triangles.len(),
            segments = segments.len(),
            "terrain built"
        );
        Ok(tin)
    }

    /// Not under a footprint, and inside the area of interest if there is one.
    fn is_open_ground(&self, p: &Point2) -> bool {
        let boundary = self.store.boundary();
        let in_aoi = boundary.is_empty() || boundary.iter().any(|b| b.contains(p));
        in_aoi && !self.store.iter().any(|(_, f)| f.polygon.contains(p))
    }
}

fn centroid(points: &[Point3], t: [usize; 3]) -> Point2 {
    let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
    Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::footprint::{FootprintRecord, Polygon, Tags, LEVELS_TAG};
    use crate::operations::extraction::ExtractVertices;
    use serde_json::json;

    fn store_with_block() -> FootprintStore {
        let mut tags = Tags::new();
        tags.insert(LEVELS_TAG.into(), json!("1"));
        let mut store = FootprintStore::new();
        store.ingest(vec![FootprintRecord {
            id: "b".into(),
            exterior: vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]],
            interiors: vec![],
            tags,
        }]);
        store
    }

    fn samples() -> Vec<Point3> {
        let mut out = Vec::new();
        for i in 0..=5 {
            for j in 0..=5 {
                out.push(Point3::new(f64::from(i) * 2.0, f64::from(j) * 2.0, 1.0));
            }
        }
        out
    }

    #[test]
    fn footprint_area_is_carved_out() {
        let store = store_with_block();
        let flat = |_x: f64, _y: f64| Some(1.0);
        let ex = ExtractVertices::default().execute(&store, &flat).unwrap();
        let tin = BuildTerrain::new(&store, &ex)
            .with_samples(samples())
            .execute(&ConstrainedDelaunay)
            .unwrap();
        assert!(!tin.triangles.is_empty());
        for t in &tin.triangles {
            let c = centroid(&tin.points, *t);
            assert!(!(c.x > 4.0 && c.x < 6.0 && c.y > 4.0 && c.y < 6.0));
        }
        let keys: Vec<PlanarKey> = tin.points.iter().map(|p| PlanarKey::new(p.x, p.y)).collect();
        for corner in [(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)] {
            assert!(keys.contains(&PlanarKey::new(corner.0, corner.1)));
        }
    }

    #[test]
    fn triangles_outside_the_area_of_interest_are_dropped() {
        let mut store = store_with_block();
        store.add_boundary(
            Polygon::from_coords("aoi", &[[0.0, 0.0], [8.0, 0.0], [8.0, 8.0], [0.0, 8.0]], &[]).unwrap(),
        );
        let flat = |_x: f64, _y: f64| Some(1.0);
        let ex = ExtractVertices::default().execute(&store, &flat).unwrap();
        let tin = BuildTerrain::new(&store, &ex)
            .with_samples(samples())
            .execute(&ConstrainedDelaunay)
            .unwrap();
        assert!(tin.points.iter().all(|p| p.x <= 8.0 && p.y <= 8.0));
    }

    #[test]
    fn empty_store_gives_empty_terrain() {
        let store = FootprintStore::new();
        let ex = Extraction::default();
        let tin = BuildTerrain::new(&store, &ex).execute(&ConstrainedDelaunay).unwrap();
        assert_eq!(tin, TerrainTin::default());
    }

    #[test]
    fn compact_renumbers_referenced_points() {
        let tin = TerrainTin::new(
            vec![
                Point3::new(9.0, 9.0, 0.0),
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[1, 2, 3]],
        )
        .compact()
        .unwrap();
        assert_eq!(tin.points.len(), 3);
        assert_eq!(tin.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn validate_catches_bad_indices() {
        let tin = TerrainTin::new(vec![Point3::origin(); 3], vec![[0, 1, 3]]);
        assert!(tin.validate().is_err());
        assert!(TerrainTin::new(vec![Point3::origin(); 3], vec![[0, 1, 2]]).validate().is_ok());
    }

    #[test]
    fn compact_rejects_bad_indices() {
        let err = TerrainTin::new(vec![Point3::origin(); 3], vec![[0, 1, 7]])
            .compact()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::GeocityError::Assembly(AssemblyError::TerrainIndexOutOfRange { index: 7, .. })
        ));
    }
}
