use slotmap::SecondaryMap;

use crate::config::ModelConfig;
use crate::error::{AssemblyError, GeocityError, GeometryError, Result};
use crate::footprint::{CapSide, Footprint, FootprintId, FootprintStore, RingRole, Skipped};
use crate::math::ELEVATION_EPSILON;
use crate::model::{
    harvest_attributes, CityModel, CityObject, Metadata, Surface, VertexPool, TERRAIN_OBJECT_ID,
};
use crate::terrain::TerrainTin;

use super::extraction::Extraction;
use super::heights::{Heights, ResolveHeights};
use super::shaping::{ExtrudeCap, ExtrudeInteriorWalls, ExtrudeWalls};
use super::shared_edges::SharedEdgeIndex;

/// A finished document and the footprints left out of it.
#[derive(Debug)]
pub struct Assembly {
    pub model: CityModel,
    pub skipped: Vec<Skipped>,
}

/// Builds the city model from the terrain, every footprint's shell and the
/// configured metadata.
///
/// Terrain points go into the vertex pool first. Each footprint then gets
/// its walls, courtyard walls, roof cap and bottom cap, in that order.
pub struct AssembleModel<'a> {
    store: &'a FootprintStore,
    extraction: &'a Extraction,
    terrain: &'a TerrainTin,
    config: &'a ModelConfig,
}

impl<'a> AssembleModel<'a> {
    /// Creates a new `AssembleModel` operation.
    #[must_use]
    pub fn new(
        store: &'a FootprintStore,
        extraction: &'a Extraction,
        terrain: &'a TerrainTin,
        config: &'a ModelConfig,
    ) -> Self {
        Self {
            store,
            extraction,
            terrain,
            config,
        }
    }

    /// Executes the assembly.
    ///
    /// A footprint whose height band is empty is skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns an [`AssemblyError`] if the terrain or the extraction tables
    /// are inconsistent with the store. No partial document is returned.
    pub fn execute(&self) -> Result<Assembly> {
        self.terrain.validate()?;
        let mut pool = VertexPool::new();
        let mut model = CityModel::new(Metadata::default());

        let base = pool.len();
        for p in &self.terrain.points {
            pool.push(p.x, p.y, p.z);
        }
        let triangles = self
            .terrain
            .triangles
            .iter()
            .map(|t| Surface::single(t.iter().map(|&i| base + i).collect()))
            .collect();
        model
            .city_objects
            .insert(TERRAIN_OBJECT_ID.to_owned(), CityObject::terrain(triangles));

        let (heights, skipped) = self.resolve_heights()?;
        let index = SharedEdgeIndex::build(&self.extraction.edges, &heights);

        for (id, footprint) in self.store.iter() {
            let Some(h) = heights.get(id) else {
                continue;
            };
            let shell = self.shell(id, footprint, h, &index, &mut pool)?;
            model.city_objects.insert(
                footprint.id.clone(),
                CityObject::building(shell, harvest_attributes(footprint, h)),
            );
        }

        let extent = pool.extent().unwrap_or_default();
        model.metadata = Metadata::from_config(&self.config.metadata, extent);
        model.vertices = pool.into_vertices();

        tracing::info!(
            buildings = heights.len(),
            skipped = skipped.len(),
            vertices = model.vertices.len(),
            "city model assembled"
        );
        Ok(Assembly { model, skipped })
    }

    /// Resolves heights for every footprint, setting aside those whose band
    /// is empty.
    fn resolve_heights(&self) -> Result<(SecondaryMap<FootprintId, Heights>, Vec<Skipped>)> {
        let mut heights = SecondaryMap::new();
        let mut skipped = Vec::new();
        for (id, footprint) in self.store.iter() {
            let ground = self
                .extraction
                .ground
                .get(id)
                .copied()
                .ok_or_else(|| AssemblyError::HeightsMissing {
                    footprint: footprint.id.clone(),
                })?;
            let h = ResolveHeights::new(footprint.category, &footprint.tags, ground)
                .with_rules(self.config.heights)
                .execute();
            if h.roof() - h.bottom() < ELEVATION_EPSILON {
                let error = GeocityError::from(GeometryError::EmptyHeightBand {
                    footprint: footprint.id.clone(),
                    bottom: h.bottom(),
                    roof: h.roof(),
                });
                tracing::warn!(footprint = %footprint.id, %error, "footprint skipped");
                skipped.push(Skipped {
                    id: footprint.id.clone(),
                    error,
                });
                continue;
            }
            heights.insert(id, h);
        }
        Ok((heights, skipped))
    }

    fn shell(
        &self,
        id: FootprintId,
        footprint: &Footprint,
        heights: &Heights,
        index: &SharedEdgeIndex,
        pool: &mut VertexPool,
    ) -> Result<Vec<Surface>> {
        let polygon = &footprint.polygon;
        let exterior = polygon.exterior.canonicalize(RingRole::Exterior, CapSide::Top);
        let sets = index.elevation_sets(id, &footprint.id, 0, &exterior, heights)?;

        let mut shell = ExtrudeWalls::new(&footprint.id, &exterior, &sets).execute(pool)?;
        shell.extend(
            ExtrudeInteriorWalls::new(&polygon.interiors, heights.bottom(), heights.roof())
                .execute(pool),
        );
        shell.push(
            ExtrudeCap::new(&exterior, &polygon.interiors, heights.roof(), CapSide::Top)
                .execute(pool),
        );
        shell.push(
            ExtrudeCap::new(&exterior, &polygon.interiors, heights.bottom(), CapSide::Bottom)
                .execute(pool),
        );

        let multi = sets.iter().filter(|s| s.is_multi_height()).count();
        tracing::debug!(footprint = %footprint.id, surfaces = shell.len(), multi_height_vertices = multi, "shell extruded");
        Ok(shell)
    }
}
