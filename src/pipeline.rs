use crate::config::ModelConfig;
use crate::error::Result;
use crate::footprint::{FootprintRecord, FootprintStore, Polygon};
use crate::math::Point3;
use crate::operations::assembly::{AssembleModel, Assembly};
use crate::operations::extraction::ExtractVertices;
use crate::raster::{ElevationSampler, RasterGrid};
use crate::terrain::{BuildTerrain, ConstrainedDelaunay, TerrainTin, Triangulator};

enum TerrainInput {
    Samples(Vec<Point3>),
    Precomputed(TerrainTin),
}

/// Runs the whole model build with one configuration.
///
/// By default the terrain is triangulated with [`ConstrainedDelaunay`] from
/// the footprint and boundary vertices alone; add raster samples with
/// [`Pipeline::with_grid`] or supply a finished TIN with
/// [`Pipeline::with_terrain`].
pub struct Pipeline {
    config: ModelConfig,
    boundary: Vec<Polygon>,
    terrain: TerrainInput,
    triangulator: Box<dyn Triangulator>,
}

impl Pipeline {
    /// Creates a pipeline for `config`.
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            boundary: Vec::new(),
            terrain: TerrainInput::Samples(Vec::new()),
            triangulator: Box::new(ConstrainedDelaunay),
        }
    }

    /// Restricts the terrain to an area of interest.
    #[must_use]
    pub fn with_boundary(mut self, polygon: Polygon) -> Self {
        self.boundary.push(polygon);
        self
    }

    /// Adds raster cell centres as terrain sample points.
    #[must_use]
    pub fn with_grid(self, grid: &RasterGrid) -> Self {
        self.with_samples(grid.cell_centres().into_iter().map(|(x, y, z)| Point3::new(x, y, z)))
    }

    /// Adds free terrain sample points.
    #[must_use]
    pub fn with_samples(mut self, samples: impl IntoIterator<Item = Point3>) -> Self {
        if matches!(self.terrain, TerrainInput::Precomputed(_)) {
            self.terrain = TerrainInput::Samples(Vec::new());
        }
        if let TerrainInput::Samples(points) = &mut self.terrain {
            points.extend(samples);
        }
        self
    }

    /// Uses a finished terrain instead of triangulating one.
    #[must_use]
    pub fn with_terrain(mut self, tin: TerrainTin) -> Self {
        self.terrain = TerrainInput::Precomputed(tin);
        self
    }

    /// Replaces the terrain triangulator.
    #[must_use]
    pub fn with_triangulator(mut self, triangulator: impl Triangulator + 'static) -> Self {
        self.triangulator = Box::new(triangulator);
        self
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Runs the build over `records`, sampling ground elevations from `sampler`.
    ///
    /// Footprints that cannot be modelled are left out and reported in
    /// [`Assembly::skipped`]. When the configuration names an output path the
    /// document is written there as well.
    ///
    /// # Errors
    ///
    /// Fails on a raster sample failure, an internal table inconsistency, a
    /// triangulation failure or a write failure. Nothing is written then.
    pub fn run<S>(&self, records: impl IntoIterator<Item = FootprintRecord>, sampler: &S) -> Result<Assembly>
    where
        S: ElevationSampler + ?Sized,
    {
        let mut store = FootprintStore::new();
        let mut skipped = store.ingest(records);
        for polygon in &self.boundary {
            store.add_boundary(polygon.clone());
        }

        let extraction = ExtractVertices::new(self.config.duplicate_vertices).execute(&store, sampler)?;
        let built;
        let terrain = match &self.terrain {
            TerrainInput::Precomputed(tin) => tin,
            TerrainInput::Samples(samples) => {
                built = BuildTerrain::new(&store, &extraction)
                    .with_samples(samples.iter().copied())
                    .execute(self.triangulator.as_ref())?;
                &built
            }
        };

        let mut assembly = AssembleModel::new(&store, &extraction, terrain, &self.config).execute()?;
        skipped.append(&mut assembly.skipped);
        assembly.skipped = skipped;

        if let Some(path) = &self.config.output {
            assembly.model.write_to_path(path)?;
        }
        Ok(assembly)
    }
}
