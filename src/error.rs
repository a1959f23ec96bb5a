use thiserror::Error;

/// Top-level error type for the city model builder.
#[derive(Debug, Error)]
pub enum GeocityError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Malformed footprint geometry. The footprint is skipped, the run continues.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("footprint {footprint}: ring {ring} is degenerate ({points} distinct points, at least 3 enclosing an area required)")]
    MalformedRing {
        footprint: String,
        ring: usize,
        points: usize,
    },

    #[error("footprint {footprint}: empty height band (bottom {bottom}, roof {roof})")]
    EmptyHeightBand {
        footprint: String,
        bottom: f64,
        roof: f64,
    },
}

/// A footprint lacks a tag needed to resolve its heights. The footprint is skipped.
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("footprint {footprint}: missing required attribute `{attribute}`")]
    Missing {
        footprint: String,
        attribute: &'static str,
    },

    #[error("footprint {footprint}: identifier already ingested")]
    DuplicateId { footprint: String },
}

/// The elevation sampler returned no usable value. Fatal for the run.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("footprint {owner}: ring {ring}: no elevation at ({x}, {y})")]
    NoData {
        owner: String,
        ring: usize,
        x: f64,
        y: f64,
    },
}

/// Vertex, edge or elevation tables disagree with each other. Always fatal.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("edge ({x1}, {y1}) -> ({x2}, {y2}) of footprint {footprint} ring {ring} is not indexed")]
    EdgeNotIndexed {
        footprint: String,
        ring: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    #[error("no vertex recorded at ({x}, {y})")]
    VertexNotFound { x: f64, y: f64 },

    #[error("footprint {footprint}: ring {ring} has {points} points but {sets} elevation sets")]
    ElevationSetMismatch {
        footprint: String,
        ring: usize,
        points: usize,
        sets: usize,
    },

    #[error("footprint {footprint}: heights not resolved")]
    HeightsMissing { footprint: String },

    #[error("footprint key {0} is not in the store")]
    UnknownFootprint(String),

    #[error("terrain triangle {triangle} references point {index}, only {points} points exist")]
    TerrainIndexOutOfRange {
        triangle: usize,
        index: usize,
        points: usize,
    },
}

/// Errors raised while building the terrain surface.
#[derive(Debug, Error)]
pub enum TriangulationError {
    #[error("point {index} rejected: {reason}")]
    PointRejected { index: usize, reason: String },

    #[error("segment {from} -> {to} references a missing point")]
    SegmentOutOfRange { from: usize, to: usize },

    #[error("triangulation needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// Errors reading configuration or writing the document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeocityError {
    /// Returns `true` for errors that skip one footprint instead of aborting the run.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Geometry(_) | Self::Attribute(_))
    }
}

/// Convenience type alias for results using [`GeocityError`].
pub type Result<T> = std::result::Result<T, GeocityError>;
