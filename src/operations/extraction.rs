use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::error::{GeocityError, RasterError, Result};
use crate::footprint::{CapSide, FootprintId, FootprintStore, Ring, RingRole};
use crate::math::{round_vertical, PlanarKey, Point3};
use crate::raster::ElevationSampler;

/// Which sample survives when several rings visit the same planar location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVertexPolicy {
    /// Keep the highest sampled elevation.
    #[default]
    KeepHighest,
    /// Keep the lowest sampled elevation.
    KeepLowest,
    /// Keep the first sample in ring traversal order.
    KeepFirst,
}

impl DuplicateVertexPolicy {
    fn prefers(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::KeepHighest => candidate > current,
            Self::KeepLowest => candidate < current,
            Self::KeepFirst => false,
        }
    }
}

/// Vertices unique per planar key, sorted by descending elevation.
///
/// Ties are broken by ascending `x` then `y`, so the order is a pure function
/// of the samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexTable {
    vertices: Vec<Point3>,
    index: HashMap<PlanarKey, usize>,
}

impl VertexTable {
    /// Deduplicates `samples` by planar key under `policy`.
    #[must_use]
    pub fn from_samples(samples: &[Point3], policy: DuplicateVertexPolicy) -> Self {
        let mut unique: HashMap<PlanarKey, Point3> = HashMap::with_capacity(samples.len());
        for p in samples {
            let key = PlanarKey::new(p.x, p.y);
            unique
                .entry(key)
                .and_modify(|kept| {
                    if policy.prefers(p.z, kept.z) {
                        *kept = *p;
                    }
                })
                .or_insert(*p);
        }

        let mut vertices: Vec<Point3> = unique.into_values().collect();
        vertices.sort_by(|a, b| {
            b.z.total_cmp(&a.z)
                .then(a.x.total_cmp(&b.x))
                .then(a.y.total_cmp(&b.y))
        });
        let index = vertices
            .iter()
            .enumerate()
            .map(|(i, p)| (PlanarKey::new(p.x, p.y), i))
            .collect();
        Self { vertices, index }
    }

    /// The deduplicated vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Position of the vertex at `key`.
    #[must_use]
    pub fn index_of(&self, key: PlanarKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// The vertex at `key`.
    #[must_use]
    pub fn get(&self, key: PlanarKey) -> Option<&Point3> {
        self.index_of(key).map(|i| &self.vertices[i])
    }

    /// Number of unique vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the table holds no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Undirected edge between two planar keys, smaller endpoint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    start: PlanarKey,
    end: PlanarKey,
}

impl EdgeKey {
    /// Canonical key of the edge `a`–`b`, in either traversal direction.
    #[must_use]
    pub fn new(a: PlanarKey, b: PlanarKey) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Lexicographically smaller endpoint.
    #[must_use]
    pub fn start(&self) -> PlanarKey {
        self.start
    }

    /// Lexicographically larger endpoint.
    #[must_use]
    pub fn end(&self) -> PlanarKey {
        self.end
    }
}

/// Who traversed an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOwner {
    Footprint(FootprintId),
    /// Area-of-interest polygon, by position in the store's boundary list.
    Boundary(usize),
}

/// One ring traversing an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    pub owner: EdgeOwner,
    /// 0 for the exterior ring, `i + 1` for interior ring `i`.
    pub ring: usize,
}

/// Edge multiplicity table: every canonical edge with the rings traversing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeTable {
    edges: BTreeMap<EdgeKey, Vec<Traversal>>,
}

impl EdgeTable {
    fn record_ring(&mut self, keys: &[PlanarKey], traversal: Traversal) {
        let n = keys.len();
        for j in 0..n {
            let key = EdgeKey::new(keys[j], keys[(j + 1) % n]);
            let traversals = self.edges.entry(key).or_default();
            if !traversals.contains(&traversal) {
                traversals.push(traversal);
            }
        }
    }

    /// Number of (owner, ring) traversals of `key`; 0 if never seen.
    #[must_use]
    pub fn multiplicity(&self, key: &EdgeKey) -> usize {
        self.edges.get(key).map_or(0, Vec::len)
    }

    /// The traversals of `key`, if it was recorded.
    #[must_use]
    pub fn traversals(&self, key: &EdgeKey) -> Option<&[Traversal]> {
        self.edges.get(key).map(Vec::as_slice)
    }

    /// Returns `true` if more than one ring traverses `key`.
    #[must_use]
    pub fn is_shared(&self, key: &EdgeKey) -> bool {
        self.multiplicity(key) > 1
    }

    /// All edge keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.keys()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no edge was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Output of the extraction pass. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Footprint vertices, deduplicated.
    pub vertices: VertexTable,
    /// Area-of-interest vertices, deduplicated separately.
    pub boundary_vertices: VertexTable,
    /// Edges of footprints and boundary rings.
    pub edges: EdgeTable,
    /// Minimum sampled ground elevation of each footprint's exterior ring.
    pub ground: SecondaryMap<FootprintId, f64>,
}

/// Walks every footprint and boundary ring, samples elevations and builds the
/// vertex and edge tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractVertices {
    policy: DuplicateVertexPolicy,
}

impl ExtractVertices {
    /// Creates the operation with the given duplicate vertex policy.
    #[must_use]
    pub fn new(policy: DuplicateVertexPolicy) -> Self {
        Self { policy }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::NoData`] if the sampler has no finite value at
    /// any ring vertex. The whole run stops: no partial tables are returned.
    pub fn execute<S>(&self, store: &FootprintStore, sampler: &S) -> Result<Extraction>
    where
        S: ElevationSampler + ?Sized,
    {
        let mut edges = EdgeTable::default();
        let mut ground = SecondaryMap::new();
        let mut samples = Vec::new();

        for (id, footprint) in store.iter() {
            let owner = EdgeOwner::Footprint(id);
            for (ring_index, ring, role) in roles(footprint.polygon.rings()) {
                let sampled = sample_ring(&footprint.id, ring_index, &ring, sampler)?;
                if role == RingRole::Exterior {
                    let min = sampled.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);
                    ground.insert(id, min);
                }
                let keys: Vec<PlanarKey> = ring.keys().collect();
                edges.record_ring(&keys, Traversal { owner, ring: ring_index });
                samples.extend(sampled);
            }
        }

        let mut boundary_samples = Vec::new();
        for (b, polygon) in store.boundary().iter().enumerate() {
            let name = format!("boundary#{b}");
            for (ring_index, ring, _) in roles(polygon.rings()) {
                boundary_samples.extend(sample_ring(&name, ring_index, &ring, sampler)?);
                let keys: Vec<PlanarKey> = ring.keys().collect();
                edges.record_ring(
                    &keys,
                    Traversal {
                        owner: EdgeOwner::Boundary(b),
                        ring: ring_index,
                    },
                );
            }
        }

        let extraction = Extraction {
            vertices: VertexTable::from_samples(&samples, self.policy),
            boundary_vertices: VertexTable::from_samples(&boundary_samples, self.policy),
            edges,
            ground,
        };
        tracing::debug!(
            samples = samples.len(),
            vertices = extraction.vertices.len(),
            boundary_vertices = extraction.boundary_vertices.len(),
            edges = extraction.edges.len(),
            shared_edges = extraction.edges.keys().filter(|k| extraction.edges.is_shared(k)).count(),
            "vertex extraction complete"
        );
        Ok(extraction)
    }
}

/// Pairs each ring with its index and role, oriented for its role.
fn roles<'a>(
    rings: impl Iterator<Item = &'a Ring> + 'a,
) -> impl Iterator<Item = (usize, Ring, RingRole)> + 'a {
    rings.enumerate().map(|(i, ring)| {
        let role = if i == 0 {
            RingRole::Exterior
        } else {
            RingRole::Interior
        };
        (i, ring.canonicalize(role, CapSide::Top), role)
    })
}

fn sample_ring<S>(owner: &str, ring_index: usize, ring: &Ring, sampler: &S) -> Result<Vec<Point3>>
where
    S: ElevationSampler + ?Sized,
{
    ring.points()
        .iter()
        .map(|p| {
            sampler
                .elevation(p.x, p.y)
                .filter(|z| z.is_finite())
                .map(|z| Point3::new(p.x, p.y, round_vertical(z)))
                .ok_or_else(|| {
                    GeocityError::from(RasterError::NoData {
                        owner: owner.to_owned(),
                        ring: ring_index,
                        x: p.x,
                        y: p.y,
                    })
                })
        })
        .collect()
}
