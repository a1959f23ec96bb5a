use std::collections::BTreeMap;

use slotmap::SecondaryMap;

use crate::error::{AssemblyError, Result};
use crate::footprint::{FootprintId, Ring};
use crate::math::{PlanarKey, ELEVATION_EPSILON};

use super::extraction::{EdgeKey, EdgeOwner, EdgeTable};
use super::heights::Heights;

/// Ascending break elevations at one ring vertex, bottom and roof included.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationSet(Vec<f64>);

impl ElevationSet {
    /// The plain two-member set of a wall from `bottom` to `roof`.
    #[must_use]
    pub fn new(bottom: f64, roof: f64) -> Self {
        Self(vec![bottom, roof])
    }

    /// Adds `z` if it lies strictly inside the band and is not already present.
    pub fn insert_break(&mut self, z: f64) {
        let (bottom, top) = (self.bottom(), self.top());
        if z <= bottom + ELEVATION_EPSILON || z >= top - ELEVATION_EPSILON {
            return;
        }
        if self.0.iter().any(|e| (e - z).abs() < ELEVATION_EPSILON) {
            return;
        }
        let at = self.0.partition_point(|&e| e < z);
        self.0.insert(at, z);
    }

    /// Lowest elevation.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.0[0]
    }

    /// Highest elevation.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Number of elevations, at least 2.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a set holds at least the bottom and the roof.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when a neighbour injects an intermediate break.
    #[must_use]
    pub fn is_multi_height(&self) -> bool {
        self.0.len() > 2
    }

    /// The elevations, ascending.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Break elevations a footprint contributes to an edge it traverses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub footprint: FootprintId,
    pub breaks: [f64; 2],
}

/// Every indexed edge with the break elevations of the footprints on it.
///
/// Built once from a complete [`EdgeTable`] and the resolved heights, then
/// queried read-only while walls are extruded.
#[derive(Debug, Clone, Default)]
pub struct SharedEdgeIndex {
    edges: BTreeMap<EdgeKey, Vec<Contribution>>,
}

impl SharedEdgeIndex {
    /// Builds the index. Boundary traversals and footprints without heights
    /// are indexed as edges but contribute no breaks.
    #[must_use]
    pub fn build(table: &EdgeTable, heights: &SecondaryMap<FootprintId, Heights>) -> Self {
        let mut edges = BTreeMap::new();
        for key in table.keys() {
            let mut contributions: Vec<Contribution> = Vec::new();
            for traversal in table.traversals(key).unwrap_or_default() {
                let EdgeOwner::Footprint(id) = traversal.owner else {
                    continue;
                };
                let Some(h) = heights.get(id) else {
                    continue;
                };
                if contributions.iter().all(|c| c.footprint != id) {
                    contributions.push(Contribution {
                        footprint: id,
                        breaks: h.breaks(),
                    });
                }
            }
            edges.insert(*key, contributions);
        }
        Self { edges }
    }

    /// Footprint contributions on `key`, if the edge is indexed.
    #[must_use]
    pub fn contributions(&self, key: &EdgeKey) -> Option<&[Contribution]> {
        self.edges.get(key).map(Vec::as_slice)
    }

    /// Elevation set of every vertex of `ring` for `footprint`.
    ///
    /// A vertex collects the breaks of every other footprint on either of its
    /// two incident edges, kept only strictly between this footprint's bottom
    /// and roof.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::EdgeNotIndexed`] if an edge of `ring` is not in
    /// the index: the ring and the extraction tables disagree.
    pub fn elevation_sets(
        &self,
        footprint: FootprintId,
        name: &str,
        ring_index: usize,
        ring: &Ring,
        heights: &Heights,
    ) -> Result<Vec<ElevationSet>> {
        let keys: Vec<PlanarKey> = ring.keys().collect();
        let n = keys.len();
        // Contributions of edge j, which runs from vertex j to vertex j + 1
        let mut edge_breaks: Vec<&[Contribution]> = Vec::with_capacity(n);
        for (j, k) in ring.edges() {
            let key = EdgeKey::new(keys[j], keys[k]);
            let contributions = self.contributions(&key).ok_or_else(|| {
                let (a, b) = (keys[j].point(), keys[k].point());
                AssemblyError::EdgeNotIndexed {
                    footprint: name.to_owned(),
                    ring: ring_index,
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                }
            })?;
            edge_breaks.push(contributions);
        }

        // A vertex sees both incident edges; its own contribution adds nothing
        let sets = (0..n)
            .map(|j| {
                let incoming = edge_breaks[(j + n - 1) % n];
                let outgoing = edge_breaks[j];
                let mut set = ElevationSet::new(heights.bottom(), heights.roof());
                for c in incoming.iter().chain(outgoing) {
                    if c.footprint != footprint {
                        for z in c.breaks {
                            // out-of-band breaks are dropped here
                            set.insert_break(z);
                        }
                    }
                }
                set
            })
            .collect();
        Ok(sets)
    }
}
