use crate::math::{round_planar, round_vertical, Point2, Point3};

/// Append-only global vertex list of the output document.
///
/// Every surface corner gets its own record: nothing is deduplicated and
/// nothing is ever removed, so an index stays valid for the whole run.
#[derive(Debug, Clone, Default)]
pub struct VertexPool {
    vertices: Vec<[f64; 3]>,
}

impl VertexPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex at output precision and returns its index.
    pub fn push(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.vertices
            .push([round_planar(x), round_planar(y), round_vertical(z)]);
        self.vertices.len() - 1
    }

    /// Appends a planar point lifted to elevation `z`.
    pub fn push_at(&mut self, p: &Point2, z: f64) -> usize {
        self.push(p.x, p.y, z)
    }

    /// Appends every point of a loop, returning the new indices in order.
    pub fn push_loop(&mut self, points: &[Point3]) -> Vec<usize> {
        points.iter().map(|p| self.push(p.x, p.y, p.z)).collect()
    }

    /// The vertex at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Point3> {
        self.vertices
            .get(index)
            .map(|&[x, y, z]| Point3::new(x, y, z))
    }

    /// All vertices in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Number of appended vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if nothing was appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `[min_x, min_y, min_z, max_x, max_y, max_z]`, or `None` when empty.
    #[must_use]
    pub fn extent(&self) -> Option<[f64; 6]> {
        let first = self.vertices.first()?;
        let mut ext = [first[0], first[1], first[2], first[0], first[1], first[2]];
        for v in &self.vertices[1..] {
            for axis in 0..3 {
                ext[axis] = ext[axis].min(v[axis]);
                ext[axis + 3] = ext[axis + 3].max(v[axis]);
            }
        }
        Some(ext)
    }

    /// Consumes the pool into the document's vertex array.
    #[must_use]
    pub fn into_vertices(self) -> Vec<[f64; 3]> {
        self.vertices
    }
}
