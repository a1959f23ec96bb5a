use crate::error::{AssemblyError, Result};
use crate::footprint::Ring;
use crate::math::{Point2, Point3};
use crate::model::{Surface, VertexPool};
use crate::operations::shared_edges::ElevationSet;

/// Extrudes every edge of an exterior ring into one wall surface.
///
/// An edge whose two ends carry only bottom and roof becomes a quad. An edge
/// touching a vertex with intermediate breaks becomes a fan that walks up the
/// far end through every break and back down the near end, so the wall shares
/// each break vertex with the neighbouring solid.
pub struct ExtrudeWalls<'a> {
    footprint: &'a str,
    ring_index: usize,
    ring: &'a Ring,
    elevations: &'a [ElevationSet],
}

impl<'a> ExtrudeWalls<'a> {
    /// Creates a new `ExtrudeWalls` operation.
    ///
    /// `ring` must already be canonical for the top side, and `elevations`
    /// holds one set per ring vertex in ring order.
    #[must_use]
    pub fn new(footprint: &'a str, ring: &'a Ring, elevations: &'a [ElevationSet]) -> Self {
        Self {
            footprint,
            ring_index: 0,
            ring,
            elevations,
        }
    }

    /// Sets the ring index reported in errors.
    #[must_use]
    pub fn with_ring_index(mut self, ring_index: usize) -> Self {
        self.ring_index = ring_index;
        self
    }

    /// Executes the extrusion, appending every wall corner to `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::ElevationSetMismatch`] if there is not exactly
    /// one elevation set per ring vertex. Nothing is appended in that case.
    pub fn execute(&self, pool: &mut VertexPool) -> Result<Vec<Surface>> {
        if self.elevations.len() != self.ring.len() {
            return Err(AssemblyError::ElevationSetMismatch {
                footprint: self.footprint.to_owned(),
                ring: self.ring_index,
                points: self.ring.len(),
                sets: self.elevations.len(),
            }
            .into());
        }

        let points = self.ring.points();
        let walls = self
            .ring
            .edges()
            .map(|(j, k)| {
                let corners = wall_loop(&points[j], &self.elevations[j], &points[k], &self.elevations[k]);
                Surface::single(pool.push_loop(&corners))
            })
            .collect();
        Ok(walls)
    }
}

/// Corner loop of the wall from `a` to `b`, counter-clockwise seen from outside.
fn wall_loop(a: &Point2, ea: &ElevationSet, b: &Point2, eb: &ElevationSet) -> Vec<Point3> {
    let at = |p: &Point2, z: f64| Point3::new(p.x, p.y, z);
    let (za, zb) = (ea.as_slice(), eb.as_slice());

    // Plain quad: bottom a, bottom b, top b, top a
    if !ea.is_multi_height() && !eb.is_multi_height() {
        return vec![at(a, za[0]), at(b, zb[0]), at(b, zb[1]), at(a, za[1])];
    }

    // Fan: along the bottom, up b through its breaks, then down a
    let mut corners = Vec::with_capacity(za.len() + zb.len());
    corners.push(at(a, za[0]));
    corners.push(at(b, zb[0]));
    corners.extend(zb[1..].iter().map(|&z| at(b, z)));
    // a's bottom is already the first corner
    corners.extend(za[1..].iter().rev().map(|&z| at(a, z)));
    corners
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    fn square() -> Ring {
        Ring::from_coords(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]).unwrap()
    }

    fn flat_sets(n: usize, bottom: f64, roof: f64) -> Vec<ElevationSet> {
        vec![ElevationSet::new(bottom, roof); n]
    }

    fn corners(pool: &VertexPool, surface: &Surface) -> Vec<Point3> {
        surface.outer().iter().map(|&i| pool.get(i).unwrap()).collect()
    }

    fn newell_normal(points: &[Point3]) -> Vector3 {
        let n = points.len();
        let mut normal = Vector3::new(0.0, 0.0, 0.0);
        for i in 0..n {
            let curr = &points[i];
            let next = &points[(i + 1) % n];
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }
        normal.normalize()
    }

    // ── Quads ──────────────────────────────────────────────────

    #[test]
    fn square_gives_four_quads() {
        let ring = square();
        let sets = flat_sets(4, 0.0, 4.1);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        assert_eq!(walls.len(), 4);
        assert!(walls.iter().all(|w| w.outer().len() == 4));
        assert_eq!(pool.len(), 16);
    }

    #[test]
    fn quad_corner_order() {
        let ring = square();
        let sets = flat_sets(4, 1.0, 5.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let c = corners(&pool, &walls[0]);
        assert_eq!(c[0], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(c[1], Point3::new(10.0, 0.0, 1.0));
        assert_eq!(c[2], Point3::new(10.0, 0.0, 5.0));
        assert_eq!(c[3], Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn closing_edge_is_extruded() {
        let ring = square();
        let sets = flat_sets(4, 0.0, 3.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let c = corners(&pool, &walls[3]);
        assert_eq!(c[0], Point3::new(0.0, 10.0, 0.0));
        assert_eq!(c[1], Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn normals_point_outward() {
        let ring = square();
        let sets = flat_sets(4, 0.0, 3.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let centre = Point3::new(5.0, 5.0, 1.5);
        for wall in &walls {
            let c = corners(&pool, wall);
            let n = newell_normal(&c);
            let outward = c[0] - centre;
            assert!(n.dot(&outward) > 0.0);
            assert_relative_eq!(n.z, 0.0, epsilon = 1e-9);
        }
    }

    // ── Fans ───────────────────────────────────────────────────

    #[test]
    fn fan_walks_up_far_end_and_down_near_end() {
        let ring = square();
        let mut sets = flat_sets(4, 0.0, 9.0);
        sets[0].insert_break(6.0);
        sets[1].insert_break(3.0);
        sets[1].insert_break(6.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let zs: Vec<f64> = corners(&pool, &walls[0]).iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.0, 0.0, 3.0, 6.0, 9.0, 9.0, 6.0]);
        let c = corners(&pool, &walls[0]);
        assert!(c[1..5].iter().all(|p| (p.x - 10.0).abs() < 1e-9));
        assert!(c[5..].iter().all(|p| p.x.abs() < 1e-9));
    }

    #[test]
    fn one_multi_height_end_is_enough_for_a_fan() {
        let ring = square();
        let mut sets = flat_sets(4, 0.0, 9.0);
        sets[2].insert_break(6.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let sizes: Vec<usize> = walls.iter().map(|w| w.outer().len()).collect();
        assert_eq!(sizes, vec![4, 5, 5, 4]);
    }

    #[test]
    fn fan_normals_point_outward() {
        let ring = square();
        let mut sets = flat_sets(4, 0.0, 9.0);
        sets[0].insert_break(6.0);
        sets[1].insert_break(6.0);
        let mut pool = VertexPool::new();
        let walls = ExtrudeWalls::new("b", &ring, &sets).execute(&mut pool).unwrap();
        let n = newell_normal(&corners(&pool, &walls[0]));
        assert_relative_eq!(n.y, -1.0, epsilon = 1e-9);
    }

    // ── Errors ─────────────────────────────────────────────────

    #[test]
    fn length_mismatch_appends_nothing() {
        let ring = square();
        let sets = flat_sets(3, 0.0, 3.0);
        let mut pool = VertexPool::new();
        let err = ExtrudeWalls::new("b", &ring, &sets)
            .with_ring_index(2)
            .execute(&mut pool)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::GeocityError::Assembly(AssemblyError::ElevationSetMismatch {
                ring: 2,
                points: 4,
                sets: 3,
                ..
            })
        ));
        assert!(pool.is_empty());
    }
}
