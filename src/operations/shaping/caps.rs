use crate::footprint::{CapSide, Ring, RingRole};
use crate::math::Point3;
use crate::model::{Surface, VertexPool};

/// Builds one horizontal cap surface from a footprint's rings.
///
/// The exterior becomes the outer loop and every interior ring a hole. A
/// top cap keeps the exterior counter-clockwise; a bottom cap reverses every
/// loop so it faces downward.
pub struct ExtrudeCap<'a> {
    exterior: &'a Ring,
    interiors: &'a [Ring],
    elevation: f64,
    side: CapSide,
}

impl<'a> ExtrudeCap<'a> {
    /// Creates a new `ExtrudeCap` operation.
    #[must_use]
    pub fn new(exterior: &'a Ring, interiors: &'a [Ring], elevation: f64, side: CapSide) -> Self {
        Self {
            exterior,
            interiors,
            elevation,
            side,
        }
    }

    /// Executes the extrusion, appending the cap's corners to `pool`.
    pub fn execute(&self, pool: &mut VertexPool) -> Surface {
        let mut loops = Vec::with_capacity(1 + self.interiors.len());
        let outer = self.exterior.canonicalize(RingRole::Exterior, self.side);
        loops.push(self.lift(&outer, pool));
        for interior in self.interiors {
            let hole = interior.canonicalize(RingRole::Interior, self.side);
            loops.push(self.lift(&hole, pool));
        }
        Surface(loops)
    }

    fn lift(&self, ring: &Ring, pool: &mut VertexPool) -> Vec<usize> {
        ring.points()
            .iter()
            .map(|p| pool.push_at(p, self.elevation))
            .collect()
    }
}

/// Extrudes the rings of courtyards into walls facing into the courtyard.
///
/// Each interior edge becomes one quad from `bottom` to `roof`; interior
/// rings never share edges with neighbours.
pub struct ExtrudeInteriorWalls<'a> {
    interiors: &'a [Ring],
    bottom: f64,
    roof: f64,
}

impl<'a> ExtrudeInteriorWalls<'a> {
    /// Creates a new `ExtrudeInteriorWalls` operation.
    #[must_use]
    pub fn new(interiors: &'a [Ring], bottom: f64, roof: f64) -> Self {
        Self {
            interiors,
            bottom,
            roof,
        }
    }

    /// Executes the extrusion, appending every wall corner to `pool`.
    pub fn execute(&self, pool: &mut VertexPool) -> Vec<Surface> {
        let mut walls = Vec::new();
        for interior in self.interiors {
            let ring = interior.canonicalize(RingRole::Interior, CapSide::Top);
            let points = ring.points();
            for (j, k) in ring.edges() {
                let (a, b) = (&points[j], &points[k]);
                let corners = [
                    Point3::new(a.x, a.y, self.bottom),
                    Point3::new(b.x, b.y, self.bottom),
                    Point3::new(b.x, b.y, self.roof),
                    Point3::new(a.x, a.y, self.roof),
                ];
                walls.push(Surface::single(pool.push_loop(&corners)));
            }
        }
        walls
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area_2d;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn square(x0: f64, x1: f64) -> Ring {
        Ring::from_coords(&[[x0, x0], [x1, x0], [x1, x1], [x0, x1]]).unwrap()
    }

    fn projected(pool: &VertexPool, indices: &[usize]) -> Vec<Point2> {
        indices
            .iter()
            .map(|&i| {
                let p = pool.get(i).unwrap();
                Point2::new(p.x, p.y)
            })
            .collect()
    }

    // ── Caps ───────────────────────────────────────────────────

    #[test]
    fn top_cap_is_ccw_at_roof() {
        let ext = square(0.0, 10.0).reversed();
        let mut pool = VertexPool::new();
        let cap = ExtrudeCap::new(&ext, &[], 4.1, CapSide::Top).execute(&mut pool);
        assert_eq!(cap.outer().len(), 4);
        assert!(signed_area_2d(&projected(&pool, cap.outer())) > 0.0);
        assert!(cap.outer().iter().all(|&i| (pool.get(i).unwrap().z - 4.1).abs() < 1e-9));
    }

    #[test]
    fn bottom_cap_is_reversed() {
        let ext = square(0.0, 10.0);
        let mut pool = VertexPool::new();
        let cap = ExtrudeCap::new(&ext, &[], 0.0, CapSide::Bottom).execute(&mut pool);
        assert_relative_eq!(signed_area_2d(&projected(&pool, cap.outer())), -100.0);
    }

    #[test]
    fn holes_wind_against_the_outer_loop() {
        let ext = square(0.0, 10.0);
        let holes = [square(3.0, 6.0)];
        let mut pool = VertexPool::new();
        let top = ExtrudeCap::new(&ext, &holes, 5.0, CapSide::Top).execute(&mut pool);
        let bottom = ExtrudeCap::new(&ext, &holes, 0.0, CapSide::Bottom).execute(&mut pool);
        assert_eq!(top.holes().len(), 1);
        assert!(signed_area_2d(&projected(&pool, &top.holes()[0])) < 0.0);
        assert!(signed_area_2d(&projected(&pool, &bottom.holes()[0])) > 0.0);
        assert_eq!(pool.len(), 16);
    }

    // ── Interior walls ─────────────────────────────────────────

    #[test]
    fn courtyard_walls_face_the_courtyard() {
        let holes = [square(3.0, 6.0)];
        let mut pool = VertexPool::new();
        let walls = ExtrudeInteriorWalls::new(&holes, 1.0, 7.0).execute(&mut pool);
        assert_eq!(walls.len(), 4);
        let centre = Point2::new(4.5, 4.5);
        for wall in &walls {
            let c: Vec<Point3> = wall.outer().iter().map(|&i| pool.get(i).unwrap()).collect();
            assert_relative_eq!(c[0].z, 1.0);
            assert_relative_eq!(c[2].z, 7.0);
            // bottom edge runs clockwise around the courtyard, so the
            // courtyard centre lies on its right
            let (a, b) = (c[0], c[1]);
            let cross = (b.x - a.x) * (centre.y - a.y) - (b.y - a.y) * (centre.x - a.x);
            assert!(cross < 0.0);
        }
    }
}
