use crate::math::polygon_2d::{is_ccw, signed_area_2d};
use crate::math::{round_planar, PlanarKey, Point2, TOLERANCE};

/// Which boundary of a polygon a ring is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingRole {
    /// Outer boundary, counter-clockwise when canonical.
    Exterior,
    /// Courtyard boundary, clockwise when canonical.
    Interior,
}

/// Which closing surface a ring is emitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapSide {
    /// Roof cap and walls: canonical orientation.
    Top,
    /// Ground or soffit cap: every loop reversed.
    Bottom,
}

/// A closed planar ring stored open (the closing point is not repeated).
///
/// Points are held at planar precision, and consecutive duplicates are removed
/// on construction, so every edge has non-zero length after rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point2>,
}

impl Ring {
    /// Builds a ring from raw coordinates, closed or open.
    ///
    /// Returns `None` when fewer than 3 distinct points remain or the points
    /// enclose no area (all collinear).
    #[must_use]
    pub fn from_coords(coords: &[[f64; 2]]) -> Option<Self> {
        let mut points: Vec<Point2> = Vec::with_capacity(coords.len());
        let mut last: Option<PlanarKey> = None;
        for &[x, y] in coords {
            let p = Point2::new(round_planar(x), round_planar(y));
            let key = PlanarKey::of(&p);
            if last != Some(key) {
                points.push(p);
                last = Some(key);
            }
        }
        if points.len() > 1 && PlanarKey::of(&points[0]) == PlanarKey::of(&points[points.len() - 1]) {
            points.pop();
        }
        (points.len() >= 3 && signed_area_2d(&points).abs() >= TOLERANCE).then_some(Self { points })
    }

    /// Number of distinct coordinates in raw input, after the same clean-up as
    /// [`Ring::from_coords`]. Used to report malformed rings.
    #[must_use]
    pub fn distinct_count(coords: &[[f64; 2]]) -> usize {
        let mut keys: Vec<PlanarKey> = coords.iter().map(|&[x, y]| PlanarKey::new(x, y)).collect();
        keys.dedup();
        if keys.len() > 1 && keys.first() == keys.last() {
            keys.pop();
        }
        keys.len()
    }

    /// The ring's points in traversal order.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of points (and edges) of the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a ring holds at least 3 points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Planar keys of the points in traversal order.
    pub fn keys(&self) -> impl Iterator<Item = PlanarKey> + '_ {
        self.points.iter().map(PlanarKey::of)
    }

    /// Signed area, positive for counter-clockwise.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points)
    }

    /// Returns `true` if the ring winds counter-clockwise.
    #[must_use]
    pub fn is_ccw(&self) -> bool {
        is_ccw(&self.points)
    }

    /// Returns the ring traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Returns a copy oriented for `role` and `side`.
    ///
    /// Exterior rings come out counter-clockwise and interior rings clockwise;
    /// for [`CapSide::Bottom`] both are reversed so the cap faces downward.
    #[must_use]
    pub fn canonicalize(&self, role: RingRole, side: CapSide) -> Self {
        let want_ccw = match (role, side) {
            (RingRole::Exterior, CapSide::Top) | (RingRole::Interior, CapSide::Bottom) => true,
            (RingRole::Interior, CapSide::Top) | (RingRole::Exterior, CapSide::Bottom) => false,
        };
        if self.is_ccw() == want_ccw {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Index pairs `(j, j + 1)` of every edge, the closing edge last.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.points.len();
        (0..n).map(move |j| (j, (j + 1) % n))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square_cw() -> Ring {
        Ring::from_coords(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]).unwrap()
    }

    #[test]
    fn closing_point_is_dropped() {
        assert_eq!(square_cw().len(), 4);
    }

    #[test]
    fn consecutive_duplicates_after_rounding_are_dropped() {
        let ring = Ring::from_coords(&[
            [0.0, 0.0],
            [5.0, 0.0],
            [5.0001, 0.0],
            [5.0, 5.0],
        ])
        .unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn fewer_than_three_points_is_rejected() {
        assert!(Ring::from_coords(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).is_none());
        assert_eq!(Ring::distinct_count(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]), 2);
    }

    #[test]
    fn collinear_points_are_rejected() {
        let coords = [[0.0, 0.0], [5.0, 0.0], [10.0, 0.0]];
        assert!(Ring::from_coords(&coords).is_none());
        assert_eq!(Ring::distinct_count(&coords), 3);
    }

    #[test]
    fn canonical_exterior_top_is_ccw() {
        let ring = square_cw().canonicalize(RingRole::Exterior, CapSide::Top);
        assert!(ring.signed_area() > 0.0);
    }

    #[test]
    fn canonical_exterior_bottom_is_cw() {
        let ring = square_cw().canonicalize(RingRole::Exterior, CapSide::Bottom);
        assert!(ring.signed_area() < 0.0);
    }

    #[test]
    fn canonical_interior_flips_with_side() {
        let top = square_cw().reversed().canonicalize(RingRole::Interior, CapSide::Top);
        let bottom = square_cw().canonicalize(RingRole::Interior, CapSide::Bottom);
        assert!(!top.is_ccw());
        assert!(bottom.is_ccw());
    }

    #[test]
    fn edges_wrap_around() {
        let edges: Vec<_> = square_cw().edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }
}
