pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Decimal places kept for planar coordinates.
pub const PLANAR_DECIMALS: i32 = 3;

/// Decimal places kept for elevations.
pub const VERTICAL_DECIMALS: i32 = 2;

/// Two elevations closer than this are the same break.
pub const ELEVATION_EPSILON: f64 = 0.005;

/// Rounds `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds a planar coordinate to the fixed planar precision.
#[must_use]
pub fn round_planar(value: f64) -> f64 {
    round_to(value, PLANAR_DECIMALS)
}

/// Rounds an elevation to the fixed vertical precision.
#[must_use]
pub fn round_vertical(value: f64) -> f64 {
    round_to(value, VERTICAL_DECIMALS)
}

/// Exact planar identity of a vertex: coordinates in integer thousandths.
///
/// Two points share a key iff their rounded `(x, y)` are equal, so the key is
/// safe to hash and order where raw `f64` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanarKey {
    pub x: i64,
    pub y: i64,
}

impl PlanarKey {
    /// Builds the key of a planar coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(x: f64, y: f64) -> Self {
        let factor = 10f64.powi(PLANAR_DECIMALS);
        Self {
            x: (x * factor).round() as i64,
            y: (y * factor).round() as i64,
        }
    }

    /// Builds the key of a point, ignoring any elevation.
    #[must_use]
    pub fn of(point: &Point2) -> Self {
        Self::new(point.x, point.y)
    }

    /// Returns the rounded planar point this key stands for.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn point(self) -> Point2 {
        let factor = 10f64.powi(PLANAR_DECIMALS);
        Point2::new(self.x as f64 / factor, self.y as f64 / factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_precision() {
        assert!((round_planar(1.234_56) - 1.235).abs() < TOLERANCE);
        assert!((round_vertical(15.899_99) - 15.9).abs() < TOLERANCE);
    }

    #[test]
    fn planar_key_ignores_sub_millimetre_noise() {
        assert_eq!(PlanarKey::new(10.0001, 5.0), PlanarKey::new(9.9999, 5.0));
        assert_ne!(PlanarKey::new(10.001, 5.0), PlanarKey::new(10.0, 5.0));
    }

    #[test]
    fn planar_key_round_trips_point() {
        let key = PlanarKey::new(-12.3456, 7.0);
        let p = key.point();
        assert!((p.x + 12.346).abs() < 1e-9);
        assert!((p.y - 7.0).abs() < 1e-9);
    }
}
