/// Point query into a ground elevation model.
///
/// Must be deterministic for the lifetime of a run. `None` means no usable
/// value (outside the raster, or no-data).
pub trait ElevationSampler {
    /// Returns the ground elevation at planar `(x, y)`.
    fn elevation(&self, x: f64, y: f64) -> Option<f64>;
}

impl<F> ElevationSampler for F
where
    F: Fn(f64, f64) -> Option<f64>,
{
    fn elevation(&self, x: f64, y: f64) -> Option<f64> {
        self(x, y)
    }
}

/// Affine pixel-to-world mapping in GDAL coefficient order.
///
/// `x = c[0] + col * c[1] + row * c[2]`, `y = c[3] + col * c[4] + row * c[5]`.
/// Rotation terms are ignored when mapping back to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// North-up transform with square pixels of `size`, origin at the top-left corner.
    #[must_use]
    pub fn north_up(origin_x: f64, origin_y: f64, size: f64) -> Self {
        Self([origin_x, size, 0.0, origin_y, 0.0, -size])
    }

    /// Pixel containing `(x, y)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let c = &self.0;
        let col = ((x - c[0]) / c[1]).floor() as i64;
        let row = ((y - c[3]) / c[5]).floor() as i64;
        (col, row)
    }
}

/// A single-band elevation raster held in memory, row-major.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    transform: GeoTransform,
    width: usize,
    height: usize,
    data: Vec<f64>,
    no_data: Option<f64>,
}

impl RasterGrid {
    /// Creates a grid. Returns `None` if `data` does not hold `width * height` cells.
    #[must_use]
    pub fn new(transform: GeoTransform, width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            transform,
            width,
            height,
            data,
            no_data: None,
        })
    }

    /// Marks a cell value as no-data.
    #[must_use]
    pub fn with_no_data(mut self, value: f64) -> Self {
        self.no_data = Some(value);
        self
    }

    /// World coordinates of every cell centre, paired with its value.
    ///
    /// No-data cells are omitted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_centres(&self) -> Vec<(f64, f64, f64)> {
        let c = &self.transform.0;
        let mut out = Vec::with_capacity(self.data.len());
        for row in 0..self.height {
            for col in 0..self.width {
                let value = self.data[row * self.width + col];
                if self.is_no_data(value) {
                    continue;
                }
                let (fc, fr) = (col as f64 + 0.5, row as f64 + 0.5);
                let x = c[0] + fc * c[1] + fr * c[2];
                let y = c[3] + fc * c[4] + fr * c[5];
                out.push((x, y, value));
            }
        }
        out
    }

    fn is_no_data(&self, value: f64) -> bool {
        !value.is_finite() || self.no_data.is_some_and(|nd| (value - nd).abs() < f64::EPSILON)
    }
}

impl ElevationSampler for RasterGrid {
    fn elevation(&self, x: f64, y: f64) -> Option<f64> {
        let (col, row) = self.transform.pixel(x, y);
        let col = usize::try_from(col).ok().filter(|&c| c < self.width)?;
        let row = usize::try_from(row).ok().filter(|&r| r < self.height)?;
        let value = self.data[row * self.width + col];
        (!self.is_no_data(value)).then_some(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> RasterGrid {
        // 3x2 cells of size 10, top-left at (0, 20)
        RasterGrid::new(
            GeoTransform::north_up(0.0, 20.0, 10.0),
            3,
            2,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, -9999.0],
        )
        .unwrap()
        .with_no_data(-9999.0)
    }

    #[test]
    fn samples_containing_cell() {
        let g = grid();
        assert_eq!(g.elevation(5.0, 15.0), Some(1.0));
        assert_eq!(g.elevation(25.0, 15.0), Some(3.0));
        assert_eq!(g.elevation(15.0, 5.0), Some(5.0));
    }

    #[test]
    fn out_of_bounds_and_no_data_are_none() {
        let g = grid();
        assert_eq!(g.elevation(-1.0, 15.0), None);
        assert_eq!(g.elevation(5.0, 25.0), None);
        assert_eq!(g.elevation(25.0, 5.0), None);
    }

    #[test]
    fn wrong_data_length_is_rejected() {
        assert!(RasterGrid::new(GeoTransform::north_up(0.0, 0.0, 1.0), 2, 2, vec![0.0; 3]).is_none());
    }

    #[test]
    fn cell_centres_skip_no_data() {
        let centres = grid().cell_centres();
        assert_eq!(centres.len(), 5);
        assert_eq!(centres[0], (5.0, 15.0, 1.0));
    }

    #[test]
    fn closures_are_samplers() {
        let flat = |_x: f64, _y: f64| Some(12.5);
        assert_eq!(flat.elevation(3.0, 4.0), Some(12.5));
    }
}
