use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TriangulationError};
use crate::math::Point3;

/// Turns a point set with constraint segments into triangles.
///
/// Implementations triangulate in plan; elevations are carried through
/// untouched. Returned triangles index into `points` and wind
/// counter-clockwise seen from above.
pub trait Triangulator {
    /// Triangulates `points`, keeping every segment `[a, b]` as a triangle edge
    /// where the implementation can.
    ///
    /// # Errors
    ///
    /// Returns a [`TriangulationError`] if the input cannot be triangulated.
    fn triangulate(&self, points: &[Point3], segments: &[[usize; 2]]) -> Result<Vec<[usize; 3]>>;
}

/// Constrained Delaunay triangulation on `spade`.
///
/// Points sharing a planar position collapse to the first of them. A segment
/// that would cross an already inserted constraint is dropped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedDelaunay;

impl Triangulator for ConstrainedDelaunay {
    fn triangulate(&self, points: &[Point3], segments: &[[usize; 2]]) -> Result<Vec<[usize; 3]>> {
        if points.len() < 3 {
            return Err(TriangulationError::TooFewPoints(points.len()).into());
        }

        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
        let mut handles = Vec::with_capacity(points.len());
        let mut first_point: HashMap<usize, usize> = HashMap::new();
        for (index, p) in points.iter().enumerate() {
            let h = cdt
                .insert(SpadePoint2::new(p.x, p.y))
                .map_err(|e: InsertionError| TriangulationError::PointRejected {
                    index,
                    reason: e.to_string(),
                })?;
            first_point.entry(h.index()).or_insert(index);
            handles.push(h);
        }

        let mut rejected = 0usize;
        for &[from, to] in segments {
            let (Some(&a), Some(&b)) = (handles.get(from), handles.get(to)) else {
                return Err(TriangulationError::SegmentOutOfRange { from, to }.into());
            };
            if a == b {
                continue;
            }
            if cdt.can_add_constraint(a, b) {
                cdt.add_constraint(a, b);
            } else {
                rejected += 1;
            }
        }
        if rejected > 0 {
            tracing::warn!(rejected, "constraint segments crossing other constraints were dropped");
        }

        let mut triangles = Vec::with_capacity(cdt.num_inner_faces());
        for face in cdt.inner_faces() {
            let mut tri = [0usize; 3];
            for (slot, vh) in tri.iter_mut().zip(face.vertices()) {
                let idx = vh.fix().index();
                let Some(&point) = first_point.get(&idx) else {
                    return Err(TriangulationError::PointRejected {
                        index: idx,
                        reason: "vertex created by the triangulation".to_owned(),
                    }
                    .into());
                };
                *slot = point;
            }
            triangles.push(tri);
        }
        Ok(triangles)
    }
}
