use std::collections::HashMap;

use crate::math::{round_vertical, PlanarKey};
use crate::model::Surface;

/// Position key of a pool vertex; records are compared by position since
/// the pool never shares them between surfaces.
type PositionKey = (PlanarKey, i64);

/// Checks that a shell is a closed 2-manifold.
///
/// Every directed boundary edge must be matched by exactly one edge running
/// the other way, with vertices compared by their rounded position. Works on
/// a live [`VertexPool`](crate::model::VertexPool) slice or a finished
/// document's `vertices`.
pub struct IsWatertight<'a> {
    shell: &'a [Surface],
}

impl<'a> IsWatertight<'a> {
    /// Creates a new `IsWatertight` query.
    #[must_use]
    pub fn new(shell: &'a [Surface]) -> Self {
        Self { shell }
    }

    /// Executes the check, returning `true` if the shell is closed.
    #[must_use]
    pub fn execute(&self, vertices: &[[f64; 3]]) -> bool {
        self.open_edges(vertices) == 0
    }

    /// Number of directed edges without exactly one partner. Indices missing
    /// from `vertices` count as open.
    #[must_use]
    pub fn open_edges(&self, vertices: &[[f64; 3]]) -> usize {
        let mut directed: HashMap<(PositionKey, PositionKey), usize> = HashMap::new();
        let mut missing = 0;
        for lp in self.shell.iter().flat_map(Surface::loops) {
            let n = lp.len();
            for j in 0..n {
                match (vertices.get(lp[j]), vertices.get(lp[(j + 1) % n])) {
                    (Some(a), Some(b)) => {
                        *directed.entry((position(a), position(b))).or_insert(0) += 1;
                    }
                    _ => missing += 1,
                }
            }
        }
        let unmatched: usize = directed
            .iter()
            .filter(|&(&(a, b), &count)| count != 1 || directed.get(&(b, a)) != Some(&1))
            .map(|(_, &count)| count)
            .sum();
        unmatched + missing
    }
}

#[allow(clippy::cast_possible_truncation)]
fn position(&[x, y, z]: &[f64; 3]) -> PositionKey {
    (PlanarKey::new(x, y), (round_vertical(z) * 100.0).round() as i64)
}
