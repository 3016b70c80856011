//! Distance matrices over an ordered list of stops.
//!
//! Index 0 is always the route start; stop `k` of a request lives at index
//! `k + 1`. Distances are kilometers.

use rayon::prelude::*;

use crate::geo::{self, Coordinate};
use crate::traits::DistanceMatrixProvider;

/// Matrices at or above this size are filled row-parallel.
const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// A dense n×n distance matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a matrix from an explicit row-major grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a matrix from nested rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            data: rows.into_iter().flatten().collect(),
            size,
        })
    }

    /// Distance from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations, including the start.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.size..(from + 1) * self.size]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.size.max(1)).map(<[f64]>::to_vec).collect()
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.size).all(|i| {
            ((i + 1)..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i) == 0.0)
    }

    /// Sum of consecutive legs along `path`.
    pub fn path_length(&self, path: &[usize]) -> f64 {
        path.windows(2).map(|leg| self.get(leg[0], leg[1])).sum()
    }
}

/// Haversine-based matrix provider.
///
/// Every ordered pair goes through [`geo::distance_km`], so the diagonal is
/// zero because `distance(p, p)` is zero, not because it is special-cased.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Location count at which rows are computed in parallel.
    pub parallel_threshold: usize,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl HaversineMatrix {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    fn row_for(from: &Coordinate, locations: &[Coordinate]) -> Vec<f64> {
        locations
            .iter()
            .map(|to| geo::distance_km(from.lat, from.lng, to.lat, to.lng))
            .collect()
    }
}

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> DistanceMatrix {
        let n = locations.len();
        let data: Vec<f64> = if n >= self.parallel_threshold {
            locations
                .par_iter()
                .flat_map_iter(|from| Self::row_for(from, locations))
                .collect()
        } else {
            locations
                .iter()
                .flat_map(|from| Self::row_for(from, locations))
                .collect()
        };

        DistanceMatrix { data, size: n }
    }
}
