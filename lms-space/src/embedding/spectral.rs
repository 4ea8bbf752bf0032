//! Spectral embedding over an RBF-weighted neighbor graph
//!
//! Spectral embedding has no exact out-of-sample map. New rows are placed at
//! the affinity-weighted mean of their nearest training rows' coordinates.

use nalgebra::{DMatrix, DVector};

use super::linalg::{flip_signs, nearest, pairwise_distances, row_values, sorted_symmetric_eigen};
use super::{EmbeddingError, Projection};

/// Minimum number of fit rows (trivial eigenvector plus three)
pub const SPECTRAL_MIN_ROWS: usize = 4;

const MIN_DEGREE: f64 = 1e-300;

/// Fitted spectral embedding
#[derive(Debug, Clone)]
pub struct Spectral {
    n_neighbors: usize,
    gamma: f64,
    training: DMatrix<f64>,
    embedding: DMatrix<f64>,
}

impl Spectral {
    pub fn fit(
        x: &DMatrix<f64>,
        n_neighbors: usize,
        n_components: usize,
    ) -> Result<Self, EmbeddingError> {
        let (n, d) = x.shape();
        if n_neighbors == 0 || n_neighbors >= n {
            return Err(EmbeddingError::InvalidHyperparameter(format!(
                "n_neighbors must be in [1, {}), got {}",
                n, n_neighbors
            )));
        }
        let min_rows = SPECTRAL_MIN_ROWS.max(n_components + 1);
        if n < min_rows {
            return Err(EmbeddingError::InsufficientData(format!(
                "spectral embedding needs at least {} rows, got {}",
                min_rows, n
            )));
        }

        let gamma = 1.0 / d.max(1) as f64;
        let distances = pairwise_distances(x, x);

        let mut affinity = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in nearest(&row_values(&distances, i), n_neighbors, Some(i)) {
                let w = (-gamma * distances[(i, j)].powi(2)).exp();
                affinity[(i, j)] = w;
                affinity[(j, i)] = w;
            }
        }

        let inv_sqrt_degree = DVector::from_iterator(
            n,
            affinity.row_iter().map(|r| {
                let degree = r.sum();
                if degree > MIN_DEGREE {
                    1.0 / degree.sqrt()
                } else {
                    0.0
                }
            }),
        );
        let normalized = DMatrix::from_fn(n, n, |i, j| {
            inv_sqrt_degree[i] * affinity[(i, j)] * inv_sqrt_degree[j]
        });

        let (values, vectors) = sorted_symmetric_eigen(normalized);
        // column 0 is the trivial eigenvector
        let mut embedding = DMatrix::from_fn(n, n_components, |i, c| {
            vectors[(i, c + 1)] * inv_sqrt_degree[i]
        });
        flip_signs(&mut embedding);

        tracing::debug!(
            rows = n,
            n_neighbors,
            gamma,
            eigenvalues = ?&values.as_slice()[..n_components + 1],
            "Spectral embedding fitted"
        );

        Ok(Self {
            n_neighbors,
            gamma,
            training: x.clone(),
            embedding,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }
}

impl Projection for Spectral {
    fn embedding(&self) -> &DMatrix<f64> {
        &self.embedding
    }

    fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, EmbeddingError> {
        if x.ncols() != self.training.ncols() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.training.ncols(),
                actual: x.ncols(),
            });
        }

        let distances = pairwise_distances(x, &self.training);
        let mut out = DMatrix::zeros(x.nrows(), self.embedding.ncols());
        for p in 0..x.nrows() {
            let row = row_values(&distances, p);
            let hops = nearest(&row, self.n_neighbors, None);
            let weights: Vec<f64> = hops
                .iter()
                .map(|&h| (-self.gamma * row[h].powi(2)).exp())
                .collect();
            let total: f64 = weights.iter().sum();

            for (&h, &w) in hops.iter().zip(weights.iter()) {
                // far from everything: fall back to an unweighted mean
                let share = if total > MIN_DEGREE {
                    w / total
                } else {
                    1.0 / hops.len() as f64
                };
                for c in 0..self.embedding.ncols() {
                    out[(p, c)] += share * self.embedding[(h, c)];
                }
            }
        }
        Ok(out)
    }
}
