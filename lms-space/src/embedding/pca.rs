//! Linear PCA with optional whitening

use nalgebra::{DMatrix, DVector};

use super::linalg::{flip_signs, sorted_symmetric_eigen};
use super::{EmbeddingError, Projection};

/// Variance below which a component is left unwhitened
const MIN_VARIANCE: f64 = 1e-12;

/// Minimum number of fit rows
pub const PCA_MIN_ROWS: usize = 3;

/// Fitted PCA model
#[derive(Debug, Clone)]
pub struct Pca {
    mean: DVector<f64>,
    /// `d × k`, one principal axis per column
    components: DMatrix<f64>,
    /// Per-component variance (ddof = 1)
    explained_variance: DVector<f64>,
    whiten: bool,
    embedding: DMatrix<f64>,
}

impl Pca {
    /// Fit `n_components` principal axes on the rows of `x`
    pub fn fit(x: &DMatrix<f64>, n_components: usize, whiten: bool) -> Result<Self, EmbeddingError> {
        let (n, d) = x.shape();
        if n < PCA_MIN_ROWS.max(n_components) {
            return Err(EmbeddingError::InsufficientData(format!(
                "PCA needs at least {} rows, got {}",
                PCA_MIN_ROWS.max(n_components),
                n
            )));
        }
        if n_components > d {
            return Err(EmbeddingError::InvalidHyperparameter(format!(
                "{} components requested from {} features",
                n_components, d
            )));
        }

        let mean = DVector::from_iterator(d, x.column_iter().map(|c| c.mean()));
        let centered = center(x, &mean);
        let covariance = (centered.transpose() * &centered) / (n as f64 - 1.0);

        let (values, vectors) = sorted_symmetric_eigen(covariance);
        let mut components = vectors.columns(0, n_components).into_owned();
        flip_signs(&mut components);
        let explained_variance =
            DVector::from_iterator(n_components, values.iter().take(n_components).map(|v| v.max(0.0)));

        let mut pca = Self {
            mean,
            components,
            explained_variance,
            whiten,
            embedding: DMatrix::zeros(0, n_components),
        };
        pca.embedding = pca.project(x);

        tracing::debug!(
            rows = n,
            components = n_components,
            whiten,
            variance = ?pca.explained_variance.as_slice(),
            "PCA fitted"
        );
        Ok(pca)
    }

    pub fn explained_variance(&self) -> &DVector<f64> {
        &self.explained_variance
    }

    fn project(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut y = center(x, &self.mean) * &self.components;
        if self.whiten {
            for (mut column, var) in y.column_iter_mut().zip(self.explained_variance.iter()) {
                let scale = var.sqrt();
                if scale > MIN_VARIANCE {
                    column /= scale;
                }
            }
        }
        y
    }
}

impl Projection for Pca {
    fn embedding(&self) -> &DMatrix<f64> {
        &self.embedding
    }

    fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, EmbeddingError> {
        if x.ncols() != self.mean.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        Ok(self.project(x))
    }
}

fn center(x: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] - mean[j])
}
