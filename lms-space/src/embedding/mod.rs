//! Normalization & embedding engine
//!
//! Feature vectors are standardized against the reference population and
//! projected to three dimensions by one of three methods. All methods share
//! the [`Projection`] interface; [`ProjectedSpace`] applies the fit policy
//! and keys coordinates by track id.

mod isomap;
mod linalg;
mod pca;
pub mod space;
mod spectral;
pub mod standardize;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use isomap::Isomap;
pub use pca::Pca;
pub use space::{Coordinates, ProjectedSpace};
pub use spectral::Spectral;
pub use standardize::{feature_matrix, FeatureStats};

/// Output dimensionality of every method
pub const EMBEDDING_DIMS: usize = 3;

/// Neighbor count used when a graph method is selected without one
pub const DEFAULT_NEIGHBORS: usize = 5;

/// Embedding engine errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingError {
    #[error("{0}")]
    InvalidHyperparameter(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("numeric failure: {0}")]
    Numeric(String),
}

/// Projection method and its hyperparameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbeddingMethod {
    #[default]
    Pca,
    Isomap { n_neighbors: usize },
    Spectral { n_neighbors: usize },
}

impl EmbeddingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingMethod::Pca => "pca",
            EmbeddingMethod::Isomap { .. } => "isomap",
            EmbeddingMethod::Spectral { .. } => "spectral",
        }
    }

    /// Neighbor count for graph methods
    pub fn n_neighbors(&self) -> Option<usize> {
        match self {
            EmbeddingMethod::Pca => None,
            EmbeddingMethod::Isomap { n_neighbors } | EmbeddingMethod::Spectral { n_neighbors } => {
                Some(*n_neighbors)
            }
        }
    }

    /// Build a method from its name and optional neighbor count
    pub fn from_name(name: &str, n_neighbors: Option<usize>) -> Result<Self, EmbeddingError> {
        let n_neighbors = n_neighbors.unwrap_or(DEFAULT_NEIGHBORS);
        match name.to_ascii_lowercase().as_str() {
            "pca" => Ok(EmbeddingMethod::Pca),
            "isomap" => Ok(EmbeddingMethod::Isomap { n_neighbors }),
            "spectral" => Ok(EmbeddingMethod::Spectral { n_neighbors }),
            other => Err(EmbeddingError::InvalidHyperparameter(format!(
                "unknown embedding method '{}'",
                other
            ))),
        }
    }

    /// Check hyperparameters against the fit population before any numeric work
    pub fn validate(&self, population: usize) -> Result<(), EmbeddingError> {
        if let Some(k) = self.n_neighbors() {
            if k < 1 || k >= population {
                return Err(EmbeddingError::InvalidHyperparameter(format!(
                    "neighbor count {} out of range: must be at least 1 and below the population size {}",
                    k, population
                )));
            }
        }
        Ok(())
    }
}

/// Which rows an embedding is fitted on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitPolicy {
    /// Refit on every row after each addition
    Global,
    /// Fit on the reference population; annotated rows are transformed only
    #[default]
    ReferenceOnly,
}

/// Method plus fit policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub method: EmbeddingMethod,
    pub fit_policy: FitPolicy,
}

/// Fitted model that maps standardized rows to coordinates
pub trait Projection {
    /// Coordinates of the fit rows, `n × EMBEDDING_DIMS`
    fn embedding(&self) -> &DMatrix<f64>;

    /// Coordinates for rows not seen during fitting
    fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, EmbeddingError>;
}

/// Closed set of fitted models
#[derive(Debug, Clone)]
pub enum EmbeddingModel {
    Pca(Pca),
    Isomap(Isomap),
    Spectral(Spectral),
}

impl EmbeddingModel {
    /// Fit a model on standardized rows
    pub fn fit(method: &EmbeddingMethod, x: &DMatrix<f64>) -> Result<Self, EmbeddingError> {
        method.validate(x.nrows())?;

        let model = match *method {
            EmbeddingMethod::Pca => EmbeddingModel::Pca(Pca::fit(x, EMBEDDING_DIMS, true)?),
            EmbeddingMethod::Isomap { n_neighbors } => {
                EmbeddingModel::Isomap(Isomap::fit(x, n_neighbors, EMBEDDING_DIMS)?)
            }
            EmbeddingMethod::Spectral { n_neighbors } => {
                EmbeddingModel::Spectral(Spectral::fit(x, n_neighbors, EMBEDDING_DIMS)?)
            }
        };

        if model.embedding().iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::Numeric(format!(
                "{} produced non-finite coordinates",
                method.name()
            )));
        }
        Ok(model)
    }

    /// Fit and return the fitted coordinates alongside the model
    pub fn fit_transform(
        method: &EmbeddingMethod,
        x: &DMatrix<f64>,
    ) -> Result<(Self, DMatrix<f64>), EmbeddingError> {
        let model = Self::fit(method, x)?;
        let coords = model.embedding().clone();
        Ok((model, coords))
    }

    pub fn method(&self) -> EmbeddingMethod {
        match self {
            EmbeddingModel::Pca(_) => EmbeddingMethod::Pca,
            EmbeddingModel::Isomap(m) => EmbeddingMethod::Isomap {
                n_neighbors: m.n_neighbors(),
            },
            EmbeddingModel::Spectral(m) => EmbeddingMethod::Spectral {
                n_neighbors: m.n_neighbors(),
            },
        }
    }

    fn inner(&self) -> &dyn Projection {
        match self {
            EmbeddingModel::Pca(m) => m,
            EmbeddingModel::Isomap(m) => m,
            EmbeddingModel::Spectral(m) => m,
        }
    }
}

impl Projection for EmbeddingModel {
    fn embedding(&self) -> &DMatrix<f64> {
        self.inner().embedding()
    }

    fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, EmbeddingError> {
        let y = self.inner().transform(x)?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::Numeric(format!(
                "{} transform produced non-finite coordinates",
                self.method().name()
            )));
        }
        Ok(y)
    }
}
