//! Feature standardization against the reference population

use nalgebra::{DMatrix, DVector};

use super::EmbeddingError;
use crate::models::{TrackRecord, FEATURE_COUNT};

/// Deviation below which a feature is treated as constant
const MIN_STD: f64 = 1e-12;

/// Stack feature vectors into an `n × FEATURE_COUNT` matrix (row order preserved)
pub fn feature_matrix<'a>(rows: impl IntoIterator<Item = &'a TrackRecord>) -> DMatrix<f64> {
    let rows: Vec<&TrackRecord> = rows.into_iter().collect();
    DMatrix::from_row_iterator(
        rows.len(),
        FEATURE_COUNT,
        rows.iter().flat_map(|r| r.features.iter().copied()),
    )
}

/// Per-feature mean and population standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStats {
    pub mean: DVector<f64>,
    pub std: DVector<f64>,
}

impl FeatureStats {
    /// Compute statistics over reference rows only.
    ///
    /// Constant features get a deviation of 1 so they standardize to 0.
    pub fn from_reference(reference: &DMatrix<f64>) -> Result<Self, EmbeddingError> {
        let n = reference.nrows();
        if n == 0 {
            return Err(EmbeddingError::InsufficientData(
                "reference population is empty".to_string(),
            ));
        }

        let n = n as f64;
        let mean = DVector::from_iterator(
            reference.ncols(),
            reference.column_iter().map(|c| c.sum() / n),
        );
        let std = DVector::from_iterator(
            reference.ncols(),
            reference.column_iter().zip(mean.iter()).map(|(c, m)| {
                let var = c.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
                let s = var.sqrt();
                if s > MIN_STD {
                    s
                } else {
                    1.0
                }
            }),
        );

        Ok(Self { mean, std })
    }

    /// `(x - mean) / std` for every row
    pub fn apply(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, EmbeddingError> {
        if x.ncols() != self.mean.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.mean[j]) / self.std[j]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            4,
            3,
            &[
                1.0, 10.0, 5.0, //
                2.0, 20.0, 5.0, //
                3.0, 35.0, 5.0, //
                6.0, 15.0, 5.0,
            ],
        )
    }

    #[test]
    fn test_standardized_reference_has_zero_mean_unit_std() {
        let x = sample();
        let stats = FeatureStats::from_reference(&x).unwrap();
        let z = stats.apply(&x).unwrap();

        for j in 0..2 {
            let col = z.column(j);
            let mean = col.sum() / 4.0;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12, "mean {}", mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-12, "std {}", var.sqrt());
        }
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let x = sample();
        let stats = FeatureStats::from_reference(&x).unwrap();
        assert_eq!(stats.std[2], 1.0);
        let z = stats.apply(&x).unwrap();
        assert!(z.column(2).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_new_rows_reuse_reference_statistics() {
        let x = sample();
        let stats = FeatureStats::from_reference(&x).unwrap();
        let outlier = DMatrix::from_row_slice(1, 3, &[100.0, 100.0, 100.0]);

        let z = stats.apply(&outlier).unwrap();
        let expected = (100.0 - stats.mean[0]) / stats.std[0];
        assert!((z[(0, 0)] - expected).abs() < 1e-12);

        // statistics are not affected by rows they standardize
        assert_eq!(FeatureStats::from_reference(&x).unwrap(), stats);
    }

    #[test]
    fn test_empty_reference_rejected() {
        let empty = DMatrix::<f64>::zeros(0, 3);
        assert!(matches!(
            FeatureStats::from_reference(&empty),
            Err(EmbeddingError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let stats = FeatureStats::from_reference(&sample()).unwrap();
        let wrong = DMatrix::<f64>::zeros(1, 2);
        assert!(matches!(
            stats.apply(&wrong),
            Err(EmbeddingError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }
}
