//! Small dense linear-algebra helpers shared by the projection methods

use nalgebra::{DMatrix, DVector};

/// Euclidean distances between every row of `a` and every row of `b`
pub(crate) fn pairwise_distances(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), b.nrows(), |i, j| (a.row(i) - b.row(j)).norm())
}

/// Indices of the `k` smallest entries of `distances`, nearest first.
///
/// `exclude` removes one index (the query point itself during fitting).
/// Ties break on the lower index so results are deterministic.
pub(crate) fn nearest(distances: &[f64], k: usize, exclude: Option<usize>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..distances.len())
        .filter(|&j| Some(j) != exclude)
        .collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

/// Row `i` of a matrix as an owned vector of values
pub(crate) fn row_values(m: &DMatrix<f64>, i: usize) -> Vec<f64> {
    m.row(i).iter().copied().collect()
}

/// Symmetric eigen-decomposition with eigenpairs sorted by descending eigenvalue
pub(crate) fn sorted_symmetric_eigen(m: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eigen = m.symmetric_eigen();
    let n = eigen.eigenvalues.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = DVector::from_iterator(n, order.iter().map(|&i| eigen.eigenvalues[i]));
    let vectors = DMatrix::from_fn(eigen.eigenvectors.nrows(), n, |r, c| {
        eigen.eigenvectors[(r, order[c])]
    });
    (values, vectors)
}

/// Flip each column so its largest-magnitude entry is positive
pub(crate) fn flip_signs(vectors: &mut DMatrix<f64>) {
    for mut column in vectors.column_iter_mut() {
        let pivot = column
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            column.neg_mut();
        }
    }
}
