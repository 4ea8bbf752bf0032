//! Isomap: kernel PCA on graph geodesic distances
//!
//! Out-of-sample rows are placed by extending the geodesics through their
//! `k` nearest training rows and centering with the training kernel
//! statistics. Training rows map back onto their fitted coordinates; other
//! rows are an approximation of where a refit would put them.

use nalgebra::{DMatrix, DVector};

use super::linalg::{flip_signs, nearest, pairwise_distances, row_values, sorted_symmetric_eigen};
use super::{EmbeddingError, Projection};

const MIN_EIGENVALUE: f64 = 1e-12;

/// Fitted Isomap model
#[derive(Debug, Clone)]
pub struct Isomap {
    n_neighbors: usize,
    training: DMatrix<f64>,
    /// All-pairs shortest paths over the neighbor graph
    geodesics: DMatrix<f64>,
    /// Column means of the uncentered training kernel
    kernel_col_means: DVector<f64>,
    kernel_mean: f64,
    /// Top eigenvectors of the centered kernel, `n × k`
    alphas: DMatrix<f64>,
    lambdas: DVector<f64>,
    embedding: DMatrix<f64>,
}

impl Isomap {
    pub fn fit(
        x: &DMatrix<f64>,
        n_neighbors: usize,
        n_components: usize,
    ) -> Result<Self, EmbeddingError> {
        let n = x.nrows();
        if n_neighbors == 0 || n_neighbors >= n {
            return Err(EmbeddingError::InvalidHyperparameter(format!(
                "n_neighbors must be in [1, {}), got {}",
                n, n_neighbors
            )));
        }
        if n < n_components {
            return Err(EmbeddingError::InsufficientData(format!(
                "Isomap needs at least {} rows, got {}",
                n_components, n
            )));
        }

        let distances = pairwise_distances(x, x);
        let mut graph = neighbor_graph(&distances, n_neighbors);
        let joined = connect_components(&mut graph, &distances);
        if joined > 0 {
            tracing::debug!(joined, "Joined disconnected neighbor graph components");
        }
        let geodesics = floyd_warshall(graph);

        let kernel = geodesics.map(|g| -0.5 * g * g);
        let kernel_col_means = DVector::from_iterator(n, kernel.column_iter().map(|c| c.mean()));
        let kernel_mean = kernel_col_means.mean();
        let centered = DMatrix::from_fn(n, n, |i, j| {
            kernel[(i, j)] - kernel_col_means[i] - kernel_col_means[j] + kernel_mean
        });

        let (values, vectors) = sorted_symmetric_eigen(centered);
        let mut alphas = vectors.columns(0, n_components).into_owned();
        flip_signs(&mut alphas);
        let lambdas = DVector::from_iterator(
            n_components,
            values.iter().take(n_components).map(|v| v.max(0.0)),
        );

        let mut embedding = alphas.clone();
        for (mut column, lambda) in embedding.column_iter_mut().zip(lambdas.iter()) {
            column *= lambda.sqrt();
        }

        tracing::debug!(
            rows = n,
            n_neighbors,
            eigenvalues = ?lambdas.as_slice(),
            "Isomap fitted"
        );

        Ok(Self {
            n_neighbors,
            training: x.clone(),
            geodesics,
            kernel_col_means,
            kernel_mean,
            alphas,
            lambdas,
            embedding,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }
}

impl Projection for Isomap {
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

        let n = self.training.nrows();
        let distances = pairwise_distances(x, &self.training);

        // geodesic from each new row to every training row, routed through
        // its nearest training rows
        let mut kernel = DMatrix::zeros(x.nrows(), n);
        for p in 0..x.nrows() {
            let row = row_values(&distances, p);
            let hops = nearest(&row, self.n_neighbors, None);
            for t in 0..n {
                let g = hops
                    .iter()
                    .map(|&h| row[h] + self.geodesics[(h, t)])
                    .fold(f64::INFINITY, f64::min);
                kernel[(p, t)] = -0.5 * g * g;
            }
        }

        let mut out = DMatrix::zeros(x.nrows(), self.alphas.ncols());
        for p in 0..x.nrows() {
            let row_mean = kernel.row(p).mean();
            let centered = DVector::from_fn(n, |t, _| {
                kernel[(p, t)] - self.kernel_col_means[t] - row_mean + self.kernel_mean
            });
            for c in 0..self.alphas.ncols() {
                let lambda = self.lambdas[c];
                if lambda > MIN_EIGENVALUE {
                    out[(p, c)] = self.alphas.column(c).dot(&centered) / lambda.sqrt();
                }
            }
        }
        Ok(out)
    }
}

/// Symmetric k-nearest-neighbor graph; missing edges are infinite
fn neighbor_graph(distances: &DMatrix<f64>, k: usize) -> DMatrix<f64> {
    let n = distances.nrows();
    let mut graph = DMatrix::from_element(n, n, f64::INFINITY);
    for i in 0..n {
        graph[(i, i)] = 0.0;
        for j in nearest(&row_values(distances, i), k, Some(i)) {
            graph[(i, j)] = distances[(i, j)];
            graph[(j, i)] = distances[(i, j)];
        }
    }
    graph
}

/// Component label of every node
fn component_labels(graph: &DMatrix<f64>) -> Vec<usize> {
    let n = graph.nrows();
    let mut labels = vec![usize::MAX; n];
    let mut next = 0;
    for start in 0..n {
        if labels[start] != usize::MAX {
            continue;
        }
        let mut stack = vec![start];
        labels[start] = next;
        while let Some(i) = stack.pop() {
            for j in 0..n {
                if labels[j] == usize::MAX && graph[(i, j)].is_finite() {
                    labels[j] = next;
                    stack.push(j);
                }
            }
        }
        next += 1;
    }
    labels
}

/// Join components by their closest cross pair until the graph is connected.
///
/// Returns the number of edges added.
fn connect_components(graph: &mut DMatrix<f64>, distances: &DMatrix<f64>) -> usize {
    let n = graph.nrows();
    let mut added = 0;
    loop {
        let labels = component_labels(graph);
        if labels.iter().all(|&l| l == 0) {
            return added;
        }

        let mut best: Option<(usize, usize)> = None;
        for i in (0..n).filter(|&i| labels[i] == 0) {
            for j in (0..n).filter(|&j| labels[j] != 0) {
                let closer = best.map_or(true, |(bi, bj)| distances[(i, j)] < distances[(bi, bj)]);
                if closer {
                    best = Some((i, j));
                }
            }
        }

        match best {
            Some((i, j)) => {
                graph[(i, j)] = distances[(i, j)];
                graph[(j, i)] = distances[(i, j)];
                added += 1;
            }
            None => return added,
        }
    }
}

fn floyd_warshall(mut graph: DMatrix<f64>) -> DMatrix<f64> {
    let n = graph.nrows();
    for via in 0..n {
        for i in 0..n {
            let to_via = graph[(i, via)];
            if !to_via.is_finite() {
                continue;
            }
            for j in 0..n {
                let candidate = to_via + graph[(via, j)];
                if candidate < graph[(i, j)] {
                    graph[(i, j)] = candidate;
                }
            }
        }
    }
    graph
}
