use ndarray::{Array1, Array2, ArrayView1};

use crate::error::RecommendError;

/// Embedding layer weights with every row scaled to unit length
///
/// Row `i` belongs to encoded index `i` of the matching encoding table. Because
/// rows are unit vectors, a plain dot product is the cosine similarity.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    name: &'static str,
    weights: Array2<f32>,
}

impl EmbeddingMatrix {
    /// Builds a matrix from raw (un-normalized) rows
    pub fn from_rows(name: &'static str, rows: Vec<Vec<f32>>) -> Result<Self, RecommendError> {
        let n_rows = rows.len();
        let dim = rows.first().map(Vec::len).unwrap_or(0);

        let mut flat = Vec::with_capacity(n_rows * dim);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(RecommendError::inconsistent(
                    name,
                    format!("row {} has {} columns, expected {}", index, row.len(), dim),
                ));
            }
            flat.extend(row);
        }

        let weights = Array2::from_shape_vec((n_rows, dim), flat)
            .map_err(|e| RecommendError::inconsistent(name, e.to_string()))?;

        Self::from_array(name, weights)
    }

    /// L2-normalizes each row of an existing weight array
    pub fn from_array(name: &'static str, mut weights: Array2<f32>) -> Result<Self, RecommendError> {
        for (index, mut row) in weights.rows_mut().into_iter().enumerate() {
            let norm = row.dot(&row).sqrt();
            if !norm.is_finite() || norm == 0.0 {
                return Err(RecommendError::Computation(format!(
                    "{} embedding row {} has norm {}",
                    name, index, norm
                )));
            }
            row.mapv_inplace(|v| v / norm);
        }

        Ok(Self { name, weights })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of rows (encoded indices)
    pub fn len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.nrows() == 0
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.len()).then(|| self.weights.row(index))
    }

    /// Cosine similarity of row `index` against every row, including itself
    pub fn similarities(&self, index: usize) -> Result<Array1<f32>, RecommendError> {
        let query = self.row(index).ok_or_else(|| {
            RecommendError::inconsistent(
                self.name,
                format!("index {} outside matrix with {} rows", index, self.len()),
            )
        })?;

        Ok(self.weights.dot(&query))
    }
}
