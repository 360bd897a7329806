//! Exact nearest-neighbor index over fixed-size vectors

use hagakure_core::error::{HagakureError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Brute-force index searched under squared Euclidean distance
///
/// Vectors are stored row-major in one flat buffer; the position of a row
/// is the id of the document it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatL2Index {
    dimensions: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index for `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, data: Vec::new() }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a vector, returning its position
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimensions {
            return Err(HagakureError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Vector stored at `position`
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimensions)?;
        self.data.get(start..start + self.dimensions)
    }

    /// Up to `k` nearest vectors to `query`, closest first
    ///
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimensions {
            return Err(HagakureError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| (position, squared_l2(query, row)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Check the buffer is a whole number of finite rows
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.dimensions == 0 {
            return Err("index dimensionality is zero".to_string());
        }
        if self.data.len() % self.dimensions != 0 {
            return Err(format!(
                "index buffer holds {} values, not a multiple of {} dimensions",
                self.data.len(),
                self.dimensions
            ));
        }
        if self.data.iter().any(|x| !x.is_finite()) {
            return Err("index contains non-finite values".to_string());
        }
        Ok(())
    }
}

/// Squared Euclidean distance between equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index_with(rows: &[[f32; 2]]) -> FlatL2Index {
        let mut index = FlatL2Index::new(2);
        for row in rows {
            index.add(row).unwrap();
        }
        index
    }

    #[test]
    fn test_add_returns_positions() {
        let mut index = FlatL2Index::new(2);
        assert_eq!(index.add(&[1.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0]).unwrap(), 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[0.0, 1.0][..]));
        assert_eq!(index.vector(2), None);
    }

    #[test]
    fn test_add_rejects_wrong_dimensions() {
        let mut index = FlatL2Index::new(3);
        assert!(index.add(&[1.0, 0.0]).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = index_with(&[[0.0, 1.0], [1.0, 0.0], [0.6, 0.8]]);
        let hits = index.search(&[1.0, 0.0], 3).unwrap();

        let order: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(hits[0].1.abs() < 1e-6);
        assert!((hits[2].1 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_clamps_k() {
        let index = index_with(&[[0.0, 1.0], [1.0, 0.0]]);
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = index_with(&[[0.0, 1.0], [0.0, -1.0], [0.0, 1.0]]);
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_detects_ragged_buffer() {
        let index = FlatL2Index { dimensions: 3, data: vec![0.0; 4] };
        assert!(index.validate().is_err());

        let index = FlatL2Index { dimensions: 0, data: Vec::new() };
        assert!(index.validate().is_err());
    }

    proptest! {
        #[test]
        fn proptest_search_distances_are_non_decreasing(
            rows in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..40),
            query in prop::collection::vec(-1.0f32..1.0, 4),
            k in 1usize..50,
        ) {
            let mut index = FlatL2Index::new(4);
            for row in &rows {
                index.add(row).unwrap();
            }

            let hits = index.search(&query, k).unwrap();
            prop_assert_eq!(hits.len(), k.min(rows.len()));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1);
                if pair[0].1 == pair[1].1 {
                    prop_assert!(pair[0].0 < pair[1].0);
                }
            }
        }
    }
}
