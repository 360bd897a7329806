//! Embedding vector utilities

use hagakure_core::error::{HagakureError, Result};

/// Euclidean length of a vector
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Validate an embedder output and scale it to unit length
///
/// Every vector that enters the store, and every query vector compared
/// against it, goes through this so distances stay comparable.
///
/// # Arguments
/// * `vector` - Raw embedder output
/// * `expected_dims` - Dimensionality the store was created with
pub fn normalize_embedding(mut vector: Vec<f32>, expected_dims: usize) -> Result<Vec<f32>> {
    if vector.len() != expected_dims {
        return Err(HagakureError::DimensionMismatch {
            expected: expected_dims,
            actual: vector.len(),
        });
    }

    if let Some(position) = vector.iter().position(|x| !x.is_finite()) {
        return Err(HagakureError::MalformedEmbedding {
            reason: format!("component {} is not a finite number", position),
        });
    }

    let norm = l2_norm(&vector);
    if norm == 0.0 || !norm.is_finite() {
        return Err(HagakureError::MalformedEmbedding {
            reason: "vector has zero length and cannot be normalized".to_string(),
        });
    }

    for x in vector.iter_mut() {
        *x /= norm;
    }

    Ok(vector)
}
