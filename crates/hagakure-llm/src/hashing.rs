//! Deterministic offline embedder based on feature hashing
//!
//! Each lower-cased word and each boundary-marked character trigram of a
//! word is hashed with BLAKE3 into one of `dimensions` buckets with a
//! pseudo-random sign. The output is stable across processes and builds, so
//! vectors persisted by one run compare correctly against queries in the
//! next. It captures lexical overlap only, not meaning.

use crate::ports::Embedder;
use async_trait::async_trait;
use hagakure_core::error::{HagakureError, Result};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    name: String,
}

impl HashingEmbedder {
    /// Create a new hashing embedder producing `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(HagakureError::ConfigInvalid {
                key: "embedding_dim".to_string(),
                reason: "hashing embedder needs at least one dimension".to_string(),
            });
        }
        Ok(Self {
            dimensions,
            name: format!("hash-{}", dimensions),
        })
    }

    /// Embed a single text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let tokens = tokenize(text);

        if tokens.is_empty() {
            // Punctuation-only input still gets a stable, non-zero vector
            self.add_feature(&mut vector, "raw", text.trim(), WORD_WEIGHT);
            return vector;
        }

        for token in &tokens {
            self.add_feature(&mut vector, "w", token, WORD_WEIGHT);

            let marked: Vec<char> = format!("#{}#", token).chars().collect();
            for window in marked.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, "t", &trigram, TRIGRAM_WEIGHT);
            }
        }

        vector
    }

    fn add_feature(&self, vector: &mut [f32], namespace: &str, feature: &str, weight: f32) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b"\x00");
        hasher.update(feature.as_bytes());
        let digest = hasher.finalize();
        let bytes = digest.as_bytes();

        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(&bytes[..8]);
        let bucket = (u64::from_le_bytes(index_bytes) % self.dimensions as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

        vector[bucket] += sign * weight;
    }
}

/// Lower-case alphanumeric word tokens
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
