use async_trait::async_trait;
use rig::embeddings::embedding::EmbeddingModel;

use crate::error::AgentError;

/// Object-safe seam over an embedding model so the cache store can be driven
/// by a deterministic fake under test.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding dimensionality of the underlying model.
    fn ndims(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f64>, AgentError>;
}

/// Adapter from any rig `EmbeddingModel` to the `Embedder` seam.
pub struct RigEmbedder<E: EmbeddingModel> {
    model: E,
}

impl<E: EmbeddingModel> RigEmbedder<E> {
    pub fn new(model: E) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<E: EmbeddingModel> Embedder for RigEmbedder<E> {
    fn ndims(&self) -> usize {
        self.model.ndims()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>, AgentError> {
        let embedding = self
            .model
            .embed_text(text)
            .await
            .map_err(|e| AgentError::Model(format!("embedding request failed: {e}")))?;
        Ok(embedding.vec)
    }
}

/// Cosine similarity between two embedding vectors. Zero-magnitude or
/// mismatched inputs score 0.0 rather than erroring.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::cosine_similarity;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.3, -1.2, 4.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
