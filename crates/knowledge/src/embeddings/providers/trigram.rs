//! Deterministic trigram-hash embedding provider.
//!
//! Produces content-dependent vectors from character trigrams and word
//! frequencies. Not semantically meaningful like a real embedding model, but
//! deterministic and cheap, which makes it the right tool for tests and
//! offline development.

use crate::embeddings::provider::EmbeddingProvider;
use mathtutor_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "what", "how",
];

/// Deterministic embedding provider for tests and offline use.
#[derive(Debug)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    /// Create a new trigram embedder with the specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_into(&self, token: &str, seed: u64, weight: f32, embedding: &mut [f32]) {
        let hash = token
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        embedding[(hash as usize) % self.dimensions] += weight;
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Whole-word signal plus character trigrams for partial overlap
            self.hash_into(word, 7, *freq as f32, &mut embedding);

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                self.hash_into(&trigram, 37, (*freq as f32).sqrt(), &mut embedding);
            }
        }

        // Normalize to unit length so cosine similarity is a dot product
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.generate(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_dimensions_and_normalization() {
        let embedder = TrigramEmbedder::new(384);
        let embedding = embedder.embed("solve the quadratic equation").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = TrigramEmbedder::new(384);
        let a = embedder.embed("derivative of x squared").await.unwrap();
        let b = embedder.embed("derivative of x squared").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let embedder = TrigramEmbedder::new(384);
        let a = embedder.embed("pythagorean theorem").await.unwrap();
        let b = embedder.embed("binomial distribution").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_similar_texts_closer_than_unrelated() {
        let embedder = TrigramEmbedder::new(384);
        let q = embedder.embed("solve quadratic equation roots").await.unwrap();
        let close = embedder
            .embed("quadratic equation roots formula discriminant")
            .await
            .unwrap();
        let far = embedder.embed("banana smoothie recipe").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&q, &close) > dot(&q, &far));
    }

    #[tokio::test]
    async fn test_empty_text_zero_vector() {
        let embedder = TrigramEmbedder::new(384);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
