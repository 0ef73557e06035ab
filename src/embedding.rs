// Voice-similarity embeddings
// The extractor itself is an external collaborator (a model behind a trait);
// this module carries the vector math used to compare and aggregate its
// output.

use anyhow::Result;

/// Extracts a fixed-length voice embedding from an audio clip. Cosine
/// similarity between two embeddings approximates speaker similarity.
///
/// Implementations wrap whatever inference runtime the pipeline loads; this
/// crate never depends on one directly.
pub trait EmbeddingExtractor {
    fn embed(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;
}

/// Calculate cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Normalize a vector to unit length in place. Zero vectors are left alone.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Average several embeddings into one representative vector and re-normalize.
/// Returns `None` when the input is empty or the vectors disagree on length.
pub fn mean_embedding(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.first()?;
    let dim = first.len();
    if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
        return None;
    }

    let count = embeddings.len() as f32;
    let mut mean = vec![0.0f32; dim];
    for embedding in embeddings {
        for (m, x) in mean.iter_mut().zip(embedding.iter()) {
            *m += x / count;
        }
    }
    normalize(&mut mean);
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Same vector should have similarity 1.0
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.001);

        // Orthogonal vectors should have similarity 0.0
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.001);

        // Opposite vectors should have similarity -1.0
        let c = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &c) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_mean_embedding_renormalizes() {
        let embeddings = vec![vec![2.0, 0.0], vec![0.0, 2.0]];
        let mean = mean_embedding(&embeddings).unwrap();
        let norm: f32 = mean.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((mean[0] - mean[1]).abs() < 1e-6);
    }

    #[test]
    fn test_mean_embedding_empty() {
        assert!(mean_embedding(&[]).is_none());
        assert!(mean_embedding(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
