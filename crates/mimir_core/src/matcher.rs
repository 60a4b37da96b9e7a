//! Similarity ranking of corpus questions against an utterance.

use crate::vectorizer::VectorModel;

/// Cosine similarity between two equal-length vectors.
/// A zero-magnitude operand yields 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Index of the corpus question most similar to `utterance`.
///
/// Scans in corpus order with a strictly-greater comparison, so the
/// first-seen maximum wins on exact ties. Returns `None` when the best
/// score is exactly zero (no shared vocabulary) or the corpus is empty.
pub fn best_match(model: &VectorModel, utterance: &str) -> Option<usize> {
    let query = model.vocabulary().vectorize(utterance);

    let mut best: Option<(usize, f32)> = None;
    for (index, vector) in model.vectors().iter().enumerate() {
        let score = cosine_similarity(&query, vector);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }

    match best {
        Some((index, score)) if score > 0.0 => Some(index),
        _ => None,
    }
}
