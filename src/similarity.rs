use serde::Serialize;

use crate::record::{FeatureVector, Record};

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult<R> {
    pub candidate: R,
    pub score: f64,
}

/// Rank `candidates` by cosine similarity to `subject`, best first.
///
/// Candidates named `exclude_identity` and candidates missing any feature are
/// skipped; there is no imputation here. Ties keep candidate order.
pub fn rank<R>(
    subject: &FeatureVector,
    candidates: &[R],
    exclude_identity: Option<&str>,
    top_n: usize,
) -> Vec<SimilarityResult<R>>
where
    R: Record + Clone,
{
    if subject.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| exclude_identity.is_none() || c.identity() != exclude_identity)
        .filter_map(|(idx, c)| {
            let vector = FeatureVector::extract(c.record(), &subject.features)?;
            Some((idx, cosine_similarity(&subject.values, &vector.values)))
        })
        .collect();

    // sort_by is stable, so equal scores keep candidate order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(top_n)
        .map(|(idx, score)| SimilarityResult {
            candidate: candidates[idx].clone(),
            score,
        })
        .collect()
}

/// Cosine of the angle between `a` and `b`; `0` when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.7, 0.7]) - 0.707_106_78).abs() < 1e-6);
        assert!((cosine_similarity(&[2.0, 4.0], &[1.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tiny_nonzero_vectors_still_score() {
        let score = cosine_similarity(&[1e-17, 0.0], &[3e-17, 0.0]);
        assert!((score - 1.0).abs() < 1e-12);
        let orthogonal = cosine_similarity(&[1e-17, 0.0], &[0.0, 1e-17]);
        assert_eq!(orthogonal, 0.0);
    }
}
