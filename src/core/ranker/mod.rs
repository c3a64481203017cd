//! # Ranker Module
//!
//! Scores every unordered pair of embeddings and ranks images two ways:
//!
//! - **Pair ranking**: mean squared error between the two vectors of each
//!   pair, sorted ascending — the most similar (near-duplicate) pairs come
//!   first.
//! - **Aggregate dissimilarity**: per image, the sum of its pairwise
//!   scores against every other image — outliers accumulate the highest
//!   totals.
//!
//! ## Scaling ceiling
//! Enumeration is all-pairs: O(N²·W) time and N·(N-1)/2 stored entries.
//! That is deliberate and fine for hundreds to low thousands of images;
//! this module is not the place for approximate-nearest-neighbor indexing.

use crate::core::embedder::EmbeddingMatrix;
use serde::{Deserialize, Serialize};

/// Unordered pair of image indices, canonically a < b
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub a: usize,
    pub b: usize,
}

/// One pair with its distance score (lower = more similar)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub pair: Pair,
    /// Mean squared error across embedding dimensions
    pub score: f64,
}

/// Score all N·(N-1)/2 pairs and sort ascending by score.
///
/// Pairs are enumerated lexicographically by (a, b); the sort is stable,
/// so equal scores keep that enumeration order.
pub fn rank_pairs(matrix: &EmbeddingMatrix) -> Vec<ScoredPair> {
    let n = matrix.len();
    let mut results = Vec::with_capacity(n * n.saturating_sub(1) / 2);

    for a in 0..n {
        for b in (a + 1)..n {
            results.push(ScoredPair {
                pair: Pair { a, b },
                score: mse(matrix.row(a), matrix.row(b)),
            });
        }
    }

    results.sort_by(|x, y| x.score.total_cmp(&y.score));
    results
}

/// Mean squared error between two equal-length vectors, accumulated in f64
fn mse(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    sum / a.len() as f64
}

/// Sum each image's pairwise scores over the full result set.
///
/// Raw sums, not means: with a different number of images the totals are
/// on a different scale, so they are not comparable across datasets. That
/// matches the reference behavior and is kept as a documented property.
pub fn aggregate_scores(results: &[ScoredPair], n: usize) -> Vec<f64> {
    let mut scores = vec![0.0; n];
    for entry in results {
        scores[entry.pair.a] += entry.score;
        scores[entry.pair.b] += entry.score;
    }
    scores
}

/// Image indices sorted most-dissimilar first.
///
/// Stable descending sort: ties keep ascending index order.
pub fn garbage_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&i, &j| scores[j].total_cmp(&scores[i]));
    order
}
