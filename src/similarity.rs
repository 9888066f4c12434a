use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use serde_derive::Deserialize;

use crate::interactions::{ItemProfile, UserProfile};

/// Similarity formula used when comparing two users or two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Counting cosine over the sets of associated ids.
    SetOverlap,
    /// Cosine over the rating vectors restricted to the shared dimensions.
    RatingCosine,
}

impl SimilarityMetric {
    pub fn between_users(&self, a: &UserProfile, b: &UserProfile) -> f64 {
        match self {
            SimilarityMetric::SetOverlap => set_overlap_cosine(&a.items, &b.items),
            SimilarityMetric::RatingCosine => rating_cosine(&a.ratings, &b.ratings),
        }
    }

    pub fn between_items(&self, a: &ItemProfile, b: &ItemProfile) -> f64 {
        match self {
            SimilarityMetric::SetOverlap => set_overlap_cosine(&a.users, &b.users),
            SimilarityMetric::RatingCosine => rating_cosine(&a.ratings, &b.ratings),
        }
    }
}

/// Cosine over unweighted indicator vectors: `|A ∩ B| / sqrt(|A| * |B|)`.
/// Returns 0.0 when the intersection is empty, values lie in (0, 1]
/// otherwise.
pub fn set_overlap_cosine<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let common = small.iter().filter(|id| large.contains(*id)).count();
    if common == 0 {
        return 0.0;
    }
    common as f64 / ((a.len() * b.len()) as f64).sqrt()
}

/// Standard cosine similarity over the intersection of the two key sets.
/// Returns 0.0 when the intersection is empty or either restricted vector
/// has zero norm, never NaN.
pub fn rating_cosine<K: Eq + Hash + Ord + Copy>(a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut common: Vec<K> = small
        .keys()
        .filter(|key| large.contains_key(*key))
        .copied()
        .collect();
    if common.is_empty() {
        return 0.0;
    }
    // fixed accumulation order keeps the result identical across runs
    common.sort_unstable();

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for key in &common {
        let rating_a = a[key];
        let rating_b = b[key];
        dot_product += rating_a * rating_b;
        norm_a += rating_a * rating_a;
        norm_b += rating_b * rating_b;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}
