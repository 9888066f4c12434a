use hashbrown::HashMap;
use rayon::prelude::*;

use crate::interactions::{InteractionStore, StoreError};
use crate::io::{ItemId, Rating, UserId};
use crate::recommend::{rank_top_n, ItemScore};
use crate::swing::SwingGraph;

/// Exhaustive variant: every candidate is scored as the rating-weighted sum
/// of its swing association to the reference items.
pub fn score_candidates(
    swing: &SwingGraph,
    candidates: &[ItemId],
    reference_items: &[(ItemId, Rating)],
    how_many: usize,
) -> Vec<ItemScore> {
    let scores: Vec<ItemScore> = candidates
        .par_iter()
        .map(|&candidate_id| {
            let interest: f64 = reference_items
                .iter()
                .map(|&(reference_id, rating)| swing.score(candidate_id, reference_id) * rating)
                .sum();
            ItemScore::new(candidate_id, interest)
        })
        .collect();
    rank_top_n(scores, how_many)
}

/// Bounded-retrieval variant: instead of scoring the whole candidate set,
/// each reference item retrieves its `top_k` swing neighbors (minus the
/// items the user already watched), weighted by the reference rating.
/// Contributions for the same item across reference lists are summed before
/// the final sort, so an item is recommended at most once.
pub fn retrieve(
    store: &InteractionStore,
    swing: &SwingGraph,
    target_user_id: UserId,
    n_retrieve: usize,
    n_recent: usize,
    top_k: usize,
) -> Result<Vec<ItemScore>, StoreError> {
    let reference_items = store.recent_items(target_user_id, n_recent)?;
    let watched_items = &store.user_profile(target_user_id)?.items;

    let mut merged: HashMap<ItemId, f64> = HashMap::new();
    for &(reference_id, rating) in &reference_items {
        for neighbor in swing.top_neighbors(reference_id, top_k, watched_items) {
            *merged.entry(neighbor.id).or_insert(0.0) += rating * neighbor.score;
        }
    }

    let scores: Vec<ItemScore> = merged
        .into_iter()
        .map(|(item_id, score)| ItemScore::new(item_id, score))
        .collect();
    Ok(rank_top_n(scores, n_retrieve))
}
