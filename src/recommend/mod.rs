use std::cmp::Ordering;

use itertools::Itertools;
use serde_derive::Serialize;

use crate::interactions::{InteractionStore, StoreError};
use crate::io::{ItemId, UserId};
use crate::similarity::SimilarityMetric;
use crate::swing::SwingGraph;

pub mod item_based;
pub mod swing_based;
pub mod user_based;

pub use item_based::ItemPool;

/// A scored recommendation candidate. The ordering is reversed on the score
/// (a smaller `ItemScore` is a better one) with an ascending-id tie-break,
/// so the order is total and rankings come out reproducible both from
/// `sort_unstable` and from bounded heaps.
#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct ItemScore {
    #[serde(rename = "item_id")]
    pub id: ItemId,
    pub score: f64,
}

impl ItemScore {
    pub fn new(id: ItemId, score: f64) -> Self {
        ItemScore { id, score }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score, ties by ascending item id
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Descending sort by score (ascending item id within ties), truncated to
/// `how_many`.
pub(crate) fn rank_top_n(mut scores: Vec<ItemScore>, how_many: usize) -> Vec<ItemScore> {
    scores.sort_unstable();
    scores.truncate(how_many);
    scores
}

/// Items eligible for recommendation to `target_user_id`: the symmetric
/// difference between the target's item set and the union of every other
/// user's item set, ascending. An item seen by the target and by nobody
/// else is therefore part of the candidate set.
pub fn candidate_items(
    store: &InteractionStore,
    target_user_id: UserId,
) -> Result<Vec<ItemId>, StoreError> {
    let target_items = &store.user_profile(target_user_id)?.items;
    let candidates = store
        .item_profiles
        .iter()
        .filter_map(|(&item_id, profile)| {
            let seen_by_target = target_items.contains(&item_id);
            let seen_by_others = profile.users.iter().any(|&user_id| user_id != target_user_id);
            if seen_by_target ^ seen_by_others {
                Some(item_id)
            } else {
                None
            }
        })
        .sorted()
        .collect_vec();
    Ok(candidates)
}

/// Wires the interaction store, the similarity engine and the swing graph
/// into the three recommendation strategies. The swing graph is built once
/// here and never mutated afterwards; every call computes its output fresh
/// from the store snapshot.
pub struct Recommender {
    store: InteractionStore,
    swing: SwingGraph,
    max_rating: f64,
}

impl Recommender {
    pub fn new(store: InteractionStore, swing_alpha: f64, max_rating: f64) -> Self {
        let swing = SwingGraph::build(&store, swing_alpha);
        Recommender {
            store,
            swing,
            max_rating,
        }
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }

    pub fn swing_graph(&self) -> &SwingGraph {
        &self.swing
    }

    /// User-CF: aggregate the ratings of the `how_many` most similar users
    /// over the candidate set, smoothed by the watched-count adjustment.
    pub fn recommend_user_based(
        &self,
        target_user_id: UserId,
        how_many: usize,
        metric: SimilarityMetric,
    ) -> Result<Vec<ItemScore>, StoreError> {
        let similar_users =
            user_based::top_similar_users(&self.store, target_user_id, how_many, metric)?;
        let candidates = candidate_items(&self.store, target_user_id)?;
        Ok(user_based::score_candidates(
            &self.store,
            &candidates,
            &similar_users,
            self.max_rating,
            how_many,
        ))
    }

    /// Item-CF: weighted-average similarity of each candidate to the items
    /// in the user's evidence pool.
    pub fn recommend_item_based(
        &self,
        target_user_id: UserId,
        how_many: usize,
        metric: SimilarityMetric,
        pool: ItemPool,
    ) -> Result<Vec<ItemScore>, StoreError> {
        let reference_items =
            item_based::evidence_pool(&self.store, target_user_id, how_many, pool)?;
        let candidates = candidate_items(&self.store, target_user_id)?;
        Ok(item_based::score_candidates(
            &self.store,
            &candidates,
            &reference_items,
            metric,
            how_many,
        ))
    }

    /// Swing: exhaustive candidate scoring against the user's `n_recent`
    /// most recent items.
    pub fn recommend_swing(
        &self,
        target_user_id: UserId,
        how_many: usize,
        n_recent: usize,
    ) -> Result<Vec<ItemScore>, StoreError> {
        let reference_items = self.store.recent_items(target_user_id, n_recent)?;
        let candidates = candidate_items(&self.store, target_user_id)?;
        Ok(swing_based::score_candidates(
            &self.swing,
            &candidates,
            &reference_items,
            how_many,
        ))
    }

    /// Swing with bounded per-trigger retrieval instead of exhaustive
    /// candidate scoring.
    pub fn recommend_swing_retrieval(
        &self,
        target_user_id: UserId,
        n_retrieve: usize,
        n_recent: usize,
        top_k: usize,
    ) -> Result<Vec<ItemScore>, StoreError> {
        swing_based::retrieve(
            &self.store,
            &self.swing,
            target_user_id,
            n_retrieve,
            n_recent,
            top_k,
        )
    }
}
