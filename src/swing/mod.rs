use std::time::Instant;

use dary_heap::OctonaryHeap;
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;

use crate::interactions::InteractionStore;
use crate::io::{ItemId, UserId};
use crate::recommend::ItemScore;

pub const DEFAULT_SWING_ALPHA: f64 = 1.0;

/// Item-to-item association index derived from shared-viewer user pairs.
/// Built eagerly over all items, read-only afterwards; an absent entry is
/// semantically zero association.
pub struct SwingGraph {
    scores: HashMap<ItemId, HashMap<ItemId, f64>>,
    alpha: f64,
}

impl SwingGraph {
    /// Builds the full graph, one independent accumulation per anchor item.
    /// Each anchor only reads the global profiles and writes its own score
    /// map, so anchors are processed in parallel.
    pub fn build(store: &InteractionStore, alpha: f64) -> Self {
        let start_time = Instant::now();
        let item_ids = store.item_ids();
        println!("computing swing scores for {} items", item_ids.len());

        let scores: HashMap<ItemId, HashMap<ItemId, f64>> = item_ids
            .par_iter()
            .map(|&anchor| (anchor, anchor_scores(store, anchor, alpha)))
            .collect();

        println!(
            "swing graph construction:{} micros",
            start_time.elapsed().as_micros()
        );

        SwingGraph { scores, alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn qty_items(&self) -> usize {
        self.scores.len()
    }

    /// Accumulated association between `item_id` and `other`, 0.0 when the
    /// pair never co-occurred.
    pub fn score(&self, item_id: ItemId, other: ItemId) -> f64 {
        self.scores
            .get(&item_id)
            .and_then(|neighbors| neighbors.get(&other))
            .copied()
            .unwrap_or(0.0)
    }

    /// The `k` strongest neighbors of `item_id` that are not in `exclude`,
    /// descending by score with ascending-id tie-break.
    pub fn top_neighbors(
        &self,
        item_id: ItemId,
        k: usize,
        exclude: &HashSet<ItemId>,
    ) -> Vec<ItemScore> {
        if k == 0 {
            return Vec::new();
        }
        let mut top_neighbors: OctonaryHeap<ItemScore> = OctonaryHeap::with_capacity(k);
        if let Some(neighbors) = self.scores.get(&item_id) {
            for (&other, &score) in neighbors {
                if exclude.contains(&other) {
                    continue;
                }
                let scored = ItemScore::new(other, score);
                if top_neighbors.len() < k {
                    top_neighbors.push(scored);
                } else {
                    let mut bottom = top_neighbors.peek_mut().unwrap();
                    if scored < *bottom {
                        *bottom = scored;
                    }
                }
            }
        }
        // popping yields the weakest neighbor first
        let mut neighbors_sorted: Vec<ItemScore> = Vec::with_capacity(top_neighbors.len());
        while let Some(scored) = top_neighbors.pop() {
            neighbors_sorted.push(scored);
        }
        neighbors_sorted.reverse();
        neighbors_sorted
    }
}

// Accumulates the association scores of a single anchor item. For every
// ordered pair (u, v) of distinct users in the anchor's pool, every item j
// shared by u and v (other than the anchor itself) receives
// w_u * w_v / (alpha + |I_u ∩ I_v|), where w_u = 1/sqrt(|I_u|).
fn anchor_scores(store: &InteractionStore, anchor: ItemId, alpha: f64) -> HashMap<ItemId, f64> {
    // the pool is iterated in sorted order: accumulation order, and thereby
    // the floating point result, stays identical across runs
    let mut user_pool: Vec<UserId> = store.item_profiles[&anchor].users.iter().copied().collect();
    user_pool.sort_unstable();

    let mut scores: HashMap<ItemId, f64> = HashMap::new();
    for &u in &user_pool {
        let items_u = &store.user_profiles[&u].items;
        let weight_u = 1.0 / (items_u.len() as f64).sqrt();

        for &v in &user_pool {
            if u == v {
                continue;
            }
            let items_v = &store.user_profiles[&v].items;
            let weight_v = 1.0 / (items_v.len() as f64).sqrt();

            let (small, large) = if items_u.len() <= items_v.len() {
                (items_u, items_v)
            } else {
                (items_v, items_u)
            };
            let mut shared: Vec<ItemId> = small
                .iter()
                .filter(|item_id| large.contains(*item_id))
                .copied()
                .collect();
            shared.sort_unstable();

            let overlap_penalty = 1.0 / (alpha + shared.len() as f64);
            for &item_j in &shared {
                if item_j == anchor {
                    continue;
                }
                *scores.entry(item_j).or_insert(0.0) += weight_u * weight_v * overlap_penalty;
            }
        }
    }
    scores
}

#[cfg(test)]
mod swing_graph_test {
    use float_cmp::approx_eq;

    use crate::io::Interaction;

    use super::*;

    fn store(interactions: Vec<Interaction>) -> InteractionStore {
        InteractionStore::from_interactions(interactions)
    }

    #[test]
    fn two_users_sharing_one_other_item() {
        // u1 and u2 both interacted with i1 and i2 and nothing else.
        // For anchor i1: ordered pairs (u1,u2) and (u2,u1), |I_u|=|I_v|=2,
        // |I_u ∩ I_v| = 2, so score[i2] = 2 * (1/sqrt(2))^2 * 1/(1+2) = 1/3.
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 2, 5.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);
        assert!(approx_eq!(f64, 1.0 / 3.0, graph.score(1, 2), ulps = 2));
    }

    #[test]
    fn stored_entries_are_symmetric() {
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(1, 3, 4.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 2, 5.0),
            Interaction::new(3, 2, 2.0),
            Interaction::new(3, 3, 4.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);
        assert!(approx_eq!(f64, graph.score(1, 2), graph.score(2, 1), ulps = 2));
        assert!(approx_eq!(f64, graph.score(2, 3), graph.score(3, 2), ulps = 2));
    }

    #[test]
    fn scores_are_non_negative_and_absent_pairs_are_zero() {
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 2, 5.0),
            Interaction::new(3, 9, 1.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);
        for &a in &[1, 2, 9] {
            for &b in &[1, 2, 9] {
                assert!(graph.score(a, b) >= 0.0);
            }
        }
        // item 9 shares no viewers with items 1 and 2
        assert_eq!(0.0, graph.score(1, 9));
        assert_eq!(0.0, graph.score(9, 1));
        // never observed at all
        assert_eq!(0.0, graph.score(1, 777));
    }

    #[test]
    fn a_single_viewer_produces_no_pairs() {
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);
        assert_eq!(0.0, graph.score(1, 2));
    }

    #[test]
    fn larger_overlap_is_penalized() {
        // u1/u2 share only items 1 and 2; u3/u4 share items 1, 3, 4, 5.
        // The pair with the smaller shared set contributes more per item.
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 2, 5.0),
            Interaction::new(3, 1, 5.0),
            Interaction::new(3, 3, 3.0),
            Interaction::new(3, 4, 3.0),
            Interaction::new(3, 5, 3.0),
            Interaction::new(4, 1, 4.0),
            Interaction::new(4, 3, 5.0),
            Interaction::new(4, 4, 3.0),
            Interaction::new(4, 5, 3.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);
        assert!(graph.score(1, 2) > graph.score(1, 3));
    }

    #[test]
    fn top_neighbors_bound_order_and_exclusion() {
        let store = store(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(1, 3, 4.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 2, 5.0),
            Interaction::new(2, 3, 2.0),
            Interaction::new(3, 1, 5.0),
            Interaction::new(3, 2, 1.0),
        ]);
        let graph = SwingGraph::build(&store, 1.0);

        let no_exclusions = HashSet::new();
        let neighbors = graph.top_neighbors(1, 10, &no_exclusions);
        assert!(neighbors.len() <= 10);
        for pair in neighbors.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        let top_one = graph.top_neighbors(1, 1, &no_exclusions);
        assert_eq!(1, top_one.len());
        assert_eq!(neighbors[0].id, top_one[0].id);

        let mut exclude = HashSet::new();
        exclude.insert(neighbors[0].id);
        let filtered = graph.top_neighbors(1, 10, &exclude);
        assert!(filtered.iter().all(|scored| scored.id != neighbors[0].id));

        assert!(graph.top_neighbors(1, 0, &no_exclusions).is_empty());
        assert!(graph.top_neighbors(777, 5, &no_exclusions).is_empty());
    }
}
