use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;

use crate::interactions::{InteractionStore, StoreError};
use crate::io::{ItemId, Rating, UserId};
use crate::recommend::{rank_top_n, ItemScore};
use crate::similarity::SimilarityMetric;

/// How the per-user evidence pool is drawn from the interaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPool {
    /// The most recent interactions.
    Recent,
    /// A seeded sample without replacement over the whole history.
    Sampled { seed: u64 },
}

/// The reference items (with their ratings) the strategy weighs candidates
/// against. Window size follows the requested pool size, capped by the
/// store's evidence-window bound.
pub fn evidence_pool(
    store: &InteractionStore,
    target_user_id: UserId,
    n: usize,
    pool: ItemPool,
) -> Result<Vec<(ItemId, Rating)>, StoreError> {
    match pool {
        ItemPool::Recent => store.recent_items(target_user_id, n),
        ItemPool::Sampled { seed } => {
            let mut rng = Pcg64::seed_from_u64(seed);
            store.sampled_items(target_user_id, n, &mut rng)
        }
    }
}

/// Predicted interest per candidate: similarity-weighted average of the
/// reference ratings, `sum(sim_k * rating_k) / sum(sim_k)`, 0.0 when the
/// similarity sum is zero.
pub fn score_candidates(
    store: &InteractionStore,
    candidates: &[ItemId],
    reference_items: &[(ItemId, Rating)],
    metric: SimilarityMetric,
    how_many: usize,
) -> Vec<ItemScore> {
    let scores: Vec<ItemScore> = candidates
        .par_iter()
        .map(|&candidate_id| {
            let candidate_profile = &store.item_profiles[&candidate_id];
            let mut weighted_sum = 0.0;
            let mut similarity_sum = 0.0;
            for &(reference_id, rating) in reference_items {
                let reference_profile = &store.item_profiles[&reference_id];
                let similarity = metric.between_items(candidate_profile, reference_profile);
                weighted_sum += similarity * rating;
                similarity_sum += similarity;
            }
            let interest = if similarity_sum == 0.0 {
                0.0
            } else {
                weighted_sum / similarity_sum
            };
            ItemScore::new(candidate_id, interest)
        })
        .collect();
    rank_top_n(scores, how_many)
}

#[cfg(test)]
mod item_based_test {
    use float_cmp::approx_eq;

    use crate::io::Interaction;

    use super::*;

    fn store() -> InteractionStore {
        InteractionStore::from_interactions(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 3, 5.0),
            Interaction::new(3, 2, 2.0),
            Interaction::new(3, 3, 4.0),
        ])
    }

    #[test]
    fn recent_pool_reflects_the_latest_interactions() {
        let store = store();
        let pool = evidence_pool(&store, 1, 1, ItemPool::Recent).unwrap();
        assert_eq!(vec![(2, 3.0)], pool);
    }

    #[test]
    fn sampled_pool_is_reproducible() {
        let store = store();
        let pool = ItemPool::Sampled { seed: 7 };
        let sample_a = evidence_pool(&store, 1, 2, pool).unwrap();
        let sample_b = evidence_pool(&store, 1, 2, pool).unwrap();
        assert_eq!(sample_a, sample_b);
        assert_eq!(2, sample_a.len());
    }

    #[test]
    fn weighted_average_of_a_single_reference() {
        let store = store();
        // candidate 3 vs reference 2: users {2,3} vs {1,3}, common=1,
        // similarity 1/2; one reference, so the interest is its rating
        let scored = score_candidates(&store, &[3], &[(2, 3.0)], SimilarityMetric::SetOverlap, 10);
        assert!(approx_eq!(f64, 3.0, scored[0].score, ulps = 2));
    }

    #[test]
    fn zero_similarity_sum_scores_zero() {
        let store = InteractionStore::from_interactions(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(2, 2, 4.0),
        ]);
        // items 1 and 2 share no users
        let scored = score_candidates(&store, &[2], &[(1, 5.0)], SimilarityMetric::SetOverlap, 10);
        assert_eq!(0.0, scored[0].score);
    }

    #[test]
    fn interest_interpolates_between_reference_ratings() {
        let store = store();
        // candidate 1 against references 2 and 3, both with nonzero
        // similarity: the weighted average must stay within the rating range
        let scored = score_candidates(
            &store,
            &[1],
            &[(2, 3.0), (3, 5.0)],
            SimilarityMetric::SetOverlap,
            10,
        );
        assert!(scored[0].score >= 3.0 && scored[0].score <= 5.0);
    }

    #[test]
    fn rating_cosine_metric_is_accepted() {
        let store = store();
        let scored = score_candidates(
            &store,
            &[3],
            &[(2, 3.0)],
            SimilarityMetric::RatingCosine,
            10,
        );
        assert_eq!(3, scored[0].id);
        assert!(scored[0].score >= 0.0);
    }
}
