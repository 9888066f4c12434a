use std::cmp::Ordering;

use rayon::prelude::*;

use crate::interactions::{InteractionStore, StoreError};
use crate::io::{ItemId, UserId};
use crate::recommend::{rank_top_n, ItemScore};
use crate::similarity::SimilarityMetric;

/// Ranks all other users by similarity to the target and keeps the best
/// `how_many`, descending by similarity with ascending-user-id tie-break.
pub fn top_similar_users(
    store: &InteractionStore,
    target_user_id: UserId,
    how_many: usize,
    metric: SimilarityMetric,
) -> Result<Vec<(UserId, f64)>, StoreError> {
    let target_profile = store.user_profile(target_user_id)?;

    let other_user_ids: Vec<UserId> = store
        .user_ids()
        .into_iter()
        .filter(|&user_id| user_id != target_user_id)
        .collect();

    let mut scored_users: Vec<(UserId, f64)> = other_user_ids
        .par_iter()
        .map(|&user_id| {
            let other_profile = &store.user_profiles[&user_id];
            (user_id, metric.between_users(target_profile, other_profile))
        })
        .collect();

    scored_users.sort_unstable_by(|(user_a, sim_a), (user_b, sim_b)| {
        sim_b
            .partial_cmp(sim_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| user_a.cmp(user_b))
    });
    scored_users.truncate(how_many);
    Ok(scored_users)
}

/// Similarity-weighted aggregation of the top users' ratings per candidate,
/// ranked and truncated to `how_many`.
pub fn score_candidates(
    store: &InteractionStore,
    candidates: &[ItemId],
    similar_users: &[(UserId, f64)],
    max_rating: f64,
    how_many: usize,
) -> Vec<ItemScore> {
    let scores: Vec<ItemScore> = candidates
        .par_iter()
        .map(|&candidate_id| {
            let interest = predicted_interest(store, candidate_id, similar_users, max_rating);
            ItemScore::new(candidate_id, interest)
        })
        .collect();
    rank_top_n(scores, how_many)
}

// Smoothed prediction: the similarity-weighted mean of the ratings of the
// top users who watched the candidate, scaled by
// ln(watched + beta) / ln(n + beta) with beta = n/2. The adjustment
// compresses the penalty for a low watcher count, so niche items are
// neither suppressed to nothing nor inflated past broadly-watched ones.
fn predicted_interest(
    store: &InteractionStore,
    candidate_id: ItemId,
    similar_users: &[(UserId, f64)],
    max_rating: f64,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut similarity_sum = 0.0;
    let mut watched_cnt = 0_usize;

    for &(user_id, similarity) in similar_users {
        let profile = &store.user_profiles[&user_id];
        if let Some(&rating) = profile.ratings.get(&candidate_id) {
            weighted_sum += similarity * (rating / max_rating);
            similarity_sum += similarity;
            watched_cnt += 1;
        }
    }

    if watched_cnt == 0 || similarity_sum == 0.0 {
        return 0.0;
    }

    let qty_users = similar_users.len() as f64;
    let beta = 0.5 * qty_users;
    let adjustment = (watched_cnt as f64 + beta).ln() / (qty_users + beta).ln();
    weighted_sum / similarity_sum * adjustment
}

#[cfg(test)]
mod user_based_test {
    use float_cmp::approx_eq;

    use crate::io::Interaction;

    use super::*;

    fn store() -> InteractionStore {
        InteractionStore::from_interactions(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(1, 2, 3.0),
            Interaction::new(2, 1, 4.0),
            Interaction::new(2, 3, 5.0),
            Interaction::new(3, 4, 2.0),
        ])
    }

    #[test]
    fn most_similar_user_ranks_first() {
        let store = store();
        // user 2 shares item 1 with the target, user 3 shares nothing
        let similar = top_similar_users(&store, 1, 10, SimilarityMetric::SetOverlap).unwrap();
        assert_eq!(2, similar.len());
        assert_eq!(2, similar[0].0);
        assert!(approx_eq!(f64, 0.5, similar[0].1, ulps = 2));
        assert_eq!((3, 0.0), similar[1]);
    }

    #[test]
    fn top_users_exclude_the_target_and_respect_the_bound() {
        let store = store();
        let similar = top_similar_users(&store, 1, 1, SimilarityMetric::SetOverlap).unwrap();
        assert_eq!(1, similar.len());
        assert!(similar.iter().all(|&(user_id, _)| user_id != 1));
    }

    #[test]
    fn equally_similar_users_order_by_id() {
        let store = InteractionStore::from_interactions(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(5, 1, 4.0),
            Interaction::new(2, 1, 3.0),
        ]);
        let similar = top_similar_users(&store, 1, 10, SimilarityMetric::SetOverlap).unwrap();
        assert_eq!(vec![2, 5], similar.iter().map(|&(id, _)| id).collect::<Vec<_>>());
    }

    #[test]
    fn unwatched_candidate_scores_zero() {
        let store = store();
        // the single most similar user (2) never rated item 4
        let similar = top_similar_users(&store, 1, 1, SimilarityMetric::SetOverlap).unwrap();
        let scored = score_candidates(&store, &[4], &similar, 5.0, 10);
        assert_eq!(1, scored.len());
        assert_eq!(4, scored[0].id);
        assert_eq!(0.0, scored[0].score);
    }

    #[test]
    fn fully_watched_candidate_gets_the_plain_weighted_mean() {
        // single similar user with similarity 0.5 who rated the candidate
        // 5.0: watched == n, the adjustment factor is exactly 1
        let store = store();
        let similar = vec![(2_u32, 0.5)];
        let scored = score_candidates(&store, &[3], &similar, 5.0, 10);
        assert!(approx_eq!(f64, 1.0, scored[0].score, ulps = 2));
    }

    #[test]
    fn partially_watched_candidate_is_compressed_not_zeroed() {
        let store = InteractionStore::from_interactions(vec![
            Interaction::new(1, 1, 5.0),
            Interaction::new(2, 1, 5.0),
            Interaction::new(2, 2, 5.0),
            Interaction::new(3, 1, 5.0),
        ]);
        let similar = top_similar_users(&store, 1, 2, SimilarityMetric::SetOverlap).unwrap();
        let scored = score_candidates(&store, &[2], &similar, 5.0, 10);
        // one of two similar users watched item 2: ln(1+1)/ln(2+1)
        let expected = 2.0_f64.ln() / 3.0_f64.ln();
        assert!(approx_eq!(f64, expected, scored[0].score, ulps = 2));
    }

    #[test]
    fn output_is_ranked_and_bounded() {
        let store = store();
        let similar = top_similar_users(&store, 1, 10, SimilarityMetric::SetOverlap).unwrap();
        let scored = score_candidates(&store, &[3, 4], &similar, 5.0, 1);
        assert_eq!(1, scored.len());
        assert_eq!(3, scored[0].id);
    }
}
