use std::error::Error;

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use rand::Rng;
use thiserror::Error as ThisError;

use crate::io;
use crate::io::{Interaction, ItemId, Rating, UserId};

/// Upper bound on the size of a per-user evidence window (recent or sampled).
pub const MAX_EVIDENCE_WINDOW: usize = 20;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown user id: {0}")]
    UnknownUser(UserId),
    #[error("unknown item id: {0}")]
    UnknownItem(ItemId),
}

/// Derived per-user view: item set, last-rating-per-item, and the raw
/// interaction history in log order (duplicates included).
#[derive(Debug, Default)]
pub struct UserProfile {
    pub items: HashSet<ItemId>,
    pub ratings: HashMap<ItemId, Rating>,
    pub history: Vec<(ItemId, Rating)>,
}

/// Derived per-item view: user set and last-rating-per-user.
#[derive(Debug, Default)]
pub struct ItemProfile {
    pub users: HashSet<UserId>,
    pub ratings: HashMap<UserId, Rating>,
}

/// In-memory snapshot of the interaction log with per-user and per-item
/// inverted indices. Built once, read-only afterwards.
pub struct InteractionStore {
    pub(crate) user_profiles: HashMap<UserId, UserProfile>,
    pub(crate) item_profiles: HashMap<ItemId, ItemProfile>,
    qty_interactions: usize,
}

impl InteractionStore {
    pub fn from_csv_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let interactions = io::read_interactions(path)?;
        Ok(Self::from_interactions(interactions))
    }

    pub fn from_interactions(interactions: Vec<Interaction>) -> Self {
        let qty_interactions = interactions.len();
        let mut user_profiles: HashMap<UserId, UserProfile> = HashMap::new();
        let mut item_profiles: HashMap<ItemId, ItemProfile> = HashMap::new();

        for interaction in interactions {
            let user_profile = user_profiles.entry(interaction.user_id).or_default();
            user_profile.items.insert(interaction.item_id);
            // insert overwrites: the last rating in log order wins
            user_profile
                .ratings
                .insert(interaction.item_id, interaction.rating);
            user_profile
                .history
                .push((interaction.item_id, interaction.rating));

            let item_profile = item_profiles.entry(interaction.item_id).or_default();
            item_profile.users.insert(interaction.user_id);
            item_profile
                .ratings
                .insert(interaction.user_id, interaction.rating);
        }

        InteractionStore {
            user_profiles,
            item_profiles,
            qty_interactions,
        }
    }

    pub fn qty_interactions(&self) -> usize {
        self.qty_interactions
    }

    pub fn qty_users(&self) -> usize {
        self.user_profiles.len()
    }

    pub fn qty_items(&self) -> usize {
        self.item_profiles.len()
    }

    /// All distinct user ids, ascending.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.user_profiles.keys().copied().sorted().collect_vec()
    }

    /// All distinct item ids, ascending.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.item_profiles.keys().copied().sorted().collect_vec()
    }

    pub fn user_profile(&self, user_id: UserId) -> Result<&UserProfile, StoreError> {
        self.user_profiles
            .get(&user_id)
            .ok_or(StoreError::UnknownUser(user_id))
    }

    pub fn item_profile(&self, item_id: ItemId) -> Result<&ItemProfile, StoreError> {
        self.item_profiles
            .get(&item_id)
            .ok_or(StoreError::UnknownItem(item_id))
    }

    /// The user's `n` most recent interactions, folded last-rating-wins and
    /// keeping first-appearance order within the window. `n` is capped at
    /// [`MAX_EVIDENCE_WINDOW`].
    pub fn recent_items(
        &self,
        user_id: UserId,
        n: usize,
    ) -> Result<Vec<(ItemId, Rating)>, StoreError> {
        let profile = self.user_profile(user_id)?;
        let n = n.min(MAX_EVIDENCE_WINDOW);
        let start = profile.history.len().saturating_sub(n);
        Ok(fold_window(&profile.history[start..]))
    }

    /// `n` interactions sampled without replacement from the user's history,
    /// folded like [`recent_items`](Self::recent_items). The sample size is
    /// clamped to the history length; `n` is capped at
    /// [`MAX_EVIDENCE_WINDOW`].
    pub fn sampled_items<R: Rng>(
        &self,
        user_id: UserId,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<(ItemId, Rating)>, StoreError> {
        let profile = self.user_profile(user_id)?;
        let n = n.min(MAX_EVIDENCE_WINDOW).min(profile.history.len());
        let rows: Vec<(ItemId, Rating)> = rand::seq::index::sample(rng, profile.history.len(), n)
            .iter()
            .map(|row| profile.history[row])
            .collect();
        Ok(fold_window(&rows))
    }
}

// Collapse duplicate items within a window: the last rating wins, the output
// keeps the order of first appearance.
fn fold_window(rows: &[(ItemId, Rating)]) -> Vec<(ItemId, Rating)> {
    let mut order: Vec<ItemId> = Vec::with_capacity(rows.len());
    let mut ratings: HashMap<ItemId, Rating> = HashMap::with_capacity(rows.len());
    for &(item_id, rating) in rows {
        if ratings.insert(item_id, rating).is_none() {
            order.push(item_id);
        }
    }
    order
        .into_iter()
        .map(|item_id| (item_id, ratings[&item_id]))
        .collect()
}
