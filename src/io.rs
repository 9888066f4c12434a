use std::error::Error;

use serde_derive::Deserialize;

pub type UserId = u32;
pub type ItemId = u64;
pub type Rating = f64;

/// One observed (user, item, rating) event. The position of a record in the
/// log is its recency: the last record for a (user, item) pair is
/// authoritative on duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: Rating,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, rating: Rating) -> Self {
        Interaction {
            user_id,
            item_id,
            rating,
        }
    }
}

/// Reads the interaction log from a csv file with a `user_id,item_id,rating`
/// header. Row order is preserved, it defines the recency order.
pub fn read_interactions(path: &str) -> Result<Vec<Interaction>, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_path(path)?;

    let mut interactions: Vec<Interaction> = Vec::new();
    for result in reader.deserialize() {
        let interaction: Interaction = result?;
        interactions.push(interaction);
    }
    Ok(interactions)
}
