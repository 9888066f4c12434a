use std::sync::Arc;

use crate::recommend::Recommender;

pub mod index_resource;
pub mod recommend_resource;

pub struct SharedHandlesAndConfig {
    pub recommender: Arc<Recommender>,
    pub num_items_to_recommend: usize,
    pub recent_items_window: usize,
    pub swing_retrieval_k: usize,
    pub qty_workers: usize,
}
