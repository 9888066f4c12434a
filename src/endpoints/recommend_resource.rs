use actix_web::{get, web, HttpResponse};
use serde_derive::Deserialize;

use crate::endpoints::SharedHandlesAndConfig;
use crate::recommend::ItemPool;
use crate::similarity::SimilarityMetric;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Strategy {
    UserBased,
    ItemBased,
    Swing,
    SwingRetrieval,
}

#[derive(Debug, Deserialize)]
pub struct V1QueryParams {
    user_id: u32,
    strategy: Strategy,
    metric: Option<SimilarityMetric>,
    how_many: Option<usize>,
}

// Sarabande's main endpoint. All strategies share the output shape: a json
// list of (item_id, score) pairs, descending by score, at most `how_many`
// entries. An unknown user id is a 404, not an empty list.
#[get("/v1/recommend")]
pub async fn v1_recommend(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<V1QueryParams>,
) -> HttpResponse {
    let recommender = data.recommender.as_ref();
    let how_many = query.how_many.unwrap_or(data.num_items_to_recommend);
    let metric = query.metric.unwrap_or(SimilarityMetric::SetOverlap);

    let result = match query.strategy {
        Strategy::UserBased => recommender.recommend_user_based(query.user_id, how_many, metric),
        Strategy::ItemBased => {
            recommender.recommend_item_based(query.user_id, how_many, metric, ItemPool::Recent)
        }
        Strategy::Swing => {
            recommender.recommend_swing(query.user_id, how_many, data.recent_items_window)
        }
        Strategy::SwingRetrieval => recommender.recommend_swing_retrieval(
            query.user_id,
            how_many,
            data.recent_items_window,
            data.swing_retrieval_k,
        ),
    };

    match result {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(error) => HttpResponse::NotFound().body(error.to_string()),
    }
}
