extern crate sarabande;

use anyhow::anyhow;
use indicatif::ProgressBar;
use num_format::{Locale, ToFormattedString};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use sarabande::interactions::InteractionStore;
use sarabande::io;
use sarabande::recommend::{ItemPool, Recommender};
use sarabande::similarity::SimilarityMetric;
use sarabande::stopwatch::Stopwatch;
use sarabande::swing::DEFAULT_SWING_ALPHA;

const MAX_RATING: f64 = 5.0;
const HOW_MANY: usize = 10;
const RECENT_WINDOW: usize = 10;
const RETRIEVAL_K: usize = 10;
const QTY_SAMPLED_USERS: usize = 500;

fn main() -> anyhow::Result<()> {
    // Times every strategy over a sample of users to compare the exhaustive
    // scorers against the bounded swing retrieval.
    let interactions_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Interaction log not specified!"))?;

    let interactions =
        io::read_interactions(&interactions_path).map_err(|error| anyhow!("{}", error))?;
    let store = InteractionStore::from_interactions(interactions);
    println!(
        "loaded {} interactions, {} users, {} items from {}",
        store.qty_interactions().to_formatted_string(&Locale::en),
        store.qty_users().to_formatted_string(&Locale::en),
        store.qty_items().to_formatted_string(&Locale::en),
        &interactions_path
    );

    let mut user_ids = store.user_ids();
    let mut rng = Pcg64::seed_from_u64(42);
    user_ids.shuffle(&mut rng);
    user_ids.truncate(QTY_SAMPLED_USERS);

    let recommender = Recommender::new(store, DEFAULT_SWING_ALPHA, MAX_RATING);

    let strategies: Vec<(&str, Box<dyn Fn(u32) -> usize + '_>)> = vec![
        (
            "user_based",
            Box::new(|user_id| {
                recommender
                    .recommend_user_based(user_id, HOW_MANY, SimilarityMetric::SetOverlap)
                    .map(|recommendations| recommendations.len())
                    .unwrap_or(0)
            }),
        ),
        (
            "item_based",
            Box::new(|user_id| {
                recommender
                    .recommend_item_based(
                        user_id,
                        HOW_MANY,
                        SimilarityMetric::SetOverlap,
                        ItemPool::Recent,
                    )
                    .map(|recommendations| recommendations.len())
                    .unwrap_or(0)
            }),
        ),
        (
            "swing",
            Box::new(|user_id| {
                recommender
                    .recommend_swing(user_id, HOW_MANY, RECENT_WINDOW)
                    .map(|recommendations| recommendations.len())
                    .unwrap_or(0)
            }),
        ),
        (
            "swing_retrieval",
            Box::new(|user_id| {
                recommender
                    .recommend_swing_retrieval(user_id, HOW_MANY, RECENT_WINDOW, RETRIEVAL_K)
                    .map(|recommendations| recommendations.len())
                    .unwrap_or(0)
            }),
        ),
    ];

    println!("strategy,qty_calls,p50_micros,p90_micros,p99.5_micros");
    for (strategy_name, recommend) in &strategies {
        let mut stopwatch = Stopwatch::new();
        let progress = ProgressBar::new(user_ids.len() as u64);
        for &user_id in &user_ids {
            progress.inc(1);
            stopwatch.start();
            let qty_recommended = recommend(user_id);
            stopwatch.stop();
            assert!(qty_recommended <= HOW_MANY);
        }
        progress.finish_and_clear();
        println!(
            "{},{},{},{},{}",
            strategy_name,
            stopwatch.get_n(),
            stopwatch.get_percentile_in_micros(0.5),
            stopwatch.get_percentile_in_micros(0.9),
            stopwatch.get_percentile_in_micros(0.995),
        );
    }

    Ok(())
}
