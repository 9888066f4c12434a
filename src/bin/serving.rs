extern crate sarabande;

use actix_web::{
    http::ContentEncoding, middleware, web, App, HttpRequest, HttpResponse, HttpServer,
};
use actix_web_prom::PrometheusMetrics;

use actix_web::http::header;
use std::sync::Arc;

use sarabande::config::AppConfig;
use sarabande::endpoints::index_resource::internal;
use sarabande::endpoints::recommend_resource::v1_recommend;
use sarabande::endpoints::SharedHandlesAndConfig;
use sarabande::interactions::InteractionStore;
use sarabande::recommend::Recommender;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let num_items_to_recommend = config.model.num_items_to_recommend;
    let recent_items_window = config.model.recent_items_window;
    let swing_retrieval_k = config.model.swing_retrieval_k;
    let qty_workers = config.server.num_workers;

    println!("loading interaction log {}", &config.data.interactions_path);
    let store = InteractionStore::from_csv_file(&config.data.interactions_path)
        .unwrap_or_else(|error| {
            panic!(
                "Unable to read interaction log {}: {}",
                &config.data.interactions_path, error
            )
        });
    println!(
        "loaded {} interactions, {} users, {} items",
        store.qty_interactions(),
        store.qty_users(),
        store.qty_items()
    );

    // The swing graph is built once here, before any worker can read it.
    let recommender = Arc::new(Recommender::new(
        store,
        config.model.swing_alpha,
        config.model.max_rating,
    ));

    println!("start metrics");
    let prometheus = PrometheusMetrics::new("api", Some("/internal/prometheus"), None);

    println!("Done. start httpd at http://{}", &bind_address);
    HttpServer::new(move || {
        let handles_and_config = SharedHandlesAndConfig {
            recommender: recommender.clone(),
            num_items_to_recommend,
            recent_items_window,
            swing_retrieval_k,
            qty_workers,
        };

        App::new()
            .wrap(middleware::Compress::new(ContentEncoding::Identity))
            .wrap(prometheus.clone())
            .wrap(
                middleware::DefaultHeaders::new()
                    .header("Cache-Control", "no-cache, no-store, must-revalidate")
                    .header("Pragma", "no-cache")
                    .header("Expires", "0"),
            )
            .data(handles_and_config)
            .service(v1_recommend)
            .service(internal)
            .service(web::resource("/").route(web::get().to(|_req: HttpRequest| {
                HttpResponse::Found()
                    .header(header::LOCATION, "/internal")
                    .finish()
            })))
    })
    .workers(config.server.num_workers)
    .bind(&bind_address)
    .unwrap_or_else(|_| panic!("Could not bind server to address {}", &bind_address))
    .run()
    .await
}
