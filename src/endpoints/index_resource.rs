extern crate sys_info;

use actix_web::{get, web, HttpResponse};

use crate::endpoints::SharedHandlesAndConfig;
use web::Data;

#[get("/internal")]
pub async fn internal(config: Data<SharedHandlesAndConfig>) -> HttpResponse {
    let mut html = "<html>sarabande: batch collaborative-filtering recommendations.<br />".to_string();

    let store = config.recommender.store();
    html.push_str("<h3>Interaction log</h3>");
    html.push_str("Qty Interactions: ");
    html.push_str(&*store.qty_interactions().to_string());
    html.push_str("<br />Qty Unique UserIds: ");
    html.push_str(&*store.qty_users().to_string());
    html.push_str("<br />Qty Unique ItemIds: ");
    html.push_str(&*store.qty_items().to_string());

    let swing = config.recommender.swing_graph();
    html.push_str("<h3>Swing graph</h3>");
    html.push_str("Qty anchor items: ");
    html.push_str(&*swing.qty_items().to_string());
    html.push_str("<br />alpha: ");
    html.push_str(&*swing.alpha().to_string());

    html.push_str("<h3>Models</h3>");
    html.push_str("hyperparameters");
    html.push_str("<br />Qty items to recommend: ");
    html.push_str(&*config.num_items_to_recommend.to_string());
    html.push_str("<br />Recent items window: ");
    html.push_str(&*config.recent_items_window.to_string());
    html.push_str("<br />Swing retrieval k: ");
    html.push_str(&*config.swing_retrieval_k.to_string());
    html.push_str("<br /><a href=\"/v1/recommend?user_id=1&strategy=swing\">v1 endpoint of our model</a>");

    html.push_str("<h3>Machine instance</h3>");
    html.push_str("<br />Qty CPU's detected: ");
    html.push_str(&*sys_info::cpu_num().unwrap_or(0).to_string());
    html.push_str("<br />Qty actix workers set: ");
    html.push_str(&*config.qty_workers.to_string());
    html.push_str("<br />CPU speed: ");
    html.push_str(&*sys_info::cpu_speed().unwrap_or(0).to_string());
    html.push_str("MHz");
    html.push_str("<br />Active processes on instance: ");
    html.push_str(&*sys_info::proc_total().unwrap_or(0).to_string());
    html.push_str("<h3>Metrics</h3>");
    html.push_str("<a href=\"/internal/prometheus\">prometheus</a>");
    html.push_str("</html>");

    HttpResponse::Ok().body(html)
}
