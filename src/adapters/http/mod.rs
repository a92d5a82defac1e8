pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/predict_signs/", post(routes::predict_signs))
        .route("/predict_signs", post(routes::predict_signs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
