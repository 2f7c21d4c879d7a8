use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/evaluate", post(handlers::evaluate))
        .route("/analyze", post(handlers::analyze))
        .route("/status", get(handlers::health_check))
}
