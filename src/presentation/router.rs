// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, slash_command};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/slash", post(slash_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
