pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/images/scene", post(handlers::handle_upload_scene))
        .route("/api/v1/images/person", post(handlers::handle_upload_person))
        .route("/api/v1/generate", post(handlers::handle_generate))
        .route("/api/v1/status", get(handlers::handle_status))
        .route("/api/v1/reset", post(handlers::handle_reset))
        .with_state(state)
}
