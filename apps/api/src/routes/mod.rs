pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::cloud::handlers;
use crate::layout::handlers::handle_layout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless layout
        .route("/api/v1/layout", post(handle_layout))
        // Live clouds
        .route("/api/v1/clouds", post(handlers::handle_create_cloud))
        .route(
            "/api/v1/clouds/:id",
            get(handlers::handle_get_cloud).delete(handlers::handle_delete_cloud),
        )
        .route(
            "/api/v1/clouds/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route("/api/v1/clouds/:id/stats", put(handlers::handle_stats_update))
        .with_state(state)
}
