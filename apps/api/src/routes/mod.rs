pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route("/api/v1/catalog", get(handlers::handle_get_catalog))
        .route(
            "/api/v1/catalog/sub-categories",
            get(handlers::handle_get_sub_categories),
        )
        // Interaction sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            put(handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/selection",
            put(handlers::handle_select),
        )
        .route(
            "/api/v1/sessions/:id/questions",
            post(handlers::handle_generate),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
