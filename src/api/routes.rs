//! API routes

use crate::api::handlers::{
    create_article, delete_article, get_article, health_check, list_articles, root,
    update_article, AppState,
};
use axum::{routing::get, Router};

/// Build the API routes
///
/// Exemption from the admission checks is decided by path inside the
/// middleware, so one route table serves both exempt and protected
/// endpoints.
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/articles", get(list_articles).post(create_article))
        .route(
            "/api/v1/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .with_state(state)
}
