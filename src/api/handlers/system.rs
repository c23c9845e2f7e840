use crate::api::handlers::AppState;
use crate::api::models::HealthResponse;
use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

/// Handler for GET / - welcome endpoint
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Article Generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
        "health": "/api/v1/health",
    }))
}

/// Handler for GET /api/v1/health - API and database connectivity check
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.articles.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: if database == "connected" {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database: database.to_string(),
    })
}
