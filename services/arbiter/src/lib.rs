//! HTTP service wrapping the dispute core: Postgres persistence, an
//! OpenAI-compatible reasoning provider, and the REST surface.

pub mod config;
pub mod error;
pub mod provider_openai;
pub mod routes_agent;
pub mod routes_disputes;
pub mod routes_resolve;
pub mod state;
pub mod store;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::state::SharedState;

/// Full application router over a prepared state.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/disputes",
            post(routes_disputes::create_dispute).get(routes_disputes::get_disputes),
        )
        .route(
            "/api/disputes/:id",
            get(routes_disputes::get_dispute)
                .put(routes_disputes::update_dispute)
                .delete(routes_disputes::delete_dispute),
        )
        .route("/api/disputes/:id/evidence", post(routes_disputes::add_evidence))
        .route("/api/disputes/:id/resolve", post(routes_resolve::resolve_dispute))
        .route("/api/agent/status", get(routes_agent::get_agent_status))
        .route("/api/agent/analyze", post(routes_agent::analyze_dispute))
        .route("/api/agent/quick-analysis", post(routes_agent::quick_analysis))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
