//! Liveness route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// GET /api/health — liveness, unsaved session count and saved history count.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let saved = state.store.count_histories().ok();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.config.port,
        "openSessions": state.session_count(),
        "savedHistories": saved,
    }))
}
