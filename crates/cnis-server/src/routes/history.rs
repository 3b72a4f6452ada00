//! Employment-history routes: extraction, clearing, saving and resync of a
//! client's session.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use cnis_core::Result;
use cnis_extract::PlainTextSource;
use cnis_history::ExtractionOutcome;
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/clients/{client_id}/history",
            get(get_history).delete(delete_history),
        )
        .route("/clients/{client_id}/history/extract", post(extract_fragments))
        .route("/clients/{client_id}/history/upload", post(upload_statement))
        .route("/clients/{client_id}/history/clear", post(clear_history))
        .route("/clients/{client_id}/history/save", post(save_history))
        .route("/clients/{client_id}/history/reload", post(reload_history))
}

fn respond(result: Result<serde_json::Value>) -> (StatusCode, Json<serde_json::Value>) {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => error_response(&e),
    }
}

fn outcome_body(outcome: &ExtractionOutcome, history: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "outcome": outcome,
        "message": outcome.message(),
        "history": history,
    })
}

/// GET /api/clients/{client_id}/history — current session view.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    respond(state.with_session(&client_id, |session| {
        Ok(serde_json::json!(session.view()))
    }))
}

/// DELETE /api/clients/{client_id}/history — forget the saved profile and
/// any unsaved edits.
async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    respond(
        state
            .forget_client(&client_id)
            .map(|()| serde_json::json!({ "deleted": client_id })),
    )
}

#[derive(Deserialize)]
struct ExtractRequest {
    fragments: Vec<String>,
}

/// POST /api/clients/{client_id}/history/extract — reconstruct bonds from
/// already retrieved page-text fragments.
async fn extract_fragments(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Json(body): Json<ExtractRequest>,
) -> impl IntoResponse {
    respond(state.with_session(&client_id, |session| {
        let outcome = session.extract_fragments(&body.fragments);
        Ok(outcome_body(&outcome, serde_json::json!(session.view())))
    }))
}

/// POST /api/clients/{client_id}/history/upload — raw statement text.
async fn upload_statement(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    respond(state.with_session(&client_id, |session| {
        let outcome = session.extract(&PlainTextSource, &body)?;
        Ok(outcome_body(&outcome, serde_json::json!(session.view())))
    }))
}

/// POST /api/clients/{client_id}/history/clear — empty the bond list.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    respond(state.with_session(&client_id, |session| {
        session.clear();
        Ok(serde_json::json!(session.view()))
    }))
}

/// POST /api/clients/{client_id}/history/save — persist to the profile store.
async fn save_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.clone();
    respond(state.with_session(&client_id, |session| {
        let saved = session.save(store.as_ref())?;
        Ok(serde_json::json!({
            "saved": saved,
            "history": session.view(),
        }))
    }))
}

/// POST /api/clients/{client_id}/history/reload — adopt the stored profile
/// if it changed since the session last loaded it.
async fn reload_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.clone();
    respond(state.with_session(&client_id, |session| {
        let stored = store.load_history(&client_id)?;
        let replaced = session.resync(&client_id, stored);
        Ok(serde_json::json!({
            "replaced": replaced,
            "history": session.view(),
        }))
    }))
}
