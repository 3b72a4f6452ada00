//! HTTP route handlers.

pub mod health;
pub mod history;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use cnis_core::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(history::routes())
}

/// Map a domain error to a status code and `{ "error": ... }` body.
pub(crate) fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        e if e.is_source_error() => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (
        status,
        Json(serde_json::json!({ "error": err.user_message() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_response(&Error::PasswordProtected).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            error_response(&Error::SourceRead("bad".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&Error::NotFound("c1".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&Error::Database("locked".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_source_error_body_is_user_message() {
        let (_, Json(body)) = error_response(&Error::SourceRead("xref".into()));
        assert_eq!(body["error"], "Erro ao ler PDF. Tente outro arquivo.");
    }
}
