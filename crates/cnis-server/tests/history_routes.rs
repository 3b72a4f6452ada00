//! Router tests for the employment-history API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cnis_core::AppConfig;
use cnis_history::{MemoryProfileStore, ProfileStore};
use cnis_server::{build_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const STATEMENT: &str = "Extrato Previdenciário\n\
    12.345.678/0001-90\n\
    ACME LTDA\n\
    01/02/2010\n\
    01/02/2015\n\
    98.765.432/0001-10\n\
    BETA SA\n\
    03/03/2015\n\
    01/01/2020\n";

struct Harness {
    dir: TempDir,
    store: Arc<MemoryProfileStore>,
    app: Router,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::from_env(dir.path()).unwrap();
    let store = Arc::new(MemoryProfileStore::new());
    let state = Arc::new(AppState::new(config, store.clone()));
    Harness {
        dir,
        store,
        app: build_router(state),
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/api/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_new_client_has_empty_history() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientId"], "c1");
    assert_eq!(body["bonds"].as_array().unwrap().len(), 0);
    assert_eq!(body["hasUnsavedChanges"], false);
    assert!(body["lastUpdate"].is_null());
}

#[tokio::test]
async fn test_upload_then_save() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "found");
    assert_eq!(body["outcome"]["count"], 2);
    assert_eq!(body["message"], "2 vínculos encontrados!");
    assert_eq!(body["history"]["hasUnsavedChanges"], true);
    assert_eq!(body["history"]["bonds"][0]["companyName"], "ACME LTDA");
    assert_eq!(body["history"]["bonds"][1]["endDate"], "01/01/2020");
    assert!(h.store.is_empty());

    let (status, body) = send(&h.app, "POST", "/api/clients/c1/history/save", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"]["hasUnsavedChanges"], false);
    assert_eq!(body["saved"]["sourceLabel"], "Importado via PDF");

    let stored = h.store.load_history("c1").unwrap().unwrap();
    assert_eq!(stored.bonds().len(), 2);
}

#[tokio::test]
async fn test_extract_fragments_ongoing_bond() {
    let h = harness();
    let payload = serde_json::json!({
        "fragments": ["12.345.678/0001-90", "ACME LTDA", "01/02/2010", "Empregado"]
    });
    let (status, body) = send(
        &h.app,
        "POST",
        "/api/clients/c1/history/extract",
        Body::from(payload.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bond = &body["history"]["bonds"][0];
    assert_eq!(bond["endDate"], "Ativo");
    assert_eq!(bond["isActive"], true);
}

#[tokio::test]
async fn test_empty_extraction_keeps_history() {
    let h = harness();
    send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from("Página 1 de 1\nSem registros\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "empty");
    assert_eq!(
        body["message"],
        "Nenhum vínculo encontrado. Verifique se o PDF é um Extrato CNIS válido."
    );
    assert_eq!(body["history"]["bonds"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_encrypted_upload_is_bad_request() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from("%PDF-1.7\n<< /Encrypt 3 0 R >>"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Arquivo protegido por senha.");

    let (_, body) = send(&h.app, "GET", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(body["hasUnsavedChanges"], false);
}

#[tokio::test]
async fn test_clear_marks_unsaved() {
    let h = harness();
    send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;
    send(&h.app, "POST", "/api/clients/c1/history/save", Body::empty()).await;

    let (status, body) = send(&h.app, "POST", "/api/clients/c1/history/clear", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bonds"].as_array().unwrap().len(), 0);
    assert_eq!(body["hasUnsavedChanges"], true);
    assert_eq!(body["totalDuration"]["years"], 0);
}

#[tokio::test]
async fn test_reload_adopts_external_change() {
    let h = harness();
    send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;
    let (_, body) = send(&h.app, "POST", "/api/clients/c1/history/reload", Body::empty()).await;
    assert_eq!(body["replaced"], false);
    assert_eq!(body["history"]["hasUnsavedChanges"], true);

    // Another process saves a history for the same client.
    let other = AppState::new(
        AppConfig::from_env(h.dir.path()).unwrap(),
        h.store.clone(),
    );
    other
        .with_session("c1", |session| {
            session.extract_fragments(&["GAMA LTDA", "01/02/2010", "01/02/2015"]);
            session.save(h.store.as_ref()).map(|_| ())
        })
        .unwrap();

    let (status, body) = send(&h.app, "POST", "/api/clients/c1/history/reload", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], true);
    assert_eq!(body["history"]["bonds"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"]["bonds"][0]["companyName"], "GAMA LTDA");
    assert_eq!(body["history"]["hasUnsavedChanges"], false);
}

#[tokio::test]
async fn test_clean_sessions_are_not_retained() {
    let h = harness();
    for i in 0..50 {
        let uri = format!("/api/clients/client-{}/history", i);
        let (status, _) = send(&h.app, "GET", &uri, Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = send(&h.app, "GET", "/api/health", Body::empty()).await;
    assert_eq!(body["openSessions"], 0);

    send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;
    let (_, body) = send(&h.app, "GET", "/api/health", Body::empty()).await;
    assert_eq!(body["openSessions"], 1);

    send(&h.app, "POST", "/api/clients/c1/history/save", Body::empty()).await;
    let (_, body) = send(&h.app, "GET", "/api/health", Body::empty()).await;
    assert_eq!(body["openSessions"], 0);
    assert_eq!(body["savedHistories"], 1);
}

#[tokio::test]
async fn test_clean_session_follows_store() {
    let h = harness();
    let (_, body) = send(&h.app, "GET", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(body["bonds"].as_array().unwrap().len(), 0);

    let other = AppState::new(
        AppConfig::from_env(h.dir.path()).unwrap(),
        h.store.clone(),
    );
    other
        .with_session("c1", |session| {
            session.extract_fragments(&["GAMA LTDA", "01/02/2010", "01/02/2015"]);
            session.save(h.store.as_ref()).map(|_| ())
        })
        .unwrap();

    let (_, body) = send(&h.app, "GET", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(body["bonds"][0]["companyName"], "GAMA LTDA");
}

#[tokio::test]
async fn test_extract_trims_fragments() {
    let h = harness();
    let payload = serde_json::json!({
        "fragments": ["  ACME LTDA ", "", " 01/02/2010", "01/02/2015 "]
    });
    let (status, body) = send(
        &h.app,
        "POST",
        "/api/clients/c1/history/extract",
        Body::from(payload.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["count"], 1);
    assert_eq!(body["history"]["bonds"][0]["companyName"], "ACME LTDA");
    assert_eq!(body["history"]["bonds"][0]["startDate"], "01/02/2010");
}

#[tokio::test]
async fn test_delete_history() {
    let h = harness();
    send(
        &h.app,
        "POST",
        "/api/clients/c1/history/upload",
        Body::from(STATEMENT),
    )
    .await;
    send(&h.app, "POST", "/api/clients/c1/history/save", Body::empty()).await;

    let (status, _) = send(&h.app, "DELETE", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.store.is_empty());

    let (status, body) = send(&h.app, "DELETE", "/api/clients/c1/history", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
