//! Router-level integration tests: drive `http::router` end to end through
//! `tower::ServiceExt::oneshot`, the way axum apps are conventionally tested
//! without binding a real socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tower::ServiceExt;

use transcribe_proxy::config::Config;
use transcribe_proxy::http::{self, AppState};
use transcribe_proxy::middleware::{Joiner, PunctuatorClient};
use transcribe_proxy::store::{DataStore, MemoryStore, User};

const HEADER: &str = "X-User-Info";

fn user_header(id: &str) -> String {
    BASE64.encode(format!(r#"{{"id":"{id}"}}"#))
}

fn app() -> axum::Router {
    let config = Config {
        port: 0,
        status_backend_url: "ws://127.0.0.1:1/status".into(),
        speech_backend_url: "ws://127.0.0.1:1/speech".into(),
        joiner_url: "http://127.0.0.1:1/join".into(),
        punctuator_url: "http://127.0.0.1:1/punct".into(),
        store_conn_str: None,
        store_encryption_key: None,
    };
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let joiner = Arc::new(Joiner::new(config.joiner_url.clone()).unwrap());
    let punctuator_client = Arc::new(PunctuatorClient::new(config.punctuator_url.clone()).unwrap());
    let state = AppState {
        config: Arc::new(config),
        store,
        joiner,
        punctuator_client,
    };
    http::router(state)
}

/// `/live` needs no auth and always answers OK - used by orchestrators as a
/// liveness probe, so it must never be gated behind `AuthedUser`.
#[tokio::test]
async fn live_endpoint_requires_no_auth() {
    let response = app()
        .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// `/client/config` (and every other `/client/*` route) is gated by the
/// `X-User-Info` header - missing it must reject before the handler runs.
#[tokio::test]
async fn config_endpoint_rejects_missing_auth_header() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/client/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A full round trip: save a config for an authenticated user, then read it
/// back through the same router and the same in-memory store.
#[tokio::test]
async fn config_save_then_get_round_trips_through_the_router() {
    let app = app();
    let auth = user_header("router-user-1");

    let body = serde_json::to_vec(&User {
        id: String::new(), // overwritten server-side from the auth header
        skip_tour: true,
    })
    .unwrap();

    let save = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/client/config")
                .header(HEADER, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(save.status(), StatusCode::OK);

    let get = app
        .oneshot(
            Request::builder()
                .uri("/client/config")
                .header(HEADER, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(get.into_body(), usize::MAX).await.unwrap();
    let user: User = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(user.id, "router-user-1");
    assert!(user.skip_tour);
}

/// A user who never saved a config gets the zero-valued default rather than
/// a 404 or 500 - `DataStore::get_config` treats "no entry" as valid state.
#[tokio::test]
async fn config_get_for_unknown_user_returns_default() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/client/config")
                .header(HEADER, &user_header("never-saved"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let user: User = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(user.id, "never-saved");
    assert!(!user.skip_tour);
}
