//! C10: the HTTP/WS edge. Thin by design - see SPEC_FULL.md §4.11.

mod auth;
mod routes;
mod state;

pub use state::AppState;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    // All origins, but only the methods this API actually exposes -
    // narrower than `CorsLayer::permissive()`'s all-methods/all-headers grant.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/live", get(routes::live))
        .route("/client/ws/status", get(routes::ws_status))
        .route("/client/ws/speech", get(routes::ws_speech))
        .route("/client/audio/:id", get(routes::get_audio))
        .route(
            "/client/config",
            get(routes::get_config).post(routes::save_config),
        )
        .route("/client/text", get(routes::get_text).post(routes::save_text))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
