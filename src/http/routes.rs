//! C10 route handlers. Grounded structurally on `service.go`'s route
//! registration (no literal Go precedent for the paths themselves - see
//! DESIGN.md).

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use super::auth::AuthedUser;
use super::state::AppState;
use crate::store::{Texts, User};
use crate::ws;

#[derive(Serialize)]
pub struct LiveResponse {
    service: &'static str,
}

pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse { service: "OK" })
}

pub async fn ws_status(
    upgrade: WebSocketUpgrade,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    AuthedUser(_user_id): AuthedUser,
) -> Response {
    let backend = state.config.status_backend_url.clone();
    upgrade.on_upgrade(move |socket| async move {
        if let Err(e) = ws::handle_passthrough(socket, &backend, query.as_deref()).await {
            error!("status connection failed: {e}");
        }
    })
}

pub async fn ws_speech(
    upgrade: WebSocketUpgrade,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    AuthedUser(user_id): AuthedUser,
) -> Response {
    let backend = state.config.speech_backend_url.clone();
    let store = state.store.clone();
    let joiner = state.joiner.clone();
    let punctuator_client = state.punctuator_client.clone();
    upgrade.on_upgrade(move |socket| async move {
        if let Err(e) = ws::handle_connection(
            socket,
            &backend,
            query.as_deref(),
            user_id,
            store,
            joiner,
            punctuator_client,
        )
        .await
        {
            error!("speech connection failed: {e}");
        }
    })
}

pub async fn get_audio(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<String>,
) -> Response {
    let key = crate::store::audio_key(&user_id, &id);
    match state.store.get_audio(&key).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn get_config(State(state): State<AppState>, AuthedUser(user_id): AuthedUser) -> Response {
    match state.store.get_config(&user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => {
            error!("get_config failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn save_config(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Json(mut user): Json<User>,
) -> Response {
    user.id = user_id;
    match state.store.save_config(&user).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("save_config failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_text(State(state): State<AppState>, AuthedUser(user_id): AuthedUser) -> Response {
    match state.store.get_texts(&user_id).await {
        Ok(texts) => Json(texts).into_response(),
        Err(e) => {
            error!("get_texts failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn save_text(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Json(texts): Json<Texts>,
) -> Response {
    match state.store.save_texts(&user_id, &texts).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("save_texts failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
