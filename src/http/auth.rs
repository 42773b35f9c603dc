//! `X-User-Info` header parsing. No Go precedent found in `original_source/`
//! (see DESIGN.md) - implemented directly from the spec: the header carries
//! base64(`{"id": "..."}`); missing, malformed, or an empty id is a 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

const HEADER: &str = "X-User-Info";

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
}

/// Extracts the authenticated user's id. Rejects with 401 before any
/// downstream handler (including a WS upgrade) runs.
pub struct AuthedUser(pub String);

impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(HEADER)
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?;
        let decoded = BASE64.decode(raw).map_err(|_| StatusCode::UNAUTHORIZED)?;
        let info: UserInfo =
            serde_json::from_slice(&decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;
        if info.id.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(AuthedUser(info.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/client/config");
        if let Some(v) = value {
            builder = builder.header(HEADER, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let mut parts = parts_with_header(None);
        let result = AuthedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn malformed_base64_is_unauthorized() {
        let mut parts = parts_with_header(Some("not-base64!!"));
        let result = AuthedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn empty_id_is_unauthorized() {
        let value = BASE64.encode(r#"{"id":""}"#);
        let mut parts = parts_with_header(Some(&value));
        let result = AuthedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn valid_header_yields_user_id() {
        let value = BASE64.encode(r#"{"id":"alice"}"#);
        let mut parts = parts_with_header(Some(&value));
        let AuthedUser(id) = AuthedUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, "alice");
    }
}
