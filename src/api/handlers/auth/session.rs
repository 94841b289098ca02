//! Session validation endpoint, consumed by the application gateway on
//! every authenticated request.

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use sqlx::PgPool;

use super::storage::lookup_session;
use super::types::SessionResponse;
use super::utils::hash_session_token;
use crate::api::error::AuthError;

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    params(
        ("Authorization" = String, Header, description = "Bearer session token")
    ),
    responses(
        (status = 200, description = "Validation result", body = SessionResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    pool: Extension<PgPool>,
) -> Result<Json<SessionResponse>, AuthError> {
    // A missing or malformed header is just "not valid", never an error.
    let Some(token) = extract_bearer_token(&headers) else {
        return Ok(Json(SessionResponse {
            valid: false,
            username: None,
        }));
    };

    // Only the hash is stored; never compare raw tokens against the database.
    let token_hash = hash_session_token(&token);
    let username = lookup_session(&pool, &token_hash).await?;

    Ok(Json(SessionResponse {
        valid: username.is_some(),
        username,
    }))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
