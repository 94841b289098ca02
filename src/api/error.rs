//! Error taxonomy for the auth endpoints.
//!
//! Client-visible messages are a small fixed vocabulary; everything else
//! (sqlx errors, rate-limit sub-reasons) stays in the server logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};

use super::handlers::auth::rate_limit::DenyReason;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(&'static str),

    /// OTP issuance denied by the rate limiter.
    #[error("rate limited: {0}")]
    RateLimited(DenyReason),

    /// Unknown identity, no pending OTP, expired OTP, or mismatched OTP.
    /// Collapsed into one variant so responses cannot be used to probe
    /// account state.
    #[error("invalid otp")]
    InvalidCredential,

    /// Transient persistence failure; retryable by the client.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            Self::RateLimited(reason) => {
                warn!("otp issuance rate limited: {reason}");
                (StatusCode::TOO_MANY_REQUESTS, reason.user_message().to_string())
            }
            Self::InvalidCredential => (StatusCode::UNAUTHORIZED, "invalid otp".to_string()),
            Self::Store(err) => {
                error!("store error: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::http::StatusCode;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let response = AuthError::Validation("missing username").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "missing username");
    }

    #[tokio::test]
    async fn rate_limited_maps_to_429() {
        let response = AuthError::RateLimited(DenyReason::Cooldown).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "please wait before requesting another code"
        );
    }

    #[tokio::test]
    async fn invalid_credential_is_uniform_401() {
        let response = AuthError::InvalidCredential.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "invalid otp");
    }

    #[tokio::test]
    async fn store_error_hides_detail() {
        let response = AuthError::Store(anyhow!("connection refused to 10.0.0.3")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "internal error");
    }
}
