//! OTP verification endpoint.

use axum::{extract::Extension, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};

use super::state::AuthState;
use super::storage::{self, VerifyOutcome};
use super::types::{VerifyOtpRequest, VerifyOtpResponse};
use super::utils::normalize_username;
use crate::api::error::AuthError;

#[utoipa::path(
    post,
    path = "/v1/auth/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted; session token issued", body = VerifyOtpResponse),
        (status = 400, description = "Missing parameters"),
        (status = 401, description = "Invalid otp (unknown user, no pending code, expired, or mismatch — the response does not distinguish)"),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Result<Json<VerifyOtpResponse>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("missing parameters"));
    };

    let username = normalize_username(&request.username);
    let code = request.otp.trim();
    if username.is_empty() || code.is_empty() {
        return Err(AuthError::Validation("missing parameters"));
    }

    match storage::verify_otp(&pool, &username, code, state.config()).await? {
        VerifyOutcome::Rejected(reason) => {
            // Reason stays in the logs; the client sees one uniform 401.
            debug!("otp verification rejected: {reason:?}");
            Err(AuthError::InvalidCredential)
        }
        VerifyOutcome::Verified { token, expires_at } => {
            info!(username = %username, "otp verified, session issued");
            Ok(Json(VerifyOtpResponse {
                success: true,
                token,
                expires_at: expires_at.to_rfc3339(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::api::notify::LogOtpSender;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        Arc::new(AuthState::new(config, Arc::new(LogOtpSender)))
    }

    #[tokio::test]
    async fn verify_missing_payload_is_400() -> anyhow::Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_otp(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn verify_blank_parameters_are_400() -> anyhow::Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_otp(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(VerifyOtpRequest {
                username: "alice".to_string(),
                otp: "  ".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
