//! OTP issuance endpoint.

use axum::{extract::Extension, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};

use super::state::AuthState;
use super::storage::{self, IssueOutcome};
use super::types::{IssueOtpRequest, IssueOtpResponse};
use super::utils::normalize_username;
use crate::api::error::AuthError;
use crate::api::notify::OtpMessage;

/// Identity-neutral reply: unknown usernames get the same body as a real
/// issuance.
const ISSUE_MESSAGE: &str = "if the account exists, a code has been sent";

#[utoipa::path(
    post,
    path = "/v1/auth/otp",
    request_body = IssueOtpRequest,
    responses(
        (status = 200, description = "Code issued (or account unknown; the response does not distinguish)", body = IssueOtpResponse),
        (status = 400, description = "Missing username"),
        (status = 429, description = "Rate limited"),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn issue_otp(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<IssueOtpRequest>>,
) -> Result<Json<IssueOtpResponse>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("missing username"));
    };

    let username = normalize_username(&request.username);
    if username.is_empty() {
        return Err(AuthError::Validation("missing username"));
    }

    match storage::issue_otp(&pool, &username, state.config()).await? {
        IssueOutcome::UnknownUser => {
            // Success-shaped no-op so responses cannot probe account
            // existence.
            debug!("otp requested for unknown username");
            Ok(Json(IssueOtpResponse {
                success: true,
                message: ISSUE_MESSAGE.to_string(),
                debug_otp: None,
            }))
        }
        IssueOutcome::RateLimited(reason) => Err(AuthError::RateLimited(reason)),
        IssueOutcome::Issued { code, expires_at } => {
            state.sender().send(&OtpMessage {
                username: username.clone(),
                email: request.email.clone(),
                code: code.clone(),
            })?;

            info!(username = %username, expires_at = %expires_at, "otp issued");

            let debug_otp = state.config().debug_echo_otp().then_some(code);
            Ok(Json(IssueOtpResponse {
                success: true,
                message: ISSUE_MESSAGE.to_string(),
                debug_otp,
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
    async fn issue_missing_payload_is_400() -> anyhow::Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = issue_otp(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn issue_blank_username_is_400() -> anyhow::Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = issue_otp(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(IssueOtpRequest {
                username: "   ".to_string(),
                email: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
