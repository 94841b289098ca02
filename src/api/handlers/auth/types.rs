//! Request/response types for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IssueOtpRequest {
    pub username: String,
    /// Optional contact channel, forwarded to the notification sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IssueOtpResponse {
    pub success: bool,
    pub message: String,
    /// Present only when debug echo is enabled; never in production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub username: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub token: String,
    /// RFC 3339 session expiry.
    pub expires_at: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn issue_request_email_is_optional() -> Result<()> {
        let decoded: IssueOtpRequest = serde_json::from_str(r#"{"username":"alice"}"#)?;
        assert_eq!(decoded.username, "alice");
        assert!(decoded.email.is_none());

        let decoded: IssueOtpRequest =
            serde_json::from_str(r#"{"username":"alice","email":"a@example.com"}"#)?;
        assert_eq!(decoded.email.as_deref(), Some("a@example.com"));
        Ok(())
    }

    #[test]
    fn issue_response_omits_absent_debug_otp() -> Result<()> {
        let response = IssueOtpResponse {
            success: true,
            message: "ok".to_string(),
            debug_otp: None,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("debug_otp").is_none());

        let response = IssueOtpResponse {
            debug_otp: Some("042137".to_string()),
            ..response
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value["debug_otp"], "042137");
        Ok(())
    }

    #[test]
    fn session_response_omits_username_when_invalid() -> Result<()> {
        let response = SessionResponse {
            valid: false,
            username: None,
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value, serde_json::json!({"valid": false}));
        Ok(())
    }

    #[test]
    fn verify_request_round_trips() -> Result<()> {
        let request = VerifyOtpRequest {
            username: "bob".to_string(),
            otp: "000042".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: VerifyOtpRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.otp, "000042");
        Ok(())
    }
}
