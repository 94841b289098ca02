//! Out-of-band OTP delivery abstraction.
//!
//! The auth core hands the plaintext code to an `OtpSender` right after the
//! issuance transaction commits. Delivery (email, SMS, push) is an external
//! collaborator; the default sender for local dev logs that a delivery
//! would have happened without ever logging the code itself.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct OtpMessage {
    pub username: String,
    /// Optional contact channel supplied by the client. The auth core
    /// ignores it; senders may use it to pick a delivery address.
    pub email: Option<String>,
    /// Plaintext code. Never persisted and never logged.
    pub code: String,
}

/// OTP delivery abstraction invoked by the issuer.
pub trait OtpSender: Send + Sync {
    /// Deliver the code or return an error to fail the request.
    fn send(&self, message: &OtpMessage) -> Result<()>;
}

/// Local dev sender that logs the delivery instead of sending anything.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

impl OtpSender for LogOtpSender {
    fn send(&self, message: &OtpMessage) -> Result<()> {
        info!(
            username = %message.username,
            has_email = message.email.is_some(),
            "otp notification send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sender_always_delivers() {
        let sender = LogOtpSender;
        let message = OtpMessage {
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            code: "042137".to_string(),
        };
        assert!(sender.send(&message).is_ok());
    }
}
