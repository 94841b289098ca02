//! Auth state and issuance/session policy configuration.

use std::sync::Arc;

use super::rate_limit::RatePolicy;
use crate::api::notify::OtpSender;

const DEFAULT_COOLDOWN_SECONDS: i64 = 30;
const DEFAULT_MAX_PER_HOUR: i32 = 4;
const DEFAULT_MAX_PER_DAY: i32 = 10;
const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// One configuration object covers every deployment variant; demo and test
/// setups only turn the same knobs (shorter cooldown, debug echo).
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    cooldown_seconds: i64,
    max_per_hour: i32,
    max_per_day: i32,
    otp_ttl_seconds: i64,
    session_ttl_seconds: i64,
    debug_echo_otp: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            max_per_hour: DEFAULT_MAX_PER_HOUR,
            max_per_day: DEFAULT_MAX_PER_DAY,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            debug_echo_otp: false,
        }
    }

    #[must_use]
    pub fn with_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_per_hour(mut self, max: i32) -> Self {
        self.max_per_hour = max;
        self
    }

    #[must_use]
    pub fn with_max_per_day(mut self, max: i32) -> Self {
        self.max_per_day = max;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    /// Echo the plaintext code in the issue response. Development only;
    /// defaults to off and must stay off in production.
    #[must_use]
    pub fn with_debug_echo_otp(mut self, enabled: bool) -> Self {
        self.debug_echo_otp = enabled;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn rate_policy(&self) -> RatePolicy {
        RatePolicy {
            cooldown_seconds: self.cooldown_seconds,
            max_per_hour: self.max_per_hour,
            max_per_day: self.max_per_day,
        }
    }

    pub(super) fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    pub(super) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn debug_echo_otp(&self) -> bool {
        self.debug_echo_otp
    }
}

pub struct AuthState {
    config: AuthConfig,
    sender: Arc<dyn OtpSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, sender: Arc<dyn OtpSender>) -> Self {
        Self { config, sender }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn sender(&self) -> &dyn OtpSender {
        self.sender.as_ref()
    }
}
