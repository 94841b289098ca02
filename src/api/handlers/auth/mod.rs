//! OTP issuance, verification, and session validation.
//!
//! The flow is a small state machine per identity: `NoPendingOtp` →
//! (issue, passes rate limits) → `OtpPending` → (verify, matches and
//! unexpired) → `NoPendingOtp` + active session. Failed or expired
//! verification attempts never clear pending OTP state; only a successful
//! verification or a fresh issuance overwrites it.
//!
//! ## Rate limiting
//!
//! Issuance is limited per identity: a cooldown between requests plus
//! hourly and daily caps with fixed-boundary resets (counters restart when
//! the previous request predates the current UTC hour / day). The
//! read-check-write sequence runs under a `SELECT ... FOR UPDATE` row lock
//! so concurrent requests for the same identity serialize.
//!
//! ## Enumeration resistance
//!
//! Issuing for an unknown username returns the same success-shaped
//! response as a real issuance, and every verification failure collapses
//! into one `401 invalid otp`.

pub mod issue;
pub mod rate_limit;
pub mod session;
pub mod verify;

mod state;
mod storage;
pub(crate) mod types;
mod utils;

pub use state::{AuthConfig, AuthState};
