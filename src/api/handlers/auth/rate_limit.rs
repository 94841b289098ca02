//! Pure issuance rate-limit policy.
//!
//! Operates only on the identity's stored counters and timestamps; the
//! caller is responsible for holding the row lock while checking and
//! writing back. Counters use fixed-boundary resets: a counter restarts
//! whenever the last issuance predates the start of the current UTC hour
//! or UTC day. Bursts straddling a boundary therefore count into both
//! windows separately; this matches the stored-counter design and is not
//! a sliding window.

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Clone, Copy, Debug)]
pub struct RatePolicy {
    pub cooldown_seconds: i64,
    pub max_per_hour: i32,
    pub max_per_day: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    Cooldown,
    HourlyLimit,
    DailyLimit,
}

impl DenyReason {
    /// Client-facing message; deliberately vague about stored state.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Cooldown => "please wait before requesting another code",
            Self::HourlyLimit => "hourly request limit reached",
            Self::DailyLimit => "daily request limit reached",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooldown => write!(f, "cooldown"),
            Self::HourlyLimit => write!(f, "hourly limit"),
            Self::DailyLimit => write!(f, "daily limit"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Issuance may proceed; carries the post-reset, post-increment
    /// counters to persist alongside the new OTP.
    Allowed { hourly: i32, daily: i32 },
    Denied(DenyReason),
}

/// Decide whether a new OTP may be issued. Rules evaluate in order:
/// cooldown, hourly cap, daily cap.
#[must_use]
pub fn check(
    now: DateTime<Utc>,
    last_request_at: Option<DateTime<Utc>>,
    hourly_count: i32,
    daily_count: i32,
    policy: RatePolicy,
) -> Decision {
    let (mut hourly, mut daily) = (hourly_count, daily_count);

    if let Some(last) = last_request_at {
        if now.signed_duration_since(last).num_seconds() < policy.cooldown_seconds {
            return Decision::Denied(DenyReason::Cooldown);
        }

        // UTC hour and day starts fall on exact unix-timestamp multiples.
        let hour_start = now.timestamp() - now.timestamp().rem_euclid(3600);
        let day_start = now.timestamp() - now.timestamp().rem_euclid(86_400);

        if last.timestamp() < hour_start {
            hourly = 0;
        }
        if last.timestamp() < day_start {
            daily = 0;
        }
    } else {
        hourly = 0;
        daily = 0;
    }

    if hourly >= policy.max_per_hour {
        return Decision::Denied(DenyReason::HourlyLimit);
    }
    if daily >= policy.max_per_day {
        return Decision::Denied(DenyReason::DailyLimit);
    }

    Decision::Allowed {
        hourly: hourly + 1,
        daily: daily + 1,
    }
}
