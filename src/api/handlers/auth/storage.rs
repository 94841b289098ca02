//! Database helpers for OTP and session state.
//!
//! Issuance and verification both take a `FOR UPDATE` row lock on the
//! identity before reading counters or OTP state, so concurrent requests
//! for the same username serialize on the store instead of racing the
//! check-then-write sequence.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::rate_limit::{self, Decision, DenyReason};
use super::state::AuthConfig;
use super::utils::{
    digest_matches, generate_otp_code, generate_session_token, hash_otp_code, hash_session_token,
    is_unique_violation,
};

/// Outcome of an issuance attempt.
#[derive(Debug)]
pub(super) enum IssueOutcome {
    /// No such user; callers must answer with the same success shape as a
    /// real issuance.
    UnknownUser,
    RateLimited(DenyReason),
    Issued {
        code: String,
        expires_at: DateTime<Utc>,
    },
}

/// Log-only detail for a rejected verification; every variant collapses
/// into the same client response.
#[derive(Clone, Copy, Debug)]
pub(super) enum RejectReason {
    UnknownUser,
    NoPendingOtp,
    Expired,
    Mismatch,
}

#[derive(Debug)]
pub(super) enum VerifyOutcome {
    Rejected(RejectReason),
    Verified {
        token: String,
        expires_at: DateTime<Utc>,
    },
}

/// Issue a new OTP for `username` if the rate limiter allows it.
///
/// The counter check and the issuance write happen under one row lock;
/// the plaintext code is returned to the caller for out-of-band delivery
/// and only its hash is persisted.
pub(super) async fn issue_otp(
    pool: &PgPool,
    username: &str,
    config: &AuthConfig,
) -> Result<IssueOutcome> {
    let mut tx = pool.begin().await.context("begin issue transaction")?;

    let query = r"
        SELECT id, otp_last_request_at, otp_hourly_count, otp_daily_count
        FROM users
        WHERE username = $1
        FOR UPDATE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to lookup user for issuance")?;

    let Some(row) = row else {
        tx.rollback().await.context("rollback issue noop")?;
        return Ok(IssueOutcome::UnknownUser);
    };

    let user_id: Uuid = row.get("id");
    let last_request_at: Option<DateTime<Utc>> = row.get("otp_last_request_at");
    let hourly_count: i32 = row.get("otp_hourly_count");
    let daily_count: i32 = row.get("otp_daily_count");

    let now = Utc::now();
    let (hourly, daily) = match rate_limit::check(
        now,
        last_request_at,
        hourly_count,
        daily_count,
        config.rate_policy(),
    ) {
        Decision::Denied(reason) => {
            tx.rollback().await.context("rollback issue denied")?;
            return Ok(IssueOutcome::RateLimited(reason));
        }
        Decision::Allowed { hourly, daily } => (hourly, daily),
    };

    let code = generate_otp_code();
    let code_hash = hash_otp_code(&code);
    let expires_at = now + Duration::seconds(config.otp_ttl_seconds());

    // Hash, expiry, counters, and last-issuance timestamp land in one write.
    let query = r"
        UPDATE users
        SET otp_hash = $2,
            otp_expires_at = $3,
            otp_last_request_at = $4,
            otp_request_count = otp_request_count + 1,
            otp_hourly_count = $5,
            otp_daily_count = $6
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(&code_hash)
        .bind(expires_at)
        .bind(now)
        .bind(hourly)
        .bind(daily)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to store issued otp")?;

    tx.commit().await.context("commit issue transaction")?;

    Ok(IssueOutcome::Issued { code, expires_at })
}

/// Verify a submitted code. On success the pending OTP state is cleared
/// and the user's session is replaced (delete-then-insert) in the same
/// transaction. Rejections leave pending OTP state untouched.
pub(super) async fn verify_otp(
    pool: &PgPool,
    username: &str,
    code: &str,
    config: &AuthConfig,
) -> Result<VerifyOutcome> {
    let mut tx = pool.begin().await.context("begin verify transaction")?;

    let query = r"
        SELECT id, otp_hash, otp_expires_at
        FROM users
        WHERE username = $1
        FOR UPDATE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to lookup user for verification")?;

    let Some(row) = row else {
        tx.rollback().await.context("rollback verify unknown")?;
        return Ok(VerifyOutcome::Rejected(RejectReason::UnknownUser));
    };

    let user_id: Uuid = row.get("id");
    let otp_hash: Option<Vec<u8>> = row.get("otp_hash");
    let otp_expires_at: Option<DateTime<Utc>> = row.get("otp_expires_at");

    let (Some(stored_hash), Some(expires_at)) = (otp_hash, otp_expires_at) else {
        tx.rollback().await.context("rollback verify no otp")?;
        return Ok(VerifyOutcome::Rejected(RejectReason::NoPendingOtp));
    };

    let now = Utc::now();
    if now > expires_at {
        // An expired OTP stays rejected on every attempt until a fresh
        // issuance overwrites it.
        tx.rollback().await.context("rollback verify expired")?;
        return Ok(VerifyOutcome::Rejected(RejectReason::Expired));
    }

    if !digest_matches(&stored_hash, &hash_otp_code(code)) {
        tx.rollback().await.context("rollback verify mismatch")?;
        return Ok(VerifyOutcome::Rejected(RejectReason::Mismatch));
    }

    // Single-use: clear OTP state before handing out the session.
    let query = r"
        UPDATE users
        SET otp_hash = NULL,
            otp_expires_at = NULL
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to clear otp state")?;

    // At most one active session per user: drop any prior session inside
    // the same transaction as the insert.
    let query = "DELETE FROM user_sessions WHERE user_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to delete prior session")?;

    let expires_at = now + Duration::seconds(config.session_ttl_seconds());

    let query = r"
        INSERT INTO user_sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(&token_hash)
            .bind(expires_at)
            .execute(&mut *tx)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => {
                tx.commit().await.context("commit verify transaction")?;
                return Ok(VerifyOutcome::Verified { token, expires_at });
            }
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

/// Resolve a session token hash to its owning username.
///
/// Pure read on the request hot path; expiry is enforced here instead of
/// by any background sweeping.
pub(crate) async fn lookup_session(pool: &PgPool, token_hash: &[u8]) -> Result<Option<String>> {
    let query = r"
        SELECT users.username
        FROM user_sessions
        JOIN users ON users.id = user_sessions.user_id
        WHERE user_sessions.token_hash = $1
          AND user_sessions.expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    Ok(row.map(|row| row.get("username")))
}

#[cfg(test)]
mod tests {
    use super::{IssueOutcome, RejectReason, VerifyOutcome};
    use crate::api::handlers::auth::rate_limit::DenyReason;
    use chrono::Utc;

    #[test]
    fn issue_outcome_debug_names() {
        assert_eq!(format!("{:?}", IssueOutcome::UnknownUser), "UnknownUser");
        assert_eq!(
            format!("{:?}", IssueOutcome::RateLimited(DenyReason::Cooldown)),
            "RateLimited(Cooldown)"
        );
    }

    #[test]
    fn verify_outcome_never_leaks_reason_text() {
        // The Debug form carries detail for logs only; the reject variants
        // all map to the same client response in the handler.
        let rejections = [
            RejectReason::UnknownUser,
            RejectReason::NoPendingOtp,
            RejectReason::Expired,
            RejectReason::Mismatch,
        ];
        assert_eq!(rejections.len(), 4);
        let outcome = VerifyOutcome::Verified {
            token: "t".to_string(),
            expires_at: Utc::now(),
        };
        assert!(matches!(outcome, VerifyOutcome::Verified { .. }));
    }
}
