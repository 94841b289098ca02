//! Small helpers for codes, tokens, and hashing.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Normalize a username for lookup.
pub(super) fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

/// Create a uniformly random 6-digit code.
///
/// Represented as a fixed-width string so leading zeros survive; a code of
/// `042137` must not collapse to `42137`.
pub(super) fn generate_otp_code() -> String {
    let value: u32 = OsRng.gen_range(0..1_000_000);
    format!("{value:06}")
}

/// Create a new session token for the bearer header.
/// The raw value is only returned to the caller; the database stores a hash.
pub(super) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash an OTP code so the plaintext never touches the database.
pub(super) fn hash_otp_code(code: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hasher.finalize().to_vec()
}

/// Hash a session token so raw values never touch the database.
/// The hash is used for lookups when the bearer token is presented.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Constant-time digest comparison.
pub(super) fn digest_matches(stored: &[u8], submitted: &[u8]) -> bool {
    stored.ct_eq(submitted).into()
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn normalize_username_trims() {
        assert_eq!(normalize_username("  alice "), "alice");
        assert_eq!(normalize_username("Alice"), "Alice");
    }

    #[test]
    fn otp_codes_are_six_digit_strings() {
        for _ in 0..64 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn otp_codes_preserve_leading_zeros() {
        // Render the smallest possible value through the same formatting.
        assert_eq!(format!("{:06}", 42u32), "000042");
    }

    #[test]
    fn generate_session_token_round_trip() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn hash_otp_code_stable() {
        let first = hash_otp_code("123456");
        let second = hash_otp_code("123456");
        let different = hash_otp_code("123457");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[test]
    fn digest_matches_compares_full_width() {
        let stored = hash_otp_code("123456");
        assert!(digest_matches(&stored, &hash_otp_code("123456")));
        assert!(!digest_matches(&stored, &hash_otp_code("654321")));
        assert!(!digest_matches(&stored, &stored[..16]));
    }

    #[test]
    fn hash_session_token_differs_from_raw() {
        let hash = hash_session_token("token");
        assert_eq!(hash.len(), 32);
        assert_ne!(hash.as_slice(), b"token".as_slice());
    }
}
