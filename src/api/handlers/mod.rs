pub mod health;
pub use self::health::health;

pub mod auth;

/// axum handler for the bare root, useful as a liveness probe target.
pub async fn root() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}
