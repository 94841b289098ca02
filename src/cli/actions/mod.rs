pub mod server;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        frontend_url: String,
        cooldown_seconds: i64,
        max_per_hour: i32,
        max_per_day: i32,
        otp_ttl_seconds: i64,
        session_ttl_seconds: i64,
        debug_echo_otp: bool,
    },
}
