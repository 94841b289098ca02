use crate::{
    api,
    api::{
        handlers::auth::AuthConfig,
        notify::LogOtpSender,
    },
    cli::actions::Action,
};
use anyhow::Result;
use std::sync::Arc;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            frontend_url,
            cooldown_seconds,
            max_per_hour,
            max_per_day,
            otp_ttl_seconds,
            session_ttl_seconds,
            debug_echo_otp,
        } => {
            let config = AuthConfig::new(frontend_url)
                .with_cooldown_seconds(cooldown_seconds)
                .with_max_per_hour(max_per_hour)
                .with_max_per_day(max_per_day)
                .with_otp_ttl_seconds(otp_ttl_seconds)
                .with_session_ttl_seconds(session_ttl_seconds)
                .with_debug_echo_otp(debug_echo_otp);

            api::new(port, dsn, config, Arc::new(LogOtpSender)).await?;
        }
    }

    Ok(())
}
