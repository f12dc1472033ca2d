use crate::{core::notify::OtpSender, error::StowageError};
use tracing::{debug, info};

/// Writes one-time codes to the log instead of mailing them.
/// Meant for local setups where no mail provider is configured.
#[derive(Debug, Clone, Default)]
pub struct TracingOtpSender;

#[async_trait::async_trait]
impl OtpSender for TracingOtpSender {
    async fn send(&self, email: &str, code: &str) -> Result<(), StowageError> {
        info!("Sign in code issued for {email}");
        debug!("Sign in code for {email}: {code}");
        Ok(())
    }
}
