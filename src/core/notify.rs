use crate::error::StowageError;

/// Delivers one-time sign in codes to users.
#[async_trait::async_trait]
pub trait OtpSender {
    /// * `email`: Recipient.
    /// * `code`: The plain code.
    async fn send(&self, email: &str, code: &str) -> Result<(), StowageError>;
}
