use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("sms gateway rejected the message: {0}")]
    Rejected(String),

    #[error("sms gateway unreachable: {0}")]
    Unavailable(String),
}

/// Delivers verification codes to a phone number.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError>;
}

/// Writes the code to the log instead of a real gateway. Local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        info!(%phone, %code, "verification code (log delivery)");
        Ok(())
    }
}

/// Retries the inner sender with exponential backoff.
pub struct RetryingSmsSender<S> {
    inner: S,
    max_attempts: u32,
    backoff: Duration,
}

impl<S: SmsSender> RetryingSmsSender<S> {
    pub fn new(inner: S, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

#[async_trait]
impl<S: SmsSender> SmsSender for RetryingSmsSender<S> {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match self.inner.send_code(phone, code).await {
                Ok(()) => return Ok(()),
                Err(error) if attempt < self.max_attempts => {
                    warn!(%phone, attempt, %error, retry_in_ms = delay.as_millis() as u64, "sms delivery failed");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(%phone, attempt, %error, "sms delivery failed, giving up");
                    return Err(error);
                }
            }
        }
    }
}
