use crate::error::{DeliveryError, TransportError};
use crate::infrastructure::{self, MailboxTransport};
use instant::Duration;
use mailbox_session_core::{ActorId, MessageError, SessionMessage};
use std::sync::Arc;

/// Retry tuning for the delivery pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delivery attempts before giving up
    pub max_attempts: u32,

    /// Unit for the exponential backoff between attempts
    pub base_delay: Duration,

    /// Interval between balance polls while waiting for funding
    pub funding_poll_interval: Duration,

    /// Total time to wait on funding before retrying anyway
    pub funding_wait_cap: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            funding_poll_interval: Duration::from_secs(2),
            funding_wait_cap: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_funding_poll_interval(mut self, interval: Duration) -> Self {
        self.funding_poll_interval = interval;
        self
    }

    pub fn with_funding_wait_cap(mut self, cap: Duration) -> Self {
        self.funding_wait_cap = cap;
        self
    }
}

/// Shields callers from transient relay failures
///
/// Relay sends are cost-bearing and have propagation latency, so a
/// failed attempt backs off exponentially; a funding-classed failure
/// instead waits on the balance, since retrying an unfunded send loses
/// deterministically. Only exhausted failures reach the caller.
pub struct ReliableSendPipeline {
    transport: Arc<dyn MailboxTransport>,
    config: RetryConfig,
}

impl ReliableSendPipeline {
    pub fn new(transport: Arc<dyn MailboxTransport>) -> Self {
        Self::with_config(transport, RetryConfig::default())
    }

    pub fn with_config(transport: Arc<dyn MailboxTransport>, config: RetryConfig) -> Self {
        ReliableSendPipeline { transport, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Deliver with the configured attempt budget
    pub async fn send(
        &self,
        target: &ActorId,
        message: &SessionMessage,
    ) -> Result<(), DeliveryError> {
        self.send_with_attempts(target, message, self.config.max_attempts)
            .await
    }

    /// Deliver with an explicit attempt budget
    pub async fn send_with_attempts(
        &self,
        target: &ActorId,
        message: &SessionMessage,
        max_attempts: u32,
    ) -> Result<(), DeliveryError> {
        let payload = match message.to_wire() {
            Ok(payload) => payload,
            Err(MessageError::Encode(source)) | Err(MessageError::Malformed(source)) => {
                return Err(DeliveryError {
                    attempts: 0,
                    source: TransportError::Serialization(source),
                });
            }
        };

        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.transport.send_message(target, &payload).await {
                Ok(()) => {
                    tracing::debug!("delivered to {} on attempt {}", target, attempt);
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        "send attempt {}/{} to {} failed: {}",
                        attempt,
                        max_attempts,
                        target,
                        err
                    );

                    if attempt >= max_attempts {
                        return Err(DeliveryError {
                            attempts: attempt,
                            source: err,
                        });
                    }

                    let delay = self.config.base_delay * 2u32.pow(attempt - 1);
                    if err.is_funding_related() {
                        self.wait_for_funding(delay).await;
                    } else {
                        infrastructure::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// Wait until the balance turns positive, bounded by the configured
    /// cap. Checks start after `initial_delay` to give an in-flight
    /// replenishment time to land.
    async fn wait_for_funding(&self, initial_delay: Duration) {
        infrastructure::sleep(initial_delay).await;

        let mut waited = initial_delay;
        loop {
            match self.transport.get_balance().await {
                Ok(balance) if balance > 0 => {
                    tracing::debug!("funding available: {} unit(s)", balance);
                    return;
                }
                Ok(_) => tracing::debug!("balance still empty"),
                Err(err) => tracing::warn!("balance query failed: {}", err),
            }

            if waited >= self.config.funding_wait_cap {
                tracing::warn!("funding wait cap reached after {:?}", waited);
                return;
            }

            infrastructure::sleep(self.config.funding_poll_interval).await;
            waited += self.config.funding_poll_interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builders() {
        let config = RetryConfig::default()
            .with_max_attempts(5)
            .with_base_delay(Duration::from_millis(250))
            .with_funding_poll_interval(Duration::from_millis(500))
            .with_funding_wait_cap(Duration::from_secs(5));

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.funding_poll_interval, Duration::from_millis(500));
        assert_eq!(config.funding_wait_cap, Duration::from_secs(5));
    }
}
