use std::time::Duration;

/// Retry bounds for the transport.
///
/// Rate-limit retries sleep for the platform-signaled delay; network
/// retries use the short fixed backoff below. Structural 4xx/5xx errors
/// are never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_rate_limit_retries: u32,
    pub max_network_retries: u32,
    pub network_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 6,
            max_network_retries: 2,
            network_backoff_ms: 250,
        }
    }
}

impl RetryPolicy {
    pub fn network_delay(&self) -> Duration {
        Duration::from_millis(self.network_backoff_ms)
    }
}
