use std::time::Duration;

use ipcplot_transport::Endpoint;
use ipcplot_wire::WireLayout;

/// Pause between attempts while the endpoint is busy.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// What to do while the endpoint reports busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed sleep between attempts. Default: 500 ms.
    pub backoff: Duration,
    /// Maximum connect attempts per cycle. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn unbounded(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    pub fn bounded(backoff: Duration, max_attempts: u32) -> Self {
        Self {
            backoff,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// True when attempt number `attempt` (1-based) may be followed by
    /// another.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

/// Configuration for a [`ChannelClient`](crate::ChannelClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Channel to connect to.
    pub endpoint: Endpoint,
    /// Busy-endpoint retry behavior.
    pub retry: RetryPolicy,
    /// Host record layout.
    pub layout: WireLayout,
    /// Per-read/write timeout on the connected stream. `None` blocks.
    pub io_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            retry: RetryPolicy::default(),
            layout: WireLayout::default(),
            io_timeout: None,
        }
    }

    /// Config for the channel named after the calling process.
    pub fn for_current_process() -> Self {
        Self::new(Endpoint::for_current_process())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_layout(mut self, layout: WireLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_current_process()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_is_unbounded_half_second() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.backoff, Duration::from_millis(500));
        assert_eq!(retry.max_attempts, None);
        assert!(retry.allows_retry_after(u32::MAX - 1));
    }

    #[test]
    fn bounded_retry_stops_at_ceiling() {
        let retry = RetryPolicy::bounded(Duration::from_millis(10), 3);
        assert!(retry.allows_retry_after(1));
        assert!(retry.allows_retry_after(2));
        assert!(!retry.allows_retry_after(3));
        assert_eq!(RetryPolicy::bounded(Duration::ZERO, 0).max_attempts, Some(1));
    }

    #[test]
    fn default_config_targets_current_process() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint.id(), std::process::id().to_string());
        assert_eq!(config.layout, WireLayout::default());
        assert_eq!(config.io_timeout, None);
    }
}
