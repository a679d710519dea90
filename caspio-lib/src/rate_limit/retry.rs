//! Retry policy for transient backend failures.

use std::time::Duration;

use crate::error::ApiError;

/// When and how often [`CaspioClient`](crate::CaspioClient) re-sends a request.
///
/// The client does not retry unless given a config; the core operations
/// never retry on their own.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use caspio_lib::rate_limit::RetryConfig;
///
/// let config = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(60));
///
/// assert!(!RetryConfig::no_retry().is_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first send.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Retry on HTTP 429, honouring `Retry-After` when present.
    pub retry_on_429: bool,
    /// Retry on HTTP 500, 502, 503 and 504.
    pub retry_on_5xx: bool,
    /// Retry on connection failures and timeouts.
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_on_429: true,
            retry_on_5xx: true,
            retry_on_network: true,
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_429: false,
            retry_on_5xx: false,
            retry_on_network: false,
            ..Default::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn retry_on_429(mut self, enabled: bool) -> Self {
        self.retry_on_429 = enabled;
        self
    }

    pub fn retry_on_5xx(mut self, enabled: bool) -> Self {
        self.retry_on_5xx = enabled;
        self
    }

    pub fn retry_on_network(mut self, enabled: bool) -> Self {
        self.retry_on_network = enabled;
        self
    }

    /// Returns `true` if any retry can happen at all.
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0 && (self.retry_on_429 || self.retry_on_5xx || self.retry_on_network)
    }

    /// Decides whether `error` should be retried after `attempts` retries so far.
    pub fn should_retry(&self, error: &ApiError, attempts: u32) -> bool {
        if attempts >= self.max_retries || !error.is_retryable() {
            return false;
        }
        match error {
            ApiError::Http { status: 429, .. } => self.retry_on_429,
            ApiError::Http { .. } => self.retry_on_5xx,
            ApiError::Network(_) | ApiError::Timeout(_) => self.retry_on_network,
            _ => false,
        }
    }

    /// Backoff before retry number `attempt` (0-based): `initial_delay * 2^attempt`,
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
