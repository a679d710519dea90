//! Sliding window rate limiter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Caps the number of requests sent within a sliding time window.
///
/// Clones share one window, so several clients using the same integration
/// can share a quota.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use caspio_lib::rate_limit::RateLimiter;
///
/// let limiter = RateLimiter::per_minute(500);
/// assert_eq!(limiter.window(), Duration::from_secs(60));
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    sent: Mutex<VecDeque<Instant>>,
    capacity: u32,
    window: Duration,
}

impl RateLimiter {
    /// Allows at most `capacity` requests in any `window`.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                sent: Mutex::new(VecDeque::with_capacity(capacity as usize)),
                capacity: capacity.max(1),
                window,
            }),
        }
    }

    pub fn per_second(capacity: u32) -> Self {
        Self::new(capacity, Duration::from_secs(1))
    }

    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, Duration::from_secs(60))
    }

    /// Waits until a request may be sent, then records it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut sent = self.inner.sent.lock().await;
                let now = Instant::now();
                self.evict(&mut sent, now);

                if (sent.len() as u32) < self.inner.capacity {
                    sent.push_back(now);
                    return;
                }

                sent.front()
                    .map(|oldest| (*oldest + self.inner.window).saturating_duration_since(now))
            };

            if let Some(wait) = wait {
                log::trace!("rate limit reached, waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Number of requests that could be sent right now without waiting.
    pub async fn available(&self) -> u32 {
        let mut sent = self.inner.sent.lock().await;
        self.evict(&mut sent, Instant::now());
        self.inner.capacity.saturating_sub(sent.len() as u32)
    }

    pub fn capacity(&self) -> u32 {
        self.inner.capacity
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    fn evict(&self, sent: &mut VecDeque<Instant>, now: Instant) {
        while let Some(ts) = sent.front() {
            if now.duration_since(*ts) >= self.inner.window {
                sent.pop_front();
            } else {
                break;
            }
        }
    }
}
