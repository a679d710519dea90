//! Client-side request pacing and retry policy.

mod limiter;
mod retry;

pub use limiter::RateLimiter;
pub use retry::RetryConfig;
