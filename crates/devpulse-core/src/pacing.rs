//! Client-side request pacing.
//!
//! Spreads page requests inside each upstream's documented quota so the
//! poller rarely trips server-side throttling in the first place. HTTP 429
//! handling still lives in the fetcher; this queue only suggests a polite
//! wait before the request goes out.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::policy::SourcePolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct PacingQueue {
    limiter: Arc<DirectRateLimiter>,
    deny_delay: Duration,
}

impl PacingQueue {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let safe_limit = quota_limit.max(1);
        let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);

        let quota = quota_from_window(quota_window, safe_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            deny_delay: Duration::from_secs_f64(seconds_per_cell),
        }
    }

    pub fn from_policy(policy: &SourcePolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit)
    }

    /// Tries to take rate budget for one request. When budget is exhausted
    /// the recommended wait before re-checking is returned.
    pub fn acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }
        Err(self.deny_delay)
    }
}

fn quota_from_window(quota_window: Duration, safe_limit: u32) -> Quota {
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}
