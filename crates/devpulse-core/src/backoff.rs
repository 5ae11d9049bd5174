//! Exponential backoff for throttled requests.

use std::time::Duration;

/// Delay schedule applied when an upstream answers HTTP 429.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling the delay never exceeds.
    pub max_delay: Duration,
    /// Multiplier applied after each consecutive throttled response.
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

/// Per-sequence retry delay state.
///
/// Owned by exactly one in-flight fetch-and-retry sequence: reset at the
/// start of each logical fetch, advanced on every consecutive throttled
/// response, never persisted across sequences.
#[derive(Debug, Clone)]
pub struct BackoffState {
    current: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl BackoffState {
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            current: policy.initial_delay.min(policy.max_delay),
            max_delay: policy.max_delay,
            multiplier: policy.multiplier,
        }
    }

    /// Delay to wait before the next retry.
    pub fn delay(&self) -> Duration {
        self.current
    }

    /// Advance the schedule after a throttled response.
    pub fn advance(&mut self) {
        let scaled = self.current.as_secs_f64() * self.multiplier;
        let capped = scaled.min(self.max_delay.as_secs_f64());
        self.current = Duration::from_secs_f64(capped);
    }
}
