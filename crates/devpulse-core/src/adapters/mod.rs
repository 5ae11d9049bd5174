//! Source adapters translating upstream URL schemes, pagination signals,
//! and JSON envelopes into the generic shapes the walker operates on.

pub mod github;
pub mod stackexchange;

pub use github::IssuesQuery;
pub use stackexchange::{AnswerFetcher, QuestionsQuery};

use time::OffsetDateTime;

use devpulse_warehouse::WindowTag;

/// Instant `days` before now, used as the upstream time filter for the
/// rolling lookback windows. Returns `None` for the all-time pass.
pub(crate) fn window_cutoff(window: WindowTag, now: OffsetDateTime) -> Option<OffsetDateTime> {
    window
        .lookback_days()
        .map(|days| now - time::Duration::days(days))
}
