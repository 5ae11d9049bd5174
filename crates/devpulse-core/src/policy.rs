use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::source::SourceId;

/// Per-upstream quota and retry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePolicy {
    pub source_id: SourceId,
    /// Window over which `quota_limit` requests are allowed.
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub retry_backoff: BackoffPolicy,
}

impl SourcePolicy {
    /// Authenticated GitHub REST quota is 5000 requests/hour.
    pub fn github_default() -> Self {
        Self {
            source_id: SourceId::Github,
            quota_window: Duration::from_secs(3600),
            quota_limit: 5000,
            retry_backoff: BackoffPolicy::default(),
        }
    }

    /// Stack Exchange allows bursts of roughly 30 requests/second; keyed
    /// apps get a 10k daily quota which the envelope reports back to us.
    pub fn stackexchange_default() -> Self {
        Self {
            source_id: SourceId::StackExchange,
            quota_window: Duration::from_secs(1),
            quota_limit: 25,
            retry_backoff: BackoffPolicy::default(),
        }
    }

    pub fn default_for(source_id: SourceId) -> Self {
        match source_id {
            SourceId::Github => Self::github_default(),
            SourceId::StackExchange => Self::stackexchange_default(),
        }
    }
}
