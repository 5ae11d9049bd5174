use thiserror::Error;

/// Failure modes of one logical fetch (a page walk or an answer fan-out).
///
/// Throttling (HTTP 429) never surfaces here: the fetcher absorbs it with
/// backoff and retries the same request. Everything below abandons the
/// current logical fetch and is recovered by the caller moving on to the
/// next window or source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode page payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("shutdown requested during backoff wait")]
    Cancelled,
}
