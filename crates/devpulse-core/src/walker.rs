//! Pagination walker.
//!
//! Drives the fetcher across successive pages of one logical query until
//! the continuation signal ends or the item cap is reached. Pages are
//! strictly sequential; page N is always fetched before page N+1.

use std::sync::Arc;

use async_trait::async_trait;

use devpulse_warehouse::WindowTag;

use crate::backoff::{BackoffPolicy, BackoffState};
use crate::error::FetchError;
use crate::fetch::{PageFetcher, RawPage};
use crate::http_client::{HttpAuth, HttpRequest};
use crate::metrics::HarvestMetrics;
use crate::pacing::PacingQueue;
use crate::source::SourceId;

/// Decoded records of one page plus the adapter's continuation signal.
#[derive(Debug)]
pub struct PageBatch<R> {
    pub records: Vec<R>,
    pub has_more: bool,
}

/// One paginated upstream query: URL scheme, auth, and payload decoding.
///
/// The lookback cutoff is baked in at construction so every page of a walk
/// filters against the same instant.
pub trait PageQuery {
    type Record;

    fn source(&self) -> SourceId;

    /// Metric/log label for the logical filter (repo path or tag).
    fn scope_label(&self) -> &str;

    fn page_url(&self, page: u32) -> String;

    fn auth(&self) -> HttpAuth;

    fn request(&self, page: u32) -> HttpRequest {
        HttpRequest::get(self.page_url(page)).with_auth(&self.auth())
    }

    /// Decode a raw page into records and the continuation signal.
    fn decode(&self, page: &RawPage) -> Result<PageBatch<Self::Record>, FetchError>;
}

/// Destination for decoded records. Persistence failures are handled (and
/// logged) inside the sink; they never abort the walk.
#[async_trait]
pub trait RecordSink<R>: Send + Sync {
    async fn deliver(&self, record: R, window: WindowTag);
}

pub struct PageWalker {
    fetcher: PageFetcher,
    metrics: Arc<HarvestMetrics>,
    backoff: BackoffPolicy,
    pacing: Option<PacingQueue>,
}

impl PageWalker {
    pub fn new(fetcher: PageFetcher, metrics: Arc<HarvestMetrics>, backoff: BackoffPolicy) -> Self {
        Self {
            fetcher,
            metrics,
            backoff,
            pacing: None,
        }
    }

    pub fn with_pacing(mut self, pacing: PacingQueue) -> Self {
        self.pacing = Some(pacing);
        self
    }

    /// Walk all pages of `query`, routing each record through `sink` under
    /// `window`, and return the number of records ingested.
    ///
    /// The cap is enforced mid-page: excess items in an over-full final
    /// page are discarded. A decode failure abandons the whole walk; the
    /// failed page's records are never delivered.
    pub async fn walk<Q, S>(
        &self,
        query: &Q,
        window: WindowTag,
        item_cap: usize,
        sink: &S,
    ) -> Result<usize, FetchError>
    where
        Q: PageQuery + Sync,
        Q::Record: Send,
        S: RecordSink<Q::Record>,
    {
        let mut page: u32 = 1;
        let mut ingested: usize = 0;

        loop {
            if let Some(pacing) = &self.pacing {
                if let Err(wait) = pacing.acquire() {
                    tracing::debug!(
                        source = %query.source(),
                        scope = query.scope_label(),
                        wait_secs = wait.as_secs_f64(),
                        "pacing quota spent, waiting"
                    );
                    self.fetcher.pause(wait).await?;
                }
            }

            tracing::debug!(
                source = %query.source(),
                scope = query.scope_label(),
                window = %window,
                page,
                "fetching page"
            );

            // Backoff state is scoped to one page fetch and its retries.
            let mut backoff = BackoffState::new(&self.backoff);
            let raw = self.fetcher.fetch(query.request(page), &mut backoff).await?;

            self.metrics.observe_fetch(
                query.source().as_str(),
                query.scope_label(),
                window,
                raw.elapsed,
                raw.payload_bytes(),
            );

            let batch = query.decode(&raw)?;

            for record in batch.records {
                if ingested >= item_cap {
                    break;
                }
                sink.deliver(record, window).await;
                ingested += 1;
            }

            if !batch.has_more || ingested >= item_cap {
                break;
            }
            page += 1;
        }

        tracing::info!(
            source = %query.source(),
            scope = query.scope_label(),
            window = %window,
            ingested,
            "walk complete"
        );
        Ok(ingested)
    }
}
