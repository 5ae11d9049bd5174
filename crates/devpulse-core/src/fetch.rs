//! Rate-limit-aware page fetching.
//!
//! One call performs one HTTP GET and classifies the outcome: a successful
//! page, a throttled response (retried in place after a backoff wait), or a
//! transport failure (abandoned, not retried). Backoff delay state belongs
//! to the calling sequence and is passed in by the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::backoff::BackoffState;
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::shutdown::ShutdownHandle;

/// One fetched page before decoding: payload plus the observations the
/// instrumentation layer needs even when decoding later fails.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub elapsed: Duration,
}

impl RawPage {
    pub fn payload_bytes(&self) -> usize {
        self.body.len()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Timer abstraction so tests can observe backoff waits without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Clone)]
pub struct PageFetcher {
    http: Arc<dyn HttpClient>,
    sleeper: Arc<dyn Sleeper>,
    shutdown: ShutdownHandle,
}

impl PageFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            sleeper: Arc::new(TokioSleeper),
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown(&self) -> &ShutdownHandle {
        &self.shutdown
    }

    /// Sleep for `delay` unless shutdown is requested first.
    pub async fn pause(&self, delay: Duration) -> Result<(), FetchError> {
        tokio::select! {
            () = self.shutdown.wait() => Err(FetchError::Cancelled),
            () = self.sleeper.sleep(delay) => Ok(()),
        }
    }

    /// Fetch one URL, retrying the identical request through `backoff` for
    /// as long as the upstream answers HTTP 429.
    ///
    /// Elapsed time and payload size in the returned [`RawPage`] cover the
    /// final (successful) round trip only.
    pub async fn fetch(
        &self,
        request: HttpRequest,
        backoff: &mut BackoffState,
    ) -> Result<RawPage, FetchError> {
        loop {
            if self.shutdown.is_requested() {
                return Err(FetchError::Cancelled);
            }

            let started = Instant::now();
            let response = self
                .http
                .execute(request.clone())
                .await
                .map_err(|e| FetchError::Transport(e.message().to_owned()))?;
            let elapsed = started.elapsed();

            if response.is_throttled() {
                let delay = backoff.delay();
                tracing::warn!(
                    url = %request.url,
                    delay_secs = delay.as_secs_f64(),
                    "rate limit exceeded, backing off"
                );
                self.pause(delay).await?;
                backoff.advance();
                continue;
            }

            if !response.is_success() {
                return Err(FetchError::Transport(format!(
                    "unexpected status {} from {}",
                    response.status, request.url
                )));
            }

            return Ok(RawPage {
                status: response.status,
                headers: response.headers,
                body: response.body,
                elapsed,
            });
        }
    }
}
