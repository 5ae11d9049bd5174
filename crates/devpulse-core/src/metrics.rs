//! Throughput instrumentation.
//!
//! Every successful fetch adds an elapsed-time-normalized rate to a pair of
//! counters keyed by source/scope/window: one call divided by its latency,
//! and the payload volume in gigabytes divided by the same latency. The
//! additive rate-per-second accumulation is the upstream-compatible metric
//! shape and must not be replaced with a gauge or an average.
//!
//! The registry is an explicitly constructed value threaded through the
//! fetch pipeline at startup; nothing here touches global state.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{CounterVec, Opts, Registry};

use devpulse_warehouse::WindowTag;

const LABELS: [&str; 3] = ["source", "scope", "window"];

/// Label applied to answer fan-out fetches, which have no page scope of
/// their own.
pub const ANSWERS_SOURCE: &str = "stackexchange_answers";
pub const ANSWERS_SCOPE: &str = "answers";

pub struct HarvestMetrics {
    registry: Registry,
    api_calls: CounterVec,
    data_collected: CounterVec,
}

impl HarvestMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let api_calls = CounterVec::new(
            Opts::new(
                "devpulse_api_calls_persecond_total",
                "Accumulated per-second call rate of upstream API fetches.",
            ),
            &LABELS,
        )?;
        let data_collected = CounterVec::new(
            Opts::new(
                "devpulse_data_collected_gigabytes_persecond_total",
                "Accumulated per-second payload volume fetched, in gigabytes.",
            ),
            &LABELS,
        )?;

        registry.register(Box::new(api_calls.clone()))?;
        registry.register(Box::new(data_collected.clone()))?;

        Ok(Self {
            registry,
            api_calls,
            data_collected,
        })
    }

    pub fn shared() -> Result<Arc<Self>, prometheus::Error> {
        Ok(Arc::new(Self::new()?))
    }

    /// Registry backing the pull-based text exposition endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one successful fetch. Called before decoding, so malformed
    /// payloads still count toward throughput.
    pub fn observe_fetch(
        &self,
        source: &str,
        scope: &str,
        window: WindowTag,
        elapsed: Duration,
        payload_bytes: usize,
    ) {
        let mut seconds = elapsed.as_secs_f64();
        if seconds == 0.0 {
            seconds = 1.0;
        }

        let call_rate = 1.0 / seconds;
        let volume_rate = payload_bytes as f64 / 1e9 / seconds;

        let labels = [source, scope, window.label()];
        self.api_calls.with_label_values(&labels).inc_by(call_rate);
        self.data_collected
            .with_label_values(&labels)
            .inc_by(volume_rate);
    }

    /// Current accumulated call-rate counter for one label set.
    pub fn api_calls_value(&self, source: &str, scope: &str, window: WindowTag) -> f64 {
        self.api_calls
            .with_label_values(&[source, scope, window.label()])
            .get()
    }

    /// Current accumulated volume-rate counter for one label set.
    pub fn data_collected_value(&self, source: &str, scope: &str, window: WindowTag) -> f64 {
        self.data_collected
            .with_label_values(&[source, scope, window.label()])
            .get()
    }
}
