//! Core contracts for devpulse.
//!
//! This crate contains:
//! - Upstream source identifiers, quota policies, and retry backoff
//! - The HTTP client abstraction and the rate-limit-aware page fetcher
//! - The pagination walker and the GitHub / Stack Exchange adapters
//! - Harvest orchestration, throughput metrics, and shutdown signalling

pub mod adapters;
pub mod backoff;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod http_client;
pub mod metrics;
pub mod pacing;
pub mod policy;
pub mod records;
pub mod shutdown;
pub mod source;
pub mod walker;

pub use adapters::{AnswerFetcher, IssuesQuery, QuestionsQuery};
pub use backoff::{BackoffPolicy, BackoffState};
pub use devpulse_warehouse::{
    AnswerRow, EntityKind, IssueRow, QuestionRow, Warehouse, WarehouseConfig, WarehouseError,
    WindowTag,
};
pub use error::FetchError;
pub use fetch::{PageFetcher, RawPage, Sleeper, TokioSleeper};
pub use harvest::{Credentials, Harvester, RepoSpec, SourceList, TagSpec};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use metrics::HarvestMetrics;
pub use pacing::PacingQueue;
pub use policy::SourcePolicy;
pub use records::{Answer, Issue, Question};
pub use shutdown::ShutdownHandle;
pub use source::SourceId;
pub use walker::{PageBatch, PageQuery, PageWalker, RecordSink};
