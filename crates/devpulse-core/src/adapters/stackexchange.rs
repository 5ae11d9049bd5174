//! Stack Exchange questions adapter.
//!
//! Pagination is signalled by the `has_more` field of the response
//! envelope; the lookback window is expressed as a unix-epoch `fromdate`
//! query parameter. Questions flagged `is_answered` additionally trigger a
//! single, independently backoff-guarded fetch of their answers.

use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;

use devpulse_warehouse::WindowTag;

use crate::adapters::window_cutoff;
use crate::backoff::{BackoffPolicy, BackoffState};
use crate::error::FetchError;
use crate::fetch::{PageFetcher, RawPage};
use crate::http_client::{HttpAuth, HttpRequest};
use crate::metrics::{HarvestMetrics, ANSWERS_SCOPE, ANSWERS_SOURCE};
use crate::records::{Answer, Question};
use crate::source::SourceId;
use crate::walker::{PageBatch, PageQuery};

const STACKEXCHANGE_API: &str = "https://api.stackexchange.com/2.3";
const SITE: &str = "stackoverflow";
const PAGE_SIZE: u32 = 30;
// API-console filter ids selecting body fields in the responses.
const QUESTION_FILTER: &str = "!9_bDDxJY5";
const ANSWER_FILTER: &str = "!nNPvSNdWme";

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    #[serde(default)]
    items: Vec<Question>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    quota_max: Option<i64>,
    #[serde(default)]
    quota_remaining: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AnswersEnvelope {
    #[serde(default)]
    items: Vec<Answer>,
}

pub struct QuestionsQuery {
    tag: String,
    api_key: Option<String>,
    fromdate: Option<i64>,
}

impl QuestionsQuery {
    pub fn new(tag: &str, api_key: Option<&str>, window: WindowTag) -> Self {
        let fromdate =
            window_cutoff(window, OffsetDateTime::now_utc()).map(OffsetDateTime::unix_timestamp);

        Self {
            tag: tag.to_owned(),
            api_key: api_key.map(str::to_owned),
            fromdate,
        }
    }

    /// Override the computed cutoff; deterministic URLs for tests.
    pub fn with_fromdate(mut self, fromdate: Option<i64>) -> Self {
        self.fromdate = fromdate;
        self
    }
}

impl PageQuery for QuestionsQuery {
    type Record = Question;

    fn source(&self) -> SourceId {
        SourceId::StackExchange
    }

    fn scope_label(&self) -> &str {
        &self.tag
    }

    fn page_url(&self, page: u32) -> String {
        let mut url = format!(
            "{STACKEXCHANGE_API}/questions?order=desc&sort=creation&tagged={}&site={SITE}\
             &filter={}&pagesize={PAGE_SIZE}&page={page}",
            urlencoding::encode(&self.tag),
            urlencoding::encode(QUESTION_FILTER),
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        if let Some(fromdate) = self.fromdate {
            url.push_str(&format!("&fromdate={fromdate}"));
        }
        url
    }

    fn auth(&self) -> HttpAuth {
        // The API key travels in the query string, not a header.
        HttpAuth::None
    }

    fn decode(&self, page: &RawPage) -> Result<PageBatch<Question>, FetchError> {
        let envelope: QuestionsEnvelope = serde_json::from_str(&page.body)?;
        if let (Some(max), Some(remaining)) = (envelope.quota_max, envelope.quota_remaining) {
            tracing::debug!(tag = %self.tag, quota_max = max, quota_remaining = remaining, "quota");
        }
        Ok(PageBatch {
            records: envelope.items,
            has_more: envelope.has_more,
        })
    }
}

/// Secondary fan-out: one non-paginated answers request per answered
/// question, guarded by its own backoff sequence.
#[derive(Clone)]
pub struct AnswerFetcher {
    fetcher: PageFetcher,
    metrics: Arc<HarvestMetrics>,
    api_key: Option<String>,
    backoff: BackoffPolicy,
}

impl AnswerFetcher {
    pub fn new(
        fetcher: PageFetcher,
        metrics: Arc<HarvestMetrics>,
        api_key: Option<String>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            fetcher,
            metrics,
            api_key,
            backoff,
        }
    }

    fn answers_url(&self, question_id: i64, window: WindowTag) -> String {
        let mut url = format!(
            "{STACKEXCHANGE_API}/questions/{question_id}/answers?order=desc&sort=activity\
             &site={SITE}&filter={}",
            urlencoding::encode(ANSWER_FILTER),
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        if let Some(fromdate) =
            window_cutoff(window, OffsetDateTime::now_utc()).map(OffsetDateTime::unix_timestamp)
        {
            url.push_str(&format!("&fromdate={fromdate}"));
        }
        url
    }

    /// Fetch all answers of one question, tagged with the question's
    /// window and id.
    pub async fn fetch_for_question(
        &self,
        question_id: i64,
        window: WindowTag,
    ) -> Result<Vec<Answer>, FetchError> {
        let request = HttpRequest::get(self.answers_url(question_id, window));
        let mut backoff = BackoffState::new(&self.backoff);
        let raw = self.fetcher.fetch(request, &mut backoff).await?;

        self.metrics.observe_fetch(
            ANSWERS_SOURCE,
            ANSWERS_SCOPE,
            window,
            raw.elapsed,
            raw.payload_bytes(),
        );

        let envelope: AnswersEnvelope = serde_json::from_str(&raw.body)?;
        Ok(envelope
            .items
            .into_iter()
            .map(|mut answer| {
                answer.question_id = question_id;
                answer
            })
            .collect())
    }
}
