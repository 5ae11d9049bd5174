//! Harvest orchestration.
//!
//! One cycle walks every configured repository and tag once per window
//! (all-time first, then each rolling lookback), persisting records as they
//! arrive. Walk failures are logged and the cycle moves on; only a shutdown
//! request aborts the cycle early.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use devpulse_warehouse::{Warehouse, WindowTag};

use crate::adapters::{AnswerFetcher, IssuesQuery, QuestionsQuery};
use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::metrics::HarvestMetrics;
use crate::pacing::PacingQueue;
use crate::policy::SourcePolicy;
use crate::records::{Issue, Question};
use crate::source::SourceId;
use crate::walker::{PageWalker, RecordSink};

const DEFAULT_TAG_CAP: usize = 500;

fn default_tag_cap() -> usize {
    DEFAULT_TAG_CAP
}

/// One GitHub repository to watch.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSpec {
    pub owner: String,
    pub name: String,
    /// Per-window item cap; unlimited when absent.
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl RepoSpec {
    fn item_cap(&self) -> usize {
        self.max_items.unwrap_or(usize::MAX)
    }
}

/// One Stack Overflow tag to watch.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSpec {
    pub name: String,
    #[serde(default = "default_tag_cap")]
    pub max_items: usize,
}

/// Everything one harvest cycle covers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceList {
    #[serde(default)]
    pub repos: Vec<RepoSpec>,
    #[serde(default)]
    pub tags: Vec<TagSpec>,
}

/// Upstream credentials. Both are optional; unauthenticated requests work
/// against much smaller quotas.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub stackexchange_key: Option<String>,
}

struct IssueSink {
    warehouse: Warehouse,
}

#[async_trait]
impl RecordSink<Issue> for IssueSink {
    async fn deliver(&self, record: Issue, window: WindowTag) {
        if let Err(error) = self.warehouse.insert_issue(window, &record.to_row()) {
            tracing::error!(
                github_id = record.github_id,
                window = %window,
                %error,
                "failed to persist issue"
            );
        }
    }
}

/// Persists questions and fans out one answers fetch per answered question.
/// Answer fetch failures are logged and skipped; the question walk goes on.
struct QuestionSink {
    warehouse: Warehouse,
    answers: AnswerFetcher,
}

#[async_trait]
impl RecordSink<Question> for QuestionSink {
    async fn deliver(&self, record: Question, window: WindowTag) {
        if let Err(error) = self.warehouse.insert_question(window, &record.to_row()) {
            tracing::error!(
                question_id = record.question_id,
                window = %window,
                %error,
                "failed to persist question"
            );
        }

        if !record.is_answered {
            return;
        }

        match self.answers.fetch_for_question(record.question_id, window).await {
            Ok(answers) => {
                for answer in answers {
                    if let Err(error) = self.warehouse.insert_answer(window, &answer.to_row()) {
                        tracing::error!(
                            answer_id = answer.answer_id,
                            question_id = record.question_id,
                            window = %window,
                            %error,
                            "failed to persist answer"
                        );
                    }
                }
            }
            Err(error) => {
                tracing::warn!(
                    question_id = record.question_id,
                    window = %window,
                    %error,
                    "answers fetch failed, skipping"
                );
            }
        }
    }
}

pub struct Harvester {
    fetcher: PageFetcher,
    metrics: Arc<HarvestMetrics>,
    warehouse: Warehouse,
    credentials: Credentials,
    github_policy: SourcePolicy,
    stackexchange_policy: SourcePolicy,
    github_pacing: PacingQueue,
    stackexchange_pacing: PacingQueue,
}

impl Harvester {
    pub fn new(
        fetcher: PageFetcher,
        metrics: Arc<HarvestMetrics>,
        warehouse: Warehouse,
        credentials: Credentials,
    ) -> Self {
        let github_policy = SourcePolicy::default_for(SourceId::Github);
        let stackexchange_policy = SourcePolicy::default_for(SourceId::StackExchange);
        let github_pacing = PacingQueue::from_policy(&github_policy);
        let stackexchange_pacing = PacingQueue::from_policy(&stackexchange_policy);

        Self {
            fetcher,
            metrics,
            warehouse,
            credentials,
            github_policy,
            stackexchange_policy,
            github_pacing,
            stackexchange_pacing,
        }
    }

    fn issue_walker(&self) -> PageWalker {
        PageWalker::new(
            self.fetcher.clone(),
            Arc::clone(&self.metrics),
            self.github_policy.retry_backoff.clone(),
        )
        .with_pacing(self.github_pacing.clone())
    }

    fn question_walker(&self) -> PageWalker {
        PageWalker::new(
            self.fetcher.clone(),
            Arc::clone(&self.metrics),
            self.stackexchange_policy.retry_backoff.clone(),
        )
        .with_pacing(self.stackexchange_pacing.clone())
    }

    /// Walk one repository's issues for one window.
    pub async fn harvest_issues(
        &self,
        repo: &RepoSpec,
        window: WindowTag,
    ) -> Result<usize, FetchError> {
        let query = IssuesQuery::new(
            &repo.owner,
            &repo.name,
            self.credentials.github_token.as_deref(),
            window,
        );
        let sink = IssueSink {
            warehouse: self.warehouse.clone(),
        };
        self.issue_walker()
            .walk(&query, window, repo.item_cap(), &sink)
            .await
    }

    /// Walk one tag's questions for one window, fanning out answers for
    /// answered questions as they arrive.
    pub async fn harvest_questions(
        &self,
        tag: &TagSpec,
        window: WindowTag,
    ) -> Result<usize, FetchError> {
        let query = QuestionsQuery::new(
            &tag.name,
            self.credentials.stackexchange_key.as_deref(),
            window,
        );
        let sink = QuestionSink {
            warehouse: self.warehouse.clone(),
            answers: AnswerFetcher::new(
                self.fetcher.clone(),
                Arc::clone(&self.metrics),
                self.credentials.stackexchange_key.clone(),
                self.stackexchange_policy.retry_backoff.clone(),
            ),
        };
        self.question_walker()
            .walk(&query, window, tag.max_items, &sink)
            .await
    }

    /// Run one full cycle over every source and every window. Failed walks
    /// are logged and skipped; a shutdown request ends the cycle early.
    pub async fn run_cycle(&self, sources: &SourceList) -> Result<(), FetchError> {
        for repo in &sources.repos {
            for window in WindowTag::ALL {
                match self.harvest_issues(repo, window).await {
                    Ok(_) => {}
                    Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                    Err(error) => {
                        tracing::error!(
                            owner = %repo.owner,
                            repo = %repo.name,
                            window = %window,
                            %error,
                            "issue walk failed"
                        );
                    }
                }
            }
        }

        for tag in &sources.tags {
            for window in WindowTag::ALL {
                match self.harvest_questions(tag, window).await {
                    Ok(_) => {}
                    Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                    Err(error) => {
                        tracing::error!(
                            tag = %tag.name,
                            window = %window,
                            %error,
                            "question walk failed"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_list_decodes_with_defaults() {
        let sources: SourceList = serde_json::from_str(
            r#"{
                "repos": [
                    {"owner": "golang", "name": "go"},
                    {"owner": "rust-lang", "name": "rust", "max_items": 100}
                ],
                "tags": [
                    {"name": "go"},
                    {"name": "rust", "max_items": 50}
                ]
            }"#,
        )
        .expect("decodes");

        assert_eq!(sources.repos.len(), 2);
        assert_eq!(sources.repos[0].max_items, None);
        assert_eq!(sources.repos[0].item_cap(), usize::MAX);
        assert_eq!(sources.repos[1].item_cap(), 100);
        assert_eq!(sources.tags[0].max_items, DEFAULT_TAG_CAP);
        assert_eq!(sources.tags[1].max_items, 50);
    }

    #[test]
    fn empty_source_list_is_valid() {
        let sources: SourceList = serde_json::from_str("{}").expect("decodes");
        assert!(sources.repos.is_empty());
        assert!(sources.tags.is_empty());
    }
}
