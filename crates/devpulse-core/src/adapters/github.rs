//! GitHub issues adapter.
//!
//! Pagination is signalled by a `rel="next"` relation in the `Link`
//! response header; the lookback window is expressed as an RFC3339 `since`
//! query parameter.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use devpulse_warehouse::WindowTag;

use crate::adapters::window_cutoff;
use crate::error::FetchError;
use crate::fetch::RawPage;
use crate::http_client::{HttpAuth, HttpRequest};
use crate::records::Issue;
use crate::source::SourceId;
use crate::walker::{PageBatch, PageQuery};

const GITHUB_API: &str = "https://api.github.com";

pub struct IssuesQuery {
    owner: String,
    repo: String,
    scope: String,
    auth: HttpAuth,
    since: Option<String>,
}

impl IssuesQuery {
    pub fn new(owner: &str, repo: &str, token: Option<&str>, window: WindowTag) -> Self {
        let since = window_cutoff(window, OffsetDateTime::now_utc())
            .and_then(|cutoff| cutoff.format(&Rfc3339).ok());

        Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            scope: format!("{owner}/{repo}"),
            auth: match token {
                Some(token) => HttpAuth::Token(token.to_owned()),
                None => HttpAuth::None,
            },
            since,
        }
    }

    /// Override the computed cutoff; deterministic URLs for tests.
    pub fn with_since(mut self, since: Option<String>) -> Self {
        self.since = since;
        self
    }
}

impl PageQuery for IssuesQuery {
    type Record = Issue;

    fn source(&self) -> SourceId {
        SourceId::Github
    }

    fn scope_label(&self) -> &str {
        &self.scope
    }

    fn page_url(&self, page: u32) -> String {
        let mut url = format!(
            "{GITHUB_API}/repos/{}/{}/issues?page={page}",
            self.owner, self.repo
        );
        if let Some(since) = &self.since {
            url.push_str("&since=");
            url.push_str(&urlencoding::encode(since));
        }
        url
    }

    fn auth(&self) -> HttpAuth {
        self.auth.clone()
    }

    fn request(&self, page: u32) -> HttpRequest {
        HttpRequest::get(self.page_url(page))
            .with_header("accept", "application/vnd.github.v3+json")
            .with_auth(&self.auth)
    }

    fn decode(&self, page: &RawPage) -> Result<PageBatch<Issue>, FetchError> {
        let records: Vec<Issue> = serde_json::from_str(&page.body)?;
        let has_more = page
            .header("link")
            .is_some_and(|link| link.contains(r#"rel="next""#));
        Ok(PageBatch { records, has_more })
    }
}
