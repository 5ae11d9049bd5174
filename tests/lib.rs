//! Shared fixtures for the behavior tests: a scripted HTTP transport, a
//! recording sleeper, and upstream payload builders.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

pub use devpulse_core::{
    Credentials, EntityKind, Harvester, HarvestMetrics, HttpClient, HttpError, HttpRequest,
    HttpResponse, PageFetcher, RepoSpec, Sleeper, TagSpec, Warehouse, WarehouseConfig, WindowTag,
};

enum Script {
    Sequence(VecDeque<Result<HttpResponse, HttpError>>),
    Repeat(HttpResponse),
}

struct Route {
    url_fragment: String,
    script: Script,
}

/// Transport that answers requests by URL fragment, in scripted order.
/// Requests with no matching route (or an exhausted script) fail, so a test
/// also asserts that nothing unexpected was fetched.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL contains `fragment` with `responses`, one
    /// per request in order.
    pub fn on(
        self,
        fragment: impl Into<String>,
        responses: Vec<Result<HttpResponse, HttpError>>,
    ) -> Self {
        self.routes.lock().expect("routes").push(Route {
            url_fragment: fragment.into(),
            script: Script::Sequence(responses.into()),
        });
        self
    }

    /// Answer every request whose URL contains `fragment` with a clone of
    /// `response`.
    pub fn on_repeat(self, fragment: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.lock().expect("routes").push(Route {
            url_fragment: fragment.into(),
            script: Script::Repeat(response),
        });
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().expect("requests").clone()
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.lock().expect("requests").push(url.to_owned());

        let mut routes = self.routes.lock().expect("routes");
        for route in routes.iter_mut() {
            if !url.contains(&route.url_fragment) {
                continue;
            }
            return match &mut route.script {
                Script::Sequence(responses) => responses
                    .pop_front()
                    .unwrap_or_else(|| Err(HttpError::new(format!("script exhausted for {url}")))),
                Script::Repeat(response) => Ok(response.clone()),
            };
        }
        Err(HttpError::new(format!("unexpected request: {url}")))
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let result = self.respond(&request.url);
        Box::pin(async move { result })
    }
}

/// Sleeper that records requested delays and returns immediately, so
/// backoff schedules are observable without real waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().expect("sleep log").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().expect("sleep log").push(duration);
    }
}

/// Harvester wired to a scripted transport, a recording sleeper, and a
/// temp-dir warehouse.
pub struct HarvestRig {
    pub harvester: Harvester,
    pub warehouse: Warehouse,
    pub metrics: Arc<HarvestMetrics>,
    pub sleeper: Arc<RecordingSleeper>,
    _dir: tempfile::TempDir,
}

pub fn harvest_rig(client: Arc<ScriptedHttpClient>) -> HarvestRig {
    let dir = tempfile::tempdir().expect("tempdir");
    let warehouse =
        Warehouse::open(WarehouseConfig::at(dir.path().join("devpulse.duckdb"))).expect("open");
    let metrics = HarvestMetrics::shared().expect("metrics");
    let sleeper = Arc::new(RecordingSleeper::default());

    let fetcher =
        PageFetcher::new(client).with_sleeper(Arc::clone(&sleeper) as Arc<dyn Sleeper>);
    let harvester = Harvester::new(
        fetcher,
        Arc::clone(&metrics),
        warehouse.clone(),
        Credentials::default(),
    );

    HarvestRig {
        harvester,
        warehouse,
        metrics,
        sleeper,
        _dir: dir,
    }
}

pub fn repo(owner: &str, name: &str) -> RepoSpec {
    RepoSpec {
        owner: owner.to_owned(),
        name: name.to_owned(),
        max_items: None,
    }
}

pub fn tag(name: &str) -> TagSpec {
    TagSpec {
        name: name.to_owned(),
        max_items: 500,
    }
}

pub fn issue_json(number: i64) -> Value {
    json!({
        "number": number,
        "title": format!("issue {number}"),
        "body": "body",
        "state": "open",
        "created_at": "2026-01-10T00:00:00Z",
        "updated_at": "2026-01-11T00:00:00Z"
    })
}

pub fn issues_page(numbers: &[i64]) -> String {
    Value::Array(numbers.iter().copied().map(issue_json).collect()).to_string()
}

pub fn question_json(id: i64, is_answered: bool) -> Value {
    json!({
        "question_id": id,
        "title": format!("question {id}"),
        "body": "body",
        "is_answered": is_answered,
        "creation_date": 1_767_000_000
    })
}

pub fn questions_envelope(items: Vec<Value>, has_more: bool) -> String {
    json!({
        "items": items,
        "has_more": has_more,
        "quota_max": 300,
        "quota_remaining": 280
    })
    .to_string()
}

pub fn answers_envelope(answer_ids: &[i64]) -> String {
    let items: Vec<Value> = answer_ids
        .iter()
        .map(|id| json!({"answer_id": id, "body": "answer body"}))
        .collect();
    json!({"items": items, "has_more": false}).to_string()
}

/// `rel="next"` link header pointing at the following page.
pub fn next_link(page: u32) -> String {
    format!(r#"<https://api.github.com/x?page={page}>; rel="next""#)
}
