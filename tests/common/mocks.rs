//! Mock collaborators for testing.
//!
//! These stand in for the completion service, search provider, content
//! fetcher, artifact renderer and output channel, so pipeline and bridge
//! behavior can be exercised without network access.

use async_trait::async_trait;
use futures::stream;
use scribe::artifact::ArtifactRenderer;
use scribe::channel::OutputChannel;
use scribe::config::ResearchConfig;
use scribe::llm::{ChatMessage, CompletionClient, TokenStream};
use scribe::retrievers::{SearchHit, SearchProvider};
use scribe::scrape::ContentFetcher;
use scribe::types::{AppError, ProgressEvent, Result, SourceDocument};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A research config with small, test-friendly defaults.
pub fn research_config() -> ResearchConfig {
    ResearchConfig {
        retriever: "mock".to_string(),
        max_iterations: 3,
        chunk_size: 10_000,
        max_concurrent_chunks: 8,
        max_search_results: 5,
        total_words: 800,
        report_format: "APA".to_string(),
        output_dir: "outputs".to_string(),
    }
}

/// Canned structured output for the persona-selection call.
pub fn persona_json() -> &'static str {
    r#"{"agent": "🔬 Science Agent", "agent_role_prompt": "You are a science researcher AI assistant."}"#
}

/// Canned structured output for the planner call.
pub fn subqueries_json() -> &'static str {
    r#"["quantum computing basics", "quantum computing applications"]"#
}

// ============= Completion Service =============

/// What one mock completion call should do.
pub struct ChatOutcome {
    pub delay: Duration,
    pub result: Result<String>,
}

impl ChatOutcome {
    pub fn ok(text: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(text.to_string()),
        }
    }

    pub fn ok_after(text: &str, delay: Duration) -> Self {
        Self {
            delay,
            result: Ok(text.to_string()),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(AppError::Completion(message.to_string())),
        }
    }

    pub fn err_after(message: &str, delay: Duration) -> Self {
        Self {
            delay,
            result: Err(AppError::Completion(message.to_string())),
        }
    }
}

type Responder = Box<dyn Fn(usize, &[ChatMessage]) -> ChatOutcome + Send + Sync>;

/// Scripted completion client. The responder decides each call's outcome
/// from the zero-based call index and the request messages; every request
/// is recorded for later assertions.
pub struct MockCompletionClient {
    responder: Responder,
    calls: AtomicUsize,
    recorded: Mutex<Vec<Vec<ChatMessage>>>,
    gauge: Option<Arc<ConcurrencyGauge>>,
}

impl MockCompletionClient {
    /// Always answer with the same text.
    pub fn new(response: &str) -> Self {
        let response = response.to_string();
        Self::with_responder(move |_, _| ChatOutcome::ok(&response))
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::with_responder(|_, _| ChatOutcome::err("Mock completion failure"))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(usize, &[ChatMessage]) -> ChatOutcome + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
            gauge: None,
        }
    }

    /// Track how many calls run concurrently.
    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<Vec<ChatMessage>> {
        self.recorded.lock().expect("mock lock poisoned").clone()
    }

    async fn respond(&self, messages: &[ChatMessage]) -> Result<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded
            .lock()
            .expect("mock lock poisoned")
            .push(messages.to_vec());

        let outcome = (self.responder)(index, messages);
        let _guard = self
            .gauge
            .as_ref()
            .map(|gauge| ConcurrencyGuard::enter(Arc::clone(gauge)));
        if !outcome.delay.is_zero() {
            tokio::time::sleep(outcome.delay).await;
        }
        outcome.result
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn chat(&self, messages: &[ChatMessage], _temperature: f32) -> Result<String> {
        self.respond(messages).await
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> Result<TokenStream> {
        let text = self.respond(messages).await?;
        let tokens: Vec<Result<String>> = text
            .split_inclusive(' ')
            .map(|token| Ok(token.to_string()))
            .collect();
        Ok(Box::new(stream::iter(tokens)))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// High-water mark of concurrent mock completion calls.
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: AtomicUsize::new(0),
            max: AtomicUsize::new(0),
        })
    }

    pub fn max_seen(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

struct ConcurrencyGuard(Arc<ConcurrencyGauge>);

impl ConcurrencyGuard {
    fn enter(gauge: Arc<ConcurrencyGauge>) -> Self {
        let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.max.fetch_max(now, Ordering::SeqCst);
        Self(gauge)
    }
}

impl Drop for ConcurrencyGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============= Search Provider =============

pub struct MockSearchProvider {
    hits: Vec<SearchHit>,
    fail: bool,
}

impl MockSearchProvider {
    /// Return the same ranked URLs for every query.
    pub fn new(urls: &[&str]) -> Self {
        Self {
            hits: urls
                .iter()
                .map(|url| SearchHit {
                    title: format!("Result for {}", url),
                    url: url.to_string(),
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        if self.fail {
            return Err(AppError::Search("Mock search failure".to_string()));
        }
        Ok(self.hits.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============= Content Fetcher =============

/// Fetcher that knows a fixed set of pages; unknown URLs are dropped, the
/// same way the real fetcher drops failures.
pub struct MockFetcher {
    pages: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, content)| (url.to_string(), content.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, urls: &[String]) -> Vec<SourceDocument> {
        urls.iter()
            .filter_map(|url| {
                self.pages.get(url).map(|content| SourceDocument {
                    url: url.clone(),
                    raw_content: content.clone(),
                })
            })
            .collect()
    }
}

// ============= Artifact Renderer =============

pub struct MockRenderer {
    rendered: Mutex<Vec<String>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            rendered: Mutex::new(Vec::new()),
        }
    }

    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl ArtifactRenderer for MockRenderer {
    async fn render(&self, report: &str) -> Result<String> {
        let mut rendered = self.rendered.lock().expect("mock lock poisoned");
        rendered.push(report.to_string());
        Ok(format!("outputs/task_{}.md", rendered.len()))
    }
}

// ============= Output Channel =============

/// Channel that records every emitted event.
pub struct CollectingChannel {
    events: Mutex<Vec<ProgressEvent>>,
    streaming: bool,
}

impl CollectingChannel {
    pub fn new(streaming: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            streaming,
        }
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl OutputChannel for CollectingChannel {
    async fn emit(&self, event: ProgressEvent) -> Result<()> {
        self.events.lock().expect("mock lock poisoned").push(event);
        Ok(())
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }
}
