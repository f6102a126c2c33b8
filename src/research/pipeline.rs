use crate::channel::{emit_or_log, OutputChannel};
use crate::config::ResearchConfig;
use crate::llm::{ChatMessage, CompletionClient};
use crate::prompts::{self, ReportType};
use crate::research::summarizer::Summarizer;
use crate::retrievers::SearchProvider;
use crate::scrape::ContentFetcher;
use crate::types::{
    AppError, ProgressEvent, Report, ResearchTask, Result, SourceDocument, SourceSummary,
};
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Pipeline progression for one run. `Error` is reachable from every
/// non-terminal stage and surfaces as the `Err` arm of [`ResearchPipeline::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    AgentSelected,
    QueriesPlanned,
    ContentFetched,
    Summarized,
    ReportGenerated,
    Done,
}

/// The voice the completion service adopts for this run.
#[derive(Debug, Clone)]
pub struct Persona {
    pub name: String,
    pub role_prompt: String,
}

impl Persona {
    fn default_agent() -> Self {
        Self {
            name: prompts::DEFAULT_AGENT.to_string(),
            role_prompt: prompts::DEFAULT_AGENT_ROLE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct PersonaChoice {
    agent: String,
    agent_role_prompt: String,
}

/// Sequences one research run from task to report.
///
/// Stateless across runs: a task and everything derived from it belong to
/// exactly one `run` call, while the pipeline itself is shared behind an
/// `Arc` by all connections and bridge workers.
pub struct ResearchPipeline {
    smart: Arc<dyn CompletionClient>,
    fast: Arc<dyn CompletionClient>,
    retriever: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    config: ResearchConfig,
}

impl ResearchPipeline {
    pub fn new(
        smart: Arc<dyn CompletionClient>,
        fast: Arc<dyn CompletionClient>,
        retriever: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            smart,
            fast,
            retriever,
            fetcher,
            config,
        }
    }

    /// Execute the full stage sequence, emitting progress between stages.
    ///
    /// Expected domain failures (persona selection, per-URL fetches,
    /// per-chunk summaries, report synthesis) never surface as `Err`; only
    /// planning failures and unexpected collaborator faults during planning
    /// or content acquisition abort the run.
    pub async fn run(
        &self,
        task: &ResearchTask,
        channel: &dyn OutputChannel,
    ) -> Result<Report> {
        task.validate()?;
        let started = Instant::now();
        let mut stage = Stage::Init;

        emit_or_log(
            channel,
            ProgressEvent::logs(format!(
                "Starting the research task for query: {}",
                task.query
            )),
        )
        .await;

        let persona = self.select_agent(task).await;
        self.advance(&mut stage, Stage::AgentSelected, channel, persona.name.clone())
            .await;

        let sub_queries = self.plan_queries(task, &persona).await?;
        self.advance(
            &mut stage,
            Stage::QueriesPlanned,
            channel,
            format!(
                "Running research for the following queries: {}",
                sub_queries.join(", ")
            ),
        )
        .await;

        let documents = self.acquire_content(&sub_queries, channel).await?;
        self.advance(
            &mut stage,
            Stage::ContentFetched,
            channel,
            format!("Gathered content from {} sources", documents.len()),
        )
        .await;

        let summaries = self.summarize(task, &persona, &documents, channel).await;
        self.advance(
            &mut stage,
            Stage::Summarized,
            channel,
            format!("Summarized {} sources, writing the report...", summaries.len()),
        )
        .await;

        let report = self
            .generate_report(task, &persona, &summaries, channel)
            .await;
        self.advance(
            &mut stage,
            Stage::ReportGenerated,
            channel,
            format!(
                "Total run time: {:.2} seconds",
                started.elapsed().as_secs_f64()
            ),
        )
        .await;

        stage = Stage::Done;
        tracing::debug!(?stage, query = %task.query, "research run finished");
        Ok(report)
    }

    async fn advance(
        &self,
        stage: &mut Stage,
        next: Stage,
        channel: &dyn OutputChannel,
        message: String,
    ) {
        emit_or_log(channel, ProgressEvent::logs(message)).await;
        tracing::debug!(from = ?*stage, to = ?next, "stage transition");
        *stage = next;
    }

    /// Pick the response persona. The only stage with a built-in fallback:
    /// any failure, from the call itself to malformed structured output,
    /// resolves to the default persona with no retry and no propagation.
    async fn select_agent(&self, task: &ResearchTask) -> Persona {
        if let Some(agent) = &task.agent {
            return Persona {
                name: agent.clone(),
                role_prompt: prompts::DEFAULT_AGENT_ROLE.to_string(),
            };
        }

        let messages = [
            ChatMessage::system(prompts::auto_agent_instructions()),
            ChatMessage::user(format!("task: {}", task.query)),
        ];

        match self.smart.chat(&messages, 0.0).await {
            Ok(response) => match serde_json::from_str::<PersonaChoice>(&response) {
                Ok(choice) => Persona {
                    name: choice.agent,
                    role_prompt: choice.agent_role_prompt,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "malformed persona choice, using default agent");
                    Persona::default_agent()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "persona selection failed, using default agent");
                Persona::default_agent()
            }
        }
    }

    /// Expand the task into bounded sub-queries. Malformed planner output
    /// is fatal: the run aborts before any content acquisition begins.
    async fn plan_queries(&self, task: &ResearchTask, persona: &Persona) -> Result<Vec<String>> {
        let max_iterations = self.config.effective_iterations();
        let messages = [
            ChatMessage::system(&persona.role_prompt),
            ChatMessage::user(prompts::search_queries_prompt(&task.query, max_iterations)),
        ];

        let response = self.smart.chat(&messages, 0.0).await?;

        let sub_queries: Vec<String> = serde_json::from_str(&response).map_err(|e| {
            AppError::Planning(format!("sub-query generation returned malformed output: {}", e))
        })?;

        Ok(sub_queries.into_iter().take(max_iterations).collect())
    }

    /// Resolve each sub-query to URLs and fetch their text. Individual
    /// fetch failures are dropped inside the fetcher; a search provider
    /// fault is unexpected and aborts the run.
    async fn acquire_content(
        &self,
        sub_queries: &[String],
        channel: &dyn OutputChannel,
    ) -> Result<Vec<SourceDocument>> {
        let mut documents = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();

        for sub_query in sub_queries {
            emit_or_log(
                channel,
                ProgressEvent::logs(format!("Running research for '{}'...", sub_query)),
            )
            .await;

            let hits = self.retriever.search(sub_query).await?;
            let urls: Vec<String> = hits
                .into_iter()
                .map(|hit| hit.url)
                .filter(|url| visited.insert(url.clone()))
                .collect();

            documents.extend(self.fetcher.fetch(&urls).await);
        }

        Ok(documents)
    }

    async fn summarize(
        &self,
        task: &ResearchTask,
        persona: &Persona,
        documents: &[SourceDocument],
        channel: &dyn OutputChannel,
    ) -> Vec<SourceSummary> {
        let summarizer = Summarizer::new(
            self.fast.as_ref(),
            &task.query,
            &persona.role_prompt,
            self.config.chunk_size,
            self.config.max_concurrent_chunks,
        );
        summarizer.summarize_sources(documents, channel).await
    }

    /// Final synthesis call. Failure is data, not an error: the returned
    /// report carries the diagnostic and the caller decides how to surface
    /// it.
    async fn generate_report(
        &self,
        task: &ResearchTask,
        persona: &Persona,
        summaries: &[SourceSummary],
        channel: &dyn OutputChannel,
    ) -> Report {
        let context = summaries
            .iter()
            .map(|s| format!("Source: {}\nSummary: {}", s.url, s.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        let report_type = ReportType::parse(&task.report_type);
        let messages = [
            ChatMessage::system(&persona.role_prompt),
            ChatMessage::user(report_type.prompt(
                &task.query,
                &context,
                &self.config.report_format,
                self.config.total_words,
            )),
        ];

        if channel.supports_streaming() {
            let mut stream = match self.smart.chat_stream(&messages, 0.0).await {
                Ok(stream) => stream,
                Err(e) => return Report::failed(e),
            };

            let mut report_text = String::new();
            while let Some(token) = stream.next().await {
                match token {
                    Ok(token) => {
                        emit_or_log(channel, ProgressEvent::report(token.clone())).await;
                        report_text.push_str(&token);
                    }
                    Err(e) => return Report::failed(e),
                }
            }
            Report::Completed(report_text)
        } else {
            match self.smart.chat(&messages, 0.0).await {
                Ok(text) => Report::Completed(text),
                Err(e) => Report::failed(e),
            }
        }
    }
}
