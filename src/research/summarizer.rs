use crate::channel::{emit_or_log, OutputChannel};
use crate::llm::{ChatMessage, CompletionClient};
use crate::prompts;
use crate::types::{ProgressEvent, SourceDocument, SourceSummary};
use futures::{stream, StreamExt};

/// Chunked, concurrent per-source summarization.
///
/// Sources are processed one at a time in accumulation order. Within a
/// source, all chunks are summarized concurrently (bounded by
/// `max_concurrent_chunks`), and the aggregated summary joins the chunk
/// summaries by chunk index, never by completion order. A failed chunk
/// contributes nothing to the join.
pub struct Summarizer<'a> {
    llm: &'a dyn CompletionClient,
    query: &'a str,
    role_prompt: &'a str,
    chunk_size: usize,
    max_concurrent_chunks: usize,
}

impl<'a> Summarizer<'a> {
    pub fn new(
        llm: &'a dyn CompletionClient,
        query: &'a str,
        role_prompt: &'a str,
        chunk_size: usize,
        max_concurrent_chunks: usize,
    ) -> Self {
        Self {
            llm,
            query,
            role_prompt,
            chunk_size: chunk_size.max(1),
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        }
    }

    /// Split raw content into fixed-size word chunks.
    pub fn chunk_words(raw_content: &str, chunk_size: usize) -> Vec<String> {
        let words: Vec<&str> = raw_content.split_whitespace().collect();
        words
            .chunks(chunk_size.max(1))
            .map(|chunk| chunk.join(" "))
            .collect()
    }

    pub async fn summarize_sources(
        &self,
        documents: &[SourceDocument],
        channel: &dyn OutputChannel,
    ) -> Vec<SourceSummary> {
        let mut summaries = Vec::with_capacity(documents.len());
        for document in documents {
            summaries.push(self.summarize_source(document, channel).await);
        }
        summaries
    }

    async fn summarize_source(
        &self,
        document: &SourceDocument,
        channel: &dyn OutputChannel,
    ) -> SourceSummary {
        let chunks = Self::chunk_words(&document.raw_content, self.chunk_size);

        // `buffered` polls up to the cap concurrently but yields results in
        // chunk order, which is what makes the aggregation deterministic.
        let chunk_summaries: Vec<String> = stream::iter(
            chunks
                .into_iter()
                .map(|chunk| self.summarize_chunk(&document.url, chunk, channel)),
        )
        .buffered(self.max_concurrent_chunks)
        .collect()
        .await;

        let summary = chunk_summaries
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        SourceSummary {
            url: document.url.clone(),
            summary,
        }
    }

    /// Summarize one chunk. Failures contribute an empty string rather than
    /// aborting the source.
    async fn summarize_chunk(
        &self,
        url: &str,
        chunk: String,
        channel: &dyn OutputChannel,
    ) -> String {
        let messages = [
            ChatMessage::system(self.role_prompt),
            ChatMessage::user(prompts::summary_prompt(self.query, &chunk)),
        ];

        match self.llm.chat(&messages, 0.0).await {
            Ok(summary) if !summary.trim().is_empty() => {
                emit_or_log(channel, ProgressEvent::logs(format!("Summarizing source: {}", url)))
                    .await;
                emit_or_log(channel, ProgressEvent::logs(summary.clone())).await;
                summary
            }
            Ok(_) => String::new(),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "chunk summarization failed");
                String::new()
            }
        }
    }
}
