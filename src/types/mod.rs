use serde::{Deserialize, Serialize};

// ============= Research Task Types =============

/// A single research request, either received over the interactive
/// WebSocket protocol or decoded from a signed bus envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchTask {
    /// The natural-language query to research.
    #[serde(alias = "task")]
    pub query: String,
    /// Report flavor, e.g. `research_report`, `resource_report`, `outline_report`.
    pub report_type: String,
    /// Optional caller-provided persona; skips automatic agent selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Correlation identifier of the requesting user (bus runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Routing tag echoed back on every outbound bus envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

impl ResearchTask {
    pub fn new(query: impl Into<String>, report_type: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            report_type: report_type.into(),
            agent: None,
            user_id: None,
            message_type: None,
        }
    }

    /// A task with an empty query or report type is unprocessable and is
    /// dropped by the caller, never executed.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(AppError::InvalidInput("missing task query".to_string()));
        }
        if self.report_type.trim().is_empty() {
            return Err(AppError::InvalidInput("missing report_type".to_string()));
        }
        Ok(())
    }
}

/// Raw text fetched for one URL. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub url: String,
    pub raw_content: String,
}

/// Aggregated summary for one source. `summary` is empty when every chunk
/// of the source failed to summarize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub url: String,
    pub summary: String,
}

// ============= Report =============

/// Outcome of report synthesis. Exactly one variant holds; callers match
/// on the variant instead of sniffing the text for an error prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Completed markdown report text.
    Completed(String),
    /// Diagnostic message, always prefixed with `Error in generate_report:`
    /// so bus consumers see the same wire text as before.
    Failed(String),
}

impl Report {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Report::Failed(format!("Error in generate_report: {}", err))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Report::Failed(_))
    }

    /// The report text or the failure diagnostic, whichever this carries.
    pub fn text(&self) -> &str {
        match self {
            Report::Completed(text) => text,
            Report::Failed(diagnostic) => diagnostic,
        }
    }
}

// ============= Progress Events =============

/// Frame type for progress delivery, serialized as the `type` field of
/// every interactive frame and bus event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    /// Human-readable stage log line.
    Logs,
    /// Live report token (streaming channels only).
    Report,
    /// Terminal or transport failure notice.
    Error,
    /// Terminal artifact location.
    Path,
}

/// One progress frame, emitted by a pipeline stage and consumed
/// immediately by the bound output channel. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub output: String,
}

impl ProgressEvent {
    pub fn logs(output: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Logs,
            output: output.into(),
        }
    }

    pub fn report(output: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Report,
            output: output.into(),
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Error,
            output: output.into(),
        }
    }

    pub fn path(output: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Path,
            output: output.into(),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or empty task fields; the message is dropped, not executed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sub-query generation produced unparseable output; fatal to the run.
    #[error("Planning error: {0}")]
    Planning(String),

    /// Completion service call failure.
    #[error("Completion error: {0}")]
    Completion(String),

    /// Search provider failure.
    #[error("Search error: {0}")]
    Search(String),

    /// Per-URL fetch failure; swallowed by content acquisition.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Envelope signature or decode failure at the bus boundary.
    #[error("Envelope error: {0}")]
    Envelope(String),

    /// Bus transport failure (connect/subscribe/publish).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Artifact rendering failure.
    #[error("Render error: {0}")]
    Render(String),

    /// Output channel delivery failure.
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
