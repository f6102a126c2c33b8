//! # Scribe - Research Report Server
//!
//! Scribe turns a natural-language query into a synthesized research
//! report by orchestrating a sequence of AI-completion calls and web
//! content retrieval, then delivers progress and results over one of two
//! transports: an interactive WebSocket connection, or a durable message
//! bus with signed envelopes and bounded concurrent delivery.
//!
//! ## Pipeline
//!
//! 1. **Agent selection** - pick a response persona for the query (with a
//!    deterministic default fallback)
//! 2. **Planning** - expand the query into bounded sub-queries
//! 3. **Content acquisition** - search and fetch raw text per sub-query
//! 4. **Summarization** - chunked, concurrent per-source summaries with
//!    deterministic index-ordered aggregation
//! 5. **Synthesis** - one streaming completion call producing the report
//!
//! ## Transports
//!
//! Interactive clients connect to `/ws` and drive runs with
//! `start{json}` command frames; progress arrives as
//! `{"type": "logs"|"report"|"error"|"path", "output": ...}` frames.
//! Bus deployments run the [`bus::BusBridge`], which verifies signed
//! inbound envelopes, executes runs under a flow-control window, and
//! publishes signed progress and result envelopes.
//!
//! ## Modules
//!
//! - [`research`] - the orchestration pipeline
//! - [`llm`] - completion service clients
//! - [`retrievers`] - search providers and their registry
//! - [`scrape`] - content fetching
//! - [`channel`] - output channel abstraction
//! - [`bus`] - envelope codec, transport, bridge
//! - [`artifact`] - report persistence
//! - [`api`] - WebSocket protocol
//! - [`types`] - common types and error handling

/// HTTP API and WebSocket protocol.
pub mod api;
/// Report artifact rendering.
pub mod artifact;
/// Message-bus envelopes, transport and bridge.
pub mod bus;
/// Output channel abstraction over both transports.
pub mod channel;
/// Environment-driven configuration.
pub mod config;
/// Completion service clients.
pub mod llm;
/// Prompt builders for every pipeline stage.
pub mod prompts;
/// The research orchestration pipeline.
pub mod research;
/// Search providers.
pub mod retrievers;
/// Content fetching.
pub mod scrape;
/// Core types (tasks, reports, events, errors).
pub mod types;

pub use types::{AppError, Report, ResearchTask, Result};

use crate::artifact::ArtifactRenderer;
use crate::config::Config;
use crate::research::ResearchPipeline;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ResearchPipeline>,
    pub renderer: Arc<dyn ArtifactRenderer>,
}
