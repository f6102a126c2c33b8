//! The research orchestration pipeline.
//!
//! One [`pipeline::ResearchPipeline::run`] call takes a task from query to
//! finished report: persona selection, sub-query planning, content
//! acquisition, concurrent summarization, and report synthesis, emitting
//! progress to the bound output channel between stages.

pub mod pipeline;
pub mod summarizer;

pub use pipeline::{Persona, ResearchPipeline, Stage};
pub use summarizer::Summarizer;
