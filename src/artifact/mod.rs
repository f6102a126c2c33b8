//! Artifact rendering: persisting a finished report and returning its path.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

/// Collaborator that turns report text into a persisted artifact.
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    /// Persist the report and return the artifact's path.
    async fn render(&self, report: &str) -> Result<String>;
}

/// Writes reports as markdown files under the configured output directory.
pub struct MarkdownRenderer {
    output_dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ArtifactRenderer for MarkdownRenderer {
    async fn render(&self, report: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::Render(format!("Failed to create output directory: {}", e)))?;

        let path = self.output_dir.join(format!("task_{}.md", Uuid::new_v4()));
        tokio::fs::write(&path, report)
            .await
            .map_err(|e| AppError::Render(format!("Failed to write artifact: {}", e)))?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_writes_markdown_artifact() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let renderer = MarkdownRenderer::new(dir.path().join("outputs"));

        let path = renderer
            .render("# Quantum Computing\n\nFindings.")
            .await
            .expect("should render");

        assert!(path.ends_with(".md"));
        let written = std::fs::read_to_string(&path).expect("artifact should exist");
        assert!(written.starts_with("# Quantum Computing"));
    }

    #[tokio::test]
    async fn test_render_creates_unique_paths() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let renderer = MarkdownRenderer::new(dir.path());

        let first = renderer.render("a").await.expect("should render");
        let second = renderer.render("b").await.expect("should render");
        assert_ne!(first, second);
    }
}
