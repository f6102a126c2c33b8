//! Content acquisition: raw page text per URL.
//!
//! Fetching is deliberately lossy. A URL that cannot be fetched or yields
//! no text is dropped and the run continues with whatever succeeded.

use crate::types::{AppError, Result, SourceDocument};
use async_trait::async_trait;
use futures::future::join_all;

/// Bulk page-text fetcher consumed by the orchestrator.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch raw text for each URL. Partial results allowed; per-URL
    /// failures are dropped silently.
    async fn fetch(&self, urls: &[String]) -> Vec<SourceDocument>;
}

/// Fetcher backed by daedra's page-visit tool, which downloads a page and
/// reduces it to readable text.
pub struct PageFetcher;

impl PageFetcher {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_one(&self, url: &str) -> Result<SourceDocument> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        let page = daedra::tools::fetch::fetch_page(&fetch_args)
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if page.content.trim().is_empty() {
            return Err(AppError::Fetch(format!("Empty content for {}", url)));
        }

        Ok(SourceDocument {
            url: url.to_string(),
            raw_content: page.content,
        })
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for PageFetcher {
    async fn fetch(&self, urls: &[String]) -> Vec<SourceDocument> {
        let results = join_all(urls.iter().map(|url| self.fetch_one(url))).await;

        results
            .into_iter()
            .zip(urls)
            .filter_map(|(result, url)| match result {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "dropping unfetchable url");
                    None
                }
            })
            .collect()
    }
}
