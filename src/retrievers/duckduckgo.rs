use crate::retrievers::{SearchHit, SearchProvider};
use crate::types::{AppError, Result};
use async_trait::async_trait;

/// DuckDuckGo search via the daedra crate. Needs no API key, which makes it
/// the default provider.
pub struct DuckDuckGoSearch {
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("DuckDuckGo search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .map(|r| SearchHit {
                title: r.title.clone(),
                url: r.url.clone(),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
