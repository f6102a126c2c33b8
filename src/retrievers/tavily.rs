use crate::retrievers::{SearchHit, SearchProvider};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily search API provider.
pub struct TavilySearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_results: usize,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
}

impl TavilySearch {
    pub fn new(api_key: String, max_results: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key,
            max_results,
        }
    }

    /// Point the provider at a different endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Tavily request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("Tavily returned an error: {}", e)))?;

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid Tavily response: {}", e)))?;

        Ok(body
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
