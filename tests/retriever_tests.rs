//! Tests for the Tavily search provider against a mock HTTP endpoint.

use scribe::retrievers::{tavily::TavilySearch, SearchProvider};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_tavily_search_returns_ranked_hits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "Quantum computing - Wikipedia", "url": "https://en.wikipedia.org/wiki/Quantum_computing"},
                {"title": "What is quantum computing?", "url": "https://example.com/qc"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = TavilySearch::new("test-key".to_string(), 2)
        .with_endpoint(format!("{}/search", server.uri()));

    let hits = provider
        .search("quantum computing")
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Quantum_computing");
    assert_eq!(hits[1].url, "https://example.com/qc");
    assert_eq!(provider.name(), "tavily");
}

#[tokio::test]
async fn test_tavily_search_empty_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let provider = TavilySearch::new("test-key".to_string(), 5)
        .with_endpoint(format!("{}/search", server.uri()));

    let hits = provider.search("nothing").await.expect("search should succeed");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_tavily_search_error_status_is_search_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = TavilySearch::new("bad-key".to_string(), 5)
        .with_endpoint(format!("{}/search", server.uri()));

    let result = provider.search("quantum computing").await;
    assert!(matches!(result, Err(scribe::AppError::Search(_))));
}
