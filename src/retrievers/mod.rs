//! Search providers.
//!
//! Sub-queries are resolved to ranked URLs through the [`SearchProvider`]
//! trait. Concrete providers are looked up by name in the
//! [`RetrieverRegistry`] once at startup, so an unknown provider name fails
//! configuration instead of failing the first query.

pub mod duckduckgo;
pub mod tavily;

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Web search capability consumed by content acquisition.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Resolve a query to ranked results, best first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Provider name as registered.
    fn name(&self) -> &str;
}

type RetrieverFactory = Box<dyn Fn(usize) -> Result<Arc<dyn SearchProvider>> + Send + Sync>;

/// Name-to-factory registry for search providers. Factories receive the
/// configured per-query result cap.
pub struct RetrieverRegistry {
    factories: HashMap<String, RetrieverFactory>,
}

impl RetrieverRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in providers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("duckduckgo", |max_results| {
            Ok(Arc::new(duckduckgo::DuckDuckGoSearch::new(max_results)))
        });
        registry.register("tavily", |max_results| {
            let api_key = std::env::var("TAVILY_API_KEY")
                .map_err(|_| AppError::Config("TAVILY_API_KEY not set".to_string()))?;
            Ok(Arc::new(tavily::TavilySearch::new(api_key, max_results)))
        });
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(usize) -> Result<Arc<dyn SearchProvider>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Construct the named provider, or fail configuration.
    pub fn resolve(&self, name: &str, max_results: usize) -> Result<Arc<dyn SearchProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AppError::Config(format!("unknown retriever: {}", name)))?;
        factory(max_results)
    }
}

impl Default for RetrieverRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_builtin() {
        let registry = RetrieverRegistry::with_builtins();
        let provider = registry
            .resolve("duckduckgo", 5)
            .expect("duckduckgo should be registered");
        assert_eq!(provider.name(), "duckduckgo");
    }

    #[test]
    fn test_registry_rejects_unknown_name() {
        let registry = RetrieverRegistry::with_builtins();
        let result = registry.resolve("serpapi", 5);
        assert!(result.is_err());
    }

    #[test]
    fn test_registry_accepts_custom_factory() {
        struct Fixed;

        #[async_trait]
        impl SearchProvider for Fixed {
            async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
                Ok(vec![])
            }

            fn name(&self) -> &str {
                "fixed"
            }
        }

        let mut registry = RetrieverRegistry::new();
        registry.register("fixed", |_| Ok(Arc::new(Fixed)));
        assert!(registry.resolve("fixed", 1).is_ok());
    }
}
