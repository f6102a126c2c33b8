use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stream of partial completion tokens.
pub type TokenStream = Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>;

/// Completion service abstraction.
///
/// Every pipeline stage that needs the AI provider goes through this trait,
/// so tests can substitute scripted clients and providers can be swapped
/// without touching stage logic.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue a chat completion and return the full response text.
    async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;

    /// Issue a streaming chat completion, yielding partial tokens.
    async fn chat_stream(&self, messages: &[ChatMessage], temperature: f32)
        -> Result<TokenStream>;

    /// Model identifier this client is bound to.
    fn model_name(&self) -> &str;
}

/// Completion provider endpoints the factory can construct clients for.
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API or any compatible endpoint (OpenRouter, vLLM, ...).
    OpenAi { api_key: String, api_base: String },
}

impl Provider {
    /// Create a client bound to one model on this provider.
    pub fn create_client(&self, model: &str) -> Arc<dyn CompletionClient> {
        match self {
            Provider::OpenAi { api_key, api_base } => Arc::new(super::openai::OpenAiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.to_string(),
            )),
        }
    }
}

/// Model-keyed client factory. The pipeline asks for a smart-model client
/// (selection, planning, synthesis) and a fast-model client (chunk
/// summaries) from the same provider.
pub struct CompletionFactory {
    provider: Provider,
}

impl CompletionFactory {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub fn client(&self, model: &str) -> Arc<dyn CompletionClient> {
        self.provider.create_client(model)
    }
}
