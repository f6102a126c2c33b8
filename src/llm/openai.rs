use crate::llm::client::{ChatMessage, CompletionClient, Role, TokenStream};
use crate::types::{AppError, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use futures::StreamExt;

/// Completion client for OpenAI-compatible chat endpoints.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
        }
    }

    fn convert_messages(messages: &[ChatMessage]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|msg| match msg.role {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(msg.content.clone()),
                ),
                // The pipeline never replays assistant turns; anything that
                // is not a system message goes out as user content.
                Role::User | Role::Assistant => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(msg.content.clone()),
                ),
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(temperature)
            .messages(Self::convert_messages(messages))
            .build()
            .map_err(|e| AppError::Completion(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::Completion(format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Completion("No response from provider".to_string()))
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<TokenStream> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(temperature)
            .messages(Self::convert_messages(messages))
            .build()
            .map_err(|e| AppError::Completion(format!("Failed to build request: {}", e)))?;

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AppError::Completion(format!("OpenAI API error: {}", e)))?;

        let token_stream = async_stream::stream! {
            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => {
                        for choice in response.choices {
                            if let Some(content) = choice.delta.content {
                                yield Ok(content);
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::Completion(format!("Stream error: {}", e)));
                    }
                }
            }
        };

        Ok(Box::new(Box::pin(token_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
