//! OpenAI chat-completion backend.

use super::LanguageModel;
use crate::config::LlmSettings;
use crate::error::{JamakError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sends each prompt as a single user message to a chat model.
pub struct OpenAiLanguageModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiLanguageModel {
    pub fn new(model: &str, temperature: f32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            model: model.to_string(),
            temperature,
        })
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        Self::new(&settings.model, settings.temperature, settings.timeout())
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| JamakError::OpenAI(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| JamakError::OpenAI(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            JamakError::OpenAI(format!("Chat completion failed: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| JamakError::OpenAI("Empty response from LLM".to_string()))?
            .clone();

        debug!("LLM returned {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        // Construction makes no API call.
        let settings = LlmSettings {
            model: "test-model".to_string(),
            ..Default::default()
        };
        let llm = OpenAiLanguageModel::from_settings(&settings).unwrap();
        assert_eq!(llm.model(), "test-model");
        assert_eq!(llm.temperature, 0.7);
    }
}
