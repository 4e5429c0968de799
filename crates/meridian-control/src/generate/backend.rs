//! Chat-completions HTTP backend.
//!
//! Speaks the OpenAI-compatible protocol, which all configured providers
//! expose either natively or through a relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BackendConfig, GeneratorConfig};

use super::prompt::SYSTEM_PROMPT;
use super::{BackendError, GenerationBackend};

/// A single chat-completions endpoint with its credentials and model.
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    name: String,
    client: Client,
    api_url: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ChatCompletionsBackend {
    /// Build a backend from its configuration entry.
    pub fn new(
        backend: &BackendConfig,
        generator: &GeneratorConfig,
        api_key: SecretString,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(generator.timeout_secs))
            .build()
            .map_err(BackendError::Http)?;

        Ok(Self {
            name: backend.name.clone(),
            client,
            api_url: backend.api_url.clone(),
            api_key,
            model: backend.model.clone(),
            max_tokens: generator.max_tokens,
            temperature: generator.temperature,
        })
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(backend = %self.name, url = %self.api_url, model = %self.model, "requesting completion");
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(BackendError::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::UnexpectedStatus { status, body });
        }

        let completion: ChatResponse = response.json().await.map_err(BackendError::Http)?;
        first_choice(completion)
    }
}

fn first_choice(completion: ChatResponse) -> Result<String, BackendError> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| BackendError::Malformed("no choices in response".to_owned()))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_config() -> BackendConfig {
        BackendConfig {
            name: "aipipe".to_owned(),
            api_url: "https://aipipe.example.com/v1/chat/completions".to_owned(),
            model: "anthropic/claude-3.5-sonnet".to_owned(),
            api_key: Some(SecretString::from("sk-test".to_owned())),
        }
    }

    #[test]
    fn test_backend_construction() {
        let backend = ChatCompletionsBackend::new(
            &backend_config(),
            &GeneratorConfig::default(),
            SecretString::from("sk-test".to_owned()),
        )
        .unwrap();
        assert_eq!(backend.name(), "aipipe");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "build a clock",
                },
            ],
            max_tokens: 4096,
            temperature: 0.7,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "build a clock");
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_first_choice_extraction() {
        let completion: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "the page" } }
            ]
        }))
        .unwrap();
        assert_eq!(first_choice(completion).unwrap(), "the page");
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let completion: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        let err = first_choice(completion).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }
}
