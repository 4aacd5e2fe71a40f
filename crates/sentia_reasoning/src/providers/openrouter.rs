//! OpenAI-compatible chat-completions client (OpenRouter by default).

use crate::retry::{with_retry, RetryConfig};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use sentia_core::{EngineError, GenerationContext, LlmConfig, Result, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REFERER: &str = "https://github.com/sentia/sentia";
const TITLE: &str = "Sentia";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenRouterGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl OpenRouterGenerator {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            retry: RetryConfig::default(),
        })
    }

    /// Reads the API key from the environment variable named in `config`.
    pub fn from_config(config: &LlmConfig, timeout: Duration) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!(
                "{} is not set; export it or use provider = \"heuristic\"",
                config.api_key_env
            )
        })?;
        let mut generator = Self::new(api_key, &config.base_url, &config.model, timeout)?;
        generator.retry = RetryConfig::with_max_retries(config.max_retries);
        Ok(generator)
    }

    fn request<'a>(&'a self, prompt: &'a str, context: &GenerationContext) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: context.max_tokens,
            temperature: context.temperature,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str, context: &GenerationContext) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request(prompt, context);
        tracing::debug!(purpose = %context.purpose, model = %self.model, "Requesting completion");

        let response = with_retry(&self.retry, self.name(), self.timeout, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("HTTP-Referer", REFERER)
                .header("X-Title", TITLE)
                .json(&body)
                .send()
        })
        .await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::GenerationTimeout(self.timeout)
            } else {
                EngineError::GenerationError(format!("Malformed completion response: {}", e))
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| EngineError::GenerationError("Completion contained no text".to_string()))
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentia_core::GenerationPurpose;

    #[test]
    fn test_request_body_shape() {
        let generator = OpenRouterGenerator::new(
            "key".to_string(),
            "https://example.invalid/api/v1/",
            "some/model",
            Duration::from_secs(5),
        )
        .unwrap();
        let context = GenerationContext::new(GenerationPurpose::Reply, 0.7, 128);
        let body = serde_json::to_value(generator.request("hello", &context)).unwrap();

        assert_eq!(body["model"], "some/model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 128);
        assert_eq!(generator.base_url, "https://example.invalid/api/v1");
    }

    #[test]
    fn test_response_parsing_tolerates_missing_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_generation_error() {
        let mut generator = OpenRouterGenerator::new(
            "key".to_string(),
            "http://127.0.0.1:9",
            "m",
            Duration::from_secs(2),
        )
        .unwrap();
        generator.retry = RetryConfig::with_max_retries(0);
        let context = GenerationContext::new(GenerationPurpose::Reply, 0.7, 16);
        let err = generator.generate("hi", &context).await.unwrap_err();
        assert!(err.is_collaborator_failure());
    }
}
