use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use aria_core::config::LlmConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A system prompt and the user's message, sent in that order.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints (Groq, OpenAI, Ollama).
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ChatCompletionsClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build chat-completions HTTP client")?;
        Ok(Self::new(
            http,
            config.effective_base_url(),
            config.api_key.clone(),
            config.model.clone(),
            config.max_retries,
        ))
    }

    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
            max_retries,
            retry_backoff: Duration::from_millis(250),
        }
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, body: &ChatCompletionBody<'_>) -> Result<String, AttemptError> {
        let mut request = self.http.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| AttemptError::Retryable(anyhow!(error)))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let error = anyhow!("chat completion returned HTTP {}: {}", status.as_u16(), detail);
            return Err(if is_retryable(status) {
                AttemptError::Retryable(error)
            } else {
                AttemptError::Fatal(error)
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| AttemptError::Fatal(anyhow!("invalid chat completion body: {error}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AttemptError::Fatal(anyhow!("chat completion has no message content")))
    }
}

enum AttemptError {
    Retryable(anyhow::Error),
    Fatal(anyhow::Error),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut attempt = 0;
        loop {
            match self.attempt(&body).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::Retryable(error)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "agent.llm.retry",
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "chat completion failed; retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(AttemptError::Retryable(error)) => {
                    bail!("chat completion failed after {} attempts: {error}", attempt + 1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::{ChatCompletionsClient, CompletionRequest, LlmClient};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "Eres ARIA.".to_string(),
            user: "¿Cómo van las ventas?".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
        }
    }

    fn client(server: &MockServer, max_retries: u32) -> ChatCompletionsClient {
        ChatCompletionsClient::new(
            reqwest::Client::new(),
            &format!("{}/openai/v1", server.base_url()),
            Some("gsk-test".to_string().into()),
            "llama-3.3-70b-versatile",
            max_retries,
        )
        .with_retry_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn sends_system_then_user_with_bearer_auth() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/v1/chat/completions")
                    .header("authorization", "Bearer gsk-test")
                    .json_body(json!({
                        "model": "llama-3.3-70b-versatile",
                        "messages": [
                            {"role": "system", "content": "Eres ARIA."},
                            {"role": "user", "content": "¿Cómo van las ventas?"}
                        ],
                        "temperature": 0.3,
                        "max_tokens": 4096
                    }));
                then.status(200).json_body(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "Van bien."}}]
                }));
            })
            .await;

        let text = client(&server, 0).complete(&request()).await.expect("completion");

        mock.assert_async().await;
        assert_eq!(text, "Van bien.");
    }

    #[tokio::test]
    async fn server_errors_are_retried_up_to_the_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let result = client(&server, 2).complete(&request()).await;

        assert!(result.is_err());
        mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn client_errors_fail_immediately() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(401).json_body(json!({"error": {"message": "Invalid API Key"}}));
            })
            .await;

        let error = client(&server, 3).complete(&request()).await.expect_err("401 should fail");

        mock.assert_hits_async(1).await;
        assert!(error.to_string().contains("401"));
    }
}
