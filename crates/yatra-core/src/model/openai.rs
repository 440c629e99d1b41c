//! OpenAI-compatible chat-completions adapter.
//!
//! Speaks the `POST {base_url}/chat/completions` protocol, which most hosted
//! and self-hosted providers accept. One HTTP request per [`ChatRequest`];
//! no streaming, no retries.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::trait_def::{ChatModel, ChatRequest};

/// Longest slice of an error body kept in the error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Resolved provider settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Provider name. Only `openai` (and compatible endpoints) is supported.
    pub provider: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token. Calls fail when absent.
    pub api_key: Option<String>,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Per-request timeout; `None` leaves it to the HTTP client.
    pub timeout: Option<Duration>,
}

impl ModelConfig {
    pub const DEFAULT_PROVIDER: &str = "openai";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Self::DEFAULT_PROVIDER.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct OpenAiChatModel {
    label: String,
    config: ModelConfig,
    client: reqwest::Client,
}

impl OpenAiChatModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self {
            label: format!("{}/{}", config.provider, config.model),
            config,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("label", &self.label)
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("no API key configured for the model provider")?;

        let body = completion_body(&self.config.model, request);
        debug!(session_id = %request.session_id, model = %self.label, "sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.label))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!(
                "{} returned {status}: {}",
                self.label,
                truncate(&text, ERROR_BODY_LIMIT)
            );
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .with_context(|| format!("{} returned an unreadable completion", self.label))?;
        reply_text(parsed)
    }
}

/// Build a [`ChatModel`] for the configured provider.
pub fn build_chat_model(config: ModelConfig) -> Result<OpenAiChatModel> {
    match config.provider.as_str() {
        "openai" => OpenAiChatModel::new(config),
        other => bail!("unsupported model provider {other:?} (expected \"openai\")"),
    }
}

fn completion_body<'a>(model: &'a str, request: &'a ChatRequest) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        messages: [
            Message {
                role: "system",
                content: &request.system_message,
            },
            Message {
                role: "user",
                content: &request.prompt,
            },
        ],
        user: &request.session_id,
    }
}

fn reply_text(response: CompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("completion contained no reply text")
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ChatRequest {
        ChatRequest {
            session_id: "trip_plan_abc".to_string(),
            system_message: "You plan trips.".to_string(),
            prompt: "Plan a 2-day trip.".to_string(),
        }
    }

    #[test]
    fn body_has_system_then_user_turn() {
        let request = sample_request();
        let body = serde_json::to_value(completion_body("gpt-4o-mini", &request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "You plan trips." },
                    { "role": "user", "content": "Plan a 2-day trip." }
                ],
                "user": "trip_plan_abc"
            })
        );
    }

    #[test]
    fn reply_text_takes_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"first"}},
                           {"message":{"role":"assistant","content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "first");
    }

    #[test]
    fn reply_text_without_choices_is_an_error() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(reply_text(response).is_err());

        let missing: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(reply_text(missing).is_err());
    }

    #[test]
    fn reply_text_with_null_content_is_an_error() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(reply_text(response).is_err());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let model = OpenAiChatModel::new(ModelConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..ModelConfig::default()
        })
        .unwrap();
        assert_eq!(model.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(model.name(), "openai/gpt-4o-mini");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = build_chat_model(ModelConfig {
            provider: "carrier-pigeon".to_string(),
            ..ModelConfig::default()
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let model = build_chat_model(ModelConfig::default()).unwrap();
        let err = model.complete(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("no API key"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("₹₹₹", 4), "₹");
        assert_eq!(truncate("short", 100), "short");
    }
}
