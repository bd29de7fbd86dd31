//! LLM provider seam.
//!
//! [`LlmClient`] is the only thing procedures depend on. Production uses
//! [`OpenAiCompatClient`]; tests substitute fakes that record calls.

use async_trait::async_trait;
use haven_config::LlmConfig;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::http::check_response;

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// Message content is kept as raw JSON; providers occasionally return
/// structured content parts instead of a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl LlmResponse {
    /// Text of the first choice, if it is a JSON string.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .as_ref()?
            .as_str()
    }

    #[must_use]
    pub fn total_tokens(&self) -> Option<u32> {
        self.usage.and_then(|u| u.total_tokens)
    }

    /// Convenience constructor for a single text choice.
    #[must_use]
    pub fn from_text(text: impl Into<String>, total_tokens: Option<u32>) -> Self {
        Self {
            choices: vec![Choice {
                message: Some(ChoiceMessage {
                    content: Some(serde_json::Value::String(text.into())),
                }),
            }],
            usage: total_tokens.map(|t| Usage {
                prompt_tokens: None,
                completion_tokens: None,
                total_tokens: Some(t),
            }),
        }
    }
}

// ── Trait ──────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one chat completion.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] on transport failure, a non-success status, or an
    /// unparseable body.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiError>;
}

// ── OpenAI-compatible client ───────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Chat completions client for any OpenAI-compatible endpoint.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::NotConfigured`] when no api key is set.
    pub fn from_config(config: &LlmConfig) -> Result<Self, AiError> {
        let config = config.require().map_err(|_| AiError::NotConfigured)?;
        Ok(Self {
            http: reqwest::Client::new(),
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
        };
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;

        let text = resp.text().await?;
        let parsed: LlmResponse =
            serde_json::from_str(&text).map_err(|e| AiError::Parse(e.to_string()))?;
        tracing::debug!(
            model = %self.model,
            tokens_used = ?parsed.total_tokens(),
            "chat completion"
        );
        Ok(parsed)
    }
}

/// Stand-in used when no provider is configured; every call fails with
/// [`AiError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLlm;

#[async_trait]
impl LlmClient for DisabledLlm {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<LlmResponse, AiError> {
        Err(AiError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_body_shape() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn parses_provider_response() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "1. What helped?"}}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
        }"#;
        let resp: LlmResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text(), Some("1. What helped?"));
        assert_eq!(resp.total_tokens(), Some(120));
    }

    #[test]
    fn non_string_content_has_no_text() {
        let raw = r#"{"choices": [{"message": {"content": [{"type": "text", "text": "x"}]}}]}"#;
        let resp: LlmResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text(), None);
        assert_eq!(resp.total_tokens(), None);
    }

    #[test]
    fn empty_choices_have_no_text() {
        let resp: LlmResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.first_text(), None);
    }

    #[test]
    fn unconfigured_client_is_rejected() {
        let err = OpenAiCompatClient::from_config(&LlmConfig::default()).err();
        assert!(matches!(err, Some(AiError::NotConfigured)));
    }

    #[test]
    fn configured_client_targets_completions_url() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/v1/".into(),
            api_key: "sk-test".into(),
            model: "llama3".into(),
        };
        let client = OpenAiCompatClient::from_config(&config).unwrap();
        assert_eq!(client.url, "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model(), "llama3");
    }

    #[tokio::test]
    async fn disabled_llm_always_fails() {
        let err = DisabledLlm.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(err, Err(AiError::NotConfigured)));
    }
}
