//! Summary generation: prompt pair in, stored-summary content out.

use crate::error::AiError;
use crate::llm::{ChatMessage, LlmClient};
use crate::prompts::{
    self, PostSessionInput, PromptPair, ReflectionInput, SessionPrepInput,
};

pub const REFLECTION_FALLBACK: &str =
    "Unable to generate reflection prompts at this time. Please try again later.";
pub const SESSION_PREP_FALLBACK: &str = "Unable to generate session summary at this time.";
pub const POST_SESSION_FALLBACK: &str = "Unable to generate post-session summary at this time.";

/// Generated text plus the provider's `usage.total_tokens`, when reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Sends exactly one system and one user message per call.
pub struct SummaryGenerator<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> SummaryGenerator<'a> {
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// # Errors
    ///
    /// Propagates transport and API errors from the provider.
    pub async fn reflection(&self, input: &ReflectionInput) -> Result<Generated, AiError> {
        self.generate(prompts::reflection_prompt(input), REFLECTION_FALLBACK)
            .await
    }

    /// # Errors
    ///
    /// Propagates transport and API errors from the provider.
    pub async fn session_prep(&self, input: &SessionPrepInput) -> Result<Generated, AiError> {
        self.generate(prompts::session_prep(input), SESSION_PREP_FALLBACK)
            .await
    }

    /// # Errors
    ///
    /// Propagates transport and API errors from the provider.
    pub async fn post_session(&self, input: &PostSessionInput) -> Result<Generated, AiError> {
        self.generate(prompts::post_session(input), POST_SESSION_FALLBACK)
            .await
    }

    async fn generate(&self, pair: PromptPair, fallback: &str) -> Result<Generated, AiError> {
        let messages = [ChatMessage::system(pair.system), ChatMessage::user(pair.user)];
        let response = self.llm.complete(&messages).await?;

        let text = response.first_text().filter(|t| !t.trim().is_empty());
        let content = if let Some(text) = text {
            text.to_string()
        } else {
            tracing::warn!("LLM returned no text content, using fallback");
            fallback.to_string()
        };

        Ok(Generated {
            content,
            tokens_used: response.total_tokens(),
        })
    }
}
