//! # haven-ai
//!
//! AI plumbing for Haven:
//! - [`crisis`]: keyword screening of client free text plus the fixed
//!   crisis resources message
//! - [`prompts`]: modality system prompts and the reflection, session-prep,
//!   and post-session user-turn renderers
//! - [`llm`]: the [`LlmClient`] seam and an OpenAI-compatible implementation
//! - [`generator`]: turns a prompt pair into stored-summary content with
//!   per-kind fallbacks

pub mod crisis;
pub mod generator;
pub mod llm;
pub mod prompts;

mod error;
mod http;

pub use error::AiError;
pub use generator::{Generated, SummaryGenerator};
pub use llm::{ChatMessage, ChatRole, DisabledLlm, LlmClient, LlmResponse, OpenAiCompatClient};
