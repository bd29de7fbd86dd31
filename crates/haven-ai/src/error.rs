//! LLM error types.

use thiserror::Error;

/// Errors that can occur when calling the LLM provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// No provider credentials are configured.
    #[error("LLM provider is not configured")]
    NotConfigured,
}
