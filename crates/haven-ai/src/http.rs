//! Shared HTTP response helpers for the provider client.

use crate::error::AiError;

/// Return the response unchanged on success, otherwise [`AiError::Api`]
/// carrying the status code and response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AiError> {
    if !resp.status().is_success() {
        return Err(AiError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
