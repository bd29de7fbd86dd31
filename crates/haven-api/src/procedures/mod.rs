//! Procedure routers.
//!
//! Inputs deserialize from camelCase JSON. Every state-changing procedure
//! records one audit entry through [`crate::ApiContext::audit`].

pub mod audit;
pub mod auth;
pub mod client_app;
pub mod demo;
pub mod onboarding;
pub mod subscription;
pub mod therapist;

use serde::{Deserialize, Serialize};

/// Plain acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

/// Input naming a single client profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub client_id: String,
}

/// Generated summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutput {
    pub summary: String,
}

/// Result of a crisis-screened client submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedOutput {
    pub success: bool,
    pub crisis_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_reflection: Option<String>,
}

impl ScreenedOutput {
    #[must_use]
    pub fn crisis() -> Self {
        Self {
            success: true,
            crisis_detected: true,
            crisis_response: Some(haven_ai::crisis::CRISIS_RESPONSE.to_string()),
            ai_reflection: None,
        }
    }

    #[must_use]
    pub const fn saved(ai_reflection: Option<String>) -> Self {
        Self {
            success: true,
            crisis_detected: false,
            crisis_response: None,
            ai_reflection,
        }
    }
}
