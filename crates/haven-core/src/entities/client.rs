use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Modality;

/// A client of exactly one therapist.
///
/// Created by an invite; `invite_token` is cleared once the invite is claimed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClientProfile {
    pub id: String,
    pub user_id: String,
    pub therapist_id: String,
    pub primary_modality: Modality,
    pub treatment_goals_summary: Option<String>,
    pub session_frequency: Option<String>,
    pub onboarding_complete: bool,
    pub is_active: bool,
    pub invite_token: Option<String>,
    pub invite_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
