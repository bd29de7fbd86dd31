use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CheckInType;

/// A completed check-in. The AI reflection is attached once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckIn {
    pub id: String,
    pub client_id: String,
    pub check_in_type: CheckInType,
    pub responses: IndexMap<String, String>,
    pub ai_prompt_used: Option<String>,
    pub ai_reflection_generated: Option<String>,
    pub mood_at_check_in: Option<u8>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
