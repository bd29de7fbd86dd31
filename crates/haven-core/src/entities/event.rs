use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EventType;

/// A client-logged emotional event. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EmotionalEvent {
    pub id: String,
    pub client_id: String,
    pub event_type: EventType,
    pub intensity: u8,
    pub description: Option<String>,
    pub triggers: Option<String>,
    pub coping_strategies_used: Option<String>,
    pub location: Option<String>,
    pub shared_with_therapist: bool,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
