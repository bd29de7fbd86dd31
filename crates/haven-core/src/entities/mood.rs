use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single mood log. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MoodEntry {
    pub id: String,
    pub client_id: String,
    /// 1-10.
    pub mood_score: u8,
    pub energy_level: Option<u8>,
    pub anxiety_level: Option<u8>,
    /// 0-24.
    pub sleep_hours: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
