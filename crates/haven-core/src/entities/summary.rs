use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Modality, SummaryType};

/// Persisted AI output. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AiSummary {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub summary_type: SummaryType,
    pub content: String,
    pub modality: Modality,
    pub data_window_start: Option<DateTime<Utc>>,
    pub data_window_end: Option<DateTime<Utc>>,
    pub tokens_used: Option<u32>,
    pub created_at: DateTime<Utc>,
}
