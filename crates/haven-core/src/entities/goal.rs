use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{GoalStatus, Modality};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TherapyGoal {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub goal_text: String,
    pub modality: Modality,
    pub status: GoalStatus,
    pub progress_notes: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub achieved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
