use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{HomeworkStatus, Modality};

/// Between-session work assigned by a therapist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HomeworkAssignment {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub title: String,
    pub description: String,
    pub modality: Modality,
    pub due_date: Option<DateTime<Utc>>,
    pub status: HomeworkStatus,
    pub completion_notes: Option<String>,
    pub therapist_review_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
