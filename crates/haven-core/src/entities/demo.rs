use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DemoRequestStatus;

/// Public "request a demo" submission.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DemoRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub practice_name: Option<String>,
    pub practice_size: Option<String>,
    pub message: Option<String>,
    pub status: DemoRequestStatus,
    pub created_at: DateTime<Utc>,
}
