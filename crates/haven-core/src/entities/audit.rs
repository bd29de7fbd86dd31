use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, ResourceType, Role};

/// An append-only audit log entry recording a state-changing procedure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLog {
    pub id: String,
    pub user_id: String,
    pub user_role: Option<Role>,
    pub action: AuditAction,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
