//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `details` JSON blob. These types
//! give the common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CheckInType, Modality, SubscriptionTier};

/// Detail for `UPDATE_GOAL` and `UPDATE_HOMEWORK` status changes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `INVITE_CLIENT`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InviteDetail {
    pub email: String,
    pub client_id: String,
}

/// Detail for `UPDATE_CLIENT_MODALITY`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ModalityChangedDetail {
    pub modality: Modality,
}

/// Detail for summary-generating actions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SummaryGeneratedDetail {
    pub client_id: String,
    pub summary_id: String,
    pub tokens_used: Option<u32>,
}

/// Detail for `COMPLETE_CHECKIN`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckInDetail {
    pub check_in_type: CheckInType,
}

/// Detail for `UPGRADE_SUBSCRIPTION`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubscriptionChangedDetail {
    pub tier: SubscriptionTier,
    pub max_clients: u32,
}
