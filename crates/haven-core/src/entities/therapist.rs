use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{SubscriptionStatus, SubscriptionTier};

/// Practice details for a user with the therapist role.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TherapistProfile {
    pub id: String,
    pub user_id: String,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub specialties: Option<String>,
    pub bio: Option<String>,
    pub practice_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: SubscriptionStatus,
    pub max_clients: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
