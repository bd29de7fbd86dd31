//! Therapist profile update builder.

use serde::{Deserialize, Serialize};

/// Practice fields a therapist may edit. Also used as the create payload
/// when a user becomes a therapist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TherapistProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_name: Option<String>,
}

impl TherapistProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.license_number.is_none()
            && self.license_state.is_none()
            && self.specialties.is_none()
            && self.bio.is_none()
            && self.practice_name.is_none()
    }
}

pub struct TherapistProfileUpdateBuilder(TherapistProfileUpdate);

impl Default for TherapistProfileUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TherapistProfileUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TherapistProfileUpdate::default())
    }

    #[must_use]
    pub fn license_number(mut self, v: impl Into<String>) -> Self {
        self.0.license_number = Some(v.into());
        self
    }

    #[must_use]
    pub fn license_state(mut self, v: impl Into<String>) -> Self {
        self.0.license_state = Some(v.into());
        self
    }

    #[must_use]
    pub fn specialties(mut self, v: impl Into<String>) -> Self {
        self.0.specialties = Some(v.into());
        self
    }

    #[must_use]
    pub fn bio(mut self, v: impl Into<String>) -> Self {
        self.0.bio = Some(v.into());
        self
    }

    #[must_use]
    pub fn practice_name(mut self, v: impl Into<String>) -> Self {
        self.0.practice_name = Some(v.into());
        self
    }

    #[must_use]
    pub fn build(self) -> TherapistProfileUpdate {
        self.0
    }
}
