//! Client profile update builder (therapist-side edits).

use haven_core::enums::Modality;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_modality: Option<Modality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_goals_summary: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_frequency: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct ClientProfileUpdateBuilder(ClientProfileUpdate);

impl Default for ClientProfileUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientProfileUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ClientProfileUpdate::default())
    }

    #[must_use]
    pub const fn primary_modality(mut self, modality: Modality) -> Self {
        self.0.primary_modality = Some(modality);
        self
    }

    #[must_use]
    pub fn treatment_goals_summary(mut self, summary: Option<String>) -> Self {
        self.0.treatment_goals_summary = Some(summary);
        self
    }

    #[must_use]
    pub fn session_frequency(mut self, frequency: Option<String>) -> Self {
        self.0.session_frequency = Some(frequency);
        self
    }

    #[must_use]
    pub const fn is_active(mut self, active: bool) -> Self {
        self.0.is_active = Some(active);
        self
    }

    #[must_use]
    pub fn build(self) -> ClientProfileUpdate {
        self.0
    }
}
