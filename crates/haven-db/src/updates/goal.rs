//! Therapy goal update builder.

use haven_core::enums::GoalStatus;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_notes: Option<Option<String>>,
}

pub struct GoalUpdateBuilder(GoalUpdate);

impl Default for GoalUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(GoalUpdate::default())
    }

    #[must_use]
    pub fn goal_text(mut self, text: impl Into<String>) -> Self {
        self.0.goal_text = Some(text.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: GoalStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn progress_notes(mut self, notes: Option<String>) -> Self {
        self.0.progress_notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> GoalUpdate {
        self.0
    }
}
