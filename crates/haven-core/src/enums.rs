//! Closed enumerations for Haven.
//!
//! All enums serialize as `snake_case` strings except `AuditAction`, which
//! uses the `SCREAMING_SNAKE_CASE` action names stored in the audit log.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Therapist,
    Client,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Therapist => "therapist",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// Therapeutic framework that constrains AI prompt content and tone.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Cbt,
    Dbt,
    TraumaInformed,
    Emdr,
    #[default]
    General,
}

impl Modality {
    pub const ALL: [Self; 5] = [
        Self::Cbt,
        Self::Dbt,
        Self::TraumaInformed,
        Self::Emdr,
        Self::General,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cbt => "cbt",
            Self::Dbt => "dbt",
            Self::TraumaInformed => "trauma_informed",
            Self::Emdr => "emdr",
            Self::General => "general",
        }
    }

    /// Human-facing label used inside prompts (`trauma-informed`).
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replacen('_', "-", 1)
    }

    /// Upper-case label (`TRAUMA-INFORMED`).
    #[must_use]
    pub fn label_upper(self) -> String {
        self.label().to_uppercase()
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown modality '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// SubscriptionTier
// ---------------------------------------------------------------------------

/// Therapist plan tier. Each tier caps the number of active clients.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Starter,
    Professional,
    Practice,
    Enterprise,
}

impl SubscriptionTier {
    pub const ALL: [Self; 4] = [
        Self::Starter,
        Self::Professional,
        Self::Practice,
        Self::Enterprise,
    ];

    /// Seat limit for the tier.
    #[must_use]
    pub const fn max_clients(self) -> u32 {
        match self {
            Self::Starter => 5,
            Self::Professional => 25,
            Self::Practice => 100,
            Self::Enterprise => 9999,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Practice => "practice",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown subscription tier '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// SubscriptionStatus
// ---------------------------------------------------------------------------

/// Billing status of a therapist's subscription.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    #[default]
    #[serde(rename = "none")]
    Unsubscribed,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unsubscribed => "none",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GoalStatus
// ---------------------------------------------------------------------------

/// Status of a therapy goal.
///
/// ```text
/// active → achieved → archived
///        → paused   → active
///                   → archived
///        → archived
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Achieved,
    Paused,
    Archived,
}

impl GoalStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Achieved, Self::Paused, Self::Archived],
            Self::Paused => &[Self::Active, Self::Archived],
            Self::Achieved => &[Self::Archived],
            Self::Archived => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Achieved => "achieved",
            Self::Paused => "paused",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HomeworkStatus
// ---------------------------------------------------------------------------

/// Status of a homework assignment.
///
/// ```text
/// assigned → in_progress → completed
///                        → skipped
///          → completed
///          → skipped
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum HomeworkStatus {
    #[default]
    Assigned,
    InProgress,
    Completed,
    Skipped,
}

impl HomeworkStatus {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Assigned => &[Self::InProgress, Self::Completed, Self::Skipped],
            Self::InProgress => &[Self::Completed, Self::Skipped],
            Self::Completed => &[],
            Self::Skipped => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Category of a client-logged emotional event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Anxiety,
    Depression,
    Anger,
    Grief,
    Joy,
    Fear,
    Shame,
    Other,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
            Self::Depression => "depression",
            Self::Anger => "anger",
            Self::Grief => "grief",
            Self::Joy => "joy",
            Self::Fear => "fear",
            Self::Shame => "shame",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CheckInType
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckInType {
    #[default]
    Daily,
    PreSession,
    PostSession,
    CrisisCheck,
}

impl CheckInType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::PreSession => "pre_session",
            Self::PostSession => "post_session",
            Self::CrisisCheck => "crisis_check",
        }
    }
}

impl fmt::Display for CheckInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SummaryType
// ---------------------------------------------------------------------------

/// Kind of persisted AI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    SessionPrep,
    PostSession,
    WeeklyOverview,
    ReflectionPrompt,
}

impl SummaryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionPrep => "session_prep",
            Self::PostSession => "post_session",
            Self::WeeklyOverview => "weekly_overview",
            Self::ReflectionPrompt => "reflection_prompt",
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DemoRequestStatus
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DemoRequestStatus {
    #[default]
    Pending,
    Contacted,
    DemoScheduled,
    Converted,
    Declined,
}

impl DemoRequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::DemoScheduled => "demo_scheduled",
            Self::Converted => "converted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for DemoRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    BecomeTherapist,
    CompleteOnboarding,
    ClaimInvite,
    UpdateProfile,
    InviteClient,
    UpdateClientModality,
    GenerateSessionPrep,
    GeneratePostSession,
    CreateGoal,
    UpdateGoal,
    CreateHomework,
    ReviewHomework,
    LogMood,
    LogEmotionalEvent,
    CompleteCheckin,
    UpdateHomework,
    UpgradeSubscription,
    SubmitDemoRequest,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BecomeTherapist => "BECOME_THERAPIST",
            Self::CompleteOnboarding => "COMPLETE_ONBOARDING",
            Self::ClaimInvite => "CLAIM_INVITE",
            Self::UpdateProfile => "UPDATE_PROFILE",
            Self::InviteClient => "INVITE_CLIENT",
            Self::UpdateClientModality => "UPDATE_CLIENT_MODALITY",
            Self::GenerateSessionPrep => "GENERATE_SESSION_PREP",
            Self::GeneratePostSession => "GENERATE_POST_SESSION",
            Self::CreateGoal => "CREATE_GOAL",
            Self::UpdateGoal => "UPDATE_GOAL",
            Self::CreateHomework => "CREATE_HOMEWORK",
            Self::ReviewHomework => "REVIEW_HOMEWORK",
            Self::LogMood => "LOG_MOOD",
            Self::LogEmotionalEvent => "LOG_EMOTIONAL_EVENT",
            Self::CompleteCheckin => "COMPLETE_CHECKIN",
            Self::UpdateHomework => "UPDATE_HOMEWORK",
            Self::UpgradeSubscription => "UPGRADE_SUBSCRIPTION",
            Self::SubmitDemoRequest => "SUBMIT_DEMO_REQUEST",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// Kind of row an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    User,
    TherapistProfile,
    ClientProfile,
    MoodEntry,
    EmotionalEvent,
    CheckIn,
    TherapyGoal,
    Homework,
    AiSummary,
    Subscription,
    DemoRequest,
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::TherapistProfile => "therapist_profile",
            Self::ClientProfile => "client_profile",
            Self::MoodEntry => "mood_entry",
            Self::EmotionalEvent => "emotional_event",
            Self::CheckIn => "check_in",
            Self::TherapyGoal => "therapy_goal",
            Self::Homework => "homework",
            Self::AiSummary => "ai_summary",
            Self::Subscription => "subscription",
            Self::DemoRequest => "demo_request",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Serde roundtrip tests ---

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(role_therapist, Role, Role::Therapist, "therapist");
    test_serde_roundtrip!(
        modality_trauma,
        Modality,
        Modality::TraumaInformed,
        "trauma_informed"
    );
    test_serde_roundtrip!(modality_emdr, Modality, Modality::Emdr, "emdr");
    test_serde_roundtrip!(
        tier_professional,
        SubscriptionTier,
        SubscriptionTier::Professional,
        "professional"
    );
    test_serde_roundtrip!(
        sub_status_none,
        SubscriptionStatus,
        SubscriptionStatus::Unsubscribed,
        "none"
    );
    test_serde_roundtrip!(
        sub_status_past_due,
        SubscriptionStatus,
        SubscriptionStatus::PastDue,
        "past_due"
    );
    test_serde_roundtrip!(goal_paused, GoalStatus, GoalStatus::Paused, "paused");
    test_serde_roundtrip!(
        homework_in_progress,
        HomeworkStatus,
        HomeworkStatus::InProgress,
        "in_progress"
    );
    test_serde_roundtrip!(event_joy, EventType, EventType::Joy, "joy");
    test_serde_roundtrip!(
        check_in_crisis,
        CheckInType,
        CheckInType::CrisisCheck,
        "crisis_check"
    );
    test_serde_roundtrip!(
        summary_reflection,
        SummaryType,
        SummaryType::ReflectionPrompt,
        "reflection_prompt"
    );
    test_serde_roundtrip!(
        demo_scheduled,
        DemoRequestStatus,
        DemoRequestStatus::DemoScheduled,
        "demo_scheduled"
    );
    test_serde_roundtrip!(
        audit_checkin,
        AuditAction,
        AuditAction::CompleteCheckin,
        "COMPLETE_CHECKIN"
    );
    test_serde_roundtrip!(
        audit_session_prep,
        AuditAction,
        AuditAction::GenerateSessionPrep,
        "GENERATE_SESSION_PREP"
    );
    test_serde_roundtrip!(
        resource_goal,
        ResourceType,
        ResourceType::TherapyGoal,
        "therapy_goal"
    );

    // --- Transition tests ---

    #[test]
    fn goal_valid_transitions() {
        assert!(GoalStatus::Active.can_transition_to(GoalStatus::Achieved));
        assert!(GoalStatus::Active.can_transition_to(GoalStatus::Paused));
        assert!(GoalStatus::Active.can_transition_to(GoalStatus::Archived));
        assert!(GoalStatus::Paused.can_transition_to(GoalStatus::Active));
        assert!(GoalStatus::Achieved.can_transition_to(GoalStatus::Archived));
    }

    #[test]
    fn goal_invalid_transitions() {
        assert!(!GoalStatus::Achieved.can_transition_to(GoalStatus::Active));
        assert!(!GoalStatus::Paused.can_transition_to(GoalStatus::Achieved));
        assert!(GoalStatus::Archived.allowed_next_states().is_empty());
    }

    #[test]
    fn homework_valid_transitions() {
        assert!(HomeworkStatus::Assigned.can_transition_to(HomeworkStatus::InProgress));
        assert!(HomeworkStatus::Assigned.can_transition_to(HomeworkStatus::Completed));
        assert!(HomeworkStatus::Assigned.can_transition_to(HomeworkStatus::Skipped));
        assert!(HomeworkStatus::InProgress.can_transition_to(HomeworkStatus::Completed));
    }

    #[test]
    fn homework_terminal_states() {
        assert!(HomeworkStatus::Completed.allowed_next_states().is_empty());
        assert!(HomeworkStatus::Skipped.allowed_next_states().is_empty());
        assert!(!HomeworkStatus::InProgress.can_transition_to(HomeworkStatus::Assigned));
    }

    // --- Modality ---

    #[test]
    fn modality_labels() {
        assert_eq!(Modality::TraumaInformed.label(), "trauma-informed");
        assert_eq!(Modality::TraumaInformed.label_upper(), "TRAUMA-INFORMED");
        assert_eq!(Modality::Cbt.label(), "cbt");
        assert_eq!(Modality::General.label_upper(), "GENERAL");
    }

    #[test]
    fn modality_parse_rejects_unknown() {
        assert_eq!("dbt".parse::<Modality>().unwrap(), Modality::Dbt);
        let err = "act".parse::<Modality>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn tier_seat_limits() {
        assert_eq!(SubscriptionTier::Starter.max_clients(), 5);
        assert_eq!(SubscriptionTier::Professional.max_clients(), 25);
        assert_eq!(SubscriptionTier::Practice.max_clients(), 100);
        assert_eq!(SubscriptionTier::Enterprise.max_clients(), 9999);
    }

    // --- Display / as_str tests ---

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Role::Admin), "admin");
        assert_eq!(format!("{}", Modality::TraumaInformed), "trauma_informed");
        assert_eq!(format!("{}", SubscriptionStatus::Unsubscribed), "none");
        assert_eq!(format!("{}", GoalStatus::Achieved), "achieved");
        assert_eq!(format!("{}", HomeworkStatus::InProgress), "in_progress");
        assert_eq!(format!("{}", EventType::Shame), "shame");
        assert_eq!(format!("{}", CheckInType::PreSession), "pre_session");
        assert_eq!(format!("{}", SummaryType::SessionPrep), "session_prep");
        assert_eq!(format!("{}", AuditAction::InviteClient), "INVITE_CLIENT");
        assert_eq!(format!("{}", ResourceType::AiSummary), "ai_summary");
    }
}
