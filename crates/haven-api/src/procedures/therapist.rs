//! Therapist-facing procedures. Every procedure requires the therapist guard
//! and the caller's therapist profile; client-scoped procedures also require
//! that the client belongs to that profile.

use chrono::{DateTime, Duration, Utc};
use haven_ai::prompts::{EventPoint, HomeworkPoint, MoodPoint, PostSessionInput, SessionPrepInput};
use haven_core::audit_detail::{
    InviteDetail, ModalityChangedDetail, StatusChangedDetail, SummaryGeneratedDetail,
};
use haven_core::entities::{
    AiSummary, CheckIn, ClientProfile, EmotionalEvent, HomeworkAssignment, MoodEntry,
    TherapistProfile, TherapyGoal, User,
};
use haven_core::enums::{AuditAction, GoalStatus, Modality, ResourceType, SummaryType};
use haven_core::identity::Caller;
use haven_db::error::DatabaseError;
use haven_db::repos::client::NewClientInvite;
use haven_db::repos::goal::NewGoal;
use haven_db::repos::homework::NewHomework;
use haven_db::repos::summary::NewAiSummary;
use haven_db::updates::client::ClientProfileUpdate;
use haven_db::updates::goal::GoalUpdate;
use serde::{Deserialize, Serialize};

use super::onboarding::TherapistProfileInput;
use super::{ClientRef, SummaryOutput};
use crate::context::{ApiContext, AuditEntry};
use crate::error::ApiError;
use crate::guards::{Access, authorize};
use crate::validation::{check_email, check_non_empty, parse_opt_date_input};

const INVITE_TTL_DAYS: i64 = 7;
const DETAIL_MOOD_LIMIT: u32 = 7;
const DETAIL_EVENT_LIMIT: u32 = 5;
const DETAIL_CHECK_IN_LIMIT: u32 = 5;
const PREP_MOOD_LIMIT: u32 = 14;
const PREP_EVENT_LIMIT: u32 = 10;
const DEFAULT_DAYS_SINCE_SESSION: i64 = 7;
const SUMMARY_LIST_LIMIT: u32 = 10;

/// Date format used inside prompts (`3/7/2026`).
pub(crate) const PROMPT_DATE_FORMAT: &str = "%-m/%-d/%Y";

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientWithUser {
    pub client: ClientProfile,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteClientInput {
    pub client_email: String,
    #[serde(default)]
    pub primary_modality: Modality,
    #[serde(default)]
    pub treatment_goals_summary: Option<String>,
    #[serde(default)]
    pub session_frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteClientOutput {
    pub success: bool,
    pub invite_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    pub client: ClientProfile,
    pub user: Option<User>,
    pub goals: Vec<TherapyGoal>,
    pub recent_mood: Vec<MoodEntry>,
    pub recent_events: Vec<EmotionalEvent>,
    pub homework: Vec<HomeworkAssignment>,
    pub check_ins: Vec<CheckIn>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientModalityInput {
    pub client_id: String,
    pub modality: Modality,
    #[serde(default)]
    pub treatment_goals_summary: Option<String>,
    #[serde(default)]
    pub session_frequency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSessionRequest {
    pub client_id: String,
    pub session_notes: String,
    #[serde(default)]
    pub homework_assigned: Vec<String>,
    #[serde(default)]
    pub goals_worked_on: Vec<String>,
    #[serde(default)]
    pub next_session_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalInput {
    pub client_id: String,
    pub goal_text: String,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalInput {
    pub goal_id: String,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(default)]
    pub progress_notes: Option<String>,
    #[serde(default)]
    pub goal_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHomeworkInput {
    pub client_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewHomeworkInput {
    pub homework_id: String,
    #[serde(default)]
    pub review_notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn therapist_for(ctx: &ApiContext, caller: &Caller) -> Result<TherapistProfile, ApiError> {
    authorize(Access::Therapist, caller)?;
    ctx.therapist_profile(caller).await
}

async fn owned_client(
    ctx: &ApiContext,
    therapist: &TherapistProfile,
    client_id: &str,
) -> Result<ClientProfile, ApiError> {
    Ok(ctx
        .service()
        .get_client_for_therapist(client_id, &therapist.id)
        .await?)
}

async fn optional_user(ctx: &ApiContext, user_id: &str) -> Result<Option<User>, ApiError> {
    match ctx.service().get_user(user_id).await {
        Ok(user) => Ok(Some(user)),
        Err(DatabaseError::NoResult) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whole days since the most recent mood entry; `entries` is newest first.
fn days_since_last_entry(entries: &[MoodEntry], now: DateTime<Utc>) -> i64 {
    entries.first().map_or(DEFAULT_DAYS_SINCE_SESSION, |latest| {
        (now - latest.recorded_at).num_days()
    })
}

async fn store_summary(
    ctx: &ApiContext,
    caller: &Caller,
    summary: NewAiSummary,
    action: AuditAction,
) -> Result<AiSummary, ApiError> {
    let stored = ctx.service().create_summary(&summary).await?;
    tracing::info!(
        client_id = %stored.client_id,
        summary_type = %stored.summary_type,
        tokens_used = ?stored.tokens_used,
        "summary generated"
    );
    ctx.audit(
        caller,
        AuditEntry::new(action)
            .resource(ResourceType::AiSummary, &stored.id)
            .details(&SummaryGeneratedDetail {
                client_id: stored.client_id.clone(),
                summary_id: stored.id.clone(),
                tokens_used: stored.tokens_used,
            }),
    )
    .await;
    Ok(stored)
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no therapist profile.
pub async fn get_profile(ctx: &ApiContext, caller: &Caller) -> Result<TherapistProfile, ApiError> {
    therapist_for(ctx, caller).await
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no therapist profile.
pub async fn update_profile(
    ctx: &ApiContext,
    caller: &Caller,
    input: TherapistProfileInput,
) -> Result<TherapistProfile, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let updated = ctx
        .service()
        .update_therapist_profile(&therapist.id, &input)
        .await?;
    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::UpdateProfile)
            .resource(ResourceType::TherapistProfile, &updated.id),
    )
    .await;
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no therapist profile.
pub async fn list_clients(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Vec<ClientWithUser>, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let clients = ctx
        .service()
        .list_clients_for_therapist(&therapist.id)
        .await?;
    let mut out = Vec::with_capacity(clients.len());
    for client in clients {
        let user = optional_user(ctx, &client.user_id).await?;
        out.push(ClientWithUser { client, user });
    }
    Ok(out)
}

/// Create a placeholder client user and a pending profile with a one-week
/// invite token.
///
/// # Errors
///
/// - [`ApiError::BadRequest`] for a malformed email.
/// - [`ApiError::Forbidden`] when the plan's seat limit is reached; nothing
///   is written.
pub async fn invite_client(
    ctx: &ApiContext,
    caller: &Caller,
    input: InviteClientInput,
) -> Result<InviteClientOutput, ApiError> {
    authorize(Access::Therapist, caller)?;
    check_email("clientEmail", &input.client_email)?;
    let therapist = ctx.therapist_profile(caller).await?;

    let active = ctx.service().count_active_clients(&therapist.id).await?;
    if active >= therapist.max_clients {
        tracing::info!(
            therapist_id = %therapist.id,
            active,
            max_clients = therapist.max_clients,
            "invite blocked by seat limit"
        );
        return Err(ApiError::Forbidden(format!(
            "Your {} plan allows a maximum of {} clients. Please upgrade to add more.",
            therapist.subscription_tier, therapist.max_clients
        )));
    }

    let token = ctx.service().db().generate_token().await?;
    let (_user, client) = ctx
        .service()
        .create_client_invite(&NewClientInvite {
            therapist_id: therapist.id.clone(),
            email: input.client_email.clone(),
            primary_modality: input.primary_modality,
            treatment_goals_summary: input.treatment_goals_summary,
            session_frequency: input.session_frequency,
            invite_token: token.clone(),
            invite_token_expiry: Utc::now() + Duration::days(INVITE_TTL_DAYS),
        })
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::InviteClient)
            .resource(ResourceType::ClientProfile, &client.id)
            .details(&InviteDetail {
                email: input.client_email,
                client_id: client.id.clone(),
            }),
    )
    .await;

    Ok(InviteClientOutput {
        success: true,
        invite_token: token,
    })
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for another therapist's client.
pub async fn get_client_detail(
    ctx: &ApiContext,
    caller: &Caller,
    input: ClientRef,
) -> Result<ClientDetail, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;
    let svc = ctx.service();

    Ok(ClientDetail {
        user: optional_user(ctx, &client.user_id).await?,
        goals: svc.list_goals(&client.id).await?,
        recent_mood: svc.list_recent_mood(&client.id, DETAIL_MOOD_LIMIT).await?,
        recent_events: svc
            .list_recent_events(&client.id, DETAIL_EVENT_LIMIT)
            .await?,
        homework: svc.list_homework(&client.id).await?,
        check_ins: svc
            .list_recent_check_ins(&client.id, DETAIL_CHECK_IN_LIMIT)
            .await?,
        client,
    })
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for another therapist's client.
pub async fn update_client_modality(
    ctx: &ApiContext,
    caller: &Caller,
    input: UpdateClientModalityInput,
) -> Result<ClientProfile, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;

    let update = ClientProfileUpdate {
        primary_modality: Some(input.modality),
        treatment_goals_summary: input.treatment_goals_summary.map(Some),
        session_frequency: input.session_frequency.map(Some),
        is_active: None,
    };
    let updated = ctx.service().update_client_profile(&client.id, &update).await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::UpdateClientModality)
            .resource(ResourceType::ClientProfile, &client.id)
            .details(&ModalityChangedDetail {
                modality: input.modality,
            }),
    )
    .await;
    Ok(updated)
}

// ---------------------------------------------------------------------------
// AI summaries
// ---------------------------------------------------------------------------

/// Generate and store a session-prep digest of the client's recent activity.
///
/// # Errors
///
/// - [`ApiError::Forbidden`] for another therapist's client; the LLM is not
///   called and nothing is stored.
/// - [`ApiError::Upstream`] when the provider call fails.
pub async fn get_session_prep_summary(
    ctx: &ApiContext,
    caller: &Caller,
    input: ClientRef,
) -> Result<SummaryOutput, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;
    let svc = ctx.service();

    let client_user = optional_user(ctx, &client.user_id).await?;
    let mood = svc.list_recent_mood(&client.id, PREP_MOOD_LIMIT).await?;
    let events = svc.list_recent_events(&client.id, PREP_EVENT_LIMIT).await?;
    let homework = svc.list_homework(&client.id).await?;
    let goals = svc.list_active_goals(&client.id).await?;

    let now = Utc::now();
    let prep = SessionPrepInput {
        modality: client.primary_modality,
        client_name: client_user
            .and_then(|u| u.name)
            .unwrap_or_else(|| "Client".to_string()),
        recent_mood_data: mood
            .iter()
            .map(|m| MoodPoint {
                score: m.mood_score,
                date: m.recorded_at.format(PROMPT_DATE_FORMAT).to_string(),
                notes: m.notes.clone(),
            })
            .collect(),
        recent_events: events
            .iter()
            .map(|e| EventPoint {
                event_type: e.event_type.to_string(),
                intensity: e.intensity,
                description: e.description.clone(),
                date: e.occurred_at.format(PROMPT_DATE_FORMAT).to_string(),
            })
            .collect(),
        homework_status: homework
            .iter()
            .map(|h| HomeworkPoint {
                title: h.title.clone(),
                status: h.status.to_string(),
                completion_notes: h.completion_notes.clone(),
            })
            .collect(),
        active_goals: goals.into_iter().map(|g| g.goal_text).collect(),
        days_since_last_session: days_since_last_entry(&mood, now),
    };

    let generated = ctx.generator().session_prep(&prep).await?;

    let window_start = mood
        .iter()
        .map(|m| m.recorded_at)
        .chain(events.iter().map(|e| e.occurred_at))
        .min();

    let stored = store_summary(
        ctx,
        caller,
        NewAiSummary {
            client_id: client.id.clone(),
            therapist_id: therapist.id.clone(),
            summary_type: SummaryType::SessionPrep,
            content: generated.content,
            modality: client.primary_modality,
            data_window_start: window_start,
            data_window_end: Some(now),
            tokens_used: generated.tokens_used,
        },
        AuditAction::GenerateSessionPrep,
    )
    .await?;

    Ok(SummaryOutput {
        summary: stored.content,
    })
}

/// Generate and store a post-session continuity message for the client.
///
/// # Errors
///
/// - [`ApiError::BadRequest`] for empty session notes.
/// - [`ApiError::Forbidden`] for another therapist's client.
/// - [`ApiError::Upstream`] when the provider call fails.
pub async fn generate_post_session_summary(
    ctx: &ApiContext,
    caller: &Caller,
    input: PostSessionRequest,
) -> Result<SummaryOutput, ApiError> {
    authorize(Access::Therapist, caller)?;
    check_non_empty("sessionNotes", &input.session_notes)?;
    let therapist = ctx.therapist_profile(caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;

    let generated = ctx
        .generator()
        .post_session(&PostSessionInput {
            modality: client.primary_modality,
            session_notes: input.session_notes,
            homework_assigned: input.homework_assigned,
            goals_worked_on: input.goals_worked_on,
            next_session_date: input.next_session_date,
        })
        .await?;

    let stored = store_summary(
        ctx,
        caller,
        NewAiSummary {
            client_id: client.id.clone(),
            therapist_id: therapist.id.clone(),
            summary_type: SummaryType::PostSession,
            content: generated.content,
            modality: client.primary_modality,
            data_window_start: None,
            data_window_end: Some(Utc::now()),
            tokens_used: generated.tokens_used,
        },
        AuditAction::GeneratePostSession,
    )
    .await?;

    Ok(SummaryOutput {
        summary: stored.content,
    })
}

/// Latest summaries for a client, newest first.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for another therapist's client.
pub async fn get_ai_summaries(
    ctx: &ApiContext,
    caller: &Caller,
    input: ClientRef,
) -> Result<Vec<AiSummary>, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;
    Ok(ctx
        .service()
        .list_summaries(&client.id, None, SUMMARY_LIST_LIMIT)
        .await?)
}

// ---------------------------------------------------------------------------
// Goals and homework
// ---------------------------------------------------------------------------

/// # Errors
///
/// - [`ApiError::BadRequest`] for empty goal text or a malformed date.
/// - [`ApiError::Forbidden`] for another therapist's client.
pub async fn create_goal(
    ctx: &ApiContext,
    caller: &Caller,
    input: CreateGoalInput,
) -> Result<TherapyGoal, ApiError> {
    authorize(Access::Therapist, caller)?;
    check_non_empty("goalText", &input.goal_text)?;
    let target_date = parse_opt_date_input("targetDate", input.target_date.as_deref())?;
    let therapist = ctx.therapist_profile(caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;

    let goal = ctx
        .service()
        .create_goal(&NewGoal {
            client_id: client.id.clone(),
            therapist_id: therapist.id.clone(),
            goal_text: input.goal_text,
            modality: input.modality,
            target_date,
        })
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::CreateGoal).resource(ResourceType::TherapyGoal, &goal.id),
    )
    .await;
    Ok(goal)
}

/// # Errors
///
/// - [`ApiError::Forbidden`] when the goal's client belongs to another therapist.
/// - [`ApiError::BadRequest`] for a status change the goal state machine rejects.
pub async fn update_goal(
    ctx: &ApiContext,
    caller: &Caller,
    input: UpdateGoalInput,
) -> Result<TherapyGoal, ApiError> {
    authorize(Access::Therapist, caller)?;
    if let Some(text) = input.goal_text.as_deref() {
        check_non_empty("goalText", text)?;
    }
    let therapist = ctx.therapist_profile(caller).await?;
    let before = ctx
        .service()
        .get_goal_for_therapist(&input.goal_id, &therapist.id)
        .await?;

    let update = GoalUpdate {
        goal_text: input.goal_text,
        status: input.status,
        progress_notes: input.progress_notes.map(Some),
    };
    let after = ctx.service().update_goal(&before.id, &update).await?;

    let mut entry =
        AuditEntry::new(AuditAction::UpdateGoal).resource(ResourceType::TherapyGoal, &after.id);
    if before.status != after.status {
        entry = entry.details(&StatusChangedDetail {
            from: before.status.to_string(),
            to: after.status.to_string(),
            reason: None,
        });
    }
    ctx.audit(caller, entry).await;
    Ok(after)
}

/// # Errors
///
/// - [`ApiError::BadRequest`] for empty title/description or a malformed date.
/// - [`ApiError::Forbidden`] for another therapist's client.
pub async fn create_homework(
    ctx: &ApiContext,
    caller: &Caller,
    input: CreateHomeworkInput,
) -> Result<HomeworkAssignment, ApiError> {
    authorize(Access::Therapist, caller)?;
    check_non_empty("title", &input.title)?;
    check_non_empty("description", &input.description)?;
    let due_date = parse_opt_date_input("dueDate", input.due_date.as_deref())?;
    let therapist = ctx.therapist_profile(caller).await?;
    let client = owned_client(ctx, &therapist, &input.client_id).await?;

    let homework = ctx
        .service()
        .create_homework(&NewHomework {
            client_id: client.id.clone(),
            therapist_id: therapist.id.clone(),
            title: input.title,
            description: input.description,
            modality: input.modality,
            due_date,
        })
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::CreateHomework).resource(ResourceType::Homework, &homework.id),
    )
    .await;
    Ok(homework)
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] when the homework's client belongs to
/// another therapist.
pub async fn review_homework(
    ctx: &ApiContext,
    caller: &Caller,
    input: ReviewHomeworkInput,
) -> Result<HomeworkAssignment, ApiError> {
    let therapist = therapist_for(ctx, caller).await?;
    let homework = ctx
        .service()
        .get_homework_for_therapist(&input.homework_id, &therapist.id)
        .await?;
    let reviewed = ctx
        .service()
        .review_homework(&homework.id, input.review_notes.as_deref())
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::ReviewHomework).resource(ResourceType::Homework, &reviewed.id),
    )
    .await;
    Ok(reviewed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count_rows, seed_client, seed_therapist, test_ctx};
    use haven_ai::ChatRole;
    use haven_core::enums::{HomeworkStatus, SubscriptionStatus, SubscriptionTier};
    use haven_db::repos::audit::AuditFilter;
    use haven_db::repos::mood::NewMoodEntry;
    use pretty_assertions::assert_eq;

    fn invite(email: &str) -> InviteClientInput {
        InviteClientInput {
            client_email: email.into(),
            primary_modality: Modality::General,
            treatment_goals_summary: None,
            session_frequency: None,
        }
    }

    fn mood_at(recorded_at: DateTime<Utc>) -> MoodEntry {
        MoodEntry {
            id: "mood-a3f8b2c1".into(),
            client_id: "cli-a3f8b2c1".into(),
            mood_score: 5,
            energy_level: None,
            anxiety_level: None,
            sleep_hours: None,
            notes: None,
            recorded_at,
            created_at: recorded_at,
        }
    }

    #[test]
    fn days_since_defaults_to_seven() {
        assert_eq!(days_since_last_entry(&[], Utc::now()), 7);
    }

    #[test]
    fn days_since_rounds_partial_days_down() {
        let now = Utc::now();
        let entry = mood_at(now - Duration::days(3) - Duration::hours(5));
        assert_eq!(days_since_last_entry(&[entry], now), 3);
    }

    #[test]
    fn days_since_uses_newest_entry() {
        let now = Utc::now();
        let entries = [
            mood_at(now - Duration::hours(30)),
            mood_at(now - Duration::days(5)),
            mood_at(now - Duration::days(12)),
        ];
        assert_eq!(days_since_last_entry(&entries, now), 1);
    }

    #[tokio::test]
    async fn invite_creates_pending_client() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;

        let out = invite_client(&ctx, &caller, invite("jordan@example.com"))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.invite_token.len(), 32);
        assert!(out.invite_token.chars().all(|c| c.is_ascii_hexdigit()));

        let clients = list_clients(&ctx, &caller).await.unwrap();
        assert_eq!(clients.len(), 1);
        let user = clients[0].user.as_ref().unwrap();
        assert_eq!(user.name.as_deref(), Some("jordan"));
        assert_eq!(user.open_id, format!("invite_{}", out.invite_token));
        assert_eq!(clients[0].client.therapist_id, therapist.id);
        let expiry = clients[0].client.invite_token_expiry.unwrap();
        assert!(expiry > Utc::now() + Duration::days(6));

        let logs = ctx
            .service()
            .query_audit(&AuditFilter {
                action: Some(AuditAction::InviteClient),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn invite_blocked_at_seat_limit() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        assert_eq!(therapist.max_clients, 5);
        for i in 0..5 {
            seed_client(&ctx, &therapist, &format!("oid-c{i}")).await;
        }
        let users_before = count_rows(&ctx, "users").await;
        let clients_before = count_rows(&ctx, "client_profiles").await;

        let err = invite_client(&ctx, &caller, invite("extra@example.com"))
            .await
            .unwrap_err();
        match err {
            ApiError::Forbidden(msg) => assert_eq!(
                msg,
                "Your starter plan allows a maximum of 5 clients. Please upgrade to add more."
            ),
            other => panic!("expected Forbidden, got {other:?}"),
        }
        assert_eq!(count_rows(&ctx, "users").await, users_before);
        assert_eq!(count_rows(&ctx, "client_profiles").await, clients_before);
    }

    #[tokio::test]
    async fn invite_rejects_bad_email() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, _therapist) = seed_therapist(&ctx, "oid-t").await;
        let err = invite_client(&ctx, &caller, invite("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn upgraded_plan_raises_limit() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        ctx.service()
            .set_therapist_plan(
                &therapist.id,
                SubscriptionTier::Professional,
                SubscriptionStatus::Active,
            )
            .await
            .unwrap();
        for i in 0..5 {
            seed_client(&ctx, &therapist, &format!("oid-c{i}")).await;
        }
        assert!(invite_client(&ctx, &caller, invite("sixth@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn session_prep_for_foreign_client_is_forbidden() {
        let (ctx, llm) = test_ctx().await;
        let (_owner, owner_profile) = seed_therapist(&ctx, "oid-owner").await;
        let (intruder, _intruder_profile) = seed_therapist(&ctx, "oid-intruder").await;
        let (_c, client) = seed_client(&ctx, &owner_profile, "oid-c").await;

        let err = get_session_prep_summary(
            &ctx,
            &intruder,
            ClientRef {
                client_id: client.id.clone(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(llm.call_count(), 0);
        assert_eq!(count_rows(&ctx, "ai_summaries").await, 0);
    }

    #[tokio::test]
    async fn session_prep_without_mood_uses_default_days() {
        let (ctx, llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;

        let out = get_session_prep_summary(
            &ctx,
            &caller,
            ClientRef {
                client_id: client.id.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out.summary, "1. What felt different this week?");

        let call = llm.last_call();
        assert_eq!(call.len(), 2);
        assert_eq!(call[0].role, ChatRole::System);
        assert!(call[0].content.contains("within cbt principles"));
        assert!(call[1].content.contains("Days since last session: 7\n"));
        assert!(call[1].content.contains("upcoming session with oid-c."));

        let summaries = get_ai_summaries(
            &ctx,
            &caller,
            ClientRef {
                client_id: client.id.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].summary_type, SummaryType::SessionPrep);
        assert_eq!(summaries[0].tokens_used, Some(321));
        assert!(summaries[0].data_window_start.is_none());
    }

    #[tokio::test]
    async fn session_prep_uses_most_recent_mood() {
        let (ctx, llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;
        ctx.service()
            .log_mood(
                &client.id,
                &NewMoodEntry {
                    mood_score: 6,
                    notes: Some("ok".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        get_session_prep_summary(
            &ctx,
            &caller,
            ClientRef {
                client_id: client.id.clone(),
            },
        )
        .await
        .unwrap();
        let call = llm.last_call();
        assert!(call[1].content.contains("Days since last session: 0\n"));
        assert!(call[1].content.contains("Score 6/10"));
    }

    #[tokio::test]
    async fn upstream_failure_stores_nothing() {
        let (ctx, llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;
        llm.fail_with(503);

        let err = get_session_prep_summary(
            &ctx,
            &caller,
            ClientRef {
                client_id: client.id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert_eq!(count_rows(&ctx, "ai_summaries").await, 0);
        assert_eq!(count_rows(&ctx, "audit_logs").await, 0);
    }

    #[tokio::test]
    async fn post_session_summary_is_stored() {
        let (ctx, llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;

        generate_post_session_summary(
            &ctx,
            &caller,
            PostSessionRequest {
                client_id: client.id.clone(),
                session_notes: "worked on thought records".into(),
                homework_assigned: vec!["Thought log".into()],
                goals_worked_on: vec![],
                next_session_date: None,
            },
        )
        .await
        .unwrap();

        assert!(llm.last_call()[1].content.contains("MODALITY: CBT"));
        let rows = ctx
            .service()
            .list_summaries(&client.id, Some(SummaryType::PostSession), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn goal_lifecycle_enforces_state_machine() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;

        let goal = create_goal(
            &ctx,
            &caller,
            CreateGoalInput {
                client_id: client.id.clone(),
                goal_text: "Sleep before midnight".into(),
                modality: Modality::Cbt,
                target_date: Some("2026-12-01".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(goal.status, GoalStatus::Active);

        let archived = update_goal(
            &ctx,
            &caller,
            UpdateGoalInput {
                goal_id: goal.id.clone(),
                status: Some(GoalStatus::Archived),
                progress_notes: None,
                goal_text: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(archived.status, GoalStatus::Archived);

        let err = update_goal(
            &ctx,
            &caller,
            UpdateGoalInput {
                goal_id: goal.id,
                status: Some(GoalStatus::Active),
                progress_notes: None,
                goal_text: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn empty_goal_text_rejected() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;
        let err = create_goal(
            &ctx,
            &caller,
            CreateGoalInput {
                client_id: client.id,
                goal_text: String::new(),
                modality: Modality::General,
                target_date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(count_rows(&ctx, "therapy_goals").await, 0);
    }

    #[tokio::test]
    async fn foreign_goal_update_is_forbidden() {
        let (ctx, _llm) = test_ctx().await;
        let (owner, owner_profile) = seed_therapist(&ctx, "oid-owner").await;
        let (intruder, _p) = seed_therapist(&ctx, "oid-intruder").await;
        let (_c, client) = seed_client(&ctx, &owner_profile, "oid-c").await;
        let goal = create_goal(
            &ctx,
            &owner,
            CreateGoalInput {
                client_id: client.id,
                goal_text: "Walk daily".into(),
                modality: Modality::General,
                target_date: None,
            },
        )
        .await
        .unwrap();

        let err = update_goal(
            &ctx,
            &intruder,
            UpdateGoalInput {
                goal_id: goal.id,
                status: Some(GoalStatus::Paused),
                progress_notes: None,
                goal_text: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn homework_create_and_review() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;

        let hw = create_homework(
            &ctx,
            &caller,
            CreateHomeworkInput {
                client_id: client.id.clone(),
                title: "Thought record".into(),
                description: "Log one automatic thought per day".into(),
                modality: Modality::Cbt,
                due_date: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(hw.status, HomeworkStatus::Assigned);

        let reviewed = review_homework(
            &ctx,
            &caller,
            ReviewHomeworkInput {
                homework_id: hw.id,
                review_notes: Some("Nice start".into()),
            },
        )
        .await
        .unwrap();
        assert!(reviewed.reviewed_at.is_some());
        assert_eq!(reviewed.therapist_review_notes.as_deref(), Some("Nice start"));

        let detail = get_client_detail(
            &ctx,
            &caller,
            ClientRef {
                client_id: client.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.homework.len(), 1);
        assert_eq!(detail.user.unwrap().open_id, "oid-c");
    }

    #[tokio::test]
    async fn modality_update_is_audited() {
        let (ctx, _llm) = test_ctx().await;
        let (caller, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (_c, client) = seed_client(&ctx, &therapist, "oid-c").await;

        let updated = update_client_modality(
            &ctx,
            &caller,
            UpdateClientModalityInput {
                client_id: client.id.clone(),
                modality: Modality::Emdr,
                treatment_goals_summary: Some("stabilization".into()),
                session_frequency: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.primary_modality, Modality::Emdr);
        assert_eq!(updated.treatment_goals_summary.as_deref(), Some("stabilization"));

        let logs = ctx
            .service()
            .query_audit(&AuditFilter {
                resource_id: Some(client.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, AuditAction::UpdateClientModality);
        assert_eq!(logs[0].details, Some(serde_json::json!({"modality": "emdr"})));
    }

    #[tokio::test]
    async fn client_role_cannot_use_therapist_procedures() {
        let (ctx, _llm) = test_ctx().await;
        let (_t, therapist) = seed_therapist(&ctx, "oid-t").await;
        let (client_caller, _client) = seed_client(&ctx, &therapist, "oid-c").await;
        let err = list_clients(&ctx, &client_caller).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
