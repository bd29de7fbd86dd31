//! Client-facing procedures. Every procedure requires the client guard and
//! the caller's client profile. Free-text submissions are screened for
//! crisis language before anything is stored or sent to the LLM.

use chrono::Utc;
use haven_ai::crisis::{detect_crisis_language, detect_in_fields};
use haven_ai::prompts::ReflectionInput;
use haven_core::audit_detail::{CheckInDetail, StatusChangedDetail};
use haven_core::entities::{
    AiSummary, CheckIn, ClientProfile, EmotionalEvent, HomeworkAssignment, MoodEntry, TherapyGoal,
};
use haven_core::enums::{
    AuditAction, CheckInType, EventType, HomeworkStatus, ResourceType, SummaryType,
};
use haven_core::identity::Caller;
use haven_db::repos::check_in::NewCheckIn;
use haven_db::repos::event::NewEmotionalEvent;
use haven_db::repos::mood::NewMoodEntry;
use haven_db::repos::summary::NewAiSummary;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ScreenedOutput;
use crate::context::{ApiContext, AuditEntry};
use crate::error::ApiError;
use crate::guards::{Access, authorize};
use crate::validation::{check_opt_score, check_score, check_sleep_hours};

const DASHBOARD_MOOD_LIMIT: u32 = 14;
const DASHBOARD_EVENT_LIMIT: u32 = 5;
const DASHBOARD_CHECK_IN_LIMIT: u32 = 3;
const TIMELINE_LIMIT: u32 = 30;
const EVENT_LIST_LIMIT: u32 = 20;
const REFLECTION_MOOD_LIMIT: u32 = 7;
const REFLECTION_EVENT_LIMIT: u32 = 5;
const REFLECTION_LIST_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub profile: ClientProfile,
    pub goals: Vec<TherapyGoal>,
    pub recent_mood: Vec<MoodEntry>,
    pub homework: Vec<HomeworkAssignment>,
    pub recent_events: Vec<EmotionalEvent>,
    pub recent_check_ins: Vec<CheckIn>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMoodInput {
    pub mood_score: u8,
    #[serde(default)]
    pub energy_level: Option<u8>,
    #[serde(default)]
    pub anxiety_level: Option<u8>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_shared() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventInput {
    pub event_type: EventType,
    pub intensity: u8,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub triggers: Option<String>,
    #[serde(default)]
    pub coping_strategies_used: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_shared")]
    pub shared_with_therapist: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInInput {
    #[serde(default)]
    pub check_in_type: CheckInType,
    /// Kept in submission order; the crisis screen reads answers as written.
    pub responses: IndexMap<String, String>,
    #[serde(default)]
    pub mood_at_check_in: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHomeworkInput {
    pub homework_id: String,
    pub status: HomeworkStatus,
    #[serde(default)]
    pub completion_notes: Option<String>,
}

async fn client_for(ctx: &ApiContext, caller: &Caller) -> Result<ClientProfile, ApiError> {
    authorize(Access::Client, caller)?;
    ctx.client_profile(caller).await
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_profile(ctx: &ApiContext, caller: &Caller) -> Result<ClientProfile, ApiError> {
    client_for(ctx, caller).await
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_dashboard(ctx: &ApiContext, caller: &Caller) -> Result<Dashboard, ApiError> {
    let profile = client_for(ctx, caller).await?;
    let svc = ctx.service();
    Ok(Dashboard {
        goals: svc.list_goals(&profile.id).await?,
        recent_mood: svc
            .list_recent_mood(&profile.id, DASHBOARD_MOOD_LIMIT)
            .await?,
        homework: svc.list_homework(&profile.id).await?,
        recent_events: svc
            .list_recent_events(&profile.id, DASHBOARD_EVENT_LIMIT)
            .await?,
        recent_check_ins: svc
            .list_recent_check_ins(&profile.id, DASHBOARD_CHECK_IN_LIMIT)
            .await?,
        profile,
    })
}

/// # Errors
///
/// Returns [`ApiError::BadRequest`] for out-of-range scores or sleep hours.
pub async fn log_mood(
    ctx: &ApiContext,
    caller: &Caller,
    input: LogMoodInput,
) -> Result<MoodEntry, ApiError> {
    authorize(Access::Client, caller)?;
    check_score("moodScore", input.mood_score)?;
    check_opt_score("energyLevel", input.energy_level)?;
    check_opt_score("anxietyLevel", input.anxiety_level)?;
    check_sleep_hours(input.sleep_hours)?;
    let profile = ctx.client_profile(caller).await?;

    let entry = ctx
        .service()
        .log_mood(
            &profile.id,
            &NewMoodEntry {
                mood_score: input.mood_score,
                energy_level: input.energy_level,
                anxiety_level: input.anxiety_level,
                sleep_hours: input.sleep_hours,
                notes: input.notes,
            },
        )
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::LogMood).resource(ResourceType::MoodEntry, &entry.id),
    )
    .await;
    Ok(entry)
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_mood_timeline(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Vec<MoodEntry>, ApiError> {
    let profile = client_for(ctx, caller).await?;
    Ok(ctx
        .service()
        .list_recent_mood(&profile.id, TIMELINE_LIMIT)
        .await?)
}

/// Record an emotional event unless its text contains crisis language, in
/// which case nothing is stored and the crisis resources are returned.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for an out-of-range intensity.
pub async fn log_emotional_event(
    ctx: &ApiContext,
    caller: &Caller,
    input: LogEventInput,
) -> Result<ScreenedOutput, ApiError> {
    authorize(Access::Client, caller)?;
    check_score("intensity", input.intensity)?;
    let profile = ctx.client_profile(caller).await?;

    let screened = [
        input.description.as_deref(),
        input.triggers.as_deref(),
        input.coping_strategies_used.as_deref(),
    ];
    if detect_in_fields(screened.into_iter().flatten()) {
        tracing::warn!(client_id = %profile.id, source = "emotional_event", "crisis language detected; entry not saved");
        return Ok(ScreenedOutput::crisis());
    }

    let event = ctx
        .service()
        .log_emotional_event(
            &profile.id,
            &NewEmotionalEvent {
                event_type: input.event_type,
                intensity: input.intensity,
                description: input.description,
                triggers: input.triggers,
                coping_strategies_used: input.coping_strategies_used,
                location: input.location,
                shared_with_therapist: input.shared_with_therapist,
            },
        )
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::LogEmotionalEvent)
            .resource(ResourceType::EmotionalEvent, &event.id),
    )
    .await;
    Ok(ScreenedOutput::saved(None))
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_emotional_events(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Vec<EmotionalEvent>, ApiError> {
    let profile = client_for(ctx, caller).await?;
    Ok(ctx
        .service()
        .list_recent_events(&profile.id, EVENT_LIST_LIMIT)
        .await?)
}

/// Screen the responses, generate a reflection, then store the check-in and
/// the reflection summary together.
///
/// # Errors
///
/// - [`ApiError::BadRequest`] for an out-of-range mood.
/// - [`ApiError::Upstream`] when the provider call fails; nothing is stored.
pub async fn complete_check_in(
    ctx: &ApiContext,
    caller: &Caller,
    input: CheckInInput,
) -> Result<ScreenedOutput, ApiError> {
    authorize(Access::Client, caller)?;
    check_opt_score("moodAtCheckIn", input.mood_at_check_in)?;
    let profile = ctx.client_profile(caller).await?;

    let response_text = input
        .responses
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    if detect_crisis_language(&response_text) {
        tracing::warn!(client_id = %profile.id, source = "check_in", "crisis language detected; entry not saved");
        return Ok(ScreenedOutput::crisis());
    }

    let svc = ctx.service();
    let mood = svc
        .list_recent_mood(&profile.id, REFLECTION_MOOD_LIMIT)
        .await?;
    let events = svc
        .list_recent_events(&profile.id, REFLECTION_EVENT_LIMIT)
        .await?;
    let goals = svc.list_active_goals(&profile.id).await?;

    let generated = ctx
        .generator()
        .reflection(&ReflectionInput {
            modality: profile.primary_modality,
            recent_mood_scores: mood.iter().map(|m| m.mood_score).collect(),
            recent_events: events
                .iter()
                .map(|e| format!("{}: {}", e.event_type, e.description.as_deref().unwrap_or("")))
                .collect(),
            client_goals: goals.into_iter().map(|g| g.goal_text).collect(),
        })
        .await?;

    let (check_in, _reflection) = svc
        .create_check_in_with_reflection(
            &profile.id,
            &NewCheckIn {
                check_in_type: input.check_in_type,
                responses: input.responses,
                ai_prompt_used: None,
                ai_reflection_generated: Some(generated.content.clone()),
                mood_at_check_in: input.mood_at_check_in,
            },
            &NewAiSummary {
                client_id: profile.id.clone(),
                therapist_id: profile.therapist_id.clone(),
                summary_type: SummaryType::ReflectionPrompt,
                content: generated.content.clone(),
                modality: profile.primary_modality,
                data_window_start: mood.last().map(|m| m.recorded_at),
                data_window_end: Some(Utc::now()),
                tokens_used: generated.tokens_used,
            },
        )
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::CompleteCheckin)
            .resource(ResourceType::CheckIn, &check_in.id)
            .details(&CheckInDetail {
                check_in_type: check_in.check_in_type,
            }),
    )
    .await;
    Ok(ScreenedOutput::saved(Some(generated.content)))
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_homework(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Vec<HomeworkAssignment>, ApiError> {
    let profile = client_for(ctx, caller).await?;
    Ok(ctx.service().list_homework(&profile.id).await?)
}

/// # Errors
///
/// - [`ApiError::BadRequest`] when `status` is `assigned` or the homework
///   state machine rejects the change.
/// - [`ApiError::Forbidden`] for homework assigned to another client.
pub async fn update_homework_status(
    ctx: &ApiContext,
    caller: &Caller,
    input: UpdateHomeworkInput,
) -> Result<HomeworkAssignment, ApiError> {
    authorize(Access::Client, caller)?;
    if input.status == HomeworkStatus::Assigned {
        return Err(ApiError::BadRequest(
            "status must be one of in_progress, completed, skipped".into(),
        ));
    }
    let profile = ctx.client_profile(caller).await?;
    let before = ctx
        .service()
        .get_homework_for_client(&input.homework_id, &profile.id)
        .await?;
    let after = ctx
        .service()
        .transition_homework(&before.id, input.status, input.completion_notes.as_deref())
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::UpdateHomework)
            .resource(ResourceType::Homework, &after.id)
            .details(&StatusChangedDetail {
                from: before.status.to_string(),
                to: after.status.to_string(),
                reason: None,
            }),
    )
    .await;
    Ok(after)
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_goals(ctx: &ApiContext, caller: &Caller) -> Result<Vec<TherapyGoal>, ApiError> {
    let profile = client_for(ctx, caller).await?;
    Ok(ctx.service().list_goals(&profile.id).await?)
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn get_reflection_prompts(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Vec<AiSummary>, ApiError> {
    let profile = client_for(ctx, caller).await?;
    Ok(ctx
        .service()
        .list_summaries(
            &profile.id,
            Some(SummaryType::ReflectionPrompt),
            REFLECTION_LIST_LIMIT,
        )
        .await?)
}
