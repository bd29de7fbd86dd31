//! axum RPC surface.
//!
//! `POST /rpc/{procedure}` with a camelCase JSON body dispatches to the
//! matching procedure. The caller is resolved from gateway headers:
//! `x-haven-user-id` names an existing user, otherwise `x-haven-open-id`
//! (with optional name, email and login-method headers) signs the user in.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use haven_core::identity::Caller;
use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::procedures::{audit, auth, client_app, demo, onboarding, subscription, therapist};

pub const USER_ID_HEADER: &str = "x-haven-user-id";
pub const OPEN_ID_HEADER: &str = "x-haven-open-id";
pub const USER_NAME_HEADER: &str = "x-haven-user-name";
pub const USER_EMAIL_HEADER: &str = "x-haven-user-email";
pub const LOGIN_METHOD_HEADER: &str = "x-haven-login-method";

/// Procedures that run without a caller. A stale user id on these resolves
/// to anonymous instead of 401.
const PUBLIC_PROCEDURES: &[&str] = &["auth.me", "demo.submit"];

/// Build the application router.
pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc/{procedure}", post(rpc))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn rpc(
    State(ctx): State<ApiContext>,
    Path(procedure): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let input: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?
    };
    let caller = match resolve_caller(&ctx, &headers).await {
        Err(ApiError::Unauthorized(_)) if PUBLIC_PROCEDURES.contains(&procedure.as_str()) => None,
        resolved => resolved?,
    };
    tracing::debug!(%procedure, user_id = ?caller.as_ref().map(|c| c.user_id.as_str()), "rpc");
    dispatch(&ctx, &procedure, caller.as_ref(), input)
        .await
        .map(Json)
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

async fn resolve_caller(ctx: &ApiContext, headers: &HeaderMap) -> Result<Option<Caller>, ApiError> {
    if let Some(user_id) = header(headers, USER_ID_HEADER) {
        return ctx.caller_for_user_id(user_id).await.map(Some);
    }
    if let Some(open_id) = header(headers, OPEN_ID_HEADER) {
        return ctx
            .sign_in(
                open_id,
                header(headers, USER_NAME_HEADER),
                header(headers, USER_EMAIL_HEADER),
                header(headers, LOGIN_METHOD_HEADER),
            )
            .await
            .map(Some);
    }
    Ok(None)
}

fn input<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("invalid input: {e}")))
}

fn output<T: Serialize>(value: T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

fn require(caller: Option<&Caller>) -> Result<&Caller, ApiError> {
    caller.ok_or_else(|| ApiError::Unauthorized("Please login.".into()))
}

/// Route a `<router>.<name>` procedure to its handler.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown procedure, otherwise
/// whatever the procedure returns.
#[allow(clippy::too_many_lines)]
pub async fn dispatch(
    ctx: &ApiContext,
    procedure: &str,
    caller: Option<&Caller>,
    body: Value,
) -> Result<Value, ApiError> {
    match procedure {
        "auth.me" => output(auth::me(ctx, caller).await?),

        "onboarding.getStatus" => output(onboarding::get_status(ctx, require(caller)?).await?),
        "onboarding.becomeTherapist" => {
            let caller = require(caller)?;
            output(onboarding::become_therapist(ctx, caller, input(body)?).await?)
        }
        "onboarding.completeClientOnboarding" => {
            output(onboarding::complete_client_onboarding(ctx, require(caller)?).await?)
        }
        "onboarding.claimInvite" => {
            let caller = require(caller)?;
            output(onboarding::claim_invite(ctx, caller, input(body)?).await?)
        }

        "therapist.getProfile" => output(therapist::get_profile(ctx, require(caller)?).await?),
        "therapist.updateProfile" => {
            let caller = require(caller)?;
            output(therapist::update_profile(ctx, caller, input(body)?).await?)
        }
        "therapist.listClients" => output(therapist::list_clients(ctx, require(caller)?).await?),
        "therapist.inviteClient" => {
            let caller = require(caller)?;
            output(therapist::invite_client(ctx, caller, input(body)?).await?)
        }
        "therapist.getClientDetail" => {
            let caller = require(caller)?;
            output(therapist::get_client_detail(ctx, caller, input(body)?).await?)
        }
        "therapist.updateClientModality" => {
            let caller = require(caller)?;
            output(therapist::update_client_modality(ctx, caller, input(body)?).await?)
        }
        "therapist.getSessionPrepSummary" => {
            let caller = require(caller)?;
            output(therapist::get_session_prep_summary(ctx, caller, input(body)?).await?)
        }
        "therapist.generatePostSessionSummary" => {
            let caller = require(caller)?;
            output(therapist::generate_post_session_summary(ctx, caller, input(body)?).await?)
        }
        "therapist.getAiSummaries" => {
            let caller = require(caller)?;
            output(therapist::get_ai_summaries(ctx, caller, input(body)?).await?)
        }
        "therapist.createGoal" => {
            let caller = require(caller)?;
            output(therapist::create_goal(ctx, caller, input(body)?).await?)
        }
        "therapist.updateGoal" => {
            let caller = require(caller)?;
            output(therapist::update_goal(ctx, caller, input(body)?).await?)
        }
        "therapist.createHomework" => {
            let caller = require(caller)?;
            output(therapist::create_homework(ctx, caller, input(body)?).await?)
        }
        "therapist.reviewHomework" => {
            let caller = require(caller)?;
            output(therapist::review_homework(ctx, caller, input(body)?).await?)
        }

        "clientApp.getProfile" => output(client_app::get_profile(ctx, require(caller)?).await?),
        "clientApp.getDashboard" => {
            output(client_app::get_dashboard(ctx, require(caller)?).await?)
        }
        "clientApp.logMood" => {
            let caller = require(caller)?;
            output(client_app::log_mood(ctx, caller, input(body)?).await?)
        }
        "clientApp.getMoodTimeline" => {
            output(client_app::get_mood_timeline(ctx, require(caller)?).await?)
        }
        "clientApp.logEmotionalEvent" => {
            let caller = require(caller)?;
            output(client_app::log_emotional_event(ctx, caller, input(body)?).await?)
        }
        "clientApp.getEmotionalEvents" => {
            output(client_app::get_emotional_events(ctx, require(caller)?).await?)
        }
        "clientApp.completeCheckIn" => {
            let caller = require(caller)?;
            output(client_app::complete_check_in(ctx, caller, input(body)?).await?)
        }
        "clientApp.getHomework" => output(client_app::get_homework(ctx, require(caller)?).await?),
        "clientApp.updateHomeworkStatus" => {
            let caller = require(caller)?;
            output(client_app::update_homework_status(ctx, caller, input(body)?).await?)
        }
        "clientApp.getGoals" => output(client_app::get_goals(ctx, require(caller)?).await?),
        "clientApp.getReflectionPrompts" => {
            output(client_app::get_reflection_prompts(ctx, require(caller)?).await?)
        }

        "subscription.get" => output(subscription::get(ctx, require(caller)?).await?),
        "subscription.upgrade" => {
            let caller = require(caller)?;
            output(subscription::upgrade(ctx, caller, input(body)?).await?)
        }

        "audit.getLogs" => {
            let caller = require(caller)?;
            output(audit::get_logs(ctx, caller, input(body)?).await?)
        }

        "demo.submit" => output(demo::submit(ctx, input(body)?).await?),
        "demo.list" => output(demo::list(ctx, require(caller)?).await?),

        other => Err(ApiError::NotFound(format!("No procedure named {other}."))),
    }
}
