//! Demo request intake. Submission is public; listing is admin-only.

use haven_core::entities::DemoRequest;
use haven_core::enums::{AuditAction, ResourceType};
use haven_core::identity::Caller;
use haven_db::repos::demo::NewDemoRequest;
use serde::Deserialize;

use super::Success;
use crate::context::{ANONYMOUS_ACTOR, ApiContext, AuditEntry};
use crate::error::ApiError;
use crate::guards::{Access, authorize};
use crate::validation::{check_email, check_non_empty};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoRequestInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub practice_name: Option<String>,
    #[serde(default)]
    pub practice_size: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// # Errors
///
/// Returns [`ApiError::BadRequest`] for an empty name or malformed email.
pub async fn submit(ctx: &ApiContext, input: DemoRequestInput) -> Result<Success, ApiError> {
    check_non_empty("name", &input.name)?;
    check_email("email", &input.email)?;

    let request = ctx
        .service()
        .create_demo_request(&NewDemoRequest {
            name: input.name,
            email: input.email,
            practice_name: input.practice_name,
            practice_size: input.practice_size,
            message: input.message,
        })
        .await?;
    tracing::info!(demo_request_id = %request.id, "demo request received");

    ctx.audit_as(
        ANONYMOUS_ACTOR,
        None,
        AuditEntry::new(AuditAction::SubmitDemoRequest)
            .resource(ResourceType::DemoRequest, &request.id),
    )
    .await;
    Ok(Success::ok())
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admin callers.
pub async fn list(ctx: &ApiContext, caller: &Caller) -> Result<Vec<DemoRequest>, ApiError> {
    authorize(Access::Admin, caller)?;
    Ok(ctx
        .service()
        .list_demo_requests(ctx.default_limit())
        .await?)
}
