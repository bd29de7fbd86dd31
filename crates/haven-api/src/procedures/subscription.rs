//! Subscription procedures. No payment provider is involved: an upgrade
//! records a 30-day active period and applies the tier's seat limit.

use chrono::{Duration, Utc};
use haven_core::audit_detail::SubscriptionChangedDetail;
use haven_core::entities::SubscriptionRecord;
use haven_core::enums::{AuditAction, ResourceType, SubscriptionStatus, SubscriptionTier};
use haven_core::identity::Caller;
use serde::Deserialize;

use super::Success;
use crate::context::{ApiContext, AuditEntry};
use crate::error::ApiError;
use crate::guards::{Access, authorize};

const PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeInput {
    pub tier: SubscriptionTier,
}

/// Current subscription record, or `None` when the caller has no therapist
/// profile or has never upgraded.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-therapist callers.
pub async fn get(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Option<SubscriptionRecord>, ApiError> {
    authorize(Access::Therapist, caller)?;
    let Some(profile) = ctx
        .service()
        .find_therapist_by_user(&caller.user_id)
        .await?
    else {
        return Ok(None);
    };
    Ok(ctx.service().find_subscription(&profile.id).await?)
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no therapist profile.
pub async fn upgrade(
    ctx: &ApiContext,
    caller: &Caller,
    input: UpgradeInput,
) -> Result<Success, ApiError> {
    authorize(Access::Therapist, caller)?;
    let profile = ctx.therapist_profile(caller).await?;

    let start = Utc::now();
    let record = ctx
        .service()
        .upsert_subscription(
            &profile.id,
            input.tier,
            SubscriptionStatus::Active,
            start,
            start + Duration::days(PERIOD_DAYS),
        )
        .await?;
    let updated = ctx
        .service()
        .set_therapist_plan(&profile.id, input.tier, SubscriptionStatus::Active)
        .await?;
    tracing::info!(therapist_id = %profile.id, tier = %input.tier, "subscription upgraded");

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::UpgradeSubscription)
            .resource(ResourceType::Subscription, &record.id)
            .details(&SubscriptionChangedDetail {
                tier: input.tier,
                max_clients: updated.max_clients,
            }),
    )
    .await;
    Ok(Success::ok())
}
