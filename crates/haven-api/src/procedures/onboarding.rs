//! Role selection and invite claiming.

use chrono::Utc;
use haven_core::entities::{ClientProfile, TherapistProfile};
use haven_core::enums::{AuditAction, ResourceType, Role};
use haven_core::identity::Caller;
use haven_db::updates::therapist::TherapistProfileUpdate;
use serde::{Deserialize, Serialize};

use super::Success;
use crate::context::{ApiContext, AuditEntry};
use crate::error::ApiError;
use crate::guards::{Access, authorize};

/// Practice fields accepted by `becomeTherapist` and `therapist.updateProfile`.
pub type TherapistProfileInput = TherapistProfileUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub role: Role,
    pub therapist_profile: Option<TherapistProfile>,
    pub client_profile: Option<ClientProfile>,
    pub has_profile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimInviteInput {
    pub token: String,
}

/// # Errors
///
/// Returns [`ApiError::Internal`] on database failure.
pub async fn get_status(ctx: &ApiContext, caller: &Caller) -> Result<OnboardingStatus, ApiError> {
    authorize(Access::Protected, caller)?;
    let (therapist_profile, client_profile) = match caller.role {
        Role::Therapist => (
            ctx.service().find_therapist_by_user(&caller.user_id).await?,
            None,
        ),
        Role::Client => (None, ctx.service().find_client_by_user(&caller.user_id).await?),
        Role::User | Role::Admin => (None, None),
    };
    let has_profile = therapist_profile.is_some() || client_profile.is_some();
    Ok(OnboardingStatus {
        role: caller.role,
        therapist_profile,
        client_profile,
        has_profile,
    })
}

/// Switch the caller to the therapist role and create (or update) their
/// practice profile. Admins keep the admin role.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] on database failure.
pub async fn become_therapist(
    ctx: &ApiContext,
    caller: &Caller,
    input: TherapistProfileInput,
) -> Result<Success, ApiError> {
    authorize(Access::Protected, caller)?;
    if caller.role != Role::Admin {
        ctx.service()
            .set_user_role(&caller.user_id, Role::Therapist)
            .await?;
    }
    let profile = ctx
        .service()
        .upsert_therapist_profile(&caller.user_id, &input)
        .await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::BecomeTherapist)
            .resource(ResourceType::TherapistProfile, &profile.id),
    )
    .await;
    Ok(Success::ok())
}

/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no client profile.
pub async fn complete_client_onboarding(
    ctx: &ApiContext,
    caller: &Caller,
) -> Result<Success, ApiError> {
    authorize(Access::Client, caller)?;
    let profile = ctx.client_profile(caller).await?;
    ctx.service().complete_client_onboarding(&profile.id).await?;

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::CompleteOnboarding)
            .resource(ResourceType::ClientProfile, &profile.id),
    )
    .await;
    Ok(Success::ok())
}

/// Bind a pending client profile to the caller and make them a client.
///
/// # Errors
///
/// - [`ApiError::NotFound`] for an unknown token.
/// - [`ApiError::BadRequest`] for an expired token, or when the caller
///   already has a client profile.
pub async fn claim_invite(
    ctx: &ApiContext,
    caller: &Caller,
    input: ClaimInviteInput,
) -> Result<Success, ApiError> {
    authorize(Access::Protected, caller)?;
    let profile = ctx
        .service()
        .find_client_by_invite_token(&input.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired invite token.".into()))?;

    if profile.invite_token_expiry.is_some_and(|exp| exp < Utc::now()) {
        return Err(ApiError::BadRequest("Invite token has expired.".into()));
    }
    if ctx
        .service()
        .find_client_by_user(&caller.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "You already have a client profile.".into(),
        ));
    }

    ctx.service()
        .claim_client_invite(&profile.id, &caller.user_id)
        .await?;
    if caller.role != Role::Admin {
        ctx.service()
            .set_user_role(&caller.user_id, Role::Client)
            .await?;
    }
    tracing::info!(client_id = %profile.id, "invite claimed");

    ctx.audit(
        caller,
        AuditEntry::new(AuditAction::ClaimInvite).resource(ResourceType::ClientProfile, &profile.id),
    )
    .await;
    Ok(Success::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::therapist::{self, InviteClientInput};
    use crate::test_support::{seed_caller, seed_therapist, test_ctx};
    use haven_core::enums::Modality;

    #[tokio::test]
    async fn user_becomes_therapist() {
        let (ctx, _llm) = test_ctx().await;
        let caller = seed_caller(&ctx, "oid-t", Role::User).await;

        let status = get_status(&ctx, &caller).await.unwrap();
        assert!(!status.has_profile);

        become_therapist(
            &ctx,
            &caller,
            TherapistProfileInput {
                practice_name: Some("Harbor Counseling".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let caller = ctx.caller_for_user_id(&caller.user_id).await.unwrap();
        assert_eq!(caller.role, Role::Therapist);
        let status = get_status(&ctx, &caller).await.unwrap();
        assert!(status.has_profile);
        assert_eq!(
            status.therapist_profile.unwrap().practice_name.as_deref(),
            Some("Harbor Counseling")
        );
    }

    #[tokio::test]
    async fn claim_invite_binds_profile() {
        let (ctx, _llm) = test_ctx().await;
        let (therapist_caller, _profile) = seed_therapist(&ctx, "oid-t").await;
        let invite = therapist::invite_client(
            &ctx,
            &therapist_caller,
            InviteClientInput {
                client_email: "sam@example.com".into(),
                primary_modality: Modality::Dbt,
                treatment_goals_summary: None,
                session_frequency: None,
            },
        )
        .await
        .unwrap();

        let claimer = seed_caller(&ctx, "oid-sam", Role::User).await;
        claim_invite(
            &ctx,
            &claimer,
            ClaimInviteInput {
                token: invite.invite_token.clone(),
            },
        )
        .await
        .unwrap();

        let claimer = ctx.caller_for_user_id(&claimer.user_id).await.unwrap();
        assert_eq!(claimer.role, Role::Client);
        let profile = ctx.client_profile(&claimer).await.unwrap();
        assert_eq!(profile.primary_modality, Modality::Dbt);
        assert!(profile.invite_token.is_none());

        // Token is single use.
        let again = claim_invite(
            &ctx,
            &seed_caller(&ctx, "oid-other", Role::User).await,
            ClaimInviteInput {
                token: invite.invite_token,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(again, ApiError::NotFound(_)));

        complete_client_onboarding(&ctx, &claimer).await.unwrap();
        assert!(ctx.client_profile(&claimer).await.unwrap().onboarding_complete);
    }

    #[tokio::test]
    async fn expired_invite_is_rejected() {
        let (ctx, _llm) = test_ctx().await;
        let (therapist_caller, _profile) = seed_therapist(&ctx, "oid-t").await;
        let invite = therapist::invite_client(
            &ctx,
            &therapist_caller,
            InviteClientInput {
                client_email: "sam@example.com".into(),
                primary_modality: Modality::General,
                treatment_goals_summary: None,
                session_frequency: None,
            },
        )
        .await
        .unwrap();
        ctx.service()
            .db()
            .conn()
            .execute(
                "UPDATE client_profiles SET invite_token_expiry = '2020-01-01T00:00:00+00:00'",
                (),
            )
            .await
            .unwrap();

        let claimer = seed_caller(&ctx, "oid-sam", Role::User).await;
        let err = claim_invite(
            &ctx,
            &claimer,
            ClaimInviteInput {
                token: invite.invite_token,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(m) if m == "Invite token has expired."));
    }

    #[tokio::test]
    async fn onboarding_requires_client_role() {
        let (ctx, _llm) = test_ctx().await;
        let caller = seed_caller(&ctx, "oid-u", Role::User).await;
        let err = complete_client_onboarding(&ctx, &caller).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
