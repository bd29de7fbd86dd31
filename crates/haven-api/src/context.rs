//! Shared procedure context.
//!
//! Built once at startup and cloned into each request. Holds the data-access
//! service and the LLM client; there is no other shared state.

use std::sync::Arc;

use haven_ai::{LlmClient, SummaryGenerator};
use haven_config::GeneralConfig;
use haven_core::entities::{ClientProfile, TherapistProfile};
use haven_core::enums::{AuditAction, ResourceType, Role};
use haven_core::identity::Caller;
use haven_db::error::DatabaseError;
use haven_db::repos::audit::NewAuditLog;
use haven_db::service::HavenService;
use serde::Serialize;

use crate::error::ApiError;

/// Actor id recorded for unauthenticated actions such as demo requests.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

#[derive(Clone)]
pub struct ApiContext {
    service: Arc<HavenService>,
    llm: Arc<dyn LlmClient>,
    owner_open_id: Option<String>,
    default_limit: u32,
}

/// One audit row, minus actor and timestamp.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    action: AuditAction,
    resource_type: Option<ResourceType>,
    resource_id: Option<String>,
    details: Option<serde_json::Value>,
}

impl AuditEntry {
    #[must_use]
    pub const fn new(action: AuditAction) -> Self {
        Self {
            action,
            resource_type: None,
            resource_id: None,
            details: None,
        }
    }

    #[must_use]
    pub fn resource(mut self, resource_type: ResourceType, id: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn details<T: Serialize>(mut self, details: &T) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }
}

impl ApiContext {
    #[must_use]
    pub fn new(service: HavenService, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            service: Arc::new(service),
            llm,
            owner_open_id: None,
            default_limit: 20,
        }
    }

    /// Apply the `[general]` config section.
    #[must_use]
    pub fn with_general(mut self, general: &GeneralConfig) -> Self {
        self.owner_open_id = Some(general.owner_open_id.clone()).filter(|o| !o.is_empty());
        self.default_limit = general.default_limit;
        self
    }

    #[must_use]
    pub fn service(&self) -> &HavenService {
        &self.service
    }

    #[must_use]
    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    #[must_use]
    pub fn generator(&self) -> SummaryGenerator<'_> {
        SummaryGenerator::new(self.llm.as_ref())
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Resolve a caller from a `users.id` supplied by the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if no such user exists.
    pub async fn caller_for_user_id(&self, user_id: &str) -> Result<Caller, ApiError> {
        match self.service.get_user(user_id).await {
            Ok(user) => Ok(Caller::new(user.id, user.role)),
            Err(DatabaseError::NoResult) => Err(ApiError::Unauthorized("Please login.".into())),
            Err(e) => Err(e.into()),
        }
    }

    /// Upsert the user behind an external open id and return it as a caller.
    /// The configured owner open id is promoted to admin.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] on database failure.
    pub async fn sign_in(
        &self,
        open_id: &str,
        name: Option<&str>,
        email: Option<&str>,
        login_method: Option<&str>,
    ) -> Result<Caller, ApiError> {
        let user = self
            .service
            .upsert_user(open_id, name, email, login_method, self.owner_open_id.as_deref())
            .await?;
        tracing::debug!(user_id = %user.id, role = %user.role, "caller signed in");
        Ok(Caller::new(user.id, user.role))
    }

    /// The caller's therapist profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the caller has none.
    pub async fn therapist_profile(&self, caller: &Caller) -> Result<TherapistProfile, ApiError> {
        self.service
            .find_therapist_by_user(&caller.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Therapist profile not found.".into()))
    }

    /// The caller's client profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the caller has none.
    pub async fn client_profile(&self, caller: &Caller) -> Result<ClientProfile, ApiError> {
        self.service
            .find_client_by_user(&caller.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Client profile not found.".into()))
    }

    /// Record an audit entry for `caller`. Failures are logged, never returned.
    pub async fn audit(&self, caller: &Caller, entry: AuditEntry) {
        self.audit_as(&caller.user_id, Some(caller.role), entry)
            .await;
    }

    /// Record an audit entry for an explicit actor id.
    pub async fn audit_as(&self, user_id: &str, user_role: Option<Role>, entry: AuditEntry) {
        let action = entry.action;
        let record = NewAuditLog {
            user_id: user_id.to_string(),
            user_role,
            action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
        };
        if let Err(e) = self.service.append_audit(&record).await {
            tracing::warn!(%action, user_id, error = %e, "audit write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ctx;
    use haven_db::repos::audit::AuditFilter;

    #[tokio::test]
    async fn sign_in_promotes_owner() {
        let (ctx, _llm) = test_ctx().await;
        let ctx = ctx.with_general(&GeneralConfig {
            owner_open_id: "owner-1".into(),
            default_limit: 20,
        });

        let owner = ctx.sign_in("owner-1", Some("Owner"), None, None).await.unwrap();
        assert_eq!(owner.role, Role::Admin);
        let other = ctx.sign_in("someone", None, None, None).await.unwrap();
        assert_eq!(other.role, Role::User);
    }

    #[tokio::test]
    async fn unknown_user_id_is_unauthorized() {
        let (ctx, _llm) = test_ctx().await;
        let err = ctx.caller_for_user_id("usr-deadbeef").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn audit_writes_actor_and_resource() {
        let (ctx, _llm) = test_ctx().await;
        let caller = Caller::new("usr-00000001", Role::Therapist);
        ctx.audit(
            &caller,
            AuditEntry::new(AuditAction::CreateGoal).resource(ResourceType::TherapyGoal, "goal-1"),
        )
        .await;

        let rows = ctx
            .service()
            .query_audit(&AuditFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "usr-00000001");
        assert_eq!(rows[0].user_role, Some(Role::Therapist));
        assert_eq!(rows[0].resource_id.as_deref(), Some("goal-1"));
    }

    #[tokio::test]
    async fn audit_failure_is_swallowed() {
        let (ctx, _llm) = test_ctx().await;
        ctx.service()
            .db()
            .conn()
            .execute("DROP TABLE audit_logs", ())
            .await
            .unwrap();
        let caller = Caller::new("usr-00000001", Role::Client);
        ctx.audit(&caller, AuditEntry::new(AuditAction::LogMood)).await;
    }
}
