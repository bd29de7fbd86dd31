//! Shared fixtures for procedure tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use haven_ai::{AiError, ChatMessage, LlmClient, LlmResponse};
use haven_core::entities::{ClientProfile, TherapistProfile};
use haven_core::enums::{Modality, Role};
use haven_core::identity::Caller;
use haven_db::repos::client::NewClientProfile;
use haven_db::service::HavenService;
use haven_db::updates::therapist::TherapistProfileUpdate;

use crate::context::ApiContext;

/// LLM fake that records every call and returns a canned reply.
pub struct FakeLlm {
    reply: Mutex<Result<LlmResponse, u16>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(LlmResponse::from_text(text, Some(321)))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent call fail with an API error of `status`.
    pub fn fail_with(&self, status: u16) {
        *self.reply.lock().unwrap() = Err(status);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Vec<ChatMessage> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &*self.reply.lock().unwrap() {
            Ok(resp) => Ok(resp.clone()),
            Err(status) => Err(AiError::Api {
                status: *status,
                message: "provider unavailable".into(),
            }),
        }
    }
}

pub async fn test_ctx() -> (ApiContext, Arc<FakeLlm>) {
    let service = HavenService::new_local(":memory:").await.unwrap();
    let llm = Arc::new(FakeLlm::replying("1. What felt different this week?"));
    (ApiContext::new(service, llm.clone()), llm)
}

pub async fn seed_caller(ctx: &ApiContext, open_id: &str, role: Role) -> Caller {
    let user = ctx
        .service()
        .upsert_user(open_id, Some(open_id), None, None, None)
        .await
        .unwrap();
    let user = ctx.service().set_user_role(&user.id, role).await.unwrap();
    Caller::new(user.id, user.role)
}

pub async fn seed_therapist(ctx: &ApiContext, open_id: &str) -> (Caller, TherapistProfile) {
    let caller = seed_caller(ctx, open_id, Role::Therapist).await;
    let profile = ctx
        .service()
        .upsert_therapist_profile(&caller.user_id, &TherapistProfileUpdate::default())
        .await
        .unwrap();
    (caller, profile)
}

pub async fn seed_client(
    ctx: &ApiContext,
    therapist: &TherapistProfile,
    open_id: &str,
) -> (Caller, ClientProfile) {
    let caller = seed_caller(ctx, open_id, Role::Client).await;
    let profile = ctx
        .service()
        .create_client_profile(&NewClientProfile {
            user_id: caller.user_id.clone(),
            therapist_id: therapist.id.clone(),
            primary_modality: Modality::Cbt,
            treatment_goals_summary: None,
            session_frequency: None,
            invite_token: None,
            invite_token_expiry: None,
        })
        .await
        .unwrap();
    (caller, profile)
}

/// Count rows in a table directly.
pub async fn count_rows(ctx: &ApiContext, table: &str) -> i64 {
    let mut rows = ctx
        .service()
        .db()
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    row.get::<i64>(0).unwrap()
}
