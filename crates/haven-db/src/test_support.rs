//! Shared test utilities for haven-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use haven_core::entities::{ClientProfile, TherapistProfile, User};
    use haven_core::enums::{Modality, Role};

    use crate::HavenDb;
    use crate::repos::client::NewClientProfile;
    use crate::service::HavenService;
    use crate::updates::therapist::TherapistProfileUpdate;

    /// Create an in-memory `HavenService`.
    pub async fn test_service() -> HavenService {
        let db = HavenDb::open_local(":memory:").await.unwrap();
        HavenService::from_db(db)
    }

    /// Create a user with the given role.
    pub async fn seed_user(svc: &HavenService, open_id: &str, role: Role) -> User {
        let user = svc
            .upsert_user(open_id, Some(open_id), None, None, None)
            .await
            .unwrap();
        svc.set_user_role(&user.id, role).await.unwrap()
    }

    /// Create a therapist user plus profile.
    pub async fn seed_therapist(svc: &HavenService, open_id: &str) -> TherapistProfile {
        let user = seed_user(svc, open_id, Role::Therapist).await;
        svc.upsert_therapist_profile(&user.id, &TherapistProfileUpdate::default())
            .await
            .unwrap()
    }

    /// Create a client user plus a claimed profile owned by `therapist`.
    pub async fn seed_client(
        svc: &HavenService,
        therapist: &TherapistProfile,
        open_id: &str,
    ) -> ClientProfile {
        let user = seed_user(svc, open_id, Role::Client).await;
        svc.create_client_profile(&NewClientProfile {
            user_id: user.id,
            therapist_id: therapist.id.clone(),
            primary_modality: Modality::Cbt,
            treatment_goals_summary: None,
            session_frequency: None,
            invite_token: None,
            invite_token_expiry: None,
        })
        .await
        .unwrap()
    }
}
