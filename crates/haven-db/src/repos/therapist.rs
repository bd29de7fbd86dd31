//! Therapist profile repository.

use chrono::Utc;

use haven_core::entities::TherapistProfile;
use haven_core::enums::{SubscriptionStatus, SubscriptionTier};
use haven_core::ids::PREFIX_THERAPIST;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_u32, parse_datetime, parse_enum};
use crate::service::HavenService;
use crate::updates::therapist::TherapistProfileUpdate;

const SELECT_COLS: &str = "id, user_id, license_number, license_state, specialties, bio, \
     practice_name, subscription_tier, subscription_status, max_clients, created_at, updated_at";

fn row_to_therapist(row: &libsql::Row) -> Result<TherapistProfile, DatabaseError> {
    Ok(TherapistProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        license_number: get_opt_string(row, 2)?,
        license_state: get_opt_string(row, 3)?,
        specialties: get_opt_string(row, 4)?,
        bio: get_opt_string(row, 5)?,
        practice_name: get_opt_string(row, 6)?,
        subscription_tier: parse_enum(&row.get::<String>(7)?)?,
        subscription_status: parse_enum(&row.get::<String>(8)?)?,
        max_clients: get_u32(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl HavenService {
    pub async fn get_therapist_profile(&self, id: &str) -> Result<TherapistProfile, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM therapist_profiles WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_therapist(&row)
    }

    pub async fn find_therapist_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TherapistProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM therapist_profiles WHERE user_id = ?1"),
                [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_therapist(&row)?)),
            None => Ok(None),
        }
    }

    /// Create the therapist profile for `user_id`, or apply `update` to the
    /// existing one. New profiles start on the starter tier.
    pub async fn upsert_therapist_profile(
        &self,
        user_id: &str,
        update: &TherapistProfileUpdate,
    ) -> Result<TherapistProfile, DatabaseError> {
        if let Some(existing) = self.find_therapist_by_user(user_id).await? {
            return self.update_therapist_profile(&existing.id, update).await;
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_THERAPIST).await?;
        let tier = SubscriptionTier::Starter;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO therapist_profiles ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    id.as_str(),
                    user_id,
                    update.license_number.as_deref(),
                    update.license_state.as_deref(),
                    update.specialties.as_deref(),
                    update.bio.as_deref(),
                    update.practice_name.as_deref(),
                    tier.as_str(),
                    SubscriptionStatus::Unsubscribed.as_str(),
                    tier.max_clients(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(TherapistProfile {
            id,
            user_id: user_id.to_string(),
            license_number: update.license_number.clone(),
            license_state: update.license_state.clone(),
            specialties: update.specialties.clone(),
            bio: update.bio.clone(),
            practice_name: update.practice_name.clone(),
            subscription_tier: tier,
            subscription_status: SubscriptionStatus::Unsubscribed,
            max_clients: tier.max_clients(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update_therapist_profile(
        &self,
        id: &str,
        update: &TherapistProfileUpdate,
    ) -> Result<TherapistProfile, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        let fields = [
            ("license_number", &update.license_number),
            ("license_state", &update.license_state),
            ("specialties", &update.specialties),
            ("bio", &update.bio),
            ("practice_name", &update.practice_name),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                params.push(value.clone().into());
                sets.push(format!("{column} = ?{}", params.len()));
            }
        }

        if sets.is_empty() {
            return self.get_therapist_profile(id).await;
        }

        params.push(Utc::now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(id.into());
        let sql = format!(
            "UPDATE therapist_profiles SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_therapist_profile(id).await
    }

    /// Apply a plan change: tier, billing status, and the tier's seat limit.
    pub async fn set_therapist_plan(
        &self,
        id: &str,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    ) -> Result<TherapistProfile, DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE therapist_profiles
                 SET subscription_tier = ?1, subscription_status = ?2, max_clients = ?3, updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    tier.as_str(),
                    status.as_str(),
                    tier.max_clients(),
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_therapist_profile(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_user, test_service};
    use crate::updates::therapist::TherapistProfileUpdateBuilder;
    use haven_core::enums::Role;

    #[tokio::test]
    async fn upsert_creates_starter_profile() {
        let svc = test_service().await;
        let user = seed_user(&svc, "t1", Role::Therapist).await;

        let update = TherapistProfileUpdateBuilder::new()
            .practice_name("Harbor Counseling")
            .build();
        let profile = svc.upsert_therapist_profile(&user.id, &update).await.unwrap();

        assert!(profile.id.starts_with("thp-"));
        assert_eq!(profile.subscription_tier, SubscriptionTier::Starter);
        assert_eq!(profile.subscription_status, SubscriptionStatus::Unsubscribed);
        assert_eq!(profile.max_clients, 5);
        assert_eq!(profile.practice_name.as_deref(), Some("Harbor Counseling"));
    }

    #[tokio::test]
    async fn upsert_twice_updates_in_place() {
        let svc = test_service().await;
        let user = seed_user(&svc, "t1", Role::Therapist).await;

        let first = svc
            .upsert_therapist_profile(&user.id, &TherapistProfileUpdate::default())
            .await
            .unwrap();
        let update = TherapistProfileUpdateBuilder::new().bio("EMDR trained").build();
        let second = svc.upsert_therapist_profile(&user.id, &update).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.bio.as_deref(), Some("EMDR trained"));
    }

    #[tokio::test]
    async fn plan_change_sets_seat_limit() {
        let svc = test_service().await;
        let user = seed_user(&svc, "t1", Role::Therapist).await;
        let profile = svc
            .upsert_therapist_profile(&user.id, &TherapistProfileUpdate::default())
            .await
            .unwrap();

        let upgraded = svc
            .set_therapist_plan(&profile.id, SubscriptionTier::Practice, SubscriptionStatus::Active)
            .await
            .unwrap();
        assert_eq!(upgraded.max_clients, 100);
        assert_eq!(upgraded.subscription_status, SubscriptionStatus::Active);
    }
}
