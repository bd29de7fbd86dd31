//! Subscription record repository. One row per therapist.

use chrono::{DateTime, Utc};

use haven_core::entities::SubscriptionRecord;
use haven_core::enums::{SubscriptionStatus, SubscriptionTier};
use haven_core::ids::PREFIX_SUBSCRIPTION;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_datetime, opt_rfc3339, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, therapist_id, tier, status, current_period_start, \
     current_period_end, cancel_at_period_end, created_at, updated_at";

fn row_to_subscription(row: &libsql::Row) -> Result<SubscriptionRecord, DatabaseError> {
    Ok(SubscriptionRecord {
        id: row.get(0)?,
        therapist_id: row.get(1)?,
        tier: parse_enum(&row.get::<String>(2)?)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        current_period_start: get_opt_datetime(row, 4)?,
        current_period_end: get_opt_datetime(row, 5)?,
        cancel_at_period_end: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl HavenService {
    pub async fn find_subscription(
        &self,
        therapist_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM subscription_records WHERE therapist_id = ?1"),
                [therapist_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_subscription(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace the therapist's subscription period.
    pub async fn upsert_subscription(
        &self,
        therapist_id: &str,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<SubscriptionRecord, DatabaseError> {
        let now = Utc::now().to_rfc3339();

        if let Some(existing) = self.find_subscription(therapist_id).await? {
            self.db()
                .conn()
                .execute(
                    "UPDATE subscription_records
                     SET tier = ?1, status = ?2, current_period_start = ?3, current_period_end = ?4,
                         cancel_at_period_end = 0, updated_at = ?5
                     WHERE id = ?6",
                    libsql::params![
                        tier.as_str(),
                        status.as_str(),
                        period_start.to_rfc3339(),
                        period_end.to_rfc3339(),
                        now.as_str(),
                        existing.id.as_str()
                    ],
                )
                .await?;
        } else {
            let id = self.db().generate_id(PREFIX_SUBSCRIPTION).await?;
            self.db()
                .conn()
                .execute(
                    &format!(
                        "INSERT INTO subscription_records ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)"
                    ),
                    libsql::params![
                        id.as_str(),
                        therapist_id,
                        tier.as_str(),
                        status.as_str(),
                        opt_rfc3339(Some(period_start)),
                        opt_rfc3339(Some(period_end)),
                        now.as_str()
                    ],
                )
                .await?;
        }

        self.find_subscription(therapist_id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }
}
