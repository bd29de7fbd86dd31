//! Check-in repository. Append-only; the reflection is written with the row.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use haven_core::entities::{AiSummary, CheckIn};
use haven_core::enums::CheckInType;
use haven_core::ids::{PREFIX_CHECK_IN, PREFIX_SUMMARY};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_opt_u8, parse_datetime, parse_enum, to_json_text};
use crate::repos::summary::{NewAiSummary, insert_summary};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, client_id, check_in_type, responses, ai_prompt_used, \
     ai_reflection_generated, mood_at_check_in, completed_at, created_at";

fn row_to_check_in(row: &libsql::Row) -> Result<CheckIn, DatabaseError> {
    let responses: IndexMap<String, String> = serde_json::from_str(&row.get::<String>(3)?)
        .map_err(|e| DatabaseError::Query(format!("Invalid check-in responses: {e}")))?;
    Ok(CheckIn {
        id: row.get(0)?,
        client_id: row.get(1)?,
        check_in_type: parse_enum(&row.get::<String>(2)?)?,
        responses,
        ai_prompt_used: get_opt_string(row, 4)?,
        ai_reflection_generated: get_opt_string(row, 5)?,
        mood_at_check_in: get_opt_u8(row, 6)?,
        completed_at: parse_datetime(&row.get::<String>(7)?)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

#[derive(Debug, Clone, Default)]
pub struct NewCheckIn {
    pub check_in_type: CheckInType,
    pub responses: IndexMap<String, String>,
    pub ai_prompt_used: Option<String>,
    pub ai_reflection_generated: Option<String>,
    pub mood_at_check_in: Option<u8>,
}

async fn insert_check_in(
    conn: &libsql::Connection,
    id: &str,
    client_id: &str,
    new: &NewCheckIn,
    now: DateTime<Utc>,
) -> Result<CheckIn, DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO check_ins ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"
        ),
        libsql::params![
            id,
            client_id,
            new.check_in_type.as_str(),
            to_json_text(&new.responses)?,
            new.ai_prompt_used.as_deref(),
            new.ai_reflection_generated.as_deref(),
            new.mood_at_check_in.map(i64::from),
            now.to_rfc3339()
        ],
    )
    .await?;

    Ok(CheckIn {
        id: id.to_string(),
        client_id: client_id.to_string(),
        check_in_type: new.check_in_type,
        responses: new.responses.clone(),
        ai_prompt_used: new.ai_prompt_used.clone(),
        ai_reflection_generated: new.ai_reflection_generated.clone(),
        mood_at_check_in: new.mood_at_check_in,
        completed_at: now,
        created_at: now,
    })
}

impl HavenService {
    pub async fn create_check_in(
        &self,
        client_id: &str,
        new: &NewCheckIn,
    ) -> Result<CheckIn, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CHECK_IN).await?;
        insert_check_in(self.db().conn(), &id, client_id, new, Utc::now()).await
    }

    /// Store a check-in and its reflection summary in one transaction.
    /// Neither row is kept when either insert fails.
    pub async fn create_check_in_with_reflection(
        &self,
        client_id: &str,
        check_in: &NewCheckIn,
        reflection: &NewAiSummary,
    ) -> Result<(CheckIn, AiSummary), DatabaseError> {
        let now = Utc::now();
        let check_in_id = self.db().generate_id(PREFIX_CHECK_IN).await?;
        let summary_id = self.db().generate_id(PREFIX_SUMMARY).await?;

        let tx = self.db().conn().transaction().await?;
        let stored = insert_check_in(&tx, &check_in_id, client_id, check_in, now).await?;
        let summary = insert_summary(&tx, &summary_id, reflection, now).await?;
        tx.commit().await?;
        Ok((stored, summary))
    }

    pub async fn list_recent_check_ins(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<CheckIn>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM check_ins WHERE client_id = ?1
                     ORDER BY completed_at DESC, rowid DESC LIMIT {limit}"
                ),
                [client_id],
            )
            .await?;

        let mut check_ins = Vec::new();
        while let Some(row) = rows.next().await? {
            check_ins.push(row_to_check_in(&row)?);
        }
        Ok(check_ins)
    }

    pub async fn count_check_ins(&self, client_id: &str) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM check_ins WHERE client_id = ?1", [client_id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        crate::helpers::get_u32(&row, 0)
    }
}
