//! AI summary repository. Rows are immutable: insert and read only.

use chrono::{DateTime, Utc};

use haven_core::entities::AiSummary;
use haven_core::enums::{Modality, SummaryType};
use haven_core::ids::PREFIX_SUMMARY;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_u32, opt_rfc3339, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, client_id, therapist_id, summary_type, content, modality, \
     data_window_start, data_window_end, tokens_used, created_at";

fn row_to_summary(row: &libsql::Row) -> Result<AiSummary, DatabaseError> {
    Ok(AiSummary {
        id: row.get(0)?,
        client_id: row.get(1)?,
        therapist_id: row.get(2)?,
        summary_type: parse_enum(&row.get::<String>(3)?)?,
        content: row.get(4)?,
        modality: parse_enum(&row.get::<String>(5)?)?,
        data_window_start: get_opt_datetime(row, 6)?,
        data_window_end: get_opt_datetime(row, 7)?,
        tokens_used: get_opt_u32(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewAiSummary {
    pub client_id: String,
    pub therapist_id: String,
    pub summary_type: SummaryType,
    pub content: String,
    pub modality: Modality,
    pub data_window_start: Option<DateTime<Utc>>,
    pub data_window_end: Option<DateTime<Utc>>,
    pub tokens_used: Option<u32>,
}

pub(crate) async fn insert_summary(
    conn: &libsql::Connection,
    id: &str,
    new: &NewAiSummary,
    now: DateTime<Utc>,
) -> Result<AiSummary, DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO ai_summaries ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        libsql::params![
            id,
            new.client_id.as_str(),
            new.therapist_id.as_str(),
            new.summary_type.as_str(),
            new.content.as_str(),
            new.modality.as_str(),
            opt_rfc3339(new.data_window_start),
            opt_rfc3339(new.data_window_end),
            new.tokens_used,
            now.to_rfc3339()
        ],
    )
    .await?;

    tracing::debug!(
        summary_id = %id,
        summary_type = %new.summary_type,
        tokens_used = ?new.tokens_used,
        "ai summary stored"
    );

    Ok(AiSummary {
        id: id.to_string(),
        client_id: new.client_id.clone(),
        therapist_id: new.therapist_id.clone(),
        summary_type: new.summary_type,
        content: new.content.clone(),
        modality: new.modality,
        data_window_start: new.data_window_start,
        data_window_end: new.data_window_end,
        tokens_used: new.tokens_used,
        created_at: now,
    })
}

impl HavenService {
    pub async fn create_summary(&self, new: &NewAiSummary) -> Result<AiSummary, DatabaseError> {
        let id = self.db().generate_id(PREFIX_SUMMARY).await?;
        insert_summary(self.db().conn(), &id, new, Utc::now()).await
    }

    /// Newest first, optionally filtered by type.
    pub async fn list_summaries(
        &self,
        client_id: &str,
        summary_type: Option<SummaryType>,
        limit: u32,
    ) -> Result<Vec<AiSummary>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![client_id.into()];
        let mut where_clause = String::from("client_id = ?1");
        if let Some(kind) = summary_type {
            params.push(kind.as_str().into());
            where_clause.push_str(" AND summary_type = ?2");
        }

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM ai_summaries WHERE {where_clause}
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push(row_to_summary(&row)?);
        }
        Ok(summaries)
    }

    pub async fn count_summaries(&self, client_id: &str) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM ai_summaries WHERE client_id = ?1",
                [client_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        crate::helpers::get_u32(&row, 0)
    }
}
