//! Mood entry repository. Append-only.

use chrono::Utc;

use haven_core::entities::MoodEntry;
use haven_core::ids::PREFIX_MOOD;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_opt_u8, get_u8, parse_datetime};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, client_id, mood_score, energy_level, anxiety_level, sleep_hours, \
     notes, recorded_at, created_at";

fn row_to_mood(row: &libsql::Row) -> Result<MoodEntry, DatabaseError> {
    Ok(MoodEntry {
        id: row.get(0)?,
        client_id: row.get(1)?,
        mood_score: get_u8(row, 2)?,
        energy_level: get_opt_u8(row, 3)?,
        anxiety_level: get_opt_u8(row, 4)?,
        sleep_hours: row.get::<Option<f64>>(5)?,
        notes: get_opt_string(row, 6)?,
        recorded_at: parse_datetime(&row.get::<String>(7)?)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

#[derive(Debug, Clone, Default)]
pub struct NewMoodEntry {
    pub mood_score: u8,
    pub energy_level: Option<u8>,
    pub anxiety_level: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub notes: Option<String>,
}

impl HavenService {
    pub async fn log_mood(
        &self,
        client_id: &str,
        new: &NewMoodEntry,
    ) -> Result<MoodEntry, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MOOD).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO mood_entries ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    client_id,
                    i64::from(new.mood_score),
                    new.energy_level.map(i64::from),
                    new.anxiety_level.map(i64::from),
                    new.sleep_hours,
                    new.notes.as_deref(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(MoodEntry {
            id,
            client_id: client_id.to_string(),
            mood_score: new.mood_score,
            energy_level: new.energy_level,
            anxiety_level: new.anxiety_level,
            sleep_hours: new.sleep_hours,
            notes: new.notes.clone(),
            recorded_at: now,
            created_at: now,
        })
    }

    /// Most recent entries first.
    pub async fn list_recent_mood(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<MoodEntry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM mood_entries WHERE client_id = ?1
                     ORDER BY recorded_at DESC, rowid DESC LIMIT {limit}"
                ),
                [client_id],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_mood(&row)?);
        }
        Ok(entries)
    }
}
