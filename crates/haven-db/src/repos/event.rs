//! Emotional event repository. Append-only.

use chrono::Utc;

use haven_core::entities::EmotionalEvent;
use haven_core::enums::EventType;
use haven_core::ids::PREFIX_EVENT;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, get_u8, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, client_id, event_type, intensity, description, triggers, \
     coping_strategies_used, location, shared_with_therapist, occurred_at, created_at";

fn row_to_event(row: &libsql::Row) -> Result<EmotionalEvent, DatabaseError> {
    Ok(EmotionalEvent {
        id: row.get(0)?,
        client_id: row.get(1)?,
        event_type: parse_enum(&row.get::<String>(2)?)?,
        intensity: get_u8(row, 3)?,
        description: get_opt_string(row, 4)?,
        triggers: get_opt_string(row, 5)?,
        coping_strategies_used: get_opt_string(row, 6)?,
        location: get_opt_string(row, 7)?,
        shared_with_therapist: get_bool(row, 8)?,
        occurred_at: parse_datetime(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewEmotionalEvent {
    pub event_type: EventType,
    pub intensity: u8,
    pub description: Option<String>,
    pub triggers: Option<String>,
    pub coping_strategies_used: Option<String>,
    pub location: Option<String>,
    pub shared_with_therapist: bool,
}

impl HavenService {
    pub async fn log_emotional_event(
        &self,
        client_id: &str,
        new: &NewEmotionalEvent,
    ) -> Result<EmotionalEvent, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_EVENT).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO emotional_events ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    client_id,
                    new.event_type.as_str(),
                    i64::from(new.intensity),
                    new.description.as_deref(),
                    new.triggers.as_deref(),
                    new.coping_strategies_used.as_deref(),
                    new.location.as_deref(),
                    i64::from(new.shared_with_therapist),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(EmotionalEvent {
            id,
            client_id: client_id.to_string(),
            event_type: new.event_type,
            intensity: new.intensity,
            description: new.description.clone(),
            triggers: new.triggers.clone(),
            coping_strategies_used: new.coping_strategies_used.clone(),
            location: new.location.clone(),
            shared_with_therapist: new.shared_with_therapist,
            occurred_at: now,
            created_at: now,
        })
    }

    /// Most recent events first.
    pub async fn list_recent_events(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<EmotionalEvent>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM emotional_events WHERE client_id = ?1
                     ORDER BY occurred_at DESC, rowid DESC LIMIT {limit}"
                ),
                [client_id],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }
        Ok(events)
    }

    pub async fn count_events(&self, client_id: &str) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM emotional_events WHERE client_id = ?1",
                [client_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        crate::helpers::get_u32(&row, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_client, seed_therapist, test_service};

    #[tokio::test]
    async fn log_event_roundtrip() {
        let svc = test_service().await;
        let therapist = seed_therapist(&svc, "t1").await;
        let client = seed_client(&svc, &therapist, "c1").await;

        let event = svc
            .log_emotional_event(
                &client.id,
                &NewEmotionalEvent {
                    event_type: EventType::Joy,
                    intensity: 6,
                    description: Some("had a great walk".into()),
                    triggers: None,
                    coping_strategies_used: None,
                    location: Some("park".into()),
                    shared_with_therapist: true,
                },
            )
            .await
            .unwrap();
        assert!(event.id.starts_with("evt-"));

        let events = svc.list_recent_events(&client.id, 5).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Joy);
        assert_eq!(events[0].location.as_deref(), Some("park"));
        assert!(events[0].shared_with_therapist);
        assert_eq!(svc.count_events(&client.id).await.unwrap(), 1);
    }
}
