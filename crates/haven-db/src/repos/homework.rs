//! Homework repository: assignment, client status transitions, therapist review.

use chrono::{DateTime, Utc};

use haven_core::entities::HomeworkAssignment;
use haven_core::enums::{HomeworkStatus, Modality};
use haven_core::ids::PREFIX_HOMEWORK;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_string, opt_rfc3339, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str = "id, client_id, therapist_id, title, description, modality, due_date, \
     status, completion_notes, therapist_review_notes, completed_at, reviewed_at, created_at, updated_at";

fn row_to_homework(row: &libsql::Row) -> Result<HomeworkAssignment, DatabaseError> {
    Ok(HomeworkAssignment {
        id: row.get(0)?,
        client_id: row.get(1)?,
        therapist_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        modality: parse_enum(&row.get::<String>(5)?)?,
        due_date: get_opt_datetime(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        completion_notes: get_opt_string(row, 8)?,
        therapist_review_notes: get_opt_string(row, 9)?,
        completed_at: get_opt_datetime(row, 10)?,
        reviewed_at: get_opt_datetime(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewHomework {
    pub client_id: String,
    pub therapist_id: String,
    pub title: String,
    pub description: String,
    pub modality: Modality,
    pub due_date: Option<DateTime<Utc>>,
}

impl HavenService {
    pub async fn create_homework(
        &self,
        new: &NewHomework,
    ) -> Result<HomeworkAssignment, DatabaseError> {
        let id = self.db().generate_id(PREFIX_HOMEWORK).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO homework_assignments ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, NULL, NULL, ?9, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    new.client_id.as_str(),
                    new.therapist_id.as_str(),
                    new.title.as_str(),
                    new.description.as_str(),
                    new.modality.as_str(),
                    opt_rfc3339(new.due_date),
                    HomeworkStatus::Assigned.as_str(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;

        self.get_homework(&id).await
    }

    pub async fn get_homework(&self, id: &str) -> Result<HomeworkAssignment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM homework_assignments WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_homework(&row)
    }

    /// Fetch an assignment only if its client belongs to `therapist_id`.
    pub async fn get_homework_for_therapist(
        &self,
        homework_id: &str,
        therapist_id: &str,
    ) -> Result<HomeworkAssignment, DatabaseError> {
        let homework = self.get_homework(homework_id).await?;
        self.get_client_for_therapist(&homework.client_id, therapist_id)
            .await?;
        Ok(homework)
    }

    /// Fetch an assignment only if it was assigned to `client_id`.
    pub async fn get_homework_for_client(
        &self,
        homework_id: &str,
        client_id: &str,
    ) -> Result<HomeworkAssignment, DatabaseError> {
        let homework = self.get_homework(homework_id).await?;
        if homework.client_id != client_id {
            return Err(DatabaseError::AccessDenied(format!(
                "homework {homework_id} is not assigned to client {client_id}"
            )));
        }
        Ok(homework)
    }

    /// Move an assignment along the homework state machine. Moving to
    /// `completed` stamps `completed_at`.
    pub async fn transition_homework(
        &self,
        homework_id: &str,
        new_status: HomeworkStatus,
        completion_notes: Option<&str>,
    ) -> Result<HomeworkAssignment, DatabaseError> {
        let current = self.get_homework(homework_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition homework {homework_id} from {} to {new_status}",
                current.status
            )));
        }

        let now = Utc::now();
        let completed_at = (new_status == HomeworkStatus::Completed).then_some(now);
        self.db()
            .conn()
            .execute(
                "UPDATE homework_assignments
                 SET status = ?1, completion_notes = COALESCE(?2, completion_notes),
                     completed_at = COALESCE(?3, completed_at), updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    new_status.as_str(),
                    completion_notes,
                    opt_rfc3339(completed_at),
                    now.to_rfc3339(),
                    homework_id
                ],
            )
            .await?;

        self.get_homework(homework_id).await
    }

    /// Record therapist review notes and stamp `reviewed_at`.
    pub async fn review_homework(
        &self,
        homework_id: &str,
        review_notes: Option<&str>,
    ) -> Result<HomeworkAssignment, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE homework_assignments
                 SET therapist_review_notes = ?1, reviewed_at = ?2, updated_at = ?2
                 WHERE id = ?3",
                libsql::params![review_notes, now.as_str(), homework_id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_homework(homework_id).await
    }

    pub async fn list_homework(
        &self,
        client_id: &str,
    ) -> Result<Vec<HomeworkAssignment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM homework_assignments WHERE client_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ),
                [client_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_homework(&row)?);
        }
        Ok(items)
    }
}
