//! Therapy goal repository: CRUD + status transitions.

use chrono::{DateTime, Utc};

use haven_core::entities::TherapyGoal;
use haven_core::enums::{GoalStatus, Modality};
use haven_core::ids::PREFIX_GOAL;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_string, opt_rfc3339, parse_datetime, parse_enum};
use crate::service::HavenService;
use crate::updates::goal::GoalUpdate;

const SELECT_COLS: &str = "id, client_id, therapist_id, goal_text, modality, status, \
     progress_notes, target_date, achieved_at, created_at, updated_at";

fn row_to_goal(row: &libsql::Row) -> Result<TherapyGoal, DatabaseError> {
    Ok(TherapyGoal {
        id: row.get(0)?,
        client_id: row.get(1)?,
        therapist_id: row.get(2)?,
        goal_text: row.get(3)?,
        modality: parse_enum(&row.get::<String>(4)?)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        progress_notes: get_opt_string(row, 6)?,
        target_date: get_opt_datetime(row, 7)?,
        achieved_at: get_opt_datetime(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub client_id: String,
    pub therapist_id: String,
    pub goal_text: String,
    pub modality: Modality,
    pub target_date: Option<DateTime<Utc>>,
}

impl HavenService {
    pub async fn create_goal(&self, new: &NewGoal) -> Result<TherapyGoal, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_GOAL).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO therapy_goals ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, NULL, ?8, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.client_id.as_str(),
                    new.therapist_id.as_str(),
                    new.goal_text.as_str(),
                    new.modality.as_str(),
                    GoalStatus::Active.as_str(),
                    opt_rfc3339(new.target_date),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(TherapyGoal {
            id,
            client_id: new.client_id.clone(),
            therapist_id: new.therapist_id.clone(),
            goal_text: new.goal_text.clone(),
            modality: new.modality,
            status: GoalStatus::Active,
            progress_notes: None,
            target_date: new.target_date,
            achieved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_goal(&self, id: &str) -> Result<TherapyGoal, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM therapy_goals WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_goal(&row)
    }

    /// Fetch a goal only if its client belongs to `therapist_id`.
    pub async fn get_goal_for_therapist(
        &self,
        goal_id: &str,
        therapist_id: &str,
    ) -> Result<TherapyGoal, DatabaseError> {
        let goal = self.get_goal(goal_id).await?;
        self.get_client_for_therapist(&goal.client_id, therapist_id)
            .await?;
        Ok(goal)
    }

    /// Apply a partial update. A status change must follow the goal state
    /// machine; moving to `achieved` stamps `achieved_at`.
    pub async fn update_goal(
        &self,
        goal_id: &str,
        update: &GoalUpdate,
    ) -> Result<TherapyGoal, DatabaseError> {
        let current = self.get_goal(goal_id).await?;
        let now = Utc::now();

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref text) = update.goal_text {
            params.push(text.clone().into());
            sets.push(format!("goal_text = ?{}", params.len()));
        }
        if let Some(ref notes) = update.progress_notes {
            params.push(notes.clone().map_or(libsql::Value::Null, Into::into));
            sets.push(format!("progress_notes = ?{}", params.len()));
        }
        if let Some(status) = update.status {
            if status != current.status {
                if !current.status.can_transition_to(status) {
                    return Err(DatabaseError::InvalidState(format!(
                        "Cannot transition goal {goal_id} from {} to {status}",
                        current.status
                    )));
                }
                params.push(status.as_str().into());
                sets.push(format!("status = ?{}", params.len()));
                if status == GoalStatus::Achieved {
                    params.push(now.to_rfc3339().into());
                    sets.push(format!("achieved_at = ?{}", params.len()));
                }
            }
        }

        if sets.is_empty() {
            return Ok(current);
        }

        params.push(now.to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(goal_id.into());
        let sql = format!(
            "UPDATE therapy_goals SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_goal(goal_id).await
    }

    pub async fn list_goals(&self, client_id: &str) -> Result<Vec<TherapyGoal>, DatabaseError> {
        self.query_goals(client_id, None).await
    }

    pub async fn list_active_goals(
        &self,
        client_id: &str,
    ) -> Result<Vec<TherapyGoal>, DatabaseError> {
        self.query_goals(client_id, Some(GoalStatus::Active)).await
    }

    async fn query_goals(
        &self,
        client_id: &str,
        status: Option<GoalStatus>,
    ) -> Result<Vec<TherapyGoal>, DatabaseError> {
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM therapy_goals
                             WHERE client_id = ?1 AND status = ?2 ORDER BY created_at DESC, rowid DESC"
                        ),
                        libsql::params![client_id, status.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM therapy_goals
                             WHERE client_id = ?1 ORDER BY created_at DESC, rowid DESC"
                        ),
                        [client_id],
                    )
                    .await?
            }
        };

        let mut goals = Vec::new();
        while let Some(row) = rows.next().await? {
            goals.push(row_to_goal(&row)?);
        }
        Ok(goals)
    }
}
