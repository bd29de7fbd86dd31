//! Demo request repository.

use chrono::Utc;

use haven_core::entities::DemoRequest;
use haven_core::enums::DemoRequestStatus;
use haven_core::ids::PREFIX_DEMO;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str =
    "id, name, email, practice_name, practice_size, message, status, created_at";

fn row_to_demo(row: &libsql::Row) -> Result<DemoRequest, DatabaseError> {
    Ok(DemoRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        practice_name: get_opt_string(row, 3)?,
        practice_size: get_opt_string(row, 4)?,
        message: get_opt_string(row, 5)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

#[derive(Debug, Clone, Default)]
pub struct NewDemoRequest {
    pub name: String,
    pub email: String,
    pub practice_name: Option<String>,
    pub practice_size: Option<String>,
    pub message: Option<String>,
}

impl HavenService {
    pub async fn create_demo_request(
        &self,
        new: &NewDemoRequest,
    ) -> Result<DemoRequest, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_DEMO).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO demo_requests ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.name.as_str(),
                    new.email.as_str(),
                    new.practice_name.as_deref(),
                    new.practice_size.as_deref(),
                    new.message.as_deref(),
                    DemoRequestStatus::Pending.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(DemoRequest {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            practice_name: new.practice_name.clone(),
            practice_size: new.practice_size.clone(),
            message: new.message.clone(),
            status: DemoRequestStatus::Pending,
            created_at: now,
        })
    }

    pub async fn list_demo_requests(&self, limit: u32) -> Result<Vec<DemoRequest>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM demo_requests
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;

        let mut requests = Vec::new();
        while let Some(row) = rows.next().await? {
            requests.push(row_to_demo(&row)?);
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn create_and_list() {
        let svc = test_service().await;
        let req = svc
            .create_demo_request(&NewDemoRequest {
                name: "Dana".into(),
                email: "dana@example.com".into(),
                practice_size: Some("2-5".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(req.id.starts_with("dem-"));
        assert_eq!(req.status, DemoRequestStatus::Pending);

        let listed = svc.list_demo_requests(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].practice_size.as_deref(), Some("2-5"));
    }
}
