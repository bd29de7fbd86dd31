//! Audit log repository.
//!
//! Append-only entries recording every state-changing procedure. Supports
//! dynamic filtering. There is no update or delete.

use chrono::Utc;

use haven_core::entities::AuditLog;
use haven_core::enums::{AuditAction, ResourceType, Role};
use haven_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_enum, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::HavenService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub limit: Option<u32>,
}

/// Fields for a new audit entry; id and timestamp are assigned on append.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: String,
    pub user_role: Option<Role>,
    pub action: AuditAction,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl HavenService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &NewAuditLog) -> Result<AuditLog, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_AUDIT).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO audit_logs (id, user_id, user_role, action, resource_type, resource_id, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    entry.user_id.as_str(),
                    entry.user_role.map(Role::as_str),
                    entry.action.as_str(),
                    entry.resource_type.map(ResourceType::as_str),
                    entry.resource_id.as_deref(),
                    entry.details.as_ref().map(std::string::ToString::to_string),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(AuditLog {
            id,
            user_id: entry.user_id.clone(),
            user_role: entry.user_role,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id.clone(),
            details: entry.details.clone(),
            created_at: now,
        })
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref uid) = filter.user_id {
            params.push(libsql::Value::Text(uid.clone()));
            conditions.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(rt) = filter.resource_type {
            params.push(libsql::Value::Text(rt.as_str().to_string()));
            conditions.push(format!("resource_type = ?{}", params.len()));
        }
        if let Some(ref rid) = filter.resource_id {
            params.push(libsql::Value::Text(rid.clone()));
            conditions.push(format!("resource_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, user_id, user_role, action, resource_type, resource_id, details, created_at
             FROM audit_logs {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditLog {
                id: row.get::<String>(0)?,
                user_id: row.get::<String>(1)?,
                user_role: get_opt_enum(&row, 2)?,
                action: parse_enum(&row.get::<String>(3)?)?,
                resource_type: get_opt_enum(&row, 4)?,
                resource_id: get_opt_string(&row, 5)?,
                details: parse_optional_json(get_opt_string(&row, 6)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(7)?)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use haven_core::audit_detail::StatusChangedDetail;

    fn entry(user_id: &str, action: AuditAction) -> NewAuditLog {
        NewAuditLog {
            user_id: user_id.into(),
            user_role: Some(Role::Therapist),
            action,
            resource_type: Some(ResourceType::TherapyGoal),
            resource_id: Some("goal-00000001".into()),
            details: None,
        }
    }

    #[tokio::test]
    async fn append_and_filter_by_user() {
        let svc = test_service().await;
        svc.append_audit(&entry("usr-a", AuditAction::CreateGoal)).await.unwrap();
        svc.append_audit(&entry("usr-a", AuditAction::UpdateGoal)).await.unwrap();
        svc.append_audit(&entry("usr-b", AuditAction::CreateGoal)).await.unwrap();

        let mine = svc
            .query_audit(&AuditFilter {
                user_id: Some("usr-a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].action, AuditAction::UpdateGoal);

        let creates = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::CreateGoal),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(creates.len(), 2);
    }

    #[tokio::test]
    async fn details_roundtrip_as_json() {
        let svc = test_service().await;
        let detail = StatusChangedDetail {
            from: "assigned".into(),
            to: "completed".into(),
            reason: None,
        };
        let mut new = entry("usr-a", AuditAction::UpdateHomework);
        new.details = Some(serde_json::to_value(&detail).unwrap());
        new.resource_type = Some(ResourceType::Homework);
        svc.append_audit(&new).await.unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                resource_type: Some(ResourceType::Homework),
                limit: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let recovered: StatusChangedDetail =
            serde_json::from_value(entries[0].details.clone().unwrap()).unwrap();
        assert_eq!(recovered, detail);
        assert_eq!(entries[0].user_role, Some(Role::Therapist));
    }
}
