//! User repository: upsert on sign-in, role changes, lookups.

use chrono::Utc;

use haven_core::entities::User;
use haven_core::enums::Role;
use haven_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::HavenService;

const SELECT_COLS: &str =
    "id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        open_id: row.get(1)?,
        name: get_opt_string(row, 2)?,
        email: get_opt_string(row, 3)?,
        login_method: get_opt_string(row, 4)?,
        role: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        last_signed_in: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl HavenService {
    /// Insert or refresh a user on sign-in.
    ///
    /// New users get role `user`. When `owner_open_id` matches, the user is
    /// promoted to `admin` (on insert and on every refresh).
    pub async fn upsert_user(
        &self,
        open_id: &str,
        name: Option<&str>,
        email: Option<&str>,
        login_method: Option<&str>,
        owner_open_id: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let is_owner = owner_open_id.is_some_and(|o| !o.is_empty() && o == open_id);

        if let Some(existing) = self.find_user_by_open_id(open_id).await? {
            let role = if is_owner { Role::Admin } else { existing.role };
            self.db()
                .conn()
                .execute(
                    "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email),
                     login_method = COALESCE(?3, login_method), role = ?4,
                     updated_at = ?5, last_signed_in = ?5
                     WHERE id = ?6",
                    libsql::params![
                        name,
                        email,
                        login_method,
                        role.as_str(),
                        now.as_str(),
                        existing.id.as_str()
                    ],
                )
                .await?;
            return self.get_user(&existing.id).await;
        }

        let role = if is_owner { Role::Admin } else { Role::User };
        self.create_user(open_id, name, email, login_method, role).await
    }

    /// Insert a new user row.
    pub async fn create_user(
        &self,
        open_id: &str,
        name: Option<&str>,
        email: Option<&str>,
        login_method: Option<&str>,
        role: Role,
    ) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO users ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    open_id,
                    name,
                    email,
                    login_method,
                    role.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(User {
            id,
            open_id: open_id.to_string(),
            name: name.map(String::from),
            email: email.map(String::from),
            login_method: login_method.map(String::from),
            role,
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    pub async fn find_user_by_open_id(&self, open_id: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE open_id = ?1"),
                [open_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<User, DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![role.as_str(), Utc::now().to_rfc3339(), id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_user(id).await
    }

    pub async fn list_users(&self, limit: u32) -> Result<Vec<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users ORDER BY created_at DESC LIMIT {limit}"),
                (),
            )
            .await?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn upsert_creates_then_refreshes() {
        let svc = test_service().await;

        let first = svc
            .upsert_user("oid-1", Some("Ada"), None, Some("email"), None)
            .await
            .unwrap();
        assert!(first.id.starts_with("usr-"));
        assert_eq!(first.role, Role::User);

        let second = svc
            .upsert_user("oid-1", None, Some("ada@example.com"), None, None)
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name.as_deref(), Some("Ada"));
        assert_eq!(second.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn owner_open_id_becomes_admin() {
        let svc = test_service().await;
        let user = svc
            .upsert_user("owner", None, None, None, Some("owner"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Admin);

        let other = svc
            .upsert_user("someone", None, None, None, Some("owner"))
            .await
            .unwrap();
        assert_eq!(other.role, Role::User);
    }

    #[tokio::test]
    async fn set_role_on_missing_user_is_no_result() {
        let svc = test_service().await;
        let result = svc.set_user_role("usr-missing", Role::Client).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn get_unknown_user_is_no_result() {
        let svc = test_service().await;
        assert!(matches!(
            svc.get_user("usr-00000000").await,
            Err(DatabaseError::NoResult)
        ));
        assert!(svc.find_user_by_open_id("nobody").await.unwrap().is_none());
    }
}
