//! Client profile repository: invites, claiming, ownership-scoped lookups.

use chrono::{DateTime, Utc};

use haven_core::entities::{ClientProfile, User};
use haven_core::enums::{Modality, Role};
use haven_core::ids::{PREFIX_CLIENT, PREFIX_USER};

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_datetime, get_opt_string, opt_rfc3339, parse_datetime, parse_enum,
};
use crate::service::HavenService;
use crate::updates::client::ClientProfileUpdate;

const SELECT_COLS: &str = "id, user_id, therapist_id, primary_modality, treatment_goals_summary, \
     session_frequency, onboarding_complete, is_active, invite_token, invite_token_expiry, \
     created_at, updated_at";

fn row_to_client(row: &libsql::Row) -> Result<ClientProfile, DatabaseError> {
    Ok(ClientProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        therapist_id: row.get(2)?,
        primary_modality: parse_enum(&row.get::<String>(3)?)?,
        treatment_goals_summary: get_opt_string(row, 4)?,
        session_frequency: get_opt_string(row, 5)?,
        onboarding_complete: get_bool(row, 6)?,
        is_active: get_bool(row, 7)?,
        invite_token: get_opt_string(row, 8)?,
        invite_token_expiry: get_opt_datetime(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

/// Fields for a new client profile row.
#[derive(Debug, Clone)]
pub struct NewClientProfile {
    pub user_id: String,
    pub therapist_id: String,
    pub primary_modality: Modality,
    pub treatment_goals_summary: Option<String>,
    pub session_frequency: Option<String>,
    pub invite_token: Option<String>,
    pub invite_token_expiry: Option<DateTime<Utc>>,
}

/// Fields for an invite: a placeholder user plus a pending client profile.
#[derive(Debug, Clone)]
pub struct NewClientInvite {
    pub therapist_id: String,
    pub email: String,
    pub primary_modality: Modality,
    pub treatment_goals_summary: Option<String>,
    pub session_frequency: Option<String>,
    pub invite_token: String,
    pub invite_token_expiry: DateTime<Utc>,
}

impl HavenService {
    pub async fn create_client_profile(
        &self,
        new: &NewClientProfile,
    ) -> Result<ClientProfile, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CLIENT).await?;
        insert_client(self.db().conn(), &id, new, Utc::now()).await?;
        self.get_client_profile(&id).await
    }

    /// Create the placeholder user and the pending client profile together.
    ///
    /// The placeholder's `open_id` is `invite_{token}` and its name is the
    /// local part of the email. Both rows are written in one transaction.
    pub async fn create_client_invite(
        &self,
        invite: &NewClientInvite,
    ) -> Result<(User, ClientProfile), DatabaseError> {
        let now = Utc::now();
        let user_id = self.db().generate_id(PREFIX_USER).await?;
        let client_id = self.db().generate_id(PREFIX_CLIENT).await?;
        let open_id = format!("invite_{}", invite.invite_token);
        let name = invite
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            "INSERT INTO users (id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?6, ?6)",
            libsql::params![
                user_id.as_str(),
                open_id.as_str(),
                name.as_str(),
                invite.email.as_str(),
                Role::Client.as_str(),
                now.to_rfc3339()
            ],
        )
        .await?;
        let new = NewClientProfile {
            user_id: user_id.clone(),
            therapist_id: invite.therapist_id.clone(),
            primary_modality: invite.primary_modality,
            treatment_goals_summary: invite.treatment_goals_summary.clone(),
            session_frequency: invite.session_frequency.clone(),
            invite_token: Some(invite.invite_token.clone()),
            invite_token_expiry: Some(invite.invite_token_expiry),
        };
        insert_client(&tx, &client_id, &new, now).await?;
        tx.commit().await?;

        let user = self.get_user(&user_id).await?;
        let client = self.get_client_profile(&client_id).await?;
        Ok((user, client))
    }

    pub async fn get_client_profile(&self, id: &str) -> Result<ClientProfile, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM client_profiles WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_client(&row)
    }

    /// Fetch a client profile only if it belongs to `therapist_id`.
    ///
    /// Returns `NoResult` for an unknown id and `AccessDenied` for another
    /// therapist's client.
    pub async fn get_client_for_therapist(
        &self,
        client_id: &str,
        therapist_id: &str,
    ) -> Result<ClientProfile, DatabaseError> {
        let client = self.get_client_profile(client_id).await?;
        if client.therapist_id != therapist_id {
            return Err(DatabaseError::AccessDenied(format!(
                "client {client_id} is not assigned to therapist {therapist_id}"
            )));
        }
        Ok(client)
    }

    pub async fn find_client_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ClientProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM client_profiles WHERE user_id = ?1"),
                [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_client(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_client_by_invite_token(
        &self,
        token: &str,
    ) -> Result<Option<ClientProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM client_profiles WHERE invite_token = ?1"),
                [token],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_client(&row)?)),
            None => Ok(None),
        }
    }

    /// Bind a pending profile to the claiming user and clear the token.
    pub async fn claim_client_invite(
        &self,
        client_id: &str,
        user_id: &str,
    ) -> Result<ClientProfile, DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE client_profiles
                 SET user_id = ?1, invite_token = NULL, invite_token_expiry = NULL, updated_at = ?2
                 WHERE id = ?3 AND invite_token IS NOT NULL",
                libsql::params![user_id, Utc::now().to_rfc3339(), client_id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::InvalidState(format!(
                "client {client_id} has no pending invite"
            )));
        }
        self.get_client_profile(client_id).await
    }

    pub async fn complete_client_onboarding(
        &self,
        client_id: &str,
    ) -> Result<ClientProfile, DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE client_profiles SET onboarding_complete = 1, updated_at = ?1 WHERE id = ?2",
                libsql::params![Utc::now().to_rfc3339(), client_id],
            )
            .await?;
        self.get_client_profile(client_id).await
    }

    pub async fn update_client_profile(
        &self,
        client_id: &str,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(modality) = update.primary_modality {
            params.push(modality.as_str().into());
            sets.push(format!("primary_modality = ?{}", params.len()));
        }
        if let Some(ref summary) = update.treatment_goals_summary {
            params.push(summary.clone().map_or(libsql::Value::Null, Into::into));
            sets.push(format!("treatment_goals_summary = ?{}", params.len()));
        }
        if let Some(ref frequency) = update.session_frequency {
            params.push(frequency.clone().map_or(libsql::Value::Null, Into::into));
            sets.push(format!("session_frequency = ?{}", params.len()));
        }
        if let Some(active) = update.is_active {
            params.push(i64::from(active).into());
            sets.push(format!("is_active = ?{}", params.len()));
        }

        if sets.is_empty() {
            return self.get_client_profile(client_id).await;
        }

        params.push(Utc::now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(client_id.into());
        let sql = format!(
            "UPDATE client_profiles SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.get_client_profile(client_id).await
    }

    pub async fn list_clients_for_therapist(
        &self,
        therapist_id: &str,
    ) -> Result<Vec<ClientProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM client_profiles
                     WHERE therapist_id = ?1 ORDER BY created_at DESC, rowid DESC"
                ),
                [therapist_id],
            )
            .await?;

        let mut clients = Vec::new();
        while let Some(row) = rows.next().await? {
            clients.push(row_to_client(&row)?);
        }
        Ok(clients)
    }

    /// Seats in use: active client profiles, including pending invites.
    pub async fn count_active_clients(&self, therapist_id: &str) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM client_profiles WHERE therapist_id = ?1 AND is_active = 1",
                [therapist_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        crate::helpers::get_u32(&row, 0)
    }
}

async fn insert_client(
    conn: &libsql::Connection,
    id: &str,
    new: &NewClientProfile,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO client_profiles ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 1, ?7, ?8, ?9, ?9)"
        ),
        libsql::params![
            id,
            new.user_id.as_str(),
            new.therapist_id.as_str(),
            new.primary_modality.as_str(),
            new.treatment_goals_summary.as_deref(),
            new.session_frequency.as_deref(),
            new.invite_token.as_deref(),
            opt_rfc3339(new.invite_token_expiry),
            now.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}
