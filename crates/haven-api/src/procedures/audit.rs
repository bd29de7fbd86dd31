//! Audit log reads. Admins may read any actor's entries; everyone else
//! only sees their own.

use haven_core::entities::AuditLog;
use haven_core::identity::Caller;
use haven_db::repos::audit::AuditFilter;
use serde::Deserialize;

use crate::context::ApiContext;
use crate::error::ApiError;
use crate::guards::{Access, authorize};

const LOG_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLogsInput {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for callers without therapist access.
pub async fn get_logs(
    ctx: &ApiContext,
    caller: &Caller,
    input: GetLogsInput,
) -> Result<Vec<AuditLog>, ApiError> {
    authorize(Access::Therapist, caller)?;
    let user_id = if caller.is_admin() {
        input.user_id
    } else {
        Some(caller.user_id.clone())
    };
    Ok(ctx
        .service()
        .query_audit(&AuditFilter {
            user_id,
            limit: Some(LOG_LIMIT),
            ..Default::default()
        })
        .await?)
}
