use haven_core::entities::User;
use haven_core::identity::Caller;

use crate::context::ApiContext;
use crate::error::ApiError;

/// The authenticated user, or `None` for anonymous callers. Public.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] on database failure.
pub async fn me(ctx: &ApiContext, caller: Option<&Caller>) -> Result<Option<User>, ApiError> {
    let Some(caller) = caller else {
        return Ok(None);
    };
    Ok(Some(ctx.service().get_user(&caller.user_id).await?))
}
