//! Role guards.
//!
//! Admins pass every guard. Procedures call [`authorize`] first, before any
//! validation, lookups, or side effects.

use haven_core::enums::Role;
use haven_core::identity::Caller;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any authenticated caller.
    Protected,
    /// Therapist or admin.
    Therapist,
    /// Client or admin.
    Client,
    Admin,
}

/// Check that `caller` may use a procedure guarded by `required`.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] naming the missing role.
pub fn authorize(required: Access, caller: &Caller) -> Result<(), ApiError> {
    let allowed = match required {
        Access::Protected => true,
        Access::Therapist => matches!(caller.role, Role::Therapist | Role::Admin),
        Access::Client => matches!(caller.role, Role::Client | Role::Admin),
        Access::Admin => caller.role == Role::Admin,
    };
    if allowed {
        return Ok(());
    }
    let message = match required {
        Access::Therapist => "Therapist access required.",
        Access::Client => "Client access required.",
        Access::Admin | Access::Protected => "Admin access required.",
    };
    Err(ApiError::Forbidden(message.into()))
}
