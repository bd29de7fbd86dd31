use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// Authenticated caller identity for cross-crate passing.
///
/// Produced by the HTTP layer (or the CLI) after the user row has been
/// loaded. Contains only data fields, no session or token logic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Caller {
    /// `users.id` of the authenticated user.
    pub user_id: String,
    /// Role as stored on the user row at request time.
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
