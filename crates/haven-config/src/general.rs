//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Upstream `open_id` that is promoted to admin when the user row is upserted.
    #[serde(default)]
    pub owner_open_id: String,

    /// Default result limit for CLI list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            owner_open_id: String::new(),
            default_limit: default_limit(),
        }
    }
}
