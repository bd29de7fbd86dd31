use haven_config::HavenConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::open_service;
use crate::output::output;

#[derive(Debug, Serialize)]
struct InitResponse<'a> {
    database: &'a str,
    ready: bool,
}

/// Handle `haven init`.
pub async fn handle(config: &HavenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    open_service(config).await?;
    tracing::info!(path = %config.database.path, "database ready");
    output(
        &InitResponse {
            database: &config.database.path,
            ready: true,
        },
        flags.format,
    )
}
