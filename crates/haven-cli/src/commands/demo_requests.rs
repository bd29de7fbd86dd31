use haven_config::HavenConfig;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::open_service;
use crate::output::output;

/// Handle `haven demo-requests`.
pub async fn handle(config: &HavenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let limit = effective_limit(flags.limit, config.general.default_limit);
    let requests = service.list_demo_requests(limit).await?;
    output(&requests, flags.format)
}
