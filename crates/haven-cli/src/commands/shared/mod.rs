pub mod limit;
pub mod parse;

use anyhow::Context;
use haven_config::HavenConfig;
use haven_db::service::HavenService;

/// Open the configured database, creating its parent directory first.
pub async fn open_service(config: &HavenConfig) -> anyhow::Result<HavenService> {
    let path = config.database.path.as_str();
    if !config.database.is_in_memory() {
        if let Some(parent) = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    HavenService::new_local(path)
        .await
        .with_context(|| format!("failed to open database at {path}"))
}
