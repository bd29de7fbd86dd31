use haven_config::HavenConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Commands,
    config: &HavenConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => commands::serve::handle(&args, config).await,
        Commands::Init => commands::init::handle(config, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, config, flags).await,
        Commands::DemoRequests => commands::demo_requests::handle(config, flags).await,
        Commands::CheckText(args) => commands::check_text::handle(&args, flags),
        Commands::Prompt(args) => commands::prompt::handle(&args),
    }
}
