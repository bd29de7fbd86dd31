use clap::{Args, Subcommand};

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP RPC server
    Serve(ServeArgs),
    /// Create the database and apply migrations
    Init,
    /// Query the audit log
    Audit(AuditArgs),
    /// List submitted demo requests
    DemoRequests,
    /// Screen text for crisis language
    CheckText(CheckTextArgs),
    /// Print the system prompt for a therapy modality
    Prompt(PromptArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address, overriding `server.bind`
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Filter by acting user id
    #[arg(long)]
    pub user: Option<String>,

    /// Filter by action (e.g. `log_mood`, `UPDATE_GOAL`)
    #[arg(long)]
    pub action: Option<String>,

    /// Filter by resource type (e.g. `ai_summary`)
    #[arg(long)]
    pub resource_type: Option<String>,

    /// Filter by resource id
    #[arg(long)]
    pub resource_id: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckTextArgs {
    /// Text to screen
    pub text: String,
}

#[derive(Clone, Debug, Args)]
pub struct PromptArgs {
    /// cbt, dbt, trauma-informed, emdr, or general
    pub modality: String,
}
