use haven_config::HavenConfig;
use haven_core::entities::AuditLog;
use haven_core::enums::ResourceType;
use haven_db::repos::audit::AuditFilter;
use haven_db::service::HavenService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::open_service;
use crate::commands::shared::parse::{parse_action, parse_enum};
use crate::output::output;

const AUDIT_LIMIT: u32 = 100;

/// Handle `haven audit`.
pub async fn handle(
    args: &AuditArgs,
    config: &HavenConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let entries = fetch(&service, args, flags).await?;
    output(&entries, flags.format)
}

async fn fetch(
    service: &HavenService,
    args: &AuditArgs,
    flags: &GlobalFlags,
) -> anyhow::Result<Vec<AuditLog>> {
    let filter = AuditFilter {
        user_id: args.user.clone(),
        action: args.action.as_deref().map(parse_action).transpose()?,
        resource_type: args
            .resource_type
            .as_deref()
            .map(|value| parse_enum::<ResourceType>(value, "resource-type"))
            .transpose()?,
        resource_id: args.resource_id.clone(),
        limit: Some(effective_limit(flags.limit, AUDIT_LIMIT)),
    };
    Ok(service.query_audit(&filter).await?)
}

#[cfg(test)]
mod tests {
    use haven_core::enums::{AuditAction, Role};
    use haven_db::repos::audit::NewAuditLog;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags(limit: Option<u32>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit,
            quiet: false,
            verbose: false,
        }
    }

    fn args(action: Option<&str>) -> AuditArgs {
        AuditArgs {
            user: None,
            action: action.map(String::from),
            resource_type: None,
            resource_id: None,
        }
    }

    #[tokio::test]
    async fn filters_by_action_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haven.db");
        let service = HavenService::new_local(path.to_str().unwrap()).await.unwrap();
        for action in [AuditAction::LogMood, AuditAction::LogMood, AuditAction::CreateGoal] {
            service
                .append_audit(&NewAuditLog {
                    user_id: "usr-00000001".into(),
                    user_role: Some(Role::Client),
                    action,
                    resource_type: None,
                    resource_id: None,
                    details: None,
                })
                .await
                .unwrap();
        }

        let moods = fetch(&service, &args(Some("log_mood")), &flags(None))
            .await
            .unwrap();
        assert_eq!(moods.len(), 2);

        let one = fetch(&service, &args(None), &flags(Some(1))).await.unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_action() {
        let service = HavenService::new_local(":memory:").await.unwrap();
        let err = fetch(&service, &args(Some("delete_everything")), &flags(None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid action"));
    }
}
