use serde::de::DeserializeOwned;

/// Parse a snake_case enum value through serde. Hyphens are accepted in
/// place of underscores.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an audit action, accepting any letter case.
pub fn parse_action<T>(raw: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    parse_enum(&raw.to_ascii_uppercase(), "action")
}

#[cfg(test)]
mod tests {
    use haven_core::enums::{AuditAction, Modality, ResourceType};

    use super::{parse_action, parse_enum};

    #[test]
    fn parses_hyphenated_modality() {
        let modality: Modality =
            parse_enum("trauma-informed", "modality").expect("modality should parse");
        assert_eq!(modality, Modality::TraumaInformed);
    }

    #[test]
    fn parses_lowercase_action() {
        let action: AuditAction = parse_action("log_mood").expect("action should parse");
        assert_eq!(action, AuditAction::LogMood);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<ResourceType>("session", "resource-type").expect_err("should fail");
        assert!(err.to_string().contains("invalid resource-type 'session'"));
    }
}
