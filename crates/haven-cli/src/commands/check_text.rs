use haven_ai::crisis::{CRISIS_RESPONSE, detect_crisis_language};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckTextArgs;
use crate::output::output;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CheckTextResponse {
    crisis_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    crisis_response: Option<&'static str>,
}

fn screen(text: &str) -> CheckTextResponse {
    let crisis_detected = detect_crisis_language(text);
    CheckTextResponse {
        crisis_detected,
        crisis_response: crisis_detected.then_some(CRISIS_RESPONSE),
    }
}

/// Handle `haven check-text`.
pub fn handle(args: &CheckTextArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&screen(&args.text), flags.format)
}

#[cfg(test)]
mod tests {
    use super::screen;

    #[test]
    fn flags_crisis_text() {
        let out = screen("Sometimes I think about SELF-HARM");
        assert!(out.crisis_detected);
        assert!(out.crisis_response.is_some());
    }

    #[test]
    fn ordinary_text_passes() {
        let out = screen("work was stressful but I went for a run");
        assert!(!out.crisis_detected);
        assert!(out.crisis_response.is_none());
    }
}
