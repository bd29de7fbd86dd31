//! Crisis language screening.
//!
//! A case-insensitive substring match against a fixed phrase list. There is
//! no stemming, negation, or context handling: "not hopeless" still matches.
//! Callers screen before persisting anything or contacting the LLM.

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "self-harm",
    "self harm",
    "hurt myself",
    "cutting",
    "overdose",
    "want to die",
    "don't want to live",
    "no reason to live",
    "hopeless",
    "worthless",
    "harm others",
];

/// Fixed resources message returned instead of saving flagged content.
pub const CRISIS_RESPONSE: &str = "I notice you may be experiencing some very difficult feelings right now. Your safety is the most important thing.

**Please reach out for immediate support:**
- **988 Suicide & Crisis Lifeline:** Call or text 988 (US)
- **Crisis Text Line:** Text HOME to 741741
- **Emergency Services:** Call 911 if you are in immediate danger

Please contact your therapist directly or go to your nearest emergency room if you are in crisis. This platform is not equipped to provide crisis intervention.";

/// True if `text` contains any crisis phrase, ignoring case.
#[must_use]
pub fn detect_crisis_language(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Join the non-empty fields with a space and screen the result.
#[must_use]
pub fn detect_in_fields<'a, I>(fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = fields
        .into_iter()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    detect_crisis_language(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("I want to END MY LIFE")]
    #[case("thinking about suicide again")]
    #[case("Feeling Suicidal tonight")]
    #[case("I might kill myself")]
    #[case("urge to self-harm")]
    #[case("urge to self harm")]
    #[case("I could hurt myself")]
    #[case("started cutting")]
    #[case("took an overdose")]
    #[case("i just want to die")]
    #[case("I don't want to live like this")]
    #[case("there is no reason to live")]
    #[case("everything feels HOPELESS")]
    #[case("I am worthless")]
    #[case("thoughts to harm others")]
    fn flags_every_keyword(#[case] text: &str) {
        assert!(detect_crisis_language(text));
    }

    #[rstest]
    #[case("had a great walk")]
    #[case("")]
    #[case("work was stressful but I used box breathing")]
    #[case("I dont want to go to the party")]
    fn passes_ordinary_text(#[case] text: &str) {
        assert!(!detect_crisis_language(text));
    }

    #[test]
    fn no_negation_handling() {
        assert!(detect_crisis_language("I am not hopeless"));
    }

    #[test]
    fn every_keyword_is_lowercase() {
        for kw in CRISIS_KEYWORDS {
            assert_eq!(*kw, kw.to_lowercase());
        }
    }

    #[test]
    fn fields_are_joined_with_space() {
        assert!(!detect_in_fields(["", "want to"]));
        assert!(detect_in_fields(["want to", "", "die"]));
        assert!(!detect_in_fields(["", ""]));
    }

    #[test]
    fn response_lists_resources() {
        assert!(CRISIS_RESPONSE.contains("988"));
        assert!(CRISIS_RESPONSE.contains("741741"));
        assert!(CRISIS_RESPONSE.contains("911"));
        assert!(CRISIS_RESPONSE.contains("not equipped to provide crisis intervention"));
    }
}
