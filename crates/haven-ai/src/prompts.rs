//! Modality-aware prompt construction.
//!
//! Every builder is deterministic: same input, same [`PromptPair`]. Empty
//! sections render a fixed placeholder so the model never sees a blank list.

use haven_core::enums::Modality;

/// System and user turns for one chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const CBT_PROMPT: &str = "You are a supportive AI assistant embedded in a therapy continuity platform. You operate strictly within Cognitive Behavioral Therapy (CBT) principles. Your role is to help clients notice connections between thoughts, feelings, and behaviors between therapy sessions.

STRICT GUARDRAILS:
- Never provide a diagnosis, clinical assessment, or medical advice
- Never replace the role of the therapist
- Never interpret dreams or perform psychoanalysis
- Always encourage the client to bring insights to their next therapy session
- If any crisis language is detected, immediately redirect to crisis resources
- Keep language warm, supportive, and non-judgmental
- Focus on thought patterns, cognitive distortions, and behavioral activation
- Use Socratic questioning to guide self-reflection";

const DBT_PROMPT: &str = "You are a supportive AI assistant embedded in a therapy continuity platform. You operate strictly within Dialectical Behavior Therapy (DBT) principles. Your role is to help clients practice DBT skills between sessions.

STRICT GUARDRAILS:
- Never provide a diagnosis, clinical assessment, or medical advice
- Never replace the role of the therapist
- Always encourage the client to bring insights to their next therapy session
- If any crisis language is detected, immediately redirect to crisis resources
- Focus on the four DBT skill modules: Mindfulness, Distress Tolerance, Emotion Regulation, and Interpersonal Effectiveness
- Use validating, dialectical language that balances acceptance and change
- Encourage skill practice and diary card completion";

const TRAUMA_INFORMED_PROMPT: &str = "You are a supportive AI assistant embedded in a therapy continuity platform. You operate strictly within trauma-informed care principles. Your role is to provide grounding, psychoeducation, and gentle reflection between therapy sessions.

STRICT GUARDRAILS:
- Never provide a diagnosis, clinical assessment, or medical advice
- Never replace the role of the therapist
- Never push clients to discuss traumatic events in detail \u{2014} this is NOT trauma processing
- Always emphasize safety, choice, and control
- If any crisis language is detected, immediately redirect to crisis resources
- Focus on grounding techniques, window of tolerance, and nervous system regulation
- Use trauma-sensitive language that avoids re-traumatization
- Always remind clients they are in control of what they share";

const EMDR_PROMPT: &str = "You are a supportive AI assistant embedded in a therapy continuity platform. You operate strictly within EMDR preparation and stabilization principles. Your role is to support clients with resource installation and stabilization between EMDR sessions.

STRICT GUARDRAILS:
- Never provide a diagnosis, clinical assessment, or medical advice
- Never replace the role of the therapist
- NEVER attempt to guide EMDR processing \u{2014} this must only be done by a trained EMDR therapist
- Focus only on stabilization, resourcing, and preparation activities
- If any crisis language is detected, immediately redirect to crisis resources
- Encourage use of the safe/calm place, container exercise, and positive resource figures
- Keep the client in their window of tolerance";

const GENERAL_PROMPT: &str = "You are a supportive AI assistant embedded in a therapy continuity platform. Your role is to provide general emotional support and reflection prompts between therapy sessions.

STRICT GUARDRAILS:
- Never provide a diagnosis, clinical assessment, or medical advice
- Never replace the role of the therapist
- Always encourage the client to bring insights to their next therapy session
- If any crisis language is detected, immediately redirect to crisis resources
- Keep language warm, supportive, and non-judgmental
- Focus on self-awareness, emotional literacy, and coping skills
- Never make definitive statements about a client's mental health";

// Separator used before optional notes in session-prep lines.
const DASH: &str = "\u{2014}";

/// Client-facing system prompt for a modality.
#[must_use]
pub const fn system_prompt(modality: Modality) -> &'static str {
    match modality {
        Modality::Cbt => CBT_PROMPT,
        Modality::Dbt => DBT_PROMPT,
        Modality::TraumaInformed => TRAUMA_INFORMED_PROMPT,
        Modality::Emdr => EMDR_PROMPT,
        Modality::General => GENERAL_PROMPT,
    }
}

fn join_or(items: &[String], sep: &str, placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(sep)
    }
}

/// Mean of the scores with one decimal, ties rounded up, or `"unknown"`.
#[must_use]
pub fn average_mood(scores: &[u8]) -> String {
    if scores.is_empty() {
        return "unknown".to_string();
    }
    let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    let len = scores.len() as u64;
    let tenths = (sum * 20 + len) / (2 * len);
    format!("{}.{}", tenths / 10, tenths % 10)
}

// ---------------------------------------------------------------------------
// Reflection prompts (client, after a check-in)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReflectionInput {
    pub modality: Modality,
    pub recent_mood_scores: Vec<u8>,
    /// Pre-rendered `"<type>: <description>"` strings.
    pub recent_events: Vec<String>,
    pub client_goals: Vec<String>,
}

#[must_use]
pub fn reflection_prompt(input: &ReflectionInput) -> PromptPair {
    let scores: Vec<String> = input
        .recent_mood_scores
        .iter()
        .map(ToString::to_string)
        .collect();

    let user = format!(
        "Based on the following client data, generate 2-3 thoughtful, open-ended reflection prompts for the client to explore before their next therapy session. The prompts should be aligned with {modality} principles.

Recent mood scores (1-10 scale): {scores}
Average mood: {avg}/10
Recent emotional events: {events}
Current therapy goals: {goals}

Generate reflection prompts that:
1. Are open-ended and non-leading
2. Encourage self-awareness without causing distress
3. Connect to the client's stated goals
4. Are appropriate for between-session reflection (not therapy processing)

Format as a numbered list of prompts only. Do not include any preamble or explanation.",
        modality = input.modality.label(),
        scores = join_or(&scores, ", ", "No recent data"),
        avg = average_mood(&input.recent_mood_scores),
        events = join_or(&input.recent_events, "; ", "None logged"),
        goals = join_or(&input.client_goals, "; ", "Not specified"),
    );

    PromptPair {
        system: system_prompt(input.modality).to_string(),
        user,
    }
}

// ---------------------------------------------------------------------------
// Session prep (therapist, before a session)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodPoint {
    pub score: u8,
    pub date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPoint {
    pub event_type: String,
    pub intensity: u8,
    pub description: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkPoint {
    pub title: String,
    pub status: String,
    pub completion_notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionPrepInput {
    pub modality: Modality,
    pub client_name: String,
    pub recent_mood_data: Vec<MoodPoint>,
    pub recent_events: Vec<EventPoint>,
    pub homework_status: Vec<HomeworkPoint>,
    pub active_goals: Vec<String>,
    pub days_since_last_session: i64,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

#[must_use]
pub fn session_prep(input: &SessionPrepInput) -> PromptPair {
    let mood: Vec<String> = input
        .recent_mood_data
        .iter()
        .map(|m| {
            let notes = non_empty(m.notes.as_ref())
                .map(|n| format!(" {DASH} \"{n}\""))
                .unwrap_or_default();
            format!("- {}: Score {}/10{notes}", m.date, m.score)
        })
        .collect();

    let events: Vec<String> = input
        .recent_events
        .iter()
        .map(|e| {
            let description = non_empty(e.description.as_ref())
                .map(|d| format!(" {DASH} {d}"))
                .unwrap_or_default();
            format!(
                "- {}: {} (intensity {}/10){description}",
                e.date, e.event_type, e.intensity
            )
        })
        .collect();

    let homework: Vec<String> = input
        .homework_status
        .iter()
        .map(|h| {
            let notes = non_empty(h.completion_notes.as_ref())
                .map(|n| format!(" {DASH} Notes: {n}"))
                .unwrap_or_default();
            format!("- \"{}\": {}{notes}", h.title, h.status)
        })
        .collect();

    let user = format!(
        "Generate a structured session preparation summary for a therapist. This summary will help the therapist prepare for their upcoming session with {client}.

MODALITY: {modality}
Days since last session: {days}

MOOD DATA (last {mood_count} entries):
{mood}

EMOTIONAL EVENTS:
{events}

HOMEWORK ASSIGNMENTS:
{homework}

ACTIVE THERAPY GOALS:
{goals}

Generate a structured summary with these sections:
1. **Between-Session Overview** (2-3 sentences on overall engagement and patterns)
2. **Mood & Emotional Patterns** (notable trends or changes)
3. **Key Events to Explore** (flagged events worth discussing in session)
4. **Homework Review** (completion status and any notable responses)
5. **Suggested Session Focus** (2-3 modality-aligned areas to consider {DASH} NOT prescriptive)

IMPORTANT: This is a clinical support tool only. Do not make diagnostic statements, clinical assessments, or treatment recommendations. Frame all suggestions as observations for the therapist to consider.",
        client = input.client_name,
        modality = input.modality.label_upper(),
        days = input.days_since_last_session,
        mood_count = input.recent_mood_data.len(),
        mood = join_or(&mood, "\n", "No mood data recorded"),
        events = join_or(&events, "\n", "No events logged"),
        homework = join_or(&homework, "\n", "No homework assigned"),
        goals = join_or(&input.active_goals, "\n", "No goals specified"),
    );

    let system = format!(
        "You are a clinical support AI that generates structured session preparation summaries for licensed therapists. You operate within {} principles. You never diagnose, never replace clinical judgment, and always frame outputs as observations for the therapist to consider. Your summaries are factual, structured, and clinically appropriate.",
        input.modality.label()
    );

    PromptPair { system, user }
}

// ---------------------------------------------------------------------------
// Post-session continuity (client, after a session)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PostSessionInput {
    pub modality: Modality,
    pub session_notes: String,
    pub homework_assigned: Vec<String>,
    pub goals_worked_on: Vec<String>,
    pub next_session_date: Option<String>,
}

#[must_use]
pub fn post_session(input: &PostSessionInput) -> PromptPair {
    let user = format!(
        "Generate a brief post-session continuity message for a therapy client. This message will help the client maintain momentum after their session.

MODALITY: {modality}
Session themes: {notes}
Homework assigned: {homework}
Goals worked on: {goals}
Next session: {next}

Generate a warm, supportive continuity message that:
1. Acknowledges the work done in session (without revealing clinical details)
2. Gently reminds the client of their homework
3. Offers 1-2 brief between-session reflection questions aligned with the modality
4. Encourages the client to log their mood and any significant events
5. Reminds them when their next session is

Keep it concise (under 200 words), warm, and non-clinical. Do not include any diagnostic language.",
        modality = input.modality.label_upper(),
        notes = input.session_notes,
        homework = join_or(&input.homework_assigned, ", ", "None"),
        goals = join_or(&input.goals_worked_on, ", ", "Not specified"),
        next = input
            .next_session_date
            .as_deref()
            .unwrap_or("To be scheduled"),
    );

    PromptPair {
        system: system_prompt(input.modality).to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn each_modality_has_its_own_system_prompt() {
        let prompts: HashSet<&str> = Modality::ALL.into_iter().map(system_prompt).collect();
        assert_eq!(prompts.len(), Modality::ALL.len());
    }

    #[rstest]
    #[case(Modality::Cbt, "Cognitive Behavioral Therapy (CBT)")]
    #[case(Modality::Dbt, "Dialectical Behavior Therapy (DBT)")]
    #[case(Modality::TraumaInformed, "trauma-informed care principles")]
    #[case(Modality::Emdr, "EMDR preparation and stabilization")]
    #[case(Modality::General, "general emotional support")]
    fn system_prompt_names_its_focus(#[case] modality: Modality, #[case] focus: &str) {
        let prompt = system_prompt(modality);
        assert!(prompt.contains(focus));
        assert!(prompt.contains("Never provide a diagnosis"));
        assert!(prompt.contains("Never replace the role of the therapist"));
        assert!(prompt.contains("immediately redirect to crisis resources"));
    }

    #[rstest]
    #[case(&[], "unknown")]
    #[case(&[7], "7.0")]
    #[case(&[6, 7], "6.5")]
    #[case(&[5, 6, 7, 7], "6.3")]
    #[case(&[1, 2, 2], "1.7")]
    fn average_mood_one_decimal(#[case] scores: &[u8], #[case] expected: &str) {
        assert_eq!(average_mood(scores), expected);
    }

    #[test]
    fn reflection_with_no_data_uses_placeholders() {
        let pair = reflection_prompt(&ReflectionInput {
            modality: Modality::TraumaInformed,
            ..Default::default()
        });
        assert_eq!(pair.system, system_prompt(Modality::TraumaInformed));
        assert!(pair.user.contains("aligned with trauma-informed principles"));
        assert!(pair.user.contains("Recent mood scores (1-10 scale): No recent data"));
        assert!(pair.user.contains("Average mood: unknown/10"));
        assert!(pair.user.contains("Recent emotional events: None logged"));
        assert!(pair.user.contains("Current therapy goals: Not specified"));
    }

    #[test]
    fn reflection_joins_data() {
        let pair = reflection_prompt(&ReflectionInput {
            modality: Modality::Cbt,
            recent_mood_scores: vec![6, 8],
            recent_events: vec!["anxiety: big meeting".into(), "joy: walk".into()],
            client_goals: vec!["Sleep earlier".into()],
        });
        assert!(pair.user.contains("Recent mood scores (1-10 scale): 6, 8\n"));
        assert!(pair.user.contains("Average mood: 7.0/10"));
        assert!(pair.user.contains("Recent emotional events: anxiety: big meeting; joy: walk"));
        assert!(pair.user.contains("Current therapy goals: Sleep earlier"));
    }

    #[test]
    fn session_prep_renders_sections() {
        let pair = session_prep(&SessionPrepInput {
            modality: Modality::TraumaInformed,
            client_name: "Sam".into(),
            recent_mood_data: vec![
                MoodPoint {
                    score: 4,
                    date: "3/2/2026".into(),
                    notes: Some("rough day".into()),
                },
                MoodPoint {
                    score: 6,
                    date: "3/1/2026".into(),
                    notes: None,
                },
            ],
            recent_events: vec![EventPoint {
                event_type: "anxiety".into(),
                intensity: 8,
                description: Some("crowded train".into()),
                date: "3/2/2026".into(),
            }],
            homework_status: vec![HomeworkPoint {
                title: "Grounding log".into(),
                status: "completed".into(),
                completion_notes: Some("did it daily".into()),
            }],
            active_goals: vec!["Reduce panic".into(), "Sleep".into()],
            days_since_last_session: 3,
        });

        assert!(pair.system.contains("within trauma-informed principles"));
        assert!(pair.user.contains("upcoming session with Sam."));
        assert!(pair.user.contains("MODALITY: TRAUMA-INFORMED\n"));
        assert!(pair.user.contains("Days since last session: 3\n"));
        assert!(pair.user.contains("MOOD DATA (last 2 entries):\n"));
        assert!(pair.user.contains("- 3/2/2026: Score 4/10 \u{2014} \"rough day\"\n- 3/1/2026: Score 6/10\n"));
        assert!(pair.user.contains("- 3/2/2026: anxiety (intensity 8/10) \u{2014} crowded train"));
        assert!(pair.user.contains("- \"Grounding log\": completed \u{2014} Notes: did it daily"));
        assert!(pair.user.contains("ACTIVE THERAPY GOALS:\nReduce panic\nSleep\n"));
    }

    #[test]
    fn session_prep_empty_sections() {
        let pair = session_prep(&SessionPrepInput {
            client_name: "Client".into(),
            days_since_last_session: 7,
            ..Default::default()
        });
        assert!(pair.user.contains("MODALITY: GENERAL"));
        assert!(pair.user.contains("MOOD DATA (last 0 entries):\nNo mood data recorded"));
        assert!(pair.user.contains("EMOTIONAL EVENTS:\nNo events logged"));
        assert!(pair.user.contains("HOMEWORK ASSIGNMENTS:\nNo homework assigned"));
        assert!(pair.user.contains("ACTIVE THERAPY GOALS:\nNo goals specified"));
        assert!(pair.user.contains("Days since last session: 7"));
    }

    #[test]
    fn post_session_defaults() {
        let pair = post_session(&PostSessionInput {
            modality: Modality::Dbt,
            session_notes: "distress tolerance".into(),
            ..Default::default()
        });
        assert_eq!(pair.system, system_prompt(Modality::Dbt));
        assert!(pair.user.contains("MODALITY: DBT\n"));
        assert!(pair.user.contains("Session themes: distress tolerance\n"));
        assert!(pair.user.contains("Homework assigned: None\n"));
        assert!(pair.user.contains("Goals worked on: Not specified\n"));
        assert!(pair.user.contains("Next session: To be scheduled\n"));
    }

    #[test]
    fn post_session_lists_are_comma_joined() {
        let pair = post_session(&PostSessionInput {
            modality: Modality::Emdr,
            session_notes: "calm place".into(),
            homework_assigned: vec!["Container exercise".into(), "Journal".into()],
            goals_worked_on: vec!["Stabilize".into()],
            next_session_date: Some("4/2/2026".into()),
        });
        assert!(pair.user.contains("Homework assigned: Container exercise, Journal\n"));
        assert!(pair.user.contains("Next session: 4/2/2026\n"));
    }
}
