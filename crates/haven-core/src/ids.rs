//! ID prefix constants.
//!
//! Every row id is `{prefix}-{8 hex chars}`, generated by the database
//! (see `HavenDb::generate_id`).

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_THERAPIST: &str = "thp";
pub const PREFIX_CLIENT: &str = "cli";
pub const PREFIX_MOOD: &str = "mood";
pub const PREFIX_EVENT: &str = "evt";
pub const PREFIX_CHECK_IN: &str = "chk";
pub const PREFIX_GOAL: &str = "goal";
pub const PREFIX_HOMEWORK: &str = "hw";
pub const PREFIX_SUMMARY: &str = "sum";
pub const PREFIX_SUBSCRIPTION: &str = "sub";
pub const PREFIX_AUDIT: &str = "aud";
pub const PREFIX_DEMO: &str = "dem";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_THERAPIST,
    PREFIX_CLIENT,
    PREFIX_MOOD,
    PREFIX_EVENT,
    PREFIX_CHECK_IN,
    PREFIX_GOAL,
    PREFIX_HOMEWORK,
    PREFIX_SUMMARY,
    PREFIX_SUBSCRIPTION,
    PREFIX_AUDIT,
    PREFIX_DEMO,
];

/// Format an id from a prefix and random hex part.
#[must_use]
pub fn format_id(prefix: &str, random: &str) -> String {
    format!("{prefix}-{random}")
}
