//! Entity structs for all Haven domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `haven-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod audit;
mod check_in;
mod client;
mod demo;
mod event;
mod goal;
mod homework;
mod mood;
mod subscription;
mod summary;
mod therapist;
mod user;

pub use audit::AuditLog;
pub use check_in::CheckIn;
pub use client::ClientProfile;
pub use demo::DemoRequest;
pub use event::EmotionalEvent;
pub use goal::TherapyGoal;
pub use homework::HomeworkAssignment;
pub use mood::MoodEntry;
pub use subscription::SubscriptionRecord;
pub use summary::AiSummary;
pub use therapist::TherapistProfile;
pub use user::User;
