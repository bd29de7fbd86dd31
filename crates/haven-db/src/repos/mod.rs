//! Repository modules implementing persistence for all Haven entities.
//!
//! Each module adds methods to `HavenService` via `impl HavenService` blocks.
//! Client-scoped lookups come in therapist-scoped and client-scoped variants
//! that return `DatabaseError::AccessDenied` when the row has another owner.

pub mod audit;
pub mod check_in;
pub mod client;
pub mod demo;
pub mod event;
pub mod goal;
pub mod homework;
pub mod mood;
pub mod subscription;
pub mod summary;
pub mod therapist;
pub mod user;
