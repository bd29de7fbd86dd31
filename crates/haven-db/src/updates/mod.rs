//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. The serialized update (changed
//! fields only) doubles as the audit `details` payload.

pub mod client;
pub mod goal;
pub mod therapist;
