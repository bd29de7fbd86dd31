//! # haven-api
//!
//! Every Haven procedure, grouped by router (`auth`, `onboarding`,
//! `therapist`, `client_app`, `subscription`, `audit`, `demo`), plus the axum
//! RPC surface in [`http`].
//!
//! A procedure takes the shared [`ApiContext`], the authenticated
//! [`haven_core::identity::Caller`] and a typed input. Role checks are
//! explicit calls to [`guards::authorize`] at the top of each procedure.

pub mod context;
pub mod error;
pub mod guards;
pub mod http;
pub mod procedures;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use context::{ApiContext, AuditEntry};
pub use error::ApiError;
