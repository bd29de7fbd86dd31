//! # haven-core
//!
//! Core domain types, ID prefixes, and error types for Haven.
//!
//! This crate provides the foundational types shared across all Haven crates:
//! - Entity structs for users, profiles, client activity, and AI summaries
//! - Closed enums, including the goal and homework state machines
//! - ID prefix constants
//! - The authenticated caller identity
//! - Cross-cutting error types
//! - Audit detail sub-types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
