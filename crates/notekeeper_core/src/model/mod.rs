//! Domain model for notes and delegated identities.
//!
//! # Responsibility
//! - Define canonical data structures used by session and store logic.
//! - Keep input validation next to the types it protects.
//!
//! # Invariants
//! - Note ids are owned by the remote service, never generated locally.
//! - Principals are always syntactically valid once constructed.

pub mod identity;
pub mod note;
pub mod principal;
