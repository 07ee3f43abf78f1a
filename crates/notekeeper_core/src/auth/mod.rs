//! Delegated-identity authentication.
//!
//! # Responsibility
//! - Restore, create and drop delegated identities.
//! - Keep the identity provider and local persistence behind traits.
//!
//! # Invariants
//! - Nothing in this module calls the note-storage service.
//! - Delegation payloads never appear in logs.

pub mod client;
pub mod local_client;
pub mod provider;
pub mod session;
pub mod storage;
