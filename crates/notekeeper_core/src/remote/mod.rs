//! Remote note-service boundary.
//!
//! # Responsibility
//! - Define the actor contract used for every remote note call.
//! - Bind actors to identities through a pluggable factory.
//! - Ship an in-process service with the remote service's semantics.
//!
//! # Invariants
//! - Core never reaches the note service except through an
//!   `AuthenticatedActor`.

pub mod actor;
pub mod factory;
pub mod in_memory;
