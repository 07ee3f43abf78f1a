//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate remote calls into use-case level APIs.
//! - Keep callers decoupled from the remote actor and session details.

pub mod note_store;
