//! Core client logic for Notekeeper.
//! Owns the delegated-identity session and the note list reconciliation
//! against the remote note service.

pub mod auth;
pub mod config;
pub mod logging;
pub mod model;
pub mod remote;
pub mod service;
pub mod session;

pub use auth::client::{AuthClient, AuthError, AuthResult, LoginOptions};
pub use auth::local_client::{system_now_ms, Clock, LocalAuthClient};
pub use auth::provider::{AuthorizeRequest, DevIdentityProvider, IdentityProvider, ProviderError};
pub use auth::session::IdentitySession;
pub use auth::storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError, StorageResult,
};
pub use config::{ClientConfig, ConfigError, Network};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{Delegation, Identity, SessionToken};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use model::principal::{Principal, PrincipalError, ServiceAddress};
pub use remote::actor::{ActorError, ActorResult, NoteActor, TaggedReply};
pub use remote::factory::{ActorFactory, AuthenticatedActor};
pub use remote::in_memory::{InMemoryActor, InMemoryActorFactory, InMemoryNoteService};
pub use service::note_store::{DeleteOutcome, NoteStore, NoteStoreError};
pub use session::build_session;
pub use session::context::{SessionContext, SessionState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
