//! Authenticated actor construction.
//!
//! # Responsibility
//! - Bind a remote-call actor to exactly one identity and service address.
//! - Interpret tagged replies so callers only see success or `ActorError`.
//!
//! # Invariants
//! - `ActorFactory::build` performs no network I/O.
//! - An `AuthenticatedActor` is never re-bound; a new identity means a new
//!   actor.

use crate::model::identity::{Identity, SessionToken};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::principal::{Principal, ServiceAddress};
use crate::remote::actor::{ActorResult, NoteActor};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Builds remote-call actors for an identity.
pub trait ActorFactory: Send + Sync {
    /// Constructs an actor that signs calls with `identity`.
    ///
    /// Must be deterministic in its inputs; connection setup is deferred to
    /// the first call.
    fn build(&self, identity: &Identity, service: &ServiceAddress) -> Arc<dyn NoteActor>;
}

/// Actor handle tied to the identity it was built from.
#[derive(Clone)]
pub struct AuthenticatedActor {
    identity: Identity,
    service: ServiceAddress,
    remote: Arc<dyn NoteActor>,
}

impl AuthenticatedActor {
    pub fn build(factory: &dyn ActorFactory, identity: Identity, service: ServiceAddress) -> Self {
        let remote = factory.build(&identity, &service);
        Self {
            identity,
            service,
            remote,
        }
    }

    pub fn principal(&self) -> &Principal {
        self.identity.principal()
    }

    pub fn session_token(&self) -> SessionToken {
        self.identity.token()
    }

    pub fn service(&self) -> &ServiceAddress {
        &self.service
    }

    /// Returns whether both handles were built for the same login.
    pub fn is_same_session(&self, other: &AuthenticatedActor) -> bool {
        self.identity.is_same_session(&other.identity)
    }

    pub async fn get_notes(&self) -> ActorResult<Vec<Note>> {
        self.remote.get_notes().await
    }

    pub async fn create(&self, draft: &NoteDraft) -> ActorResult<String> {
        self.remote
            .create(draft.title(), draft.content())
            .await?
            .into_result()
    }

    pub async fn edit(&self, id: NoteId, draft: &NoteDraft) -> ActorResult<String> {
        self.remote
            .edit(id, draft.title(), draft.content())
            .await?
            .into_result()
    }

    pub async fn delete(&self, id: NoteId) -> ActorResult<String> {
        self.remote.delete(id).await?.into_result()
    }

    pub async fn get_caller_principal(&self) -> ActorResult<Principal> {
        self.remote.get_caller_principal().await
    }
}

impl Debug for AuthenticatedActor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedActor")
            .field("principal", self.principal())
            .field("session_token", &self.session_token())
            .field("service", &self.service)
            .finish()
    }
}
