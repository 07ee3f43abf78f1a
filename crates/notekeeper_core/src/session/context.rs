//! Session context state machine.
//!
//! # Responsibility
//! - Compose the identity session with actor construction.
//! - Expose authentication state and the authenticated actor to consumers.
//!
//! # Invariants
//! - `Authenticated` iff an identity and an actor bound to it are present.
//! - The actor is rebuilt on every identity transition and dropped on logout.
//! - The startup probe runs once and settles in a terminal state.
//!
//! # See also
//! - `crate::service::note_store` for the main consumer.

use crate::auth::client::{AuthError, AuthResult};
use crate::auth::session::IdentitySession;
use crate::model::identity::Identity;
use crate::model::principal::{Principal, ServiceAddress};
use crate::remote::factory::{ActorFactory, AuthenticatedActor};
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }

    fn is_settled(self) -> bool {
        matches!(self, Self::Authenticated | Self::Unauthenticated)
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Bound {
    actor: AuthenticatedActor,
    principal: Principal,
}

#[derive(Debug)]
struct ContextState {
    phase: SessionState,
    bound: Option<Bound>,
}

/// Shared session container injected into consumers.
pub struct SessionContext {
    identity: IdentitySession,
    factory: Arc<dyn ActorFactory>,
    service: ServiceAddress,
    state: RwLock<ContextState>,
}

impl SessionContext {
    pub fn new(
        identity: IdentitySession,
        factory: Arc<dyn ActorFactory>,
        service: ServiceAddress,
    ) -> Self {
        Self {
            identity,
            factory,
            service,
            state: RwLock::new(ContextState {
                phase: SessionState::Uninitialized,
                bound: None,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn service(&self) -> &ServiceAddress {
        &self.service
    }

    pub fn state(&self) -> SessionState {
        self.read().phase
    }

    pub fn is_initializing(&self) -> bool {
        self.state() == SessionState::Initializing
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Principal reported by the service for the current session.
    pub fn principal(&self) -> Option<Principal> {
        self.read().bound.as_ref().map(|bound| bound.principal.clone())
    }

    /// Actor for the current session; absent whenever unauthenticated.
    ///
    /// Callers must re-fetch after every `.await` instead of keeping the
    /// handle across a logout/login cycle.
    pub fn authenticated_actor(&self) -> Option<AuthenticatedActor> {
        self.read().bound.as_ref().map(|bound| bound.actor.clone())
    }

    /// Returns whether `actor` still belongs to the current session.
    pub fn is_current(&self, actor: &AuthenticatedActor) -> bool {
        self.read()
            .bound
            .as_ref()
            .is_some_and(|bound| bound.actor.is_same_session(actor))
    }

    /// Runs the startup probe.
    ///
    /// Only the first call probes; later calls return the current state.
    pub async fn initialize(&self) -> SessionState {
        {
            let mut state = self.write();
            if state.phase != SessionState::Uninitialized {
                return state.phase;
            }
            state.phase = SessionState::Initializing;
        }

        let settled = match self.identity.initialize().await {
            Some(identity) => self.bind(identity).await,
            None => false,
        };

        let mut state = self.write();
        // A login or logout may already have settled the phase during the lookup.
        if !settled && state.phase == SessionState::Initializing {
            state.bound = None;
            state.phase = SessionState::Unauthenticated;
        }
        info!(
            "event=session_init module=session status=ok state={}",
            state.phase
        );
        state.phase
    }

    /// Runs the interactive login and binds a new actor on success.
    ///
    /// Failure leaves the previous state untouched.
    pub async fn login(&self) -> AuthResult<()> {
        if !self.state().is_settled() {
            return Err(AuthError::NotInitialized);
        }
        let identity = self.identity.login().await?;
        if !self.bind(identity).await {
            warn!("event=login module=session status=superseded");
        }
        Ok(())
    }

    /// Drops the actor immediately, then clears the identity.
    ///
    /// Idempotent: logging out while unauthenticated is a no-op. Rejected
    /// with `NotInitialized` while the startup probe is still running.
    pub async fn logout(&self) -> AuthResult<()> {
        {
            let mut state = self.write();
            match state.phase {
                SessionState::Uninitialized => return Ok(()),
                SessionState::Initializing => {
                    warn!("event=logout module=session status=rejected reason=initializing");
                    return Err(AuthError::NotInitialized);
                }
                SessionState::Authenticated | SessionState::Unauthenticated => {}
            }
            state.bound = None;
            state.phase = SessionState::Unauthenticated;
        }
        self.identity.logout().await
    }

    /// Installs an actor for `identity` if it is still current, then asks
    /// the service who we are.
    ///
    /// The previous actor is replaced before the lookup is awaited.
    async fn bind(&self, identity: Identity) -> bool {
        let actor =
            AuthenticatedActor::build(self.factory.as_ref(), identity, self.service.clone());
        {
            let mut state = self.write();
            if self.identity.current_token() != Some(actor.session_token()) {
                return false;
            }
            state.bound = Some(Bound {
                actor: actor.clone(),
                principal: actor.principal().clone(),
            });
            state.phase = SessionState::Authenticated;
        }

        let principal = match actor.get_caller_principal().await {
            Ok(principal) => principal,
            Err(err) => {
                warn!("event=caller_principal module=session status=error error={err}");
                return true;
            }
        };

        let mut state = self.write();
        match state.bound.as_mut() {
            Some(bound) if bound.actor.is_same_session(&actor) => {
                bound.principal = principal;
                true
            }
            _ => false,
        }
    }
}
