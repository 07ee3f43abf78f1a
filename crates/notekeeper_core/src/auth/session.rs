//! Identity session over the local authentication client.
//!
//! # Responsibility
//! - Own the current identity handle and its lifecycle.
//! - Turn client results into identity transitions.
//!
//! # Invariants
//! - `initialize` never fails; any client error degrades to no identity.
//! - Every successful transition yields an identity with a fresh session
//!   token.
//! - `logout` clears the local identity even when the client fails.

use crate::auth::client::{AuthClient, AuthError, AuthResult, LoginOptions};
use crate::model::identity::{Identity, SessionToken};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct IdentityState {
    initialized: bool,
    identity: Option<Identity>,
}

pub struct IdentitySession {
    client: Arc<dyn AuthClient>,
    options: LoginOptions,
    state: Mutex<IdentityState>,
}

impl IdentitySession {
    pub fn new(client: Arc<dyn AuthClient>, options: LoginOptions) -> Self {
        Self {
            client,
            options,
            state: Mutex::new(IdentityState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn login_options(&self) -> &LoginOptions {
        &self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    pub fn current_token(&self) -> Option<SessionToken> {
        self.state().identity.as_ref().map(Identity::token)
    }

    /// Probes the client for a still-valid session.
    ///
    /// Runs the probe once; later calls return the current identity.
    pub async fn initialize(&self) -> Option<Identity> {
        if self.is_initialized() {
            return self.identity();
        }

        let restored = match self.client.restore().await {
            Ok(delegation) => delegation.map(Identity::from_delegation),
            Err(err) => {
                error!("event=session_probe module=auth status=error error={err}");
                None
            }
        };

        let mut state = self.state();
        state.initialized = true;
        state.identity = restored.clone();
        info!(
            "event=session_probe module=auth status=ok restored={}",
            restored.is_some()
        );
        restored
    }

    /// Runs the interactive login flow.
    ///
    /// A failed re-login keeps the identity that was current before it.
    pub async fn login(&self) -> AuthResult<Identity> {
        if !self.is_initialized() {
            return Err(AuthError::NotInitialized);
        }

        match self.client.login(&self.options).await {
            Ok(delegation) => {
                let identity = Identity::from_delegation(delegation);
                self.state().identity = Some(identity.clone());
                info!(
                    "event=login module=auth status=ok principal={}",
                    identity.principal()
                );
                Ok(identity)
            }
            Err(err) => {
                let status = if err.is_cancelled() {
                    "cancelled"
                } else {
                    "error"
                };
                warn!("event=login module=auth status={status} error={err}");
                Err(err)
            }
        }
    }

    /// Drops the current identity and tells the client to forget it.
    ///
    /// The client is called even without an identity, so a logout whose
    /// storage clear failed can be retried.
    pub async fn logout(&self) -> AuthResult<()> {
        let previous = self.state().identity.take();

        match self.client.logout().await {
            Ok(()) => {
                info!(
                    "event=logout module=auth status=ok had_identity={}",
                    previous.is_some()
                );
                Ok(())
            }
            Err(err) => {
                error!("event=logout module=auth status=error error={err}");
                Err(err)
            }
        }
    }
}
