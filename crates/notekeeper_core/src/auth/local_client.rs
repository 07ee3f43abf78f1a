//! Storage-backed authentication client.
//!
//! # Responsibility
//! - Restore a still-valid delegation from local storage on startup.
//! - Drive the provider flow on login and persist its delegation.
//!
//! # Invariants
//! - Expired delegations are cleared on restore, never returned.
//! - Stored expiry never exceeds `requested_at + max_time_to_live`.

use crate::auth::client::{AuthClient, AuthResult, LoginOptions};
use crate::auth::provider::{AuthorizeRequest, IdentityProvider, ProviderError};
use crate::auth::storage::SessionStorage;
use crate::model::identity::Delegation;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond clock used for expiry checks.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall-clock time in Unix epoch milliseconds.
pub fn system_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub struct LocalAuthClient {
    storage: Arc<dyn SessionStorage>,
    provider: Arc<dyn IdentityProvider>,
    clock: Clock,
}

impl LocalAuthClient {
    pub fn new(storage: Arc<dyn SessionStorage>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            storage,
            provider,
            clock: Arc::new(system_now_ms),
        }
    }

    /// Replaces the wall clock, mainly for expiry tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now_ms(&self) -> i64 {
        (self.clock)()
    }
}

#[async_trait]
impl AuthClient for LocalAuthClient {
    async fn restore(&self) -> AuthResult<Option<Delegation>> {
        let Some(stored) = self.storage.load()? else {
            return Ok(None);
        };
        if stored.is_valid_at(self.now_ms()) {
            return Ok(Some(stored));
        }

        info!(
            "event=session_expired module=auth status=ok expired_at_ms={}",
            stored.expires_at_ms
        );
        self.storage.clear()?;
        Ok(None)
    }

    async fn login(&self, options: &LoginOptions) -> AuthResult<Delegation> {
        let request = AuthorizeRequest {
            identity_provider: options.identity_provider.clone(),
            max_time_to_live: options.max_time_to_live,
            requested_at_ms: self.now_ms(),
        };
        let mut delegation = self.provider.authorize(&request).await?;

        let bound = request.expiry_bound_ms();
        if delegation.expires_at_ms > bound {
            warn!(
                "event=delegation_clamped module=auth status=ok issued_expiry_ms={} bound_ms={}",
                delegation.expires_at_ms, bound
            );
            delegation.expires_at_ms = bound;
        }
        if !delegation.is_valid_at(self.now_ms()) {
            return Err(ProviderError::Rejected("issued delegation is already expired".to_string())
                .into());
        }

        self.storage.save(&delegation)?;
        Ok(delegation)
    }

    async fn logout(&self) -> AuthResult<()> {
        self.storage.clear()?;
        Ok(())
    }
}
