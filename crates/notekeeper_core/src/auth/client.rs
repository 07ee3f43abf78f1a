//! Local authentication client contract.
//!
//! # Responsibility
//! - Define the seam between session logic and the local auth client.
//! - Classify authentication failures.
//!
//! # Invariants
//! - `restore` never talks to the identity provider.
//! - `login` persists nothing unless the provider approved the request.

use crate::auth::provider::ProviderError;
use crate::auth::storage::StorageError;
use crate::model::identity::Delegation;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Default maximum delegation lifetime requested at login.
pub const DEFAULT_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(8 * 60 * 60);

pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication failures surfaced to session callers.
#[derive(Debug)]
pub enum AuthError {
    /// `login` was requested before the startup probe ran.
    NotInitialized,
    /// The identity provider flow failed or was cancelled.
    Provider(ProviderError),
    /// Local session persistence failed.
    Storage(StorageError),
}

impl AuthError {
    /// Returns whether the user backed out of the provider flow.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::Cancelled))
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "session not initialized"),
            Self::Provider(err) => write!(f, "login failed: {err}"),
            Self::Storage(err) => write!(f, "session storage failed: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotInitialized => None,
            Self::Provider(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<StorageError> for AuthError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Inputs for one interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// Origin URL of the identity provider.
    pub identity_provider: String,
    /// Upper bound for the issued delegation's lifetime.
    pub max_time_to_live: Duration,
}

impl LoginOptions {
    pub fn new(identity_provider: impl Into<String>) -> Self {
        Self {
            identity_provider: identity_provider.into(),
            max_time_to_live: DEFAULT_MAX_TIME_TO_LIVE,
        }
    }

    pub fn with_max_time_to_live(mut self, max_time_to_live: Duration) -> Self {
        self.max_time_to_live = max_time_to_live;
        self
    }
}

/// Local authentication client.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Returns the stored delegation if it is still valid.
    async fn restore(&self) -> AuthResult<Option<Delegation>>;

    /// Runs the interactive provider flow and stores the new delegation.
    async fn login(&self, options: &LoginOptions) -> AuthResult<Delegation>;

    /// Forgets the stored delegation.
    async fn logout(&self) -> AuthResult<()>;
}
