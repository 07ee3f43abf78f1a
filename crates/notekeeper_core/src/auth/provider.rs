//! Identity provider seam.
//!
//! # Responsibility
//! - Model the interactive round trip to the external identity provider.
//! - Offer a development provider for local runs.

use crate::model::identity::Delegation;
use crate::model::principal::Principal;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

/// One authorization round trip request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub identity_provider: String,
    pub max_time_to_live: Duration,
    /// Client clock at request time, Unix epoch milliseconds.
    pub requested_at_ms: i64,
}

impl AuthorizeRequest {
    /// Latest expiry the client will accept for this request.
    pub fn expiry_bound_ms(&self) -> i64 {
        let ttl_ms = i64::try_from(self.max_time_to_live.as_millis()).unwrap_or(i64::MAX);
        self.requested_at_ms.saturating_add(ttl_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The user closed or abandoned the flow.
    Cancelled,
    /// The provider refused to issue a delegation.
    Rejected(String),
    /// The provider origin could not be reached.
    Unreachable(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "login cancelled by user"),
            Self::Rejected(reason) => write!(f, "identity provider rejected login: {reason}"),
            Self::Unreachable(reason) => {
                write!(f, "identity provider unreachable: {reason}")
            }
        }
    }
}

impl Error for ProviderError {}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Suspends until the provider calls back with a delegation or an error.
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<Delegation, ProviderError>;
}

/// Provider for local development that approves every request.
///
/// Issues delegations for one fixed principal that expire at the requested
/// bound.
#[derive(Debug, Clone)]
pub struct DevIdentityProvider {
    principal: Principal,
}

impl DevIdentityProvider {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

#[async_trait]
impl IdentityProvider for DevIdentityProvider {
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<Delegation, ProviderError> {
        Ok(Delegation {
            principal: self.principal.clone(),
            payload: format!("dev-delegation:{}", Uuid::new_v4()),
            expires_at_ms: request.expiry_bound_ms(),
        })
    }
}
