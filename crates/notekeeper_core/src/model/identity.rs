//! Delegated identity handle.
//!
//! # Responsibility
//! - Carry the opaque delegation obtained from the identity provider.
//! - Tag every login with a session token so stale handles are detectable.
//!
//! # Invariants
//! - The delegation payload is never inspected or logged by core.
//! - Two identities belong to the same session iff their tokens are equal.

use crate::model::principal::Principal;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Per-login session token.
pub type SessionToken = Uuid;

/// Signed delegation as stored by the local authentication client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub principal: Principal,
    /// Opaque signed payload issued by the identity provider.
    pub payload: String,
    /// Unix epoch milliseconds after which the delegation is invalid.
    pub expires_at_ms: i64,
}

impl Delegation {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

impl Debug for Delegation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegation")
            .field("principal", &self.principal)
            .field("payload", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Credential capable of signing remote calls on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    token: SessionToken,
    delegation: Delegation,
}

impl Identity {
    /// Wraps a delegation with a fresh session token.
    pub fn from_delegation(delegation: Delegation) -> Self {
        Self {
            token: Uuid::new_v4(),
            delegation,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.delegation.principal
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn delegation(&self) -> &Delegation {
        &self.delegation
    }

    pub fn is_same_session(&self, other: &Identity) -> bool {
        self.token == other.token
    }
}
