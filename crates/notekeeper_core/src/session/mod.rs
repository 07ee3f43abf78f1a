//! Process-wide session state.
//!
//! # Responsibility
//! - Own the authentication state machine shared by all consumers.
//! - Wire a session from validated configuration.
//!
//! # Invariants
//! - One `SessionContext` per process, passed explicitly (no global).

pub mod context;

use crate::auth::client::AuthClient;
use crate::auth::session::IdentitySession;
use crate::config::ClientConfig;
use crate::remote::factory::ActorFactory;
use context::SessionContext;
use std::sync::Arc;

/// Builds an uninitialized session for `config`.
///
/// Callers still have to run `SessionContext::initialize` once at startup.
pub fn build_session(
    config: &ClientConfig,
    client: Arc<dyn AuthClient>,
    factory: Arc<dyn ActorFactory>,
) -> Arc<SessionContext> {
    let identity = IdentitySession::new(client, config.login_options());
    Arc::new(SessionContext::new(
        identity,
        factory,
        config.service_address.clone(),
    ))
}
