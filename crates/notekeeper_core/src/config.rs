//! Client configuration.
//!
//! # Responsibility
//! - Resolve network, identity provider, service address and session
//!   lifetime from JSON or environment.
//! - Validate every value before it reaches session or store code.
//!
//! # Invariants
//! - A loaded `ClientConfig` always has a valid service address and a
//!   non-zero session lifetime.
//! - Unset identity provider falls back to the network preset.

use crate::auth::client::{LoginOptions, DEFAULT_MAX_TIME_TO_LIVE};
use crate::logging::{default_log_level, normalize_level};
use crate::model::principal::{PrincipalError, ServiceAddress};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_NETWORK: &str = "DFX_NETWORK";
pub const ENV_SERVICE_ADDRESS: &str = "NOTEKEEPER_SERVICE_ADDRESS";
pub const ENV_IDENTITY_PROVIDER: &str = "NOTEKEEPER_IDENTITY_PROVIDER";
pub const ENV_SESSION_TTL_SECS: &str = "NOTEKEEPER_SESSION_TTL_SECS";
pub const ENV_LOG_LEVEL: &str = "NOTEKEEPER_LOG_LEVEL";

const MAINNET_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";
const LOCAL_IDENTITY_PROVIDER: &str = "http://rdmx6-jaaaa-aaaaa-aaadq-cai.localhost:4943";

#[derive(Debug)]
pub enum ConfigError {
    UnknownNetwork(String),
    MissingServiceAddress,
    InvalidServiceAddress(PrincipalError),
    InvalidIdentityProvider(String),
    InvalidSessionTtl(String),
    InvalidLogLevel(String),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNetwork(value) => {
                write!(f, "unknown network `{value}`; expected ic|local")
            }
            Self::MissingServiceAddress => write!(f, "service address is required"),
            Self::InvalidServiceAddress(err) => write!(f, "invalid service address: {err}"),
            Self::InvalidIdentityProvider(value) => {
                write!(f, "identity provider must be an http(s) URL, got `{value}`")
            }
            Self::InvalidSessionTtl(value) => {
                write!(f, "session ttl must be a positive number of seconds, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidServiceAddress(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// Public mainnet.
    Ic,
    /// Local replica.
    Local,
}

impl Network {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ic" => Ok(Self::Ic),
            "local" | "" => Ok(Self::Local),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }

    /// Identity provider origin used when none is configured.
    pub fn default_identity_provider(self) -> &'static str {
        match self {
            Self::Ic => MAINNET_IDENTITY_PROVIDER,
            Self::Local => LOCAL_IDENTITY_PROVIDER,
        }
    }
}

/// Raw JSON document shape; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    network: Option<Network>,
    service_address: Option<String>,
    identity_provider: Option<String>,
    session_ttl_secs: Option<u64>,
    log_level: Option<String>,
}

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub network: Network,
    pub service_address: ServiceAddress,
    pub identity_provider: String,
    pub max_time_to_live: Duration,
    pub log_level: &'static str,
}

impl ClientConfig {
    /// Builds a config for `network` with all other values defaulted.
    pub fn for_network(network: Network, service_address: ServiceAddress) -> Self {
        Self {
            network,
            service_address,
            identity_provider: network.default_identity_provider().to_string(),
            max_time_to_live: DEFAULT_MAX_TIME_TO_LIVE,
            log_level: default_log_level(),
        }
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        Self::from_raw(raw)
    }

    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = lookup(ENV_NETWORK)
            .map(|value| Network::parse(&value))
            .transpose()?;
        let session_ttl_secs = lookup(ENV_SESSION_TTL_SECS)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSessionTtl(value.clone()))
            })
            .transpose()?;

        Self::from_raw(RawConfig {
            network,
            service_address: lookup(ENV_SERVICE_ADDRESS),
            identity_provider: lookup(ENV_IDENTITY_PROVIDER),
            session_ttl_secs,
            log_level: lookup(ENV_LOG_LEVEL),
        })
    }

    /// Login options derived from this config.
    pub fn login_options(&self) -> LoginOptions {
        LoginOptions::new(self.identity_provider.clone())
            .with_max_time_to_live(self.max_time_to_live)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let network = raw.network.unwrap_or(Network::Local);
        let service_address = raw
            .service_address
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingServiceAddress)
            .and_then(|value| {
                ServiceAddress::parse(&value).map_err(ConfigError::InvalidServiceAddress)
            })?;

        let identity_provider = match raw.identity_provider {
            Some(value) if !value.trim().is_empty() => normalize_identity_provider(&value)?,
            _ => network.default_identity_provider().to_string(),
        };

        let max_time_to_live = match raw.session_ttl_secs {
            Some(0) => return Err(ConfigError::InvalidSessionTtl("0".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_MAX_TIME_TO_LIVE,
        };

        let log_level = match raw.log_level {
            Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self {
            network,
            service_address,
            identity_provider,
            max_time_to_live,
            log_level,
        })
    }
}

fn normalize_identity_provider(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidIdentityProvider(value.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        ClientConfig, ConfigError, Network, ENV_IDENTITY_PROVIDER, ENV_NETWORK,
        ENV_SERVICE_ADDRESS, ENV_SESSION_TTL_SECS,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    const SERVICE: &str = "bkyz2-fmaaa-aaaaa-qaaaq-cai";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn network_presets_select_identity_provider() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_NETWORK, "ic"),
            (ENV_SERVICE_ADDRESS, SERVICE),
        ]))
        .expect("ic config should load");
        assert_eq!(config.network, Network::Ic);
        assert_eq!(config.identity_provider, "https://identity.ic0.app");

        let local = ClientConfig::from_lookup(lookup_from(&[(ENV_SERVICE_ADDRESS, SERVICE)]))
            .expect("local config should load");
        assert_eq!(local.network, Network::Local);
        assert!(local.identity_provider.contains("localhost:4943"));
        assert_eq!(local.max_time_to_live, Duration::from_secs(8 * 60 * 60));
    }

    #[test]
    fn explicit_values_override_presets() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_NETWORK, "IC"),
            (ENV_SERVICE_ADDRESS, SERVICE),
            (ENV_IDENTITY_PROVIDER, "https://id.example.org/"),
            (ENV_SESSION_TTL_SECS, "600"),
        ]))
        .expect("config should load");
        assert_eq!(config.identity_provider, "https://id.example.org");
        assert_eq!(config.login_options().max_time_to_live, Duration::from_secs(600));
    }

    #[test]
    fn rejects_missing_or_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup_from(&[])),
            Err(ConfigError::MissingServiceAddress)
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup_from(&[(ENV_SERVICE_ADDRESS, "Not A Principal")])),
            Err(ConfigError::InvalidServiceAddress(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup_from(&[
                (ENV_SERVICE_ADDRESS, SERVICE),
                (ENV_NETWORK, "mainnet"),
            ])),
            Err(ConfigError::UnknownNetwork(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup_from(&[
                (ENV_SERVICE_ADDRESS, SERVICE),
                (ENV_SESSION_TTL_SECS, "0"),
            ])),
            Err(ConfigError::InvalidSessionTtl(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup_from(&[
                (ENV_SERVICE_ADDRESS, SERVICE),
                (ENV_IDENTITY_PROVIDER, "identity.ic0.app"),
            ])),
            Err(ConfigError::InvalidIdentityProvider(_))
        ));
    }

    #[test]
    fn parses_json_documents() {
        let config = ClientConfig::from_json_str(
            r#"{"network":"ic","service_address":"bkyz2-fmaaa-aaaaa-qaaaq-cai","log_level":"WARNING"}"#,
        )
        .expect("json config should load");
        assert_eq!(config.network, Network::Ic);
        assert_eq!(config.log_level, "warn");

        let err = ClientConfig::from_json_str(r#"{"service_address":"x","extra":1}"#)
            .expect_err("unknown fields must be rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
