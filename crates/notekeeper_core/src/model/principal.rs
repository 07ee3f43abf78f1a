//! Principal identifiers.
//!
//! # Responsibility
//! - Validate and carry the textual principal form used by the service.
//! - Provide the anonymous principal constant.
//!
//! # Invariants
//! - A `Principal` always holds a syntactically valid textual form.
//! - Textual form is lowercase base32 groups of 5 separated by `-`; the last
//!   group has 1..=5 characters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static PRINCIPAL_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z2-7]{5}-)*[a-z2-7]{1,5}$").expect("valid principal regex")
});

const ANONYMOUS_PRINCIPAL_TEXT: &str = "2vxsx-fae";
const MAX_PRINCIPAL_TEXT_LEN: usize = 63;

/// Principal parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    Empty,
    TooLong(usize),
    Malformed(String),
}

impl Display for PrincipalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "principal text must not be empty"),
            Self::TooLong(len) => write!(
                f,
                "principal text is {len} chars; max supported is {MAX_PRINCIPAL_TEXT_LEN}"
            ),
            Self::Malformed(value) => write!(f, "principal text is malformed: `{value}`"),
        }
    }
}

impl Error for PrincipalError {}

/// Stable, string-renderable caller identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parses a textual principal. Surrounding whitespace is ignored.
    pub fn from_text(value: &str) -> Result<Self, PrincipalError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if trimmed.len() > MAX_PRINCIPAL_TEXT_LEN {
            return Err(PrincipalError::TooLong(trimmed.len()));
        }
        if !PRINCIPAL_TEXT_RE.is_match(trimmed) {
            return Err(PrincipalError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The principal attributed to unauthenticated callers.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL_TEXT.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL_TEXT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_text(value.as_str())
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

/// Address of the remote note-storage service.
///
/// Services are addressed by principal, so this is a thin wrapper that keeps
/// service ids and caller ids apart in signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAddress(Principal);

impl ServiceAddress {
    pub fn new(principal: Principal) -> Self {
        Self(principal)
    }

    pub fn parse(value: &str) -> Result<Self, PrincipalError> {
        Principal::from_text(value).map(Self)
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl Display for ServiceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{Principal, PrincipalError, ServiceAddress};

    #[test]
    fn parses_well_formed_principals() {
        let principal = Principal::from_text(" rdmx6-jaaaa-aaaaa-aaadq-cai ")
            .expect("well-formed principal should parse");
        assert_eq!(principal.as_str(), "rdmx6-jaaaa-aaaaa-aaadq-cai");
        assert!(!principal.is_anonymous());
    }

    #[test]
    fn anonymous_principal_round_trips_through_text() {
        let parsed = Principal::from_text("2vxsx-fae").expect("anonymous text parses");
        assert_eq!(parsed, Principal::anonymous());
        assert!(parsed.is_anonymous());
    }

    #[test]
    fn rejects_blank_uppercase_and_bad_grouping() {
        assert_eq!(Principal::from_text("  "), Err(PrincipalError::Empty));
        assert!(matches!(
            Principal::from_text("RDMX6-jaaaa"),
            Err(PrincipalError::Malformed(_))
        ));
        assert!(matches!(
            Principal::from_text("rdmx6jaaaa-cai"),
            Err(PrincipalError::Malformed(_))
        ));
        assert!(matches!(
            Principal::from_text("abc--def"),
            Err(PrincipalError::Malformed(_))
        ));
    }

    #[test]
    fn serde_rejects_malformed_principal() {
        let err = serde_json::from_str::<Principal>("\"not a principal\"");
        assert!(err.is_err());

        let address: ServiceAddress =
            serde_json::from_str("\"bkyz2-fmaaa-aaaaa-qaaaq-cai\"").expect("address parses");
        assert_eq!(address.to_string(), "bkyz2-fmaaa-aaaaa-qaaaq-cai");
    }
}
