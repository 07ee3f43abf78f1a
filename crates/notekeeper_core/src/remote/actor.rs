//! Remote note-service call contract.
//!
//! # Responsibility
//! - Define the per-call interface of the remote note-storage service.
//! - Decode tagged `{Ok}` / `{Err}` replies and reject any other shape.
//!
//! # Invariants
//! - Exactly one of `Ok` / `Err` must be present for a reply to be valid.
//! - `NoteActor` methods return `Err` only for transport failures; service
//!   level failures travel inside `TaggedReply`.

use crate::model::note::{Note, NoteId};
use crate::model::principal::Principal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ActorResult<T> = Result<T, ActorError>;

/// Remote-call failure classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// The call never produced a reply (network, agent, expired credential).
    Transport(String),
    /// The service replied with an `Err` tag.
    Rejected(String),
    /// The reply matched neither `Ok` nor `Err`.
    UnexpectedResponse(String),
}

impl Display for ActorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "remote call failed: {message}"),
            Self::Rejected(message) => write!(f, "{message}"),
            Self::UnexpectedResponse(details) => {
                write!(f, "unexpected response format: {details}")
            }
        }
    }
}

impl Error for ActorError {}

/// Wire shape of `Result<text, text>` replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedReply {
    #[serde(rename = "Ok", default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,
    #[serde(rename = "Err", default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl TaggedReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: Some(message.into()),
            err: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: None,
            err: Some(message.into()),
        }
    }

    /// Decodes a JSON-encoded reply.
    ///
    /// Anything that is not an object with string tags is reported as
    /// `UnexpectedResponse`; tag exclusivity is checked by `into_result`.
    pub fn from_wire(raw: &str) -> ActorResult<Self> {
        serde_json::from_str(raw).map_err(|err| ActorError::UnexpectedResponse(err.to_string()))
    }

    /// Interprets the reply as success payload or rejection.
    pub fn into_result(self) -> ActorResult<String> {
        match (self.ok, self.err) {
            (Some(message), None) => Ok(message),
            (None, Some(message)) => Err(ActorError::Rejected(message)),
            (Some(_), Some(_)) => Err(ActorError::UnexpectedResponse(
                "both Ok and Err tags present".to_string(),
            )),
            (None, None) => Err(ActorError::UnexpectedResponse(
                "neither Ok nor Err tag present".to_string(),
            )),
        }
    }
}

/// Remote-call actor bound to one identity and one service address.
///
/// Implementations attribute every call to the identity they were built
/// with; they must not switch identities after construction.
#[async_trait]
pub trait NoteActor: Send + Sync {
    async fn get_notes(&self) -> ActorResult<Vec<Note>>;
    async fn create(&self, title: &str, content: &str) -> ActorResult<TaggedReply>;
    async fn edit(&self, id: NoteId, title: &str, content: &str) -> ActorResult<TaggedReply>;
    async fn delete(&self, id: NoteId) -> ActorResult<TaggedReply>;
    async fn get_caller_principal(&self) -> ActorResult<Principal>;
}

#[cfg(test)]
mod tests {
    use super::{ActorError, TaggedReply};

    #[test]
    fn decodes_ok_and_err_tags() {
        let ok = TaggedReply::from_wire(r#"{"Ok":"Note created successfully"}"#)
            .expect("ok reply should decode");
        assert_eq!(ok.into_result(), Ok("Note created successfully".to_string()));

        let err = TaggedReply::from_wire(r#"{"Err":"Note not found"}"#)
            .expect("err reply should decode");
        assert_eq!(
            err.into_result(),
            Err(ActorError::Rejected("Note not found".to_string()))
        );
    }

    #[test]
    fn rejects_shapes_without_exactly_one_tag() {
        let empty = TaggedReply::from_wire("{}").expect("empty object decodes");
        assert!(matches!(
            empty.into_result(),
            Err(ActorError::UnexpectedResponse(_))
        ));

        let both = TaggedReply::from_wire(r#"{"Ok":"a","Err":"b"}"#).expect("decodes");
        assert!(matches!(
            both.into_result(),
            Err(ActorError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn non_object_wire_values_are_unexpected() {
        for raw in [r#""ok""#, "42", "null", r#"{"Ok":1}"#, "not json"] {
            let err = TaggedReply::from_wire(raw).expect_err("non-tagged reply must fail");
            assert!(matches!(err, ActorError::UnexpectedResponse(_)), "{raw}");
        }
    }

    #[test]
    fn rejected_message_is_rendered_verbatim() {
        assert_eq!(ActorError::Rejected("not found".to_string()).to_string(), "not found");
    }
}
