//! Note domain model.
//!
//! # Responsibility
//! - Define the note record as returned by the remote service.
//! - Validate user input before any remote call is made.
//!
//! # Invariants
//! - `Note::id` is assigned by the service and may be renumbered by it after
//!   another note of the same owner is deleted.
//! - A `NoteDraft` always has non-blank title and content.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service-assigned note id, unique per owner.
pub type NoteId = u64;

/// Note record as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

impl Note {
    /// Replaces title and content in place, keeping the id.
    pub fn apply(&mut self, draft: &NoteDraft) {
        self.title = draft.title.clone();
        self.content = draft.content.clone();
    }
}

/// Input validation errors for note write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Validated title/content pair for create and edit.
///
/// Values are kept as typed; only the emptiness check looks at the trimmed
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, NoteValidationError> {
        let title = title.into();
        let content = content.into();
        if title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        if content.trim().is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        Ok(Self { title, content })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
