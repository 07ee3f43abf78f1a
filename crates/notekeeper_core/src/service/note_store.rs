//! Note list store with optimistic reconciliation.
//!
//! # Responsibility
//! - Provide load/create/edit/delete use-cases over the session's actor.
//! - Keep the local note list consistent with the service's list.
//!
//! # Invariants
//! - The local list is replaced wholesale on every successful load.
//! - Only a successful edit patches the list in place; create and delete
//!   always reload, since the service owns id assignment and renumbers ids
//!   on delete.
//! - Every failed write is followed by a reload.
//! - A response that arrives after the session changed is discarded.
//! - At most one write is in flight per store.
//! - Overlapping loads apply newest-first; a load started before the most
//!   recent load or edit patch is dropped.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::remote::actor::ActorError;
use crate::remote::factory::AuthenticatedActor;
use crate::session::context::SessionContext;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Store-level failure for one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteStoreError {
    /// Input rejected before any remote call.
    Validation(NoteValidationError),
    /// No authenticated session; nothing was sent.
    NotAuthenticated,
    /// Another write is still being reconciled.
    Busy,
    /// The remote call failed, was rejected, or replied with an unknown shape.
    Remote(ActorError),
    /// The session changed while the call was in flight; its result was
    /// dropped.
    StaleSession,
}

impl NoteStoreError {
    /// Returns whether the service replied with an unrecognized shape.
    pub fn is_unexpected_response(&self) -> bool {
        matches!(self, Self::Remote(ActorError::UnexpectedResponse(_)))
    }
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotAuthenticated => write!(f, "not authenticated; please log in"),
            Self::Busy => write!(f, "another note operation is still in progress"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::StaleSession => write!(f, "session changed before the response arrived"),
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ActorError> for NoteStoreError {
    fn from(value: ActorError) -> Self {
        Self::Remote(value)
    }
}

/// Result of a confirmed or declined delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

#[derive(Debug, Default)]
struct StoreState {
    notes: Vec<Note>,
    /// Bumped on every load start and every local patch.
    generation: u64,
    pending_loads: usize,
    last_error: Option<String>,
}

/// Releases the submission flag when the action finishes.
struct SubmitGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Local cache of the caller's notes.
pub struct NoteStore {
    session: Arc<SessionContext>,
    state: Mutex<StoreState>,
    submitting: AtomicBool,
}

impl NoteStore {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            session,
            state: Mutex::new(StoreState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the local list in service order.
    pub fn notes(&self) -> Vec<Note> {
        self.state().notes.clone()
    }

    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.state().notes.iter().find(|note| note.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state().pending_loads > 0
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Message of the most recent failed action, cleared by a good load.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Forgets the local list, e.g. after logout.
    pub fn clear(&self) {
        let mut state = self.state();
        state.notes.clear();
        state.generation += 1;
        state.last_error = None;
    }

    /// Replaces the local list with the service's list.
    ///
    /// On failure the previous list is kept and `last_error` is set.
    pub async fn load(&self) -> Result<usize, NoteStoreError> {
        let actor = self.require_actor()?;
        self.reload_with(&actor).await
    }

    /// Creates a note, then reloads to learn its service-assigned id.
    pub async fn create(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), NoteStoreError> {
        let draft = NoteDraft::new(title, content)?;
        let actor = self.require_actor()?;
        let _guard = self.begin_submit()?;

        let outcome = actor.create(&draft).await;
        self.ensure_current(&actor, "create")?;
        match outcome {
            Ok(message) => {
                info!("event=note_create module=store status=ok reply={message}");
                self.reload_with(&actor).await.map(|_| ())
            }
            Err(err) => Err(self.fail_and_resync(&actor, "create", err).await),
        }
    }

    /// Edits a note and patches the local copy in place.
    pub async fn edit(
        &self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), NoteStoreError> {
        let draft = NoteDraft::new(title, content)?;
        let actor = self.require_actor()?;
        let _guard = self.begin_submit()?;

        let outcome = actor.edit(id, &draft).await;
        self.ensure_current(&actor, "edit")?;
        match outcome {
            Ok(message) => {
                info!("event=note_edit module=store status=ok id={id} reply={message}");
                if self.patch_local(id, &draft) {
                    Ok(())
                } else {
                    // Not in the local copy; only a reload can converge.
                    self.reload_with(&actor).await.map(|_| ())
                }
            }
            Err(err) => Err(self.fail_and_resync(&actor, "edit", err).await),
        }
    }

    /// Deletes a note once `confirm` approves it, then reloads.
    ///
    /// `confirm` runs synchronously before anything else; declining is not an
    /// error.
    pub async fn delete<F>(&self, id: NoteId, confirm: F) -> Result<DeleteOutcome, NoteStoreError>
    where
        F: FnOnce(NoteId) -> bool,
    {
        if !confirm(id) {
            debug!("event=note_delete module=store status=declined id={id}");
            return Ok(DeleteOutcome::Declined);
        }
        let actor = self.require_actor()?;
        let _guard = self.begin_submit()?;

        let outcome = actor.delete(id).await;
        self.ensure_current(&actor, "delete")?;
        match outcome {
            Ok(message) => {
                info!("event=note_delete module=store status=ok id={id} reply={message}");
                self.reload_with(&actor)
                    .await
                    .map(|_| DeleteOutcome::Deleted)
            }
            Err(err) => Err(self.fail_and_resync(&actor, "delete", err).await),
        }
    }

    fn require_actor(&self) -> Result<AuthenticatedActor, NoteStoreError> {
        self.session
            .authenticated_actor()
            .ok_or(NoteStoreError::NotAuthenticated)
    }

    fn begin_submit(&self) -> Result<SubmitGuard<'_>, NoteStoreError> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| NoteStoreError::Busy)?;
        Ok(SubmitGuard {
            flag: &self.submitting,
        })
    }

    fn ensure_current(
        &self,
        actor: &AuthenticatedActor,
        operation: &str,
    ) -> Result<(), NoteStoreError> {
        if self.session.is_current(actor) {
            return Ok(());
        }
        warn!("event=note_{operation} module=store status=discarded reason=session_changed");
        Err(NoteStoreError::StaleSession)
    }

    async fn reload_with(&self, actor: &AuthenticatedActor) -> Result<usize, NoteStoreError> {
        let issued = {
            let mut state = self.state();
            state.pending_loads += 1;
            state.generation += 1;
            state.generation
        };
        let fetched = actor.get_notes().await;

        let mut state = self.state();
        state.pending_loads -= 1;
        if !self.session.is_current(actor) {
            warn!("event=note_load module=store status=discarded reason=session_changed");
            return Err(NoteStoreError::StaleSession);
        }
        if state.generation != issued {
            debug!("event=note_load module=store status=superseded");
            return fetched.map(|_| state.notes.len()).map_err(NoteStoreError::from);
        }

        match fetched {
            Ok(notes) => {
                let count = notes.len();
                state.notes = notes;
                state.last_error = None;
                debug!("event=note_load module=store status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                error!("event=note_load module=store status=error error={err}");
                state.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    async fn fail_and_resync(
        &self,
        actor: &AuthenticatedActor,
        operation: &str,
        err: ActorError,
    ) -> NoteStoreError {
        warn!("event=note_{operation} module=store status=error error={err}");
        if let Err(reload_err) = self.reload_with(actor).await {
            error!("event=note_resync module=store status=error error={reload_err}");
        }
        self.state().last_error = Some(err.to_string());
        err.into()
    }

    fn patch_local(&self, id: NoteId, draft: &NoteDraft) -> bool {
        let mut state = self.state();
        match state.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                note.apply(draft);
                state.generation += 1;
                true
            }
            None => false,
        }
    }
}
