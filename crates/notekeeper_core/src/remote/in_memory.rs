//! In-process note-storage service.
//!
//! # Responsibility
//! - Reproduce the remote service's per-call semantics without a network.
//! - Provide an `ActorFactory` whose actors call into one shared service.
//!
//! # Invariants
//! - Notes are partitioned by owner principal; callers only see their own.
//! - Display ids per owner are `max(existing) + 1` on create.
//! - Deleting a note decrements every higher display id of the same owner.
//! - Anonymous callers cannot mutate and always list nothing.

use crate::model::identity::Identity;
use crate::model::note::{Note, NoteId};
use crate::model::principal::{Principal, ServiceAddress};
use crate::remote::actor::{ActorResult, NoteActor, TaggedReply};
use crate::remote::factory::ActorFactory;
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const AUTH_REQUIRED_MESSAGE: &str =
    "Authentication required. Please login with Internet Identity.";
pub const CREATED_MESSAGE: &str = "Note created successfully";
pub const UPDATED_MESSAGE: &str = "Note updated successfully";
pub const DELETED_MESSAGE: &str = "Note deleted successfully";
pub const EDIT_NOT_FOUND_MESSAGE: &str = "Note not found";
pub const DELETE_NOT_FOUND_MESSAGE: &str = "Note not found or you don't have permission";

#[derive(Debug, Clone)]
struct StoredNote {
    id: NoteId,
    title: String,
    content: String,
    owner: Principal,
}

impl StoredNote {
    fn to_note(&self) -> Note {
        Note {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

#[derive(Debug)]
struct ServiceState {
    next_storage_key: u64,
    notes: BTreeMap<u64, StoredNote>,
}

/// Shared in-memory note storage keyed by a global storage key.
#[derive(Debug)]
pub struct InMemoryNoteService {
    state: Mutex<ServiceState>,
}

impl Default for InMemoryNoteService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNoteService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState {
                next_storage_key: 1,
                notes: BTreeMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lists the caller's notes ordered by display id.
    pub fn get_notes(&self, caller: &Principal) -> Vec<Note> {
        if caller.is_anonymous() {
            return Vec::new();
        }
        let state = self.state();
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|note| &note.owner == caller)
            .map(StoredNote::to_note)
            .collect();
        notes.sort_by_key(|note| note.id);
        notes
    }

    pub fn create(&self, caller: &Principal, title: &str, content: &str) -> TaggedReply {
        if caller.is_anonymous() {
            return TaggedReply::err(AUTH_REQUIRED_MESSAGE);
        }
        let mut state = self.state();
        let storage_key = state.next_storage_key;
        state.next_storage_key += 1;

        let display_id = state
            .notes
            .values()
            .filter(|note| &note.owner == caller)
            .map(|note| note.id)
            .max()
            .unwrap_or(0)
            + 1;

        state.notes.insert(
            storage_key,
            StoredNote {
                id: display_id,
                title: title.to_string(),
                content: content.to_string(),
                owner: caller.clone(),
            },
        );
        debug!("event=service_create module=in_memory status=ok id={display_id}");
        TaggedReply::ok(CREATED_MESSAGE)
    }

    pub fn edit(&self, caller: &Principal, id: NoteId, title: &str, content: &str) -> TaggedReply {
        if caller.is_anonymous() {
            return TaggedReply::err(AUTH_REQUIRED_MESSAGE);
        }
        let mut state = self.state();
        match state
            .notes
            .values_mut()
            .find(|note| &note.owner == caller && note.id == id)
        {
            Some(note) => {
                note.title = title.to_string();
                note.content = content.to_string();
                TaggedReply::ok(UPDATED_MESSAGE)
            }
            None => TaggedReply::err(EDIT_NOT_FOUND_MESSAGE),
        }
    }

    pub fn delete(&self, caller: &Principal, id: NoteId) -> TaggedReply {
        if caller.is_anonymous() {
            return TaggedReply::err(AUTH_REQUIRED_MESSAGE);
        }
        let mut state = self.state();
        let storage_key = state
            .notes
            .iter()
            .find(|(_, note)| &note.owner == caller && note.id == id)
            .map(|(key, _)| *key);

        let Some(storage_key) = storage_key else {
            return TaggedReply::err(DELETE_NOT_FOUND_MESSAGE);
        };
        state.notes.remove(&storage_key);

        for note in state
            .notes
            .values_mut()
            .filter(|note| &note.owner == caller && note.id > id)
        {
            note.id -= 1;
        }
        debug!("event=service_delete module=in_memory status=ok id={id}");
        TaggedReply::ok(DELETED_MESSAGE)
    }

    pub fn get_caller_principal(&self, caller: &Principal) -> Principal {
        caller.clone()
    }

    pub fn is_user_authenticated(&self, caller: &Principal) -> bool {
        !caller.is_anonymous()
    }

    /// Total stored notes across all owners.
    pub fn len(&self) -> usize {
        self.state().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Actor that calls the shared service as one fixed principal.
pub struct InMemoryActor {
    service: Arc<InMemoryNoteService>,
    caller: Principal,
}

impl InMemoryActor {
    pub fn new(service: Arc<InMemoryNoteService>, caller: Principal) -> Self {
        Self { service, caller }
    }
}

#[async_trait]
impl NoteActor for InMemoryActor {
    async fn get_notes(&self) -> ActorResult<Vec<Note>> {
        Ok(self.service.get_notes(&self.caller))
    }

    async fn create(&self, title: &str, content: &str) -> ActorResult<TaggedReply> {
        Ok(self.service.create(&self.caller, title, content))
    }

    async fn edit(&self, id: NoteId, title: &str, content: &str) -> ActorResult<TaggedReply> {
        Ok(self.service.edit(&self.caller, id, title, content))
    }

    async fn delete(&self, id: NoteId) -> ActorResult<TaggedReply> {
        Ok(self.service.delete(&self.caller, id))
    }

    async fn get_caller_principal(&self) -> ActorResult<Principal> {
        Ok(self.service.get_caller_principal(&self.caller))
    }
}

/// Factory producing `InMemoryActor`s over one shared service.
#[derive(Clone)]
pub struct InMemoryActorFactory {
    service: Arc<InMemoryNoteService>,
}

impl InMemoryActorFactory {
    pub fn new(service: Arc<InMemoryNoteService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<InMemoryNoteService> {
        &self.service
    }
}

impl ActorFactory for InMemoryActorFactory {
    fn build(&self, identity: &Identity, _service: &ServiceAddress) -> Arc<dyn NoteActor> {
        Arc::new(InMemoryActor::new(
            Arc::clone(&self.service),
            identity.principal().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryNoteService, AUTH_REQUIRED_MESSAGE, DELETE_NOT_FOUND_MESSAGE,
        EDIT_NOT_FOUND_MESSAGE,
    };
    use crate::model::principal::Principal;

    fn alice() -> Principal {
        Principal::from_text("aaaaa-aa").expect("principal")
    }

    fn bob() -> Principal {
        Principal::from_text("bbbbb-bb").expect("principal")
    }

    #[test]
    fn display_ids_are_assigned_per_owner() {
        let service = InMemoryNoteService::new();
        service.create(&alice(), "a1", "x");
        service.create(&bob(), "b1", "x");
        service.create(&alice(), "a2", "x");

        let ids: Vec<u64> = service.get_notes(&alice()).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<u64> = service.get_notes(&bob()).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(service.len(), 3);
    }

    #[test]
    fn delete_renumbers_only_higher_ids_of_the_same_owner() {
        let service = InMemoryNoteService::new();
        for title in ["one", "two", "three"] {
            service.create(&alice(), title, "body");
        }
        service.create(&bob(), "bob-one", "body");
        service.create(&bob(), "bob-two", "body");

        assert!(service.delete(&alice(), 2).into_result().is_ok());

        let notes = service.get_notes(&alice());
        let pairs: Vec<(u64, &str)> = notes.iter().map(|n| (n.id, n.title.as_str())).collect();
        assert_eq!(pairs, vec![(1, "one"), (2, "three")]);

        let bob_ids: Vec<u64> = service.get_notes(&bob()).iter().map(|n| n.id).collect();
        assert_eq!(bob_ids, vec![1, 2]);
    }

    #[test]
    fn edit_and_delete_do_not_cross_owners() {
        let service = InMemoryNoteService::new();
        service.create(&alice(), "mine", "body");

        let edit = service.edit(&bob(), 1, "stolen", "body");
        assert_eq!(edit.err.as_deref(), Some(EDIT_NOT_FOUND_MESSAGE));
        let delete = service.delete(&bob(), 1);
        assert_eq!(delete.err.as_deref(), Some(DELETE_NOT_FOUND_MESSAGE));
        assert_eq!(service.get_notes(&alice())[0].title, "mine");
    }

    #[test]
    fn anonymous_callers_are_rejected_and_see_nothing() {
        let service = InMemoryNoteService::new();
        let anonymous = Principal::anonymous();
        let reply = service.create(&anonymous, "t", "c");
        assert_eq!(reply.err.as_deref(), Some(AUTH_REQUIRED_MESSAGE));
        assert!(service.get_notes(&anonymous).is_empty());
        assert!(!service.is_user_authenticated(&anonymous));
        assert!(service.is_user_authenticated(&alice()));
        assert!(service.is_empty());
    }
}
