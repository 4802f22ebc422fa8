//! In-memory participant repository with version-checked updates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::participant::{
    domain::{Participant, ParticipantId, UserId},
    ports::{
        ParticipantFilter, ParticipantRepository, ParticipantRepositoryError,
        ParticipantRepositoryResult,
    },
};

#[derive(Debug, Default)]
struct InMemoryState {
    participants: HashMap<ParticipantId, Participant>,
    user_index: HashMap<UserId, ParticipantId>,
}

/// Thread-safe in-memory participant repository.
///
/// The version check and the write happen under one write lock, which gives
/// the same guarantee as a conditional update in a document store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipantRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryParticipantRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ParticipantRepositoryError {
    ParticipantRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    async fn store(&self, participant: &Participant) -> ParticipantRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.participants.contains_key(&participant.id()) {
            return Err(ParticipantRepositoryError::DuplicateParticipant(
                participant.id(),
            ));
        }
        if state.user_index.contains_key(&participant.user_id()) {
            return Err(ParticipantRepositoryError::DuplicateUser(
                participant.user_id(),
            ));
        }
        state
            .user_index
            .insert(participant.user_id(), participant.id());
        state
            .participants
            .insert(participant.id(), participant.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ParticipantId,
    ) -> ParticipantRepositoryResult<Option<Participant>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.participants.get(&id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: UserId,
    ) -> ParticipantRepositoryResult<Option<Participant>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .user_index
            .get(&user_id)
            .and_then(|id| state.participants.get(id))
            .cloned())
    }

    async fn update_if_version(
        &self,
        participant: &Participant,
        expected_version: u64,
    ) -> ParticipantRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let slot = state
            .participants
            .get_mut(&participant.id())
            .ok_or(ParticipantRepositoryError::NotFound(participant.id()))?;
        if slot.version() != expected_version {
            return Err(ParticipantRepositoryError::VersionConflict {
                id: participant.id(),
                expected: expected_version,
                actual: slot.version(),
            });
        }
        *slot = participant.clone();
        Ok(())
    }

    async fn list(
        &self,
        filter: ParticipantFilter,
    ) -> ParticipantRepositoryResult<Vec<Participant>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut matching: Vec<Participant> = state
            .participants
            .values()
            .filter(|participant| filter.matches(participant))
            .cloned()
            .collect();
        matching.sort_by_key(Participant::created_at);
        Ok(matching)
    }
}
