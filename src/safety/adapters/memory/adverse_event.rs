//! In-memory adverse event repository.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{
    participant::domain::ParticipantId,
    safety::{
        domain::{AdverseEvent, AdverseEventId, AdverseEventStatus},
        ports::{AdverseEventRepository, AdverseEventRepositoryError, AdverseEventRepositoryResult},
    },
};

/// Thread-safe in-memory adverse event repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdverseEventRepository {
    events: Arc<RwLock<HashMap<AdverseEventId, AdverseEvent>>>,
}

impl InMemoryAdverseEventRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> AdverseEventRepositoryError {
    AdverseEventRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn newest_first(events: &mut [AdverseEvent]) {
    events.sort_by_key(|event| Reverse(event.reported_at()));
}

#[async_trait]
impl AdverseEventRepository for InMemoryAdverseEventRepository {
    async fn store(&self, event: &AdverseEvent) -> AdverseEventRepositoryResult<()> {
        let mut events = self.events.write().map_err(lock_error)?;
        if events.contains_key(&event.id()) {
            return Err(AdverseEventRepositoryError::DuplicateEvent(event.id()));
        }
        events.insert(event.id(), event.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        event: &AdverseEvent,
        expected: AdverseEventStatus,
    ) -> AdverseEventRepositoryResult<()> {
        let mut events = self.events.write().map_err(lock_error)?;
        let slot = events
            .get_mut(&event.id())
            .ok_or(AdverseEventRepositoryError::NotFound(event.id()))?;
        if slot.status() != expected {
            return Err(AdverseEventRepositoryError::StatusConflict {
                id: event.id(),
                expected,
                actual: slot.status(),
            });
        }
        *slot = event.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: AdverseEventId,
    ) -> AdverseEventRepositoryResult<Option<AdverseEvent>> {
        let events = self.events.read().map_err(lock_error)?;
        Ok(events.get(&id).cloned())
    }

    async fn list_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> AdverseEventRepositoryResult<Vec<AdverseEvent>> {
        let events = self.events.read().map_err(lock_error)?;
        let mut matching: Vec<AdverseEvent> = events
            .values()
            .filter(|event| event.participant_id() == participant_id)
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    async fn list_recent(&self, limit: usize) -> AdverseEventRepositoryResult<Vec<AdverseEvent>> {
        let events = self.events.read().map_err(lock_error)?;
        let mut all: Vec<AdverseEvent> = events.values().cloned().collect();
        newest_first(&mut all);
        all.truncate(limit);
        Ok(all)
    }
}
