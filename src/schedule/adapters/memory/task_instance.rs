//! In-memory task instance repository with a uniqueness index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{
    participant::domain::ParticipantId,
    schedule::{
        domain::{TaskInstance, TaskInstanceId, TaskInstanceStatus},
        ports::{TaskInstanceRepository, TaskInstanceRepositoryError, TaskInstanceRepositoryResult},
    },
    study::domain::TaskDefinitionId,
};

#[derive(Debug, Default)]
struct InMemoryState {
    instances: HashMap<TaskInstanceId, TaskInstance>,
    assignment_index: HashMap<(ParticipantId, TaskDefinitionId), TaskInstanceId>,
}

/// Thread-safe in-memory task instance repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskInstanceRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryTaskInstanceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskInstanceRepositoryError {
    TaskInstanceRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskInstanceRepository for InMemoryTaskInstanceRepository {
    async fn store_unique(&self, instance: &TaskInstance) -> TaskInstanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = (instance.participant_id(), instance.task_definition_id());
        if state.assignment_index.contains_key(&key) {
            return Err(TaskInstanceRepositoryError::DuplicateAssignment {
                participant_id: key.0,
                task_definition_id: key.1,
            });
        }
        if state.instances.contains_key(&instance.id()) {
            return Err(TaskInstanceRepositoryError::DuplicateInstance(instance.id()));
        }
        state.assignment_index.insert(key, instance.id());
        state.instances.insert(instance.id(), instance.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        instance: &TaskInstance,
        expected: TaskInstanceStatus,
    ) -> TaskInstanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let slot = state
            .instances
            .get_mut(&instance.id())
            .ok_or(TaskInstanceRepositoryError::NotFound(instance.id()))?;
        if slot.status() != expected {
            return Err(TaskInstanceRepositoryError::StatusConflict {
                id: instance.id(),
                expected,
                actual: slot.status(),
            });
        }
        *slot = instance.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: TaskInstanceId,
    ) -> TaskInstanceRepositoryResult<Option<TaskInstance>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.instances.get(&id).cloned())
    }

    async fn find_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> TaskInstanceRepositoryResult<Vec<TaskInstance>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .instances
            .values()
            .filter(|instance| instance.participant_id() == participant_id)
            .cloned()
            .collect())
    }
}
