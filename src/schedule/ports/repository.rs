//! Repository port for task instances.

use crate::{
    participant::domain::ParticipantId,
    schedule::domain::{TaskInstance, TaskInstanceId, TaskInstanceStatus},
    study::domain::TaskDefinitionId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task instance repository operations.
pub type TaskInstanceRepositoryResult<T> = Result<T, TaskInstanceRepositoryError>;

/// Task instance persistence contract.
#[async_trait]
pub trait TaskInstanceRepository: Send + Sync {
    /// Stores a new instance, enforcing at most one instance per
    /// participant and task definition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskInstanceRepositoryError::DuplicateAssignment`] when the
    /// pair already has an instance, or
    /// [`TaskInstanceRepositoryError::DuplicateInstance`] when the identifier
    /// exists.
    async fn store_unique(&self, instance: &TaskInstance) -> TaskInstanceRepositoryResult<()>;

    /// Persists changes to an existing instance only while the stored copy
    /// still has status `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskInstanceRepositoryError::NotFound`] when the instance
    /// does not exist, or [`TaskInstanceRepositoryError::StatusConflict`]
    /// when another writer changed its status first.
    async fn update_if_status(
        &self,
        instance: &TaskInstance,
        expected: TaskInstanceStatus,
    ) -> TaskInstanceRepositoryResult<()>;

    /// Finds an instance by identifier.
    async fn find_by_id(&self, id: TaskInstanceId)
    -> TaskInstanceRepositoryResult<Option<TaskInstance>>;

    /// Returns every instance of a participant, in no particular order.
    async fn find_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> TaskInstanceRepositoryResult<Vec<TaskInstance>>;
}

/// Errors returned by task instance repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskInstanceRepositoryError {
    /// An instance with the same identifier already exists.
    #[error("duplicate task instance identifier: {0}")]
    DuplicateInstance(TaskInstanceId),

    /// The participant already has an instance of the definition.
    #[error("participant {participant_id} already has an instance of task {task_definition_id}")]
    DuplicateAssignment {
        /// Participant identifier.
        participant_id: ParticipantId,
        /// Task definition identifier.
        task_definition_id: TaskDefinitionId,
    },

    /// The instance was not found.
    #[error("task instance not found: {0}")]
    NotFound(TaskInstanceId),

    /// The stored status no longer matches the expected one.
    #[error("task instance {id} is {actual}, expected {expected}")]
    StatusConflict {
        /// Instance identifier.
        id: TaskInstanceId,
        /// Status the writer read.
        expected: TaskInstanceStatus,
        /// Status currently stored.
        actual: TaskInstanceStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskInstanceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
