//! Schedule generation, completion, and listing.

use crate::{
    config::CohortConfig,
    error::ErrorKind,
    participant::{
        domain::{Participant, ParticipantId},
        ports::{ParticipantRepository, ParticipantRepositoryError},
    },
    schedule::{
        domain::{
            DuplicatePolicy, ScheduleDomainError, TaskInstance, TaskInstanceId,
            TaskInstanceStatus, plan_schedule,
        },
        ports::{TaskInstanceRepository, TaskInstanceRepositoryError},
    },
    study::{
        domain::{StudyId, TaskDefinitionId},
        ports::{StudyRepository, StudyRepositoryError},
    },
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Outcome of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSchedule {
    /// One instance per task definition, in protocol order.
    pub instances: Vec<TaskInstance>,
    /// Number of instances written by this request.
    pub created: usize,
}

/// Service-level errors for schedule operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The participant cannot be scheduled.
    #[error(transparent)]
    Domain(#[from] ScheduleDomainError),
    /// Instances already exist and the duplicate policy is `Fail`.
    #[error(
        "participant {participant_id} already has instances of {} task definitions",
        .definitions.len()
    )]
    AlreadyGenerated {
        /// Participant identifier.
        participant_id: ParticipantId,
        /// Every definition that already has an instance.
        definitions: Vec<TaskDefinitionId>,
    },
    /// No participant exists with the given identifier.
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    /// The participant's study no longer exists.
    #[error("study {0} not found")]
    StudyNotFound(StudyId),
    /// No task instance exists with the given identifier.
    #[error("task instance {0} not found")]
    NotFound(TaskInstanceId),
    /// Task instance repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskInstanceRepositoryError),
    /// Participant lookup failed.
    #[error(transparent)]
    Participants(#[from] ParticipantRepositoryError),
    /// Study lookup failed.
    #[error(transparent)]
    Studies(#[from] StudyRepositoryError),
}

impl ScheduleError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(ScheduleDomainError::NotEnrolled(_)) => ErrorKind::NotEnrolled,
            Self::Domain(ScheduleDomainError::WindowOutOfRange(_)) => ErrorKind::Validation,
            Self::AlreadyGenerated { .. } => ErrorKind::AlreadyGenerated,
            Self::ParticipantNotFound(_)
            | Self::StudyNotFound(_)
            | Self::NotFound(_)
            | Self::Repository(TaskInstanceRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Repository(_) | Self::Participants(_) | Self::Studies(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Task schedule orchestration service.
#[derive(Clone)]
pub struct ScheduleService<T, P, St, C>
where
    T: TaskInstanceRepository,
    P: ParticipantRepository,
    St: StudyRepository,
    C: Clock + Send + Sync,
{
    instances: Arc<T>,
    participants: Arc<P>,
    studies: Arc<St>,
    clock: Arc<C>,
    duplicate_policy: DuplicatePolicy,
}

impl<T, P, St, C> ScheduleService<T, P, St, C>
where
    T: TaskInstanceRepository,
    P: ParticipantRepository,
    St: StudyRepository,
    C: Clock + Send + Sync,
{
    /// Creates a schedule service using the default configuration.
    #[must_use]
    pub fn new(instances: Arc<T>, participants: Arc<P>, studies: Arc<St>, clock: Arc<C>) -> Self {
        Self::with_config(
            instances,
            participants,
            studies,
            clock,
            &CohortConfig::default(),
        )
    }

    /// Creates a schedule service honouring `config`.
    #[must_use]
    pub const fn with_config(
        instances: Arc<T>,
        participants: Arc<P>,
        studies: Arc<St>,
        clock: Arc<C>,
        config: &CohortConfig,
    ) -> Self {
        Self {
            instances,
            participants,
            studies,
            clock,
            duplicate_policy: config.duplicate_policy,
        }
    }

    /// Returns the duplicate policy applied by
    /// [`ScheduleService::generate_task_schedule`].
    #[must_use]
    pub const fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Generates the participant's schedule with the configured duplicate
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::ParticipantNotFound`],
    /// [`ScheduleError::Domain`] when the participant is not enrolled, or
    /// [`ScheduleError::AlreadyGenerated`] under [`DuplicatePolicy::Fail`].
    pub async fn generate_task_schedule(
        &self,
        participant_id: ParticipantId,
    ) -> ScheduleResult<GeneratedSchedule> {
        let participant = self
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(ScheduleError::ParticipantNotFound(participant_id))?;
        self.generate_for(&participant, self.duplicate_policy).await
    }

    /// Generates instances for an already loaded participant.
    ///
    /// Under [`DuplicatePolicy::Skip`] existing instances are returned in
    /// place of new ones. Under [`DuplicatePolicy::Fail`] any existing
    /// instance rejects the request before anything is written.
    ///
    /// # Errors
    ///
    /// See [`ScheduleService::generate_task_schedule`].
    pub async fn generate_for(
        &self,
        participant: &Participant,
        policy: DuplicatePolicy,
    ) -> ScheduleResult<GeneratedSchedule> {
        let participant_id = participant.id();
        let study_id = participant
            .study_id()
            .ok_or(ScheduleDomainError::NotEnrolled(participant_id))?;
        let study = self
            .studies
            .find_by_id(study_id)
            .await?
            .ok_or(ScheduleError::StudyNotFound(study_id))?;
        let planned = plan_schedule(participant, study.task_definitions(), &*self.clock)?;

        let mut existing = self.existing_by_definition(participant_id).await?;
        if policy == DuplicatePolicy::Fail {
            let definitions: Vec<TaskDefinitionId> = planned
                .iter()
                .map(TaskInstance::task_definition_id)
                .filter(|definition_id| existing.contains_key(definition_id))
                .collect();
            if !definitions.is_empty() {
                return Err(ScheduleError::AlreadyGenerated {
                    participant_id,
                    definitions,
                });
            }
        }

        let mut instances = Vec::with_capacity(planned.len());
        let mut created = 0;
        for instance in planned {
            let definition_id = instance.task_definition_id();
            if let Some(current) = existing.remove(&definition_id) {
                instances.push(current);
                continue;
            }
            match self.instances.store_unique(&instance).await {
                Ok(()) => {
                    created += 1;
                    instances.push(instance);
                }
                Err(TaskInstanceRepositoryError::DuplicateAssignment { .. })
                    if policy == DuplicatePolicy::Skip =>
                {
                    // Lost a race with a concurrent generation.
                    existing = self.existing_by_definition(participant_id).await?;
                    let current = existing
                        .remove(&definition_id)
                        .ok_or_else(|| {
                            ScheduleError::Repository(
                                TaskInstanceRepositoryError::DuplicateAssignment {
                                    participant_id,
                                    task_definition_id: definition_id,
                                },
                            )
                        })?;
                    instances.push(current);
                }
                Err(TaskInstanceRepositoryError::DuplicateAssignment { .. }) => {
                    return Err(ScheduleError::AlreadyGenerated {
                        participant_id,
                        definitions: vec![definition_id],
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        if created == 0 {
            debug!(%participant_id, %study_id, "task schedule already generated");
        } else {
            info!(
                %participant_id,
                %study_id,
                created,
                total = instances.len(),
                "generated task schedule"
            );
        }
        Ok(GeneratedSchedule { instances, created })
    }

    /// Marks a task instance completed. Completing it again is a no-op.
    ///
    /// The write only lands while the stored instance is still pending, so
    /// concurrent completions keep the first completion date and every
    /// caller receives the stored instance.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] for an unknown instance or
    /// repository errors.
    pub async fn complete_task_instance(
        &self,
        instance_id: TaskInstanceId,
    ) -> ScheduleResult<TaskInstance> {
        let mut instance = self.require(instance_id).await?;
        if !instance.complete(&*self.clock) {
            debug!(task_instance_id = %instance_id, "task instance already completed");
            return Ok(instance);
        }
        match self
            .instances
            .update_if_status(&instance, TaskInstanceStatus::Pending)
            .await
        {
            Ok(()) => {
                info!(
                    task_instance_id = %instance_id,
                    participant_id = %instance.participant_id(),
                    "completed task instance"
                );
                Ok(instance)
            }
            Err(TaskInstanceRepositoryError::StatusConflict { .. }) => {
                debug!(
                    task_instance_id = %instance_id,
                    "task instance completed by a concurrent request"
                );
                self.require(instance_id).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Finds a task instance by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Repository`] when lookup fails.
    pub async fn find_by_id(
        &self,
        instance_id: TaskInstanceId,
    ) -> ScheduleResult<Option<TaskInstance>> {
        Ok(self.instances.find_by_id(instance_id).await?)
    }

    /// Lists a participant's instances by due date, optionally only those
    /// in `status`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Repository`] when lookup fails.
    pub async fn list_for_participant(
        &self,
        participant_id: ParticipantId,
        status: Option<TaskInstanceStatus>,
    ) -> ScheduleResult<Vec<TaskInstance>> {
        let mut instances: Vec<TaskInstance> = self
            .instances
            .find_by_participant(participant_id)
            .await?
            .into_iter()
            .filter(|instance| status.is_none_or(|wanted| instance.status() == wanted))
            .collect();
        instances.sort_by_key(|instance| (instance.due_date(), instance.available_date()));
        Ok(instances)
    }

    async fn require(&self, instance_id: TaskInstanceId) -> ScheduleResult<TaskInstance> {
        self.instances
            .find_by_id(instance_id)
            .await?
            .ok_or(ScheduleError::NotFound(instance_id))
    }

    async fn existing_by_definition(
        &self,
        participant_id: ParticipantId,
    ) -> ScheduleResult<HashMap<TaskDefinitionId, TaskInstance>> {
        Ok(self
            .instances
            .find_by_participant(participant_id)
            .await?
            .into_iter()
            .map(|instance| (instance.task_definition_id(), instance))
            .collect())
    }
}
