//! Role-checked entry points and cross-context reactions.

use super::{InMemoryWorkflowPorts, WorkflowError, WorkflowPorts, WorkflowResult};
use crate::{
    caller::{Caller, CallerRole},
    config::CohortConfig,
    participant::{
        adapters::memory::{InMemoryParticipantRepository, InMemoryScreenerResponseRepository},
        domain::{
            Participant, ParticipantId, ParticipantProfile, ParticipantStatus, TransitionCause,
        },
        ports::{ParticipantRepository, ScreenerResponseRepository},
        services::{
            EnrollmentService, RegisterParticipantRequest, ScreenerOutcome, StatusTransition,
            SubmitScreenerRequest, TransitionParticipantRequest,
        },
    },
    safety::{
        adapters::memory::InMemoryAdverseEventRepository,
        domain::{AdverseEvent, AdverseEventId, AdverseEventSeverity},
        ports::{AdverseEventRepository, EscalationNotifier},
        services::{ReportAdverseEventRequest, SafetyService},
    },
    schedule::{
        adapters::memory::InMemoryTaskInstanceRepository,
        domain::{TaskInstance, TaskInstanceId, TaskInstanceStatus},
        ports::TaskInstanceRepository,
        services::{GeneratedSchedule, ScheduleService},
    },
    study::{
        adapters::memory::InMemoryStudyRepository, ports::StudyRepository,
        services::StudyCatalogService,
    },
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of an administrative status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTransition {
    /// The applied status change.
    pub transition: StatusTransition,
    /// Schedule generated because the change entered `ENROLLED`.
    pub schedule: Option<GeneratedSchedule>,
}

/// Result of an adverse event report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdverseEventOutcome {
    /// The triaged event.
    pub event: AdverseEvent,
    /// Withdrawal requested because the event was life-threatening.
    pub withdrawal: Option<StatusTransition>,
}

/// Workflow wired to the in-memory adapters.
pub type InMemoryTrialWorkflow<N, C> = TrialWorkflow<
    InMemoryParticipantRepository,
    InMemoryScreenerResponseRepository,
    InMemoryStudyRepository,
    InMemoryTaskInstanceRepository,
    InMemoryAdverseEventRepository,
    N,
    C,
>;

/// Authenticated entry points for the participant lifecycle.
#[derive(Clone)]
pub struct TrialWorkflow<P, S, St, T, A, N, C>
where
    P: ParticipantRepository,
    S: ScreenerResponseRepository,
    St: StudyRepository,
    T: TaskInstanceRepository,
    A: AdverseEventRepository,
    N: EscalationNotifier,
    C: Clock + Send + Sync,
{
    catalog: StudyCatalogService<St, C>,
    enrollment: EnrollmentService<P, S, St, C>,
    schedule: ScheduleService<T, P, St, C>,
    safety: SafetyService<A, N, C>,
    config: CohortConfig,
}

impl<N, C> InMemoryTrialWorkflow<N, C>
where
    N: EscalationNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a workflow over fresh in-memory repositories.
    #[must_use]
    pub fn in_memory(notifier: Arc<N>, clock: Arc<C>, config: CohortConfig) -> Self {
        Self::new(InMemoryWorkflowPorts::in_memory(notifier), clock, config)
    }
}

impl<P, S, St, T, A, N, C> TrialWorkflow<P, S, St, T, A, N, C>
where
    P: ParticipantRepository,
    S: ScreenerResponseRepository,
    St: StudyRepository,
    T: TaskInstanceRepository,
    A: AdverseEventRepository,
    N: EscalationNotifier,
    C: Clock + Send + Sync,
{
    /// Wires the context services over `ports`.
    #[must_use]
    pub fn new(
        ports: WorkflowPorts<P, S, St, T, A, N>,
        clock: Arc<C>,
        config: CohortConfig,
    ) -> Self {
        let WorkflowPorts {
            participants,
            screeners,
            studies,
            task_instances,
            adverse_events,
            notifier,
        } = ports;
        Self {
            catalog: StudyCatalogService::with_config(
                Arc::clone(&studies),
                Arc::clone(&clock),
                &config,
            ),
            enrollment: EnrollmentService::with_config(
                Arc::clone(&participants),
                screeners,
                Arc::clone(&studies),
                Arc::clone(&clock),
                &config,
            ),
            schedule: ScheduleService::with_config(
                task_instances,
                participants,
                studies,
                Arc::clone(&clock),
                &config,
            ),
            safety: SafetyService::with_config(adverse_events, notifier, clock, &config),
            config,
        }
    }

    /// Returns the study catalog service.
    #[must_use]
    pub const fn catalog(&self) -> &StudyCatalogService<St, C> {
        &self.catalog
    }

    /// Returns the enrollment service.
    #[must_use]
    pub const fn enrollment(&self) -> &EnrollmentService<P, S, St, C> {
        &self.enrollment
    }

    /// Returns the schedule service.
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleService<T, P, St, C> {
        &self.schedule
    }

    /// Returns the safety service.
    #[must_use]
    pub const fn safety(&self) -> &SafetyService<A, N, C> {
        &self.safety
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &CohortConfig {
        &self.config
    }

    /// Registers the calling user as a prospective participant.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] unless the caller holds the
    /// `PARTICIPANT` role, or enrollment errors.
    pub async fn register_participant(
        &self,
        caller: &Caller,
        profile: ParticipantProfile,
    ) -> WorkflowResult<Participant> {
        if caller.role() != CallerRole::Participant {
            return Err(forbidden(caller, "register as a participant"));
        }
        let request = RegisterParticipantRequest::new(caller.user_id()).with_profile(profile);
        Ok(self.enrollment.register_participant(request).await?)
    }

    /// Evaluates a screener and applies the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when a non-staff caller submits
    /// for someone else's record, or enrollment errors.
    pub async fn submit_screener(
        &self,
        caller: &Caller,
        request: SubmitScreenerRequest,
    ) -> WorkflowResult<ScreenerOutcome> {
        self.require_staff_or_owner(caller, request.participant_id(), "submit a screener")
            .await?;
        Ok(self.enrollment.submit_screener(request).await?)
    }

    /// Applies an administrative status change.
    ///
    /// When the change enters `ENROLLED` and schedule generation on
    /// enrollment is enabled, the task schedule is generated in the same
    /// call. A generation failure is logged; the status change stands and
    /// the schedule can be generated again explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] for non-staff callers, or
    /// enrollment errors.
    pub async fn transition_participant_status(
        &self,
        caller: &Caller,
        request: TransitionParticipantRequest,
    ) -> WorkflowResult<WorkflowTransition> {
        require_staff(caller, "change participant status")?;
        let transition = self
            .enrollment
            .transition_participant_status(request)
            .await?;

        let schedule = if transition.change.entered(ParticipantStatus::Enrolled)
            && self.config.auto_generate_schedule_on_enrollment
        {
            self.generate_on_enrollment(&transition.participant).await
        } else {
            None
        };
        Ok(WorkflowTransition {
            transition,
            schedule,
        })
    }

    /// Generates a participant's task schedule.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] for non-staff callers, or
    /// schedule errors.
    pub async fn generate_task_schedule(
        &self,
        caller: &Caller,
        participant_id: ParticipantId,
    ) -> WorkflowResult<GeneratedSchedule> {
        require_staff(caller, "generate task schedules")?;
        Ok(self.schedule.generate_task_schedule(participant_id).await?)
    }

    /// Marks a task instance completed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskInstanceNotFound`], or
    /// [`WorkflowError::Forbidden`] when a non-staff caller completes
    /// someone else's task.
    pub async fn complete_task_instance(
        &self,
        caller: &Caller,
        instance_id: TaskInstanceId,
    ) -> WorkflowResult<TaskInstance> {
        let instance = self
            .schedule
            .find_by_id(instance_id)
            .await?
            .ok_or(WorkflowError::TaskInstanceNotFound(instance_id))?;
        self.require_staff_or_owner(caller, instance.participant_id(), "complete a task")
            .await?;
        Ok(self.schedule.complete_task_instance(instance_id).await?)
    }

    /// Lists a participant's task instances by due date.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when a non-staff caller reads
    /// someone else's schedule, or schedule errors.
    pub async fn list_task_instances(
        &self,
        caller: &Caller,
        participant_id: ParticipantId,
        status: Option<TaskInstanceStatus>,
    ) -> WorkflowResult<Vec<TaskInstance>> {
        self.require_staff_or_owner(caller, participant_id, "list tasks")
            .await?;
        Ok(self
            .schedule
            .list_for_participant(participant_id, status)
            .await?)
    }

    /// Reports an adverse event.
    ///
    /// With withdrawal on life-threatening events enabled, an escalated
    /// report also requests `WITHDRAWN` for the participant. A rejected
    /// withdrawal is logged and leaves the report in place.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when a non-staff caller reports
    /// for someone else, [`WorkflowError::ParticipantNotFound`], or safety
    /// errors.
    pub async fn report_adverse_event(
        &self,
        caller: &Caller,
        request: ReportAdverseEventRequest,
    ) -> WorkflowResult<AdverseEventOutcome> {
        let participant_id = request.participant_id();
        self.require_staff_or_owner(caller, participant_id, "report an adverse event")
            .await?;
        if caller.is_staff() {
            self.require_participant(participant_id).await?;
        }
        let event = self.safety.report_adverse_event(request).await?;

        let withdrawal = if event.severity() == AdverseEventSeverity::LifeThreatening
            && self.config.withdraw_on_life_threatening
        {
            self.withdraw_after(&event).await
        } else {
            None
        };
        Ok(AdverseEventOutcome { event, withdrawal })
    }

    /// Moves an adverse event to a new review status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] for non-staff callers, or
    /// safety errors.
    pub async fn update_adverse_event_status(
        &self,
        caller: &Caller,
        event_id: AdverseEventId,
        status: &str,
    ) -> WorkflowResult<AdverseEvent> {
        require_staff(caller, "update adverse event status")?;
        Ok(self
            .safety
            .update_adverse_event_status(event_id, status)
            .await?)
    }

    /// Lists a participant's adverse events, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when a non-staff caller reads
    /// someone else's events, or safety errors.
    pub async fn list_adverse_events(
        &self,
        caller: &Caller,
        participant_id: ParticipantId,
    ) -> WorkflowResult<Vec<AdverseEvent>> {
        self.require_staff_or_owner(caller, participant_id, "list adverse events")
            .await?;
        Ok(self.safety.list_for_participant(participant_id).await?)
    }

    async fn generate_on_enrollment(
        &self,
        participant: &Participant,
    ) -> Option<GeneratedSchedule> {
        match self
            .schedule
            .generate_for(participant, self.schedule.duplicate_policy())
            .await
        {
            Ok(generated) => Some(generated),
            Err(err) => {
                warn!(
                    participant_id = %participant.id(),
                    error = %err,
                    kind = %err.kind(),
                    "schedule generation on enrollment failed"
                );
                None
            }
        }
    }

    async fn withdraw_after(&self, event: &AdverseEvent) -> Option<StatusTransition> {
        let participant_id = event.participant_id();
        match self
            .enrollment
            .request_status(
                participant_id,
                ParticipantStatus::Withdrawn,
                TransitionCause::Administrative,
            )
            .await
        {
            Ok(transition) => {
                info!(
                    %participant_id,
                    adverse_event_id = %event.id(),
                    "withdrew participant after life-threatening adverse event"
                );
                Some(transition)
            }
            Err(err) => {
                warn!(
                    %participant_id,
                    adverse_event_id = %event.id(),
                    error = %err,
                    "withdrawal after life-threatening adverse event was rejected"
                );
                None
            }
        }
    }

    async fn require_participant(
        &self,
        participant_id: ParticipantId,
    ) -> WorkflowResult<Participant> {
        self.enrollment
            .find_by_id(participant_id)
            .await?
            .ok_or(WorkflowError::ParticipantNotFound(participant_id))
    }

    /// Staff may act on any record; participants only on their own.
    async fn require_staff_or_owner(
        &self,
        caller: &Caller,
        participant_id: ParticipantId,
        operation: &'static str,
    ) -> WorkflowResult<()> {
        if caller.is_staff() {
            return Ok(());
        }
        if caller.role() != CallerRole::Participant {
            return Err(forbidden(caller, operation));
        }
        let participant = self.require_participant(participant_id).await?;
        if participant.user_id() == caller.user_id() {
            Ok(())
        } else {
            Err(forbidden(caller, operation))
        }
    }
}

fn require_staff(caller: &Caller, operation: &'static str) -> WorkflowResult<()> {
    if caller.is_staff() {
        Ok(())
    } else {
        Err(forbidden(caller, operation))
    }
}

fn forbidden(caller: &Caller, operation: &'static str) -> WorkflowError {
    warn!(
        user_id = %caller.user_id(),
        role = %caller.role(),
        operation,
        "caller not permitted"
    );
    WorkflowError::Forbidden {
        role: caller.role(),
        operation,
    }
}
