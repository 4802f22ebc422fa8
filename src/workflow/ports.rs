//! Collaborator bundle injected into the workflow.

use crate::{
    participant::adapters::memory::{
        InMemoryParticipantRepository, InMemoryScreenerResponseRepository,
    },
    safety::adapters::memory::InMemoryAdverseEventRepository,
    schedule::adapters::memory::InMemoryTaskInstanceRepository,
    study::adapters::memory::InMemoryStudyRepository,
};
use std::sync::Arc;

/// Parameter object holding every port the workflow depends on.
#[derive(Debug)]
pub struct WorkflowPorts<P, S, St, T, A, N> {
    /// Participant repository.
    pub participants: Arc<P>,
    /// Screener response repository.
    pub screeners: Arc<S>,
    /// Study repository.
    pub studies: Arc<St>,
    /// Task instance repository.
    pub task_instances: Arc<T>,
    /// Adverse event repository.
    pub adverse_events: Arc<A>,
    /// Escalation notifier.
    pub notifier: Arc<N>,
}

impl<P, S, St, T, A, N> Clone for WorkflowPorts<P, S, St, T, A, N> {
    fn clone(&self) -> Self {
        Self {
            participants: Arc::clone(&self.participants),
            screeners: Arc::clone(&self.screeners),
            studies: Arc::clone(&self.studies),
            task_instances: Arc::clone(&self.task_instances),
            adverse_events: Arc::clone(&self.adverse_events),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

/// Ports backed entirely by the in-memory adapters.
pub type InMemoryWorkflowPorts<N> = WorkflowPorts<
    InMemoryParticipantRepository,
    InMemoryScreenerResponseRepository,
    InMemoryStudyRepository,
    InMemoryTaskInstanceRepository,
    InMemoryAdverseEventRepository,
    N,
>;

impl<N> InMemoryWorkflowPorts<N> {
    /// Creates empty in-memory repositories around `notifier`.
    #[must_use]
    pub fn in_memory(notifier: Arc<N>) -> Self {
        Self {
            participants: Arc::new(InMemoryParticipantRepository::new()),
            screeners: Arc::new(InMemoryScreenerResponseRepository::new()),
            studies: Arc::new(InMemoryStudyRepository::new()),
            task_instances: Arc::new(InMemoryTaskInstanceRepository::new()),
            adverse_events: Arc::new(InMemoryAdverseEventRepository::new()),
            notifier,
        }
    }
}
