//! Notification port for escalated adverse events.

use crate::{
    participant::domain::ParticipantId,
    safety::domain::{AdverseEventId, AdverseEventSeverity},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Payload announced when an adverse event is escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationEvent {
    /// Escalated event.
    pub adverse_event_id: AdverseEventId,
    /// Affected participant.
    pub participant_id: ParticipantId,
    /// Reported severity.
    pub severity: AdverseEventSeverity,
}

/// Delivery contract for escalation announcements.
///
/// Callers treat delivery as best effort: an error is logged by the caller
/// and never fails the report that triggered it. The report awaits the
/// announcement inline once the event is stored, so implementations must
/// bound their own delivery time. A transport that cannot answer within
/// its deadline returns [`NotifierError::Transport`] with a timeout error
/// instead of waiting.
#[async_trait]
pub trait EscalationNotifier: Send + Sync {
    /// Announces an escalation.
    ///
    /// Must complete within the implementation's delivery timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when delivery fails or times out.
    async fn notify(&self, event: EscalationEvent) -> Result<(), NotifierError>;
}

/// Errors returned by escalation notifiers.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The delivery channel rejected or dropped the announcement.
    #[error("escalation delivery failed: {0}")]
    Delivery(String),

    /// Transport-layer failure.
    #[error("notifier transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
