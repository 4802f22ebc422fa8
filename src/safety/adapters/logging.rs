//! Escalation notifier that records escalations as structured log events.

use async_trait::async_trait;
use tracing::warn;

use crate::safety::ports::{EscalationEvent, EscalationNotifier, NotifierError};

/// Notifier that emits a `WARN` event per escalation.
///
/// Hosts without a paging or messaging channel can use it so escalations
/// still reach the log pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEscalationNotifier;

impl TracingEscalationNotifier {
    /// Creates the notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EscalationNotifier for TracingEscalationNotifier {
    async fn notify(&self, event: EscalationEvent) -> Result<(), NotifierError> {
        warn!(
            adverse_event_id = %event.adverse_event_id,
            participant_id = %event.participant_id,
            severity = %event.severity,
            "adverse event escalated"
        );
        Ok(())
    }
}
