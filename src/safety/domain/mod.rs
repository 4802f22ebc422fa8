//! Domain model for adverse events.

mod adverse_event;
mod error;
mod ids;
mod triage;

pub use adverse_event::{AdverseEvent, AdverseEventReport, PersistedAdverseEventData};
pub use error::{ParseAdverseEventStatusError, ParseSeverityError, SafetyDomainError};
pub use ids::AdverseEventId;
pub use triage::{
    AdverseEventSeverity, AdverseEventStatus, AdverseEventStatusPolicy, Triage, triage,
};
