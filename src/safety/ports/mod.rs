//! Port contracts for adverse event persistence and escalation delivery.

pub mod notifier;
pub mod repository;

pub use notifier::{EscalationEvent, EscalationNotifier, NotifierError};
pub use repository::{
    AdverseEventRepository, AdverseEventRepositoryError, AdverseEventRepositoryResult,
};
