//! Cohort: clinical-trial participant lifecycle and scheduling core.
//!
//! This crate holds the decision logic of a participant-management backend:
//! how a participant's enrollment status advances, how eligibility is
//! computed from screener answers, how per-study task instances are derived
//! from the enrollment date, and how adverse-event severity drives triage
//! and escalation.
//!
//! # Architecture
//!
//! Cohort follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and notification
//! - **Adapters**: Concrete implementations of ports (in-memory, logging)
//! - **Services**: Orchestration over injected ports and clocks
//!
//! # Modules
//!
//! - [`study`]: Study protocols, task definitions, and eligibility rules
//! - [`participant`]: Participant status lifecycle and screener submission
//! - [`schedule`]: Task instance generation and completion
//! - [`safety`]: Adverse event triage and review status
//! - [`workflow`]: Authenticated entry points composing the contexts above

pub mod caller;
pub mod config;
pub mod error;
mod ids;
pub mod participant;
pub mod safety;
pub mod schedule;
pub mod study;
pub mod workflow;

#[cfg(test)]
mod test_clock;
