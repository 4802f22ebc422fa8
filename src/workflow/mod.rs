//! Authenticated entry points composing the lifecycle contexts.
//!
//! [`TrialWorkflow`] is what a transport layer calls. Each entry point
//! takes the verified [`crate::caller::Caller`], checks the caller's role
//! against the operation, and delegates to the context services. It also
//! wires the cross-context reactions: entering `ENROLLED` generates the
//! task schedule, and a life-threatening report may withdraw the
//! participant.

mod error;
mod ports;
mod trial;

pub use error::{WorkflowError, WorkflowResult};
pub use ports::{InMemoryWorkflowPorts, WorkflowPorts};
pub use trial::{AdverseEventOutcome, InMemoryTrialWorkflow, TrialWorkflow, WorkflowTransition};
