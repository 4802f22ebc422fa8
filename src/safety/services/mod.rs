//! Application services for adverse event reporting and review.

mod review;

pub use review::{ReportAdverseEventRequest, SafetyError, SafetyResult, SafetyService};
