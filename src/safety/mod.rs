//! Adverse event triage and safety review for Cohort.
//!
//! A reported adverse event is triaged by severity: every event starts
//! under review, and only life-threatening events are escalated. The
//! escalation flag is fixed at report time. Escalations are announced to a
//! notification collaborator whose failures are logged and never surface
//! to the reporter.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
