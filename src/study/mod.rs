//! Study protocols for Cohort.
//!
//! A study carries the metadata shown to prospective participants, the
//! eligibility rule set its screener is evaluated against, and the ordered
//! task definitions from which participant schedules are derived. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
