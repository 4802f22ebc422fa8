//! Participant lifecycle management for Cohort.
//!
//! A participant advances through a fixed lifecycle graph, from prospective
//! lead to completion or withdrawal. Status changes are validated against
//! the graph's edges and persisted with compare-and-swap so concurrent
//! requests cannot both succeed from a stale status. Screener submission
//! feeds an eligibility verdict through the same validation.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
