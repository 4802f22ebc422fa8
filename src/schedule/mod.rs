//! Task schedule generation and completion for Cohort.
//!
//! When a participant is enrolled, every task definition of their study is
//! materialised as a [`domain::TaskInstance`] whose window is derived from
//! the enrollment timestamp. Generation is idempotent: the repository
//! enforces one instance per participant and definition, so repeated or
//! racing calls never persist duplicates.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
