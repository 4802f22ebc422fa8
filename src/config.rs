//! Runtime policy configuration for the lifecycle core.
//!
//! Loading configuration from files or the environment is the host's job;
//! this module only defines the shape and the defaults.
//!
//! # Examples
//!
//! ```
//! use cohort::config::CohortConfig;
//! use cohort::safety::domain::AdverseEventStatusPolicy;
//!
//! let config = CohortConfig::default();
//! assert_eq!(config.default_window_days, 3);
//! assert_eq!(
//!     config.adverse_event_status_policy,
//!     AdverseEventStatusPolicy::Unrestricted
//! );
//!
//! let strict = CohortConfig::strict();
//! assert_eq!(
//!     strict.adverse_event_status_policy,
//!     AdverseEventStatusPolicy::Restricted
//! );
//! assert!(CohortConfig::lenient().max_transition_attempts > strict.max_transition_attempts);
//! ```

use crate::{safety::domain::AdverseEventStatusPolicy, schedule::domain::DuplicatePolicy};
use serde::{Deserialize, Serialize};

/// Policy knobs shared by the services and the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Completion window applied to task definitions that omit one.
    pub default_window_days: u32,
    /// How schedule generation treats definitions that already have an
    /// instance.
    pub duplicate_policy: DuplicatePolicy,
    /// Which adverse-event review status changes are accepted.
    pub adverse_event_status_policy: AdverseEventStatusPolicy,
    /// Compare-and-swap attempts for a participant status change before
    /// the conflict is surfaced as a storage error.
    pub max_transition_attempts: u32,
    /// Generate the task schedule as soon as a participant becomes
    /// enrolled.
    pub auto_generate_schedule_on_enrollment: bool,
    /// Request withdrawal of the participant when a life-threatening
    /// adverse event is reported.
    pub withdraw_on_life_threatening: bool,
    /// Upper bound on adverse events returned by a full listing.
    pub adverse_event_list_limit: usize,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            default_window_days: 3,
            duplicate_policy: DuplicatePolicy::Skip,
            adverse_event_status_policy: AdverseEventStatusPolicy::Unrestricted,
            max_transition_attempts: 3,
            auto_generate_schedule_on_enrollment: true,
            withdraw_on_life_threatening: false,
            adverse_event_list_limit: 200,
        }
    }
}

impl CohortConfig {
    /// Creates a configuration that rejects duplicates instead of skipping
    /// them and restricts adverse-event review changes.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Fail,
            adverse_event_status_policy: AdverseEventStatusPolicy::Restricted,
            max_transition_attempts: 1,
            ..Default::default()
        }
    }

    /// Creates a configuration that skips duplicates, accepts any review
    /// status change, and retries contended status changes longer.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Skip,
            adverse_event_status_policy: AdverseEventStatusPolicy::Unrestricted,
            max_transition_attempts: 5,
            ..Default::default()
        }
    }
}
