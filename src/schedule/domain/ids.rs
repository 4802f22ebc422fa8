//! Identifier types for the schedule domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a generated task instance.
    TaskInstanceId
);
