//! Identifier types for the study domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a study protocol.
    StudyId
);

uuid_identifier!(
    /// Unique identifier for a task definition within a study.
    TaskDefinitionId
);
