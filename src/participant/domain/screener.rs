//! Write-once record of a submitted eligibility screener.

use super::{ParticipantId, ScreenerResponseId};
use crate::study::domain::{EligibilityVerdict, ScreenerAnswers, StudyId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A screener submission together with the verdict derived from it.
///
/// Responses are never edited; a participant who re-screens produces a new
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerResponse {
    id: ScreenerResponseId,
    participant_id: ParticipantId,
    study_id: StudyId,
    answers: ScreenerAnswers,
    verdict: EligibilityVerdict,
    completed_at: DateTime<Utc>,
}

impl ScreenerResponse {
    /// Records a submission and its verdict.
    #[must_use]
    pub fn record(
        participant_id: ParticipantId,
        study_id: StudyId,
        answers: ScreenerAnswers,
        verdict: EligibilityVerdict,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ScreenerResponseId::new(),
            participant_id,
            study_id,
            answers,
            verdict,
            completed_at: clock.utc(),
        }
    }

    /// Returns the response identifier.
    #[must_use]
    pub const fn id(&self) -> ScreenerResponseId {
        self.id
    }

    /// Returns the submitting participant.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Returns the study screened for.
    #[must_use]
    pub const fn study_id(&self) -> StudyId {
        self.study_id
    }

    /// Returns the submitted answers.
    #[must_use]
    pub const fn answers(&self) -> &ScreenerAnswers {
        &self.answers
    }

    /// Returns the full eligibility verdict.
    #[must_use]
    pub const fn verdict(&self) -> &EligibilityVerdict {
        &self.verdict
    }

    /// Returns `true` when the participant was eligible.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.verdict.is_eligible()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
