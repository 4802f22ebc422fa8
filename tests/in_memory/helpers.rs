//! Shared fixtures for in-memory workflow integration tests.

use std::sync::Arc;

use crate::test_helpers::{TestClock, TestWorkflow, caller, workflow_with};
use chrono::{DateTime, NaiveDate, Utc};
use cohort::{
    caller::{Caller, CallerRole},
    config::CohortConfig,
    participant::{
        domain::{Participant, ParticipantProfile, ParticipantStatus},
        services::{SubmitScreenerRequest, TransitionParticipantRequest},
    },
    schedule::services::GeneratedSchedule,
    study::{
        domain::{ScreenerAnswers, ScreenerValue, Study, StudyStatus},
        services::{AddTaskDefinitionRequest, RegisterStudyRequest},
    },
};
use eyre::WrapErr;
use rstest::fixture;

/// A workflow together with the clock driving it and a coordinator.
pub struct Trial {
    pub clock: Arc<TestClock>,
    pub workflow: TestWorkflow,
    pub coordinator: Caller,
}

impl Trial {
    /// Builds a trial whose clock starts at midnight on 1 January 2024.
    ///
    /// # Errors
    ///
    /// Returns an error if the start instant cannot be built.
    pub fn with_config(config: CohortConfig) -> Result<Self, eyre::Report> {
        let clock = Arc::new(TestClock::at(at_midnight(2024, 1, 1)?));
        Ok(Self {
            workflow: workflow_with(Arc::clone(&clock), config),
            clock,
            coordinator: caller(CallerRole::Coordinator),
        })
    }

    /// Registers a recruiting study with task definitions at the given
    /// `(day offset, window)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if registration or protocol setup fails.
    pub async fn recruiting_study(&self, tasks: &[(u32, u32)]) -> Result<Study, eyre::Report> {
        let catalog = self.workflow.catalog();
        let study = catalog
            .register_study(RegisterStudyRequest::new(
                "Vitamin D and sleep",
                "Twelve week supplement study",
            ))
            .await
            .wrap_err("register study")?;
        for &(offset, window) in tasks {
            catalog
                .add_task_definition(
                    AddTaskDefinitionRequest::new(study.id(), format!("Day {offset}"), offset)
                        .with_window_days(window),
                )
                .await
                .wrap_err("add task definition")?;
        }
        catalog
            .update_status(study.id(), StudyStatus::Recruiting.as_str())
            .await
            .wrap_err("open study")
    }

    /// Registers a new participant and returns them with their caller
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn register(&self) -> Result<(Caller, Participant), eyre::Report> {
        let owner = caller(CallerRole::Participant);
        let participant = self
            .workflow
            .register_participant(&owner, ParticipantProfile::default())
            .await
            .wrap_err("register participant")?;
        Ok((owner, participant))
    }

    /// Screens `participant` for `study` with eligible answers.
    ///
    /// # Errors
    ///
    /// Returns an error if screening fails.
    pub async fn screen(
        &self,
        owner: &Caller,
        participant: &Participant,
        study: &Study,
    ) -> Result<Participant, eyre::Report> {
        let outcome = self
            .workflow
            .submit_screener(
                owner,
                SubmitScreenerRequest::new(participant.id(), study.id(), eligible_answers()),
            )
            .await
            .wrap_err("submit screener")?;
        Ok(outcome.participant)
    }

    /// Moves a participant through `statuses` as the coordinator and
    /// returns the final record with the last generated schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if any transition is rejected.
    pub async fn advance(
        &self,
        participant: &Participant,
        statuses: &[ParticipantStatus],
    ) -> Result<(Participant, Option<GeneratedSchedule>), eyre::Report> {
        let mut current = participant.clone();
        let mut schedule = None;
        for status in statuses {
            let moved = self
                .workflow
                .transition_participant_status(
                    &self.coordinator,
                    TransitionParticipantRequest::new(current.id(), status.as_str()),
                )
                .await
                .wrap_err_with(|| format!("transition to {status}"))?;
            current = moved.transition.participant;
            schedule = moved.schedule.or(schedule);
        }
        Ok((current, schedule))
    }

    /// Registers, screens, consents, and enrolls a participant.
    ///
    /// # Errors
    ///
    /// Returns an error if any lifecycle step fails.
    pub async fn enroll(
        &self,
        study: &Study,
    ) -> Result<(Caller, Participant, Option<GeneratedSchedule>), eyre::Report> {
        let (owner, participant) = self.register().await?;
        let screened = self.screen(&owner, &participant, study).await?;
        let (enrolled, schedule) = self
            .advance(
                &screened,
                &[ParticipantStatus::Consented, ParticipantStatus::Enrolled],
            )
            .await?;
        Ok((owner, enrolled, schedule))
    }
}

/// Answers that satisfy the baseline rule set.
pub fn eligible_answers() -> ScreenerAnswers {
    ScreenerAnswers::baseline()
        .with_answer("age", ScreenerValue::Integer(34))
        .with_answer("smoker", ScreenerValue::Text("no".to_owned()))
}

/// Returns midnight UTC on the given calendar day.
///
/// # Errors
///
/// Returns an error for an invalid date.
pub fn at_midnight(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>, eyre::Report> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| eyre::eyre!("invalid date {year}-{month}-{day}"))
}

/// Provides a trial with the default configuration.
///
/// # Errors
///
/// Returns an error if the trial cannot be built.
#[fixture]
pub fn trial() -> Result<Trial, eyre::Report> {
    Trial::with_config(CohortConfig::default())
}
