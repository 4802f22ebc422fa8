//! End-to-end enrollment flows through the workflow entry points.

use super::helpers::{Trial, eligible_answers, trial};
use crate::test_helpers::caller;
use chrono::Duration;
use cohort::{
    caller::CallerRole,
    error::ErrorKind,
    participant::{
        domain::{ParticipantId, ParticipantProfile, ParticipantStatus},
        ports::ParticipantFilter,
        services::{SubmitScreenerRequest, TransitionParticipantRequest},
    },
    study::domain::{ScreenerAnswers, ScreenerValue},
};
use eyre::ensure;
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn participant_walks_the_full_lifecycle(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[(0, 3), (7, 3)]).await?;
    let (owner, lead) = trial.register().await?;
    ensure!(lead.status() == ParticipantStatus::Lead, "new participants start as leads");

    let screened = trial.screen(&owner, &lead, &study).await?;
    ensure!(screened.study_id() == Some(study.id()), "screening assigns the study");

    trial.clock.advance(Duration::days(2));
    let enrolled_on = trial.clock.utc();
    let (enrolled, schedule) = trial
        .advance(
            &screened,
            &[ParticipantStatus::Consented, ParticipantStatus::Enrolled],
        )
        .await?;
    ensure!(enrolled.enrolled_at() == Some(enrolled_on), "enrollment is stamped");
    let schedule = schedule.ok_or_else(|| eyre::eyre!("enrollment should generate tasks"))?;
    ensure!(schedule.created == 2, "expected two new instances");

    trial.clock.advance(Duration::days(30));
    let (completed, _) = trial
        .advance(
            &enrolled,
            &[ParticipantStatus::Active, ParticipantStatus::Completed],
        )
        .await?;
    ensure!(completed.status() == ParticipantStatus::Completed, "lifecycle completes");
    ensure!(
        completed.enrolled_at() == Some(enrolled_on),
        "later transitions keep the enrollment timestamp"
    );
    ensure!(
        completed.version() > enrolled.version(),
        "every accepted change bumps the version"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ineligible_lead_can_rescreen(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[]).await?;
    let (owner, lead) = trial.register().await?;

    let minor = ScreenerAnswers::baseline()
        .with_answer("age", ScreenerValue::Integer(16))
        .with_answer("smoker", ScreenerValue::Text("no".to_owned()));
    let first = trial
        .workflow
        .submit_screener(&owner, SubmitScreenerRequest::new(lead.id(), study.id(), minor))
        .await?;
    ensure!(!first.response.is_eligible(), "minors are ineligible");
    ensure!(first.participant.status() == ParticipantStatus::Lead, "stays a lead");
    ensure!(
        first.response.verdict().unmet_criteria().len() == 1,
        "only the age criterion fails"
    );

    let second = trial
        .workflow
        .submit_screener(
            &owner,
            SubmitScreenerRequest::new(lead.id(), study.id(), eligible_answers()),
        )
        .await?;
    ensure!(
        second.participant.status() == ParticipantStatus::Screened,
        "eligible answers screen the lead"
    );

    let history = trial.workflow.enrollment().screener_history(lead.id()).await?;
    ensure!(history.len() == 2, "both submissions are kept");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn screened_participant_cannot_switch_studies(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let first = trial.recruiting_study(&[]).await?;
    let second = trial.recruiting_study(&[]).await?;
    let (owner, lead) = trial.register().await?;
    trial.screen(&owner, &lead, &first).await?;

    let result = trial
        .workflow
        .submit_screener(
            &owner,
            SubmitScreenerRequest::new(lead.id(), second.id(), eligible_answers()),
        )
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("reassignment should be rejected"))?;
    ensure!(err.kind() == ErrorKind::Validation, "unexpected kind {}", err.kind());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_studies_reject_screeners(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[]).await?;
    trial.workflow.catalog().close(study.id()).await?;
    let (owner, lead) = trial.register().await?;

    let result = trial
        .workflow
        .submit_screener(
            &owner,
            SubmitScreenerRequest::new(lead.id(), study.id(), eligible_answers()),
        )
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("closed study should reject screeners"))?;
    ensure!(err.kind() == ErrorKind::Validation, "unexpected kind {}", err.kind());
    let stored = trial
        .workflow
        .enrollment()
        .find_by_id(lead.id())
        .await?
        .ok_or_else(|| eyre::eyre!("participant should still exist"))?;
    ensure!(stored.status() == ParticipantStatus::Lead, "status is unchanged");
    ensure!(stored.study_id().is_none(), "no study is assigned");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_user_registers_only_once(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let (owner, _) = trial.register().await?;

    let result = trial
        .workflow
        .register_participant(&owner, ParticipantProfile::default())
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("second registration should fail"))?;
    ensure!(err.kind() == ErrorKind::Validation, "unexpected kind {}", err.kind());
    Ok(())
}

#[rstest]
#[case(CallerRole::Coordinator)]
#[case(CallerRole::Admin)]
#[case(CallerRole::Sponsor)]
#[tokio::test(flavor = "multi_thread")]
async fn only_participants_self_register(
    trial: Result<Trial, eyre::Report>,
    #[case] role: CallerRole,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let staff = caller(role);

    let result = trial
        .workflow
        .register_participant(&staff, ParticipantProfile::default())
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("{role} should not self-register"))?;
    ensure!(err.kind() == ErrorKind::Forbidden, "unexpected kind {}", err.kind());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn participants_cannot_screen_someone_else(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[]).await?;
    let (_, target) = trial.register().await?;
    let (intruder, _) = trial.register().await?;

    let result = trial
        .workflow
        .submit_screener(
            &intruder,
            SubmitScreenerRequest::new(target.id(), study.id(), eligible_answers()),
        )
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("foreign screener should be refused"))?;
    ensure!(err.kind() == ErrorKind::Forbidden, "unexpected kind {}", err.kind());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roster_lists_participants_by_study_and_status(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[]).await?;
    let (_, enrolled, _) = trial.enroll(&study).await?;
    let (owner, lead) = trial.register().await?;
    let screened = trial.screen(&owner, &lead, &study).await?;
    trial.register().await?;

    let enrollment = trial.workflow.enrollment();
    let study_filter = ParticipantFilter::default().for_study(study.id());
    let in_study = enrollment.list(study_filter).await?;
    let ids: Vec<_> = in_study.iter().map(|participant| participant.id()).collect();
    ensure!(ids == vec![enrolled.id(), screened.id()], "oldest first within the study");

    let only_enrolled = enrollment
        .list(study_filter.with_status(ParticipantStatus::Enrolled))
        .await?;
    ensure!(only_enrolled.len() == 1, "status filter narrows the roster");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staff_status_changes_reject_unknown_participants(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let missing = ParticipantId::new();

    let result = trial
        .workflow
        .transition_participant_status(
            &trial.coordinator,
            TransitionParticipantRequest::new(missing, "SCREENED"),
        )
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("unknown participant should be rejected"))?;
    ensure!(err.kind() == ErrorKind::NotFound, "unexpected kind {}", err.kind());
    Ok(())
}
