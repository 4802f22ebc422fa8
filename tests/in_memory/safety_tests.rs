//! Adverse event reporting, review, and withdrawal through the workflow.

use super::helpers::{Trial, trial};
use crate::test_helpers::caller;
use chrono::Duration;
use cohort::{
    caller::{Caller, CallerRole},
    config::CohortConfig,
    error::ErrorKind,
    participant::domain::{ParticipantId, ParticipantStatus},
    safety::{
        domain::{AdverseEvent, AdverseEventSeverity, AdverseEventStatus},
        services::ReportAdverseEventRequest,
    },
    workflow::WorkflowResult,
};
use eyre::ensure;
use mockable::Clock;
use rstest::rstest;

fn report(
    trial: &Trial,
    participant_id: ParticipantId,
    severity: AdverseEventSeverity,
) -> ReportAdverseEventRequest {
    ReportAdverseEventRequest::new(
        participant_id,
        "Rash on both forearms",
        trial.clock.utc().date_naive(),
        severity,
    )
}

async fn report_as(
    trial: &Trial,
    reporter: &Caller,
    participant_id: ParticipantId,
    severity: AdverseEventSeverity,
) -> WorkflowResult<AdverseEvent> {
    Ok(trial
        .workflow
        .report_adverse_event(reporter, report(trial, participant_id, severity))
        .await?
        .event)
}

#[rstest]
#[case(AdverseEventSeverity::Mild, false)]
#[case(AdverseEventSeverity::Moderate, false)]
#[case(AdverseEventSeverity::Severe, false)]
#[case(AdverseEventSeverity::LifeThreatening, true)]
#[tokio::test(flavor = "multi_thread")]
async fn reports_start_under_review(
    trial: Result<Trial, eyre::Report>,
    #[case] severity: AdverseEventSeverity,
    #[case] escalated: bool,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let (owner, participant) = trial.register().await?;

    let event = report_as(&trial, &owner, participant.id(), severity).await?;

    ensure!(event.status() == AdverseEventStatus::UnderReview, "new events await review");
    ensure!(event.escalated() == escalated, "escalation for {severity}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn life_threatening_event_withdraws_when_configured() -> Result<(), eyre::Report> {
    let config = CohortConfig {
        withdraw_on_life_threatening: true,
        ..CohortConfig::default()
    };
    let trial = Trial::with_config(config)?;
    let study = trial.recruiting_study(&[(7, 3)]).await?;
    let (owner, participant, _) = trial.enroll(&study).await?;

    let outcome = trial
        .workflow
        .report_adverse_event(
            &owner,
            report(&trial, participant.id(), AdverseEventSeverity::LifeThreatening),
        )
        .await?;

    let withdrawal = outcome
        .withdrawal
        .ok_or_else(|| eyre::eyre!("withdrawal should be requested"))?;
    ensure!(
        withdrawal.participant.status() == ParticipantStatus::Withdrawn,
        "participant is withdrawn"
    );
    ensure!(outcome.event.escalated(), "event is escalated");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn withdrawal_is_off_by_default(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[]).await?;
    let (owner, participant, _) = trial.enroll(&study).await?;

    let outcome = trial
        .workflow
        .report_adverse_event(
            &owner,
            report(&trial, participant.id(), AdverseEventSeverity::LifeThreatening),
        )
        .await?;

    ensure!(outcome.withdrawal.is_none(), "no withdrawal without the policy");
    let stored = trial
        .workflow
        .enrollment()
        .find_by_id(participant.id())
        .await?
        .ok_or_else(|| eyre::eyre!("participant should exist"))?;
    ensure!(stored.status() == ParticipantStatus::Enrolled, "status is unchanged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restricted_review_keeps_closed_events_closed() -> Result<(), eyre::Report> {
    let trial = Trial::with_config(CohortConfig::strict())?;
    let (owner, participant) = trial.register().await?;
    let event =
        report_as(&trial, &owner, participant.id(), AdverseEventSeverity::Moderate).await?;

    let closed = trial
        .workflow
        .update_adverse_event_status(&trial.coordinator, event.id(), "CLOSED")
        .await?;
    ensure!(closed.status() == AdverseEventStatus::Closed, "review closes");

    let reopened = trial
        .workflow
        .update_adverse_event_status(&trial.coordinator, event.id(), "UNDER_REVIEW")
        .await;
    ensure!(
        reopened.err().map(|err| err.kind()) == Some(ErrorKind::InvalidStatus),
        "closed reviews stay closed"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unrestricted_review_accepts_any_order(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let (owner, participant) = trial.register().await?;
    let event = report_as(&trial, &owner, participant.id(), AdverseEventSeverity::Mild).await?;

    for label in ["CLOSED", "UNDER_REVIEW", "RESOLVED", "ESCALATED"] {
        let updated = trial
            .workflow
            .update_adverse_event_status(&trial.coordinator, event.id(), label)
            .await?;
        ensure!(updated.status().as_str() == label, "status becomes {label}");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn participants_cannot_review_events(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let (owner, participant) = trial.register().await?;
    let event = report_as(&trial, &owner, participant.id(), AdverseEventSeverity::Mild).await?;

    let result = trial
        .workflow
        .update_adverse_event_status(&owner, event.id(), "RESOLVED")
        .await;

    ensure!(
        result.err().map(|err| err.kind()) == Some(ErrorKind::Forbidden),
        "participants may not review"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staff_reports_require_a_known_participant(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let pi = caller(CallerRole::Pi);

    let result = report_as(&trial, &pi, ParticipantId::new(), AdverseEventSeverity::Severe).await;

    ensure!(
        result.err().map(|err| err.kind()) == Some(ErrorKind::NotFound),
        "unknown participant should be not found"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn events_are_listed_newest_first(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let (owner, participant) = trial.register().await?;
    let older = report_as(&trial, &owner, participant.id(), AdverseEventSeverity::Mild).await?;
    trial.clock.advance(Duration::hours(4));
    let newer = report_as(&trial, &owner, participant.id(), AdverseEventSeverity::Severe).await?;

    let listed = trial
        .workflow
        .list_adverse_events(&owner, participant.id())
        .await?;

    let ids: Vec<_> = listed.iter().map(AdverseEvent::id).collect();
    ensure!(ids == vec![newer.id(), older.id()], "newest event comes first");
    Ok(())
}
