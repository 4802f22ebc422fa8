//! Task schedule generation, completion, and listing through the workflow.

use super::helpers::{Trial, at_midnight, trial};
use chrono::Duration;
use cohort::{
    config::CohortConfig,
    error::ErrorKind,
    schedule::domain::{TaskInstanceId, TaskInstanceStatus},
    study::services::AddTaskDefinitionRequest,
};
use eyre::ensure;
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn windows_follow_the_enrollment_date(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[(14, 5), (0, 2), (7, 3)]).await?;
    let (owner, participant, _) = trial.enroll(&study).await?;

    let listed = trial
        .workflow
        .list_task_instances(&owner, participant.id(), None)
        .await?;

    let windows: Vec<_> = listed
        .iter()
        .map(|instance| (instance.available_date(), instance.due_date()))
        .collect();
    let expected = vec![
        (at_midnight(2024, 1, 1)?, at_midnight(2024, 1, 3)?),
        (at_midnight(2024, 1, 8)?, at_midnight(2024, 1, 11)?),
        (at_midnight(2024, 1, 15)?, at_midnight(2024, 1, 20)?),
    ];
    ensure!(windows == expected, "unexpected windows {windows:?}");
    ensure!(
        listed
            .iter()
            .all(|instance| instance.status() == TaskInstanceStatus::Pending),
        "new instances are pending"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn regeneration_only_adds_new_definitions(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[(7, 3)]).await?;
    let (_, participant, first) = trial.enroll(&study).await?;
    let first = first.ok_or_else(|| eyre::eyre!("enrollment should generate tasks"))?;

    trial
        .workflow
        .catalog()
        .add_task_definition(AddTaskDefinitionRequest::new(study.id(), "Exit survey", 28))
        .await?;
    let second = trial
        .workflow
        .generate_task_schedule(&trial.coordinator, participant.id())
        .await?;

    ensure!(second.created == 1, "only the new definition is created");
    ensure!(second.instances.len() == 2, "existing instances are returned");
    ensure!(
        second
            .instances
            .iter()
            .any(|instance| first.instances.contains(instance)),
        "the first instance is kept as-is"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn strict_configuration_rejects_regeneration() -> Result<(), eyre::Report> {
    let trial = Trial::with_config(CohortConfig::strict())?;
    let study = trial.recruiting_study(&[(7, 3), (14, 3)]).await?;
    let (_, participant, _) = trial.enroll(&study).await?;

    let result = trial
        .workflow
        .generate_task_schedule(&trial.coordinator, participant.id())
        .await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("duplicates should be rejected"))?;
    ensure!(
        err.kind() == ErrorKind::AlreadyGenerated,
        "unexpected kind {}",
        err.kind()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_auto_generation_waits_for_staff() -> Result<(), eyre::Report> {
    let config = CohortConfig {
        auto_generate_schedule_on_enrollment: false,
        ..CohortConfig::default()
    };
    let trial = Trial::with_config(config)?;
    let study = trial.recruiting_study(&[(7, 3)]).await?;
    let (owner, participant, schedule) = trial.enroll(&study).await?;
    ensure!(schedule.is_none(), "no schedule is generated on enrollment");

    let listed = trial
        .workflow
        .list_task_instances(&owner, participant.id(), None)
        .await?;
    ensure!(listed.is_empty(), "nothing exists before explicit generation");

    let generated = trial
        .workflow
        .generate_task_schedule(&trial.coordinator, participant.id())
        .await?;
    ensure!(generated.created == 1, "explicit generation creates the task");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn participants_complete_their_own_tasks_once(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[(0, 3), (7, 3)]).await?;
    let (owner, participant, schedule) = trial.enroll(&study).await?;
    let schedule = schedule.ok_or_else(|| eyre::eyre!("enrollment should generate tasks"))?;
    let first = schedule
        .instances
        .first()
        .ok_or_else(|| eyre::eyre!("expected at least one instance"))?;

    trial.clock.advance(Duration::hours(30));
    let completed_at = trial.clock.utc();
    let completed = trial
        .workflow
        .complete_task_instance(&owner, first.id())
        .await?;
    ensure!(completed.completed_date() == Some(completed_at), "completion is stamped");

    trial.clock.set(completed_at + Duration::days(1));
    let again = trial
        .workflow
        .complete_task_instance(&owner, first.id())
        .await?;
    ensure!(
        again.completed_date() == Some(completed_at),
        "completing twice keeps the first date"
    );

    let pending = trial
        .workflow
        .list_task_instances(&owner, participant.id(), Some(TaskInstanceStatus::Pending))
        .await?;
    ensure!(pending.len() == 1, "one task remains pending");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_participants_cannot_touch_a_schedule(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;
    let study = trial.recruiting_study(&[(0, 3)]).await?;
    let (_, participant, schedule) = trial.enroll(&study).await?;
    let instance_id = schedule
        .and_then(|generated| generated.instances.first().map(|instance| instance.id()))
        .ok_or_else(|| eyre::eyre!("enrollment should generate tasks"))?;
    let (intruder, _) = trial.register().await?;

    let completion = trial
        .workflow
        .complete_task_instance(&intruder, instance_id)
        .await;
    let listing = trial
        .workflow
        .list_task_instances(&intruder, participant.id(), None)
        .await;

    ensure!(
        completion.err().map(|err| err.kind()) == Some(ErrorKind::Forbidden),
        "foreign completion should be forbidden"
    );
    ensure!(
        listing.err().map(|err| err.kind()) == Some(ErrorKind::Forbidden),
        "foreign listing should be forbidden"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_an_unknown_instance_is_not_found(
    trial: Result<Trial, eyre::Report>,
) -> Result<(), eyre::Report> {
    let trial = trial?;

    let result = trial
        .workflow
        .complete_task_instance(&trial.coordinator, TaskInstanceId::new())
        .await;

    ensure!(
        result.err().map(|err| err.kind()) == Some(ErrorKind::NotFound),
        "unknown instance should be not found"
    );
    Ok(())
}
