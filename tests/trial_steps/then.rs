//! Then steps for trial workflow BDD scenarios.

use super::world::{TrialWorld, run_async};
use chrono::NaiveDate;
use cohort::{
    participant::domain::ParticipantStatus,
    safety::domain::AdverseEventStatus,
    schedule::domain::TaskInstanceStatus,
};
use eyre::{WrapErr, ensure};
use rstest_bdd_macros::then;

#[then(r#"the participant status is "{label}""#)]
fn participant_status_is(world: &TrialWorld, label: String) -> Result<(), eyre::Report> {
    let expected = ParticipantStatus::try_from(label.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let (_, participant) = world.participant()?;

    let stored = run_async(world.workflow.enrollment().find_by_id(participant.id()))
        .wrap_err("reload scenario participant")?
        .ok_or_else(|| eyre::eyre!("participant disappeared from the store"))?;
    ensure!(
        stored.status() == expected,
        "expected status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then("the screener is recorded as ineligible")]
fn screener_recorded_ineligible(world: &TrialWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_screener
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing screener outcome"))?;
    ensure!(
        !outcome.response.is_eligible(),
        "expected an ineligible verdict"
    );

    let history = run_async(
        world
            .workflow
            .enrollment()
            .screener_history(outcome.participant.id()),
    )
    .wrap_err("load screener history")?;
    ensure!(
        history.iter().any(|response| response.id() == outcome.response.id()),
        "screener response was not stored"
    );
    Ok(())
}

#[then(r#"the request fails with "{kind}""#)]
fn request_fails_with(world: &TrialWorld, kind: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the request to fail"))?;
    ensure!(
        err.kind().as_str() == kind,
        "expected {kind}, got {} ({err})",
        err.kind()
    );
    Ok(())
}

#[then("the participant has {count:usize} pending task")]
fn participant_has_pending_tasks(world: &TrialWorld, count: usize) -> Result<(), eyre::Report> {
    let (owner, participant) = world.participant()?;
    let pending = run_async(world.workflow.list_task_instances(
        &owner,
        participant.id(),
        Some(TaskInstanceStatus::Pending),
    ))
    .wrap_err("list pending tasks")?;
    ensure!(
        pending.len() == count,
        "expected {count} pending tasks, found {}",
        pending.len()
    );
    Ok(())
}

#[then(r#"the task for day {offset:u32} is available on "{available}" and due on "{due}""#)]
fn task_window_is(
    world: &TrialWorld,
    offset: u32,
    available: String,
    due: String,
) -> Result<(), eyre::Report> {
    let expected_available =
        NaiveDate::parse_from_str(&available, "%Y-%m-%d").wrap_err("parse available date")?;
    let expected_due = NaiveDate::parse_from_str(&due, "%Y-%m-%d").wrap_err("parse due date")?;
    let instance = world.task_for_day(offset)?;

    ensure!(
        instance.available_date().date_naive() == expected_available,
        "available on {}, expected {expected_available}",
        instance.available_date()
    );
    ensure!(
        instance.due_date().date_naive() == expected_due,
        "due on {}, expected {expected_due}",
        instance.due_date()
    );
    Ok(())
}

#[then(r#"the task for day {offset:u32} was completed on "{date}""#)]
fn task_completed_on(world: &TrialWorld, offset: u32, date: String) -> Result<(), eyre::Report> {
    let expected = NaiveDate::parse_from_str(&date, "%Y-%m-%d").wrap_err("parse completion date")?;
    let instance = world.task_for_day(offset)?;
    ensure!(
        instance.status() == TaskInstanceStatus::Completed,
        "the day {offset} task is {}",
        instance.status()
    );
    ensure!(
        instance.completed_date().map(|at| at.date_naive()) == Some(expected),
        "completed on {:?}, expected {expected}",
        instance.completed_date()
    );
    Ok(())
}

#[then("{count:usize} task instances are created")]
fn task_instances_created(world: &TrialWorld, count: usize) -> Result<(), eyre::Report> {
    let schedule = world
        .last_schedule
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing generated schedule"))?;
    ensure!(
        schedule.created == count,
        "expected {count} new instances, found {}",
        schedule.created
    );
    Ok(())
}

#[then(r#"the adverse event status is "{label}""#)]
fn adverse_event_status_is(world: &TrialWorld, label: String) -> Result<(), eyre::Report> {
    let expected = AdverseEventStatus::try_from(label.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let event = world
        .last_event
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing adverse event"))?;
    ensure!(
        event.status() == expected,
        "expected {expected}, found {}",
        event.status()
    );
    Ok(())
}

#[then("the adverse event is escalated")]
fn adverse_event_escalated(world: &TrialWorld) -> Result<(), eyre::Report> {
    expect_escalation(world, true)
}

#[then("the adverse event is not escalated")]
fn adverse_event_not_escalated(world: &TrialWorld) -> Result<(), eyre::Report> {
    expect_escalation(world, false)
}

fn expect_escalation(world: &TrialWorld, expected: bool) -> Result<(), eyre::Report> {
    let event = world
        .last_event
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing adverse event"))?;
    ensure!(
        event.escalated() == expected,
        "expected escalated = {expected}"
    );
    Ok(())
}
