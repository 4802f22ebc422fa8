//! When steps for trial workflow BDD scenarios.

use super::world::{TrialWorld, run_async};
use cohort::{
    caller::Caller,
    participant::services::{SubmitScreenerRequest, TransitionParticipantRequest},
    safety::{
        domain::{AdverseEvent, AdverseEventSeverity},
        services::ReportAdverseEventRequest,
    },
    study::domain::{ScreenerAnswers, ScreenerValue},
};
use chrono::Duration;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::when;

#[when(r#"the participant submits a screener with age {age:i64} and smoker "{smoker}""#)]
fn submit_screener(world: &mut TrialWorld, age: i64, smoker: String) -> Result<(), eyre::Report> {
    let study_id = world.study_id()?;
    let (owner, participant) = world.participant()?;
    let answers = ScreenerAnswers::baseline()
        .with_answer("age", ScreenerValue::Integer(age))
        .with_answer("smoker", ScreenerValue::Text(smoker));
    let request = SubmitScreenerRequest::new(participant.id(), study_id, answers);

    let result = run_async(world.workflow.submit_screener(&owner, request));
    if let Some(outcome) = world.record(result) {
        world.participant = Some((owner, outcome.participant.clone()));
        world.last_screener = Some(outcome);
    }
    Ok(())
}

#[when(r#"a coordinator requests status "{label}""#)]
fn coordinator_requests_status(world: &mut TrialWorld, label: String) -> Result<(), eyre::Report> {
    let coordinator = world.coordinator;
    request_status(world, coordinator, label)
}

#[when(r#"the participant requests status "{label}""#)]
fn participant_requests_status(world: &mut TrialWorld, label: String) -> Result<(), eyre::Report> {
    let (owner, _) = world.participant()?;
    request_status(world, owner, label)
}

#[when("a coordinator generates the schedule")]
fn coordinator_generates_schedule(world: &mut TrialWorld) -> Result<(), eyre::Report> {
    let (_, participant) = world.participant()?;
    let participant_id = participant.id();
    let result = run_async(
        world
            .workflow
            .generate_task_schedule(&world.coordinator, participant_id),
    );
    if let Some(schedule) = world.record(result) {
        world.last_schedule = Some(schedule);
    }
    Ok(())
}

#[when(r#"the participant reports a "{severity}" adverse event"#)]
fn participant_reports_event(
    world: &mut TrialWorld,
    severity: String,
) -> Result<(), eyre::Report> {
    let parsed = AdverseEventSeverity::try_from(severity.as_str())
        .map_err(|err| eyre::eyre!("invalid severity in scenario: {err}"))?;
    let (owner, participant) = world.participant()?;
    let request = ReportAdverseEventRequest::new(
        participant.id(),
        "Hives after the evening dose",
        world.clock.utc().date_naive(),
        parsed,
    );

    let result = run_async(world.workflow.report_adverse_event(&owner, request));
    if let Some(outcome) = world.record(result) {
        world.last_event = Some(outcome.event);
    }
    Ok(())
}

#[when(r#"a coordinator sets the adverse event status to "{label}""#)]
fn coordinator_sets_event_status(
    world: &mut TrialWorld,
    label: String,
) -> Result<(), eyre::Report> {
    let event_id = world
        .last_event
        .as_ref()
        .map(AdverseEvent::id)
        .ok_or_else(|| eyre::eyre!("missing adverse event in scenario world"))?;

    let result = run_async(world.workflow.update_adverse_event_status(
        &world.coordinator,
        event_id,
        &label,
    ));
    if let Some(event) = world.record(result) {
        world.last_event = Some(event);
    }
    Ok(())
}

#[when("the clock moves forward {hours:i64} hours")]
fn clock_moves_forward(world: &mut TrialWorld, hours: i64) -> Result<(), eyre::Report> {
    let step =
        Duration::try_hours(hours).ok_or_else(|| eyre::eyre!("{hours} hours is out of range"))?;
    world.clock.advance(step);
    Ok(())
}

#[when("the participant completes the task for day {offset:u32}")]
fn participant_completes_task(world: &mut TrialWorld, offset: u32) -> Result<(), eyre::Report> {
    let instance = world.task_for_day(offset)?;
    let (owner, _) = world.participant()?;
    run_async(world.workflow.complete_task_instance(&owner, instance.id()))
        .wrap_err("complete scenario task")?;
    Ok(())
}

fn request_status(
    world: &mut TrialWorld,
    requester: Caller,
    label: String,
) -> Result<(), eyre::Report> {
    let (owner, participant) = world.participant()?;
    let request = TransitionParticipantRequest::new(participant.id(), label);

    let result = run_async(
        world
            .workflow
            .transition_participant_status(&requester, request),
    );
    if let Some(moved) = world.record(result) {
        world.participant = Some((owner, moved.transition.participant));
    }
    Ok(())
}
