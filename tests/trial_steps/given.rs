//! Given steps for trial workflow BDD scenarios.

use super::world::{TrialWorld, run_async};
use crate::test_helpers::caller;
use chrono::{DateTime, Utc};
use cohort::{
    caller::CallerRole,
    participant::{
        domain::{ParticipantProfile, ParticipantStatus},
        services::{SubmitScreenerRequest, TransitionParticipantRequest},
    },
    study::{
        domain::{ScreenerAnswers, ScreenerValue, StudyStatus},
        services::{AddTaskDefinitionRequest, RegisterStudyRequest},
    },
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"the clock reads "{instant}""#)]
fn clock_reads(world: &mut TrialWorld, instant: String) -> Result<(), eyre::Report> {
    let parsed = DateTime::parse_from_rfc3339(&instant)
        .wrap_err("parse scenario clock instant")?
        .with_timezone(&Utc);
    world.clock.set(parsed);
    Ok(())
}

#[given(r#"a recruiting study "{title}""#)]
fn recruiting_study(world: &mut TrialWorld, title: String) -> Result<(), eyre::Report> {
    let catalog = world.workflow.catalog();
    let study = run_async(catalog.register_study(RegisterStudyRequest::new(
        title,
        "Scenario study",
    )))
    .wrap_err("register scenario study")?;
    run_async(catalog.update_status(study.id(), StudyStatus::Recruiting.as_str()))
        .wrap_err("open scenario study for recruitment")?;
    world.study_id = Some(study.id());
    Ok(())
}

#[given(
    r#"a recruiting study "{title}" with a task at day {offset:u32} lasting {window:u32} days"#
)]
fn recruiting_study_with_task(
    world: &mut TrialWorld,
    title: String,
    offset: u32,
    window: u32,
) -> Result<(), eyre::Report> {
    recruiting_study(world, title)?;
    let study_id = world.study_id()?;
    let definition = run_async(world.workflow.catalog().add_task_definition(
        AddTaskDefinitionRequest::new(study_id, format!("Day {offset} survey"), offset)
            .with_window_days(window),
    ))
    .wrap_err("add scenario task definition")?;
    world.task_definitions.push(definition);
    Ok(())
}

#[given("a registered participant")]
fn registered_participant(world: &mut TrialWorld) -> Result<(), eyre::Report> {
    let owner = caller(CallerRole::Participant);
    let participant = run_async(
        world
            .workflow
            .register_participant(&owner, ParticipantProfile::default()),
    )
    .wrap_err("register scenario participant")?;
    world.participant = Some((owner, participant));
    Ok(())
}

#[given("an enrolled participant")]
fn enrolled_participant(world: &mut TrialWorld) -> Result<(), eyre::Report> {
    registered_participant(world)?;
    let study_id = world.study_id()?;
    let (owner, participant) = world.participant()?;
    let participant_id = participant.id();

    let answers = ScreenerAnswers::baseline()
        .with_answer("age", ScreenerValue::Integer(34))
        .with_answer("smoker", ScreenerValue::Text("no".to_owned()));
    run_async(world.workflow.submit_screener(
        &owner,
        SubmitScreenerRequest::new(participant_id, study_id, answers),
    ))
    .wrap_err("screen scenario participant")?;

    for status in [ParticipantStatus::Consented, ParticipantStatus::Enrolled] {
        let moved = run_async(world.workflow.transition_participant_status(
            &world.coordinator,
            TransitionParticipantRequest::new(participant_id, status.as_str()),
        ))
        .wrap_err_with(|| format!("move scenario participant to {status}"))?;
        world.last_schedule = moved.schedule;
        world.participant = Some((owner, moved.transition.participant));
    }
    Ok(())
}

#[given(r#"a coordinator has moved the participant to "{label}""#)]
fn coordinator_has_moved(world: &mut TrialWorld, label: String) -> Result<(), eyre::Report> {
    let (owner, participant) = world.participant()?;
    let moved = run_async(world.workflow.transition_participant_status(
        &world.coordinator,
        TransitionParticipantRequest::new(participant.id(), label),
    ))
    .wrap_err("move scenario participant")?;
    world.participant = Some((owner, moved.transition.participant));
    Ok(())
}
